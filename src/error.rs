//! 服务错误类型
//!
//! 上游请求与数据异常不做重试，直接向调用方传播

use actix_web::http::StatusCode;
use thiserror::Error;

/// 服务错误
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 上游网络/超时/连接错误，或上游返回非 2xx 状态码
    #[error("上游请求失败: {0}")]
    UpstreamTransport(String),

    /// 上游响应可解析，但缺少字段或字段格式不符
    #[error("上游数据异常: {0}")]
    UpstreamData(String),

    /// 请求参数无效
    #[error("参数无效: {0}")]
    InvalidInput(String),

    /// 记录不存在
    #[error("{0}")]
    NotFound(String),

    /// 文档存储错误
    #[error("存储错误: {0}")]
    Storage(String),
}

impl ServiceError {
    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::UpstreamData(err.to_string())
        } else {
            ServiceError::UpstreamTransport(err.to_string())
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Storage(err.to_string())
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
