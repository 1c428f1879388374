pub mod accounts;
pub mod health;
pub mod prices;
pub mod tefas;
pub mod transactions;

use actix_web::{error, web, HttpResponse};

use crate::error::ServiceError;
use crate::models::ApiResponse;

/// 将服务错误转换为统一响应
pub fn error_response(err: &ServiceError) -> HttpResponse {
    let status = err.status_code();
    if status.is_server_error() {
        log::error!("请求处理失败: {}", err);
    }
    HttpResponse::build(status).json(ApiResponse::<()>::error(err.to_string()))
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::<()>::error(message))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    // 请求体与查询参数解析失败时同样返回统一格式
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let response = bad_request(format!("请求体无效: {}", err));
        error::InternalError::from_response(err, response).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let response = bad_request(format!("查询参数无效: {}", err));
        error::InternalError::from_response(err, response).into()
    }))
    .service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(accounts::config)
            .configure(transactions::config)
            .configure(tefas::config)
            .configure(prices::config),
    );
}
