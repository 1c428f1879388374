//! TEFAS 基金收益后端服务
//!
//! 提供基金收益排名、定投复利模拟、汇率调整收益以及账户/交易记录的 RESTful API 服务
//! 数据来源：TEFAS、Binance

mod config;     // 配置加载
mod error;      // 错误类型
mod handlers;   // HTTP 请求处理器
mod middleware; // 中间件
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务
mod state;      // 共享状态

#[cfg(test)]
mod test_support;

use actix_web::{web, App, HttpServer, middleware::Logger};
use env_logger::Env;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::middleware::ApiKeyMiddleware;
use crate::services::binance::BinanceClient;
use crate::services::common::USER_AGENT;
use crate::services::store;
use crate::services::tefas::TefasClient;
use crate::state::AppState;

/// 应用程序入口
///
/// 加载配置，创建上游客户端与存储，启动 HTTP 服务器
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let (config, load_notes) = AppConfig::load();

    // 初始化日志系统，RUST_LOG 优先于配置文件
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));
    log::info!("{}", load_notes);

    if config.api.api_key.is_empty() {
        log::warn!("未设置 API_KEY，账户与交易接口不启用认证");
    }

    let http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.api.timeout_secs))
        .connect_timeout(Duration::from_secs(config.api.connect_timeout_secs))
        .build()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let store = store::open(&config.storage)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let state = AppState::new(
        Arc::new(TefasClient::new(http.clone(), config.upstream.tefas_base_url.clone())),
        Arc::new(BinanceClient::new(http, config.upstream.binance_base_url.clone())),
        store,
        config.analysis.clone(),
    );
    let api_key = config.api.api_key.clone();

    log::info!("启动 TEFAS 后端服务，监听 {}", config.bind_addr());

    // 创建并启动 HTTP 服务器
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(
                ApiKeyMiddleware::new(api_key.clone())
                    .protect("/api/v1/accounts")
                    .protect("/api/v1/transactions"),
            ) // API Key 认证
            .wrap(Logger::default()) // 添加请求日志中间件
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::config) // 配置路由
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(config.bind_addr())?.run().await
}
