//! 业务逻辑服务模块
//!
//! 封装上游数据获取、收益计算和账户存储逻辑

pub mod binance;  // Binance 价格数据
pub mod common;   // 公共常量和辅助函数
pub mod ledger;   // 账户与交易
pub mod pg_store; // PostgreSQL 文档存储
pub mod returns;  // 基金收益聚合
pub mod store;    // 文档存储
pub mod tefas;    // TEFAS 基金数据
