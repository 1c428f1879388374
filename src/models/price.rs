//! 价格数据模型

use serde::{Deserialize, Serialize};

/// K线数据
///
/// 包含单根 K 线的 OHLCV 数据，时间为毫秒时间戳
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Candle {
    /// 开盘时间
    pub open_time: i64,
    /// 开盘价
    pub open: f64,
    /// 最高价
    pub high: f64,
    /// 最低价
    pub low: f64,
    /// 收盘价
    pub close: f64,
    /// 成交量
    pub volume: f64,
    /// 收盘时间
    pub close_time: i64,
}

/// 收盘价查询参数
#[derive(Debug, Deserialize, Default)]
pub struct ClosePriceQuery {
    /// 日期（YYYY-MM-DD），默认今天
    pub date: Option<String>,
}

/// 收盘价结果
#[derive(Debug, Serialize, Deserialize)]
pub struct ClosePrice {
    pub symbol: String,
    pub date: String,
    pub close: f64,
}

/// K线查询参数
#[derive(Debug, Deserialize, Default)]
pub struct KlineQuery {
    /// K 线周期，如 1d、1h
    pub interval: Option<String>,
    /// 开始日期（YYYY-MM-DD），默认 30 天前
    pub start: Option<String>,
    /// 结束日期（YYYY-MM-DD），默认今天
    pub end: Option<String>,
}
