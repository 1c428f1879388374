//! Binance 价格接口
//!
//! 对接 https://api.binance.com/api/v3/klines，取指定交易对的 K 线数据
//! 汇率调整收益使用某日第一根日 K 线的收盘价

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::Client;
use serde_json::Value;

use crate::error::{ServiceError, ServiceResult};
use crate::models::Candle;

/// Binance 默认地址
pub const BINANCE_BASE_URL: &str = "https://api.binance.com";
/// K 线 API
pub const KLINES_PATH: &str = "/api/v3/klines";
/// 日 K 线周期
pub const DAILY_INTERVAL: &str = "1d";

const DAY_MILLIS: i64 = 86_400_000;

/// 某日（UTC）的毫秒时间范围，首尾均包含
pub fn day_bounds_millis(date: NaiveDate) -> (i64, i64) {
    let start = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
    (start, start + DAY_MILLIS - 1)
}

/// 价格数据源
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// 获取时间范围内的 K 线
    async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> ServiceResult<Vec<Candle>>;

    /// 获取某日第一根日 K 线的收盘价
    async fn close_on(&self, symbol: &str, date: NaiveDate) -> ServiceResult<f64> {
        let (start, end) = day_bounds_millis(date);
        let candles = self.klines(symbol, DAILY_INTERVAL, start, end).await?;
        candles.first().map(|c| c.close).ok_or_else(|| {
            ServiceError::UpstreamData(format!("{} 在 {} 没有 K 线数据", symbol, date))
        })
    }
}

fn number_at(row: &[Value], index: usize) -> ServiceResult<f64> {
    let field = row
        .get(index)
        .ok_or_else(|| ServiceError::UpstreamData(format!("K 线缺少第 {} 列", index)))?;
    let parsed = match field {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| ServiceError::UpstreamData(format!("K 线第 {} 列不是数值: {}", index, field)))
}

fn millis_at(row: &[Value], index: usize) -> ServiceResult<i64> {
    row.get(index)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| ServiceError::UpstreamData(format!("K 线第 {} 列不是时间戳", index)))
}

/// 解析 K 线响应
///
/// 格式: [[openTime,"open","high","low","close","volume",closeTime,...],...]
pub fn parse_klines(raw: &Value) -> ServiceResult<Vec<Candle>> {
    let rows = raw
        .as_array()
        .ok_or_else(|| ServiceError::UpstreamData(format!("K 线响应不是数组: {}", raw)))?;

    rows.iter()
        .map(|row| {
            let row = row
                .as_array()
                .ok_or_else(|| ServiceError::UpstreamData("K 线行不是数组".to_string()))?;
            Ok(Candle {
                open_time: millis_at(row, 0)?,
                open: number_at(row, 1)?,
                high: number_at(row, 2)?,
                low: number_at(row, 3)?,
                close: number_at(row, 4)?,
                volume: number_at(row, 5)?,
                close_time: millis_at(row, 6)?,
            })
        })
        .collect()
}

/// Binance 客户端
pub struct BinanceClient {
    client: Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PriceSource for BinanceClient {
    async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> ServiceResult<Vec<Candle>> {
        let url = format!("{}{}", self.base_url, KLINES_PATH);
        log::debug!(
            "请求 Binance K 线 URL: {} symbol={} interval={} {}~{}",
            url, symbol, interval, start_ms, end_ms
        );

        let start = start_ms.to_string();
        let end = end_ms.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", interval),
                ("startTime", start.as_str()),
                ("endTime", end.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                log::warn!("Binance 请求失败 {}: {}", url, e);
                ServiceError::from(e)
            })?;

        if !response.status().is_success() {
            log::warn!("Binance 返回异常状态 {}: {}", url, response.status());
            return Err(ServiceError::UpstreamTransport(format!(
                "Binance 返回状态码 {}",
                response.status()
            )));
        }

        let text = response.text().await?;
        let raw: Value = serde_json::from_str(&text)
            .map_err(|e| ServiceError::UpstreamData(format!("Binance 响应不是有效 JSON: {}", e)))?;
        parse_klines(&raw)
    }
}
