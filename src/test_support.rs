//! 测试用数据源

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};

use crate::config::AnalysisConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Candle, FundReturnRecord, FundType, PeriodKind, PeriodWindow};
use crate::services::binance::PriceSource;
use crate::services::returns::window::period_window;
use crate::services::store::MemoryStore;
use crate::services::tefas::FundDataSource;
use crate::state::AppState;

/// 测试窗口基准日
pub fn fake_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

pub fn record(code: &str, category: &str, rate: Option<f64>) -> FundReturnRecord {
    FundReturnRecord {
        code: code.to_string(),
        title: Some(format!("{} PORTFÖY", code)),
        category: category.to_string(),
        return_rate: rate,
        portfolio_value: None,
    }
}

/// 按周期序号返回预设记录的基金数据源（序号相对 fake_today 计算）
pub struct FakeFunds {
    periods: Vec<Vec<FundReturnRecord>>,
    fail_at: Option<usize>,
    calls: AtomicUsize,
}

impl FakeFunds {
    pub fn new(periods: Vec<Vec<FundReturnRecord>>) -> Self {
        Self {
            periods,
            fail_at: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// 指定序号的周期请求失败
    pub fn fail_at(mut self, offset: usize) -> Self {
        self.fail_at = Some(offset);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn offset_of(&self, window: &PeriodWindow) -> Option<usize> {
        (0..self.periods.len().max(self.fail_at.map_or(0, |f| f + 1))).find(|&i| {
            [PeriodKind::Month, PeriodKind::Week]
                .iter()
                .any(|&kind| period_window(fake_today(), kind, i as u32) == *window)
        })
    }
}

#[async_trait]
impl FundDataSource for FakeFunds {
    async fn comparison_raw(&self, window: &PeriodWindow, fund_type: FundType) -> ServiceResult<Value> {
        let records = self.comparison_returns(window, fund_type).await?;
        let rows: Vec<Value> = records
            .iter()
            .map(|r| {
                json!({
                    "FONKODU": r.code,
                    "FONUNVAN": r.title,
                    "FONTURACIKLAMA": r.category,
                    "GETIRIORANI": r.return_rate,
                })
            })
            .collect();
        Ok(json!({ "data": rows }))
    }

    async fn history_info(
        &self,
        code: &str,
        window: &PeriodWindow,
        _fund_type: FundType,
    ) -> ServiceResult<Value> {
        Ok(json!({ "data": [{ "FONKODU": code, "TARIH": window.start.to_string() }] }))
    }

    async fn comparison_returns(
        &self,
        window: &PeriodWindow,
        _fund_type: FundType,
    ) -> ServiceResult<Vec<FundReturnRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let offset = self.offset_of(window);
        if offset.is_some() && offset == self.fail_at {
            return Err(ServiceError::UpstreamTransport("connection reset".to_string()));
        }
        Ok(offset
            .and_then(|i| self.periods.get(i))
            .cloned()
            .unwrap_or_default())
    }
}

/// 按日期返回预设收盘价的价格数据源，缺失日期返回空 K 线
#[derive(Default)]
pub struct FakePrices {
    closes: HashMap<NaiveDate, f64>,
}

impl FakePrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_close(mut self, date: NaiveDate, close: f64) -> Self {
        self.closes.insert(date, close);
        self
    }
}

#[async_trait]
impl PriceSource for FakePrices {
    async fn klines(
        &self,
        _symbol: &str,
        _interval: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> ServiceResult<Vec<Candle>> {
        let date = DateTime::<Utc>::from_timestamp_millis(start_ms)
            .map(|t| t.date_naive())
            .ok_or_else(|| ServiceError::InvalidInput("bad timestamp".to_string()))?;
        Ok(self
            .closes
            .get(&date)
            .map(|&close| Candle {
                open_time: start_ms,
                open: close,
                high: close,
                low: close,
                close,
                volume: 0.0,
                close_time: end_ms,
            })
            .into_iter()
            .collect())
    }
}

/// 使用内存存储和测试数据源的应用状态，基准日固定为 fake_today
pub fn test_state(funds: FakeFunds, prices: FakePrices) -> AppState {
    AppState::new(
        Arc::new(funds),
        Arc::new(prices),
        Arc::new(MemoryStore::new()),
        AnalysisConfig::default(),
    )
    .with_clock(fake_today)
}
