//! 汇率调整收益
//!
//! 以期初 1 单位本币投资为基准，期末价值为 `1 + r/100`，
//! 两端分别按期初、期末汇率折算为参考货币后求收益率：
//! `d = 100 * ((price_last / fx_end) / (price_begin / fx_start) - 1)`

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::fetch::PeriodRecords;
use super::simulate::simulate;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{PeriodWindow, SimulationResult};
use crate::services::binance::PriceSource;

/// 单个周期的本币收益及期初、期末汇率
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxPeriod {
    /// 本币收益率，缺失按 0 计
    pub rate: Option<f64>,
    pub fx_start: f64,
    pub fx_end: f64,
}

/// 单周期汇率调整收益率（百分比）
pub fn fx_adjusted_rate(period: &FxPeriod) -> f64 {
    let price_begin = 1.0;
    let price_last = 1.0 + period.rate.unwrap_or(0.0) / 100.0;
    let a = price_begin / period.fx_start;
    let b = price_last / period.fx_end;
    100.0 * (b / a - 1.0)
}

/// 汇率调整后再做定投模拟
pub fn simulate_fx_adjusted(periods: &[FxPeriod], contribution: f64) -> SimulationResult {
    let rates: Vec<f64> = periods.iter().map(fx_adjusted_rate).collect();
    simulate(&rates, contribution)
}

/// 周期边界汇率
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxBounds {
    pub start: f64,
    pub end: f64,
}

fn checked_close(close: f64, symbol: &str, date: NaiveDate) -> ServiceResult<f64> {
    if close.is_finite() && close > 0.0 {
        Ok(close)
    } else {
        Err(ServiceError::UpstreamData(format!(
            "{} 在 {} 的收盘价无效: {}",
            symbol, date, close
        )))
    }
}

/// 逐个周期获取期初、期末收盘价，顺序与 `windows` 一致
///
/// 查询日期不晚于 `today`；任一查询失败则整体失败
pub async fn fetch_fx_bounds(
    prices: &dyn PriceSource,
    symbol: &str,
    windows: &[PeriodWindow],
    today: NaiveDate,
) -> ServiceResult<Vec<FxBounds>> {
    let mut bounds = Vec::with_capacity(windows.len());
    for window in windows {
        let start_date = window.start.min(today);
        let end_date = window.end.min(today);
        let start = checked_close(prices.close_on(symbol, start_date).await?, symbol, start_date)?;
        let end = checked_close(prices.close_on(symbol, end_date).await?, symbol, end_date)?;
        bounds.push(FxBounds { start, end });
    }
    Ok(bounds)
}

/// 按周期对齐本币收益与汇率，结果为最早在前
///
/// 某周期没有该基金记录时跳过该周期，后续会因周期数不足被过滤
pub fn align_with_fx(
    fetched: &[PeriodRecords],
    bounds: &[FxBounds],
    target_codes: &[String],
) -> BTreeMap<String, Vec<FxPeriod>> {
    let mut series = BTreeMap::new();

    for code in target_codes {
        let mut periods: Vec<FxPeriod> = fetched
            .iter()
            .zip(bounds)
            .filter_map(|(period, fx)| {
                period
                    .records
                    .iter()
                    .find(|r| &r.code == code)
                    .map(|r| FxPeriod {
                        rate: r.return_rate,
                        fx_start: fx.start,
                        fx_end: fx.end,
                    })
            })
            .collect();
        periods.reverse();
        series.insert(code.clone(), periods);
    }

    series
}
