//! 收益序列对齐
//!
//! 将「每周期一组记录」重排为「每只基金一条收益序列」

use std::collections::BTreeMap;

use super::fetch::PeriodRecords;

/// 基金代码 -> 收益率序列（最早在前），缺失值保留为 None，模拟前剔除
pub type FundReturnSeries = BTreeMap<String, Vec<Option<f64>>>;

/// 按获取顺序（最新在前）收集每只目标基金的收益率，再反转为最早在前
///
/// 某周期没有该基金的记录时不补位，因此不同基金的序列长度可能不同，
/// 也不保证与周期一一对应
pub fn align(fetched: &[PeriodRecords], target_codes: &[String]) -> FundReturnSeries {
    let mut series = FundReturnSeries::new();

    for code in target_codes {
        let mut rates: Vec<Option<f64>> = fetched
            .iter()
            .filter_map(|period| period.records.iter().find(|r| &r.code == code))
            .map(|r| r.return_rate)
            .collect();
        rates.reverse();
        series.insert(code.clone(), rates);
    }

    series
}

/// 剔除缺失的收益率
pub fn drop_missing(rates: &[Option<f64>]) -> Vec<f64> {
    rates.iter().flatten().copied().collect()
}

/// 最新周期与最早周期的组合规模差
///
/// 两端任一周期缺少该基金或缺少规模数据时返回 None
pub fn portfolio_delta(fetched: &[PeriodRecords], code: &str) -> Option<f64> {
    let value_in = |period: &PeriodRecords| {
        period
            .records
            .iter()
            .find(|r| r.code == code)
            .and_then(|r| r.portfolio_value)
    };
    let newest = value_in(fetched.first()?)?;
    let oldest = value_in(fetched.last()?)?;
    Some(newest - oldest)
}
