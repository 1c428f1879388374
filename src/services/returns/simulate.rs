//! 定投复利模拟
//!
//! 每期先投入固定金额，再按当期收益率对全部余额计息：
//! `value = (value + contribution) * (1 + r / 100)`

use crate::models::SimulationResult;

/// 按收益率序列（最早在前，已剔除缺失值）模拟定投
///
/// 有效周期数为 0 或投入为 0 时，收益率均定义为 0
pub fn simulate(rates: &[f64], contribution: f64) -> SimulationResult {
    let mut value = 0.0;
    for rate in rates {
        value += contribution;
        value += value * (rate / 100.0);
    }

    let periods = rates.len();
    let invested = periods as f64 * contribution;
    let profit = value - invested;
    let profit_rate = if invested != 0.0 {
        100.0 * profit / invested
    } else {
        0.0
    };
    let avg_period_rate = if periods != 0 {
        profit_rate / periods as f64
    } else {
        0.0
    };

    SimulationResult {
        invested,
        value,
        profit,
        profit_rate,
        avg_period_rate,
        periods,
    }
}
