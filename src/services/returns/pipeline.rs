//! 多周期复利排名流程
//!
//! 获取周期数据 -> 从最新周期发现基金（按类别过滤）-> 对齐收益序列 -> 模拟 -> 排名

use std::collections::HashSet;

use super::align::{align, drop_missing, portfolio_delta};
use super::fetch::{fetch_periods, PeriodRecords, PeriodRequest};
use super::fx::{align_with_fx, fetch_fx_bounds, simulate_fx_adjusted};
use super::rank::{is_excluded, rank, RankOptions};
use super::simulate::simulate;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{FundReturnRecord, FundSimulation, PeriodWindow, SimulationResult};
use crate::services::binance::PriceSource;
use crate::services::tefas::FundDataSource;

/// 复利排名请求
#[derive(Debug, Clone, Copy)]
pub struct CompoundRequest {
    pub periods: PeriodRequest,
    /// 每期投入金额
    pub contribution: f64,
    pub rank: RankOptions,
}

/// 从最新周期中发现目标基金，按类别子串排除，代码去重
fn discover_targets(fetched: &[PeriodRecords], exclude: &[&str]) -> Vec<FundReturnRecord> {
    let Some(newest) = fetched.first() else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    newest
        .records
        .iter()
        .filter(|r| !is_excluded(&r.category, exclude))
        .filter(|r| seen.insert(r.code.clone()))
        .cloned()
        .collect()
}

fn target_codes(targets: &[FundReturnRecord]) -> Vec<String> {
    targets.iter().map(|t| t.code.clone()).collect()
}

fn to_simulation(
    target: FundReturnRecord,
    result: SimulationResult,
    fetched: &[PeriodRecords],
) -> FundSimulation {
    let delta = portfolio_delta(fetched, &target.code);
    FundSimulation {
        code: target.code,
        title: target.title,
        category: target.category,
        result,
        portfolio_delta: delta,
    }
}

/// 全部基金的定投复利排名
pub async fn compound_ranking(
    funds: &dyn FundDataSource,
    request: &CompoundRequest,
) -> ServiceResult<Vec<FundSimulation>> {
    let fetched = fetch_periods(funds, None, &request.periods).await?;
    let targets = discover_targets(&fetched, request.rank.exclude);
    let series = align(&fetched, &target_codes(&targets));

    let simulations: Vec<FundSimulation> = targets
        .into_iter()
        .map(|target| {
            let rates = series
                .get(&target.code)
                .map(|s| drop_missing(s))
                .unwrap_or_default();
            let result = simulate(&rates, request.contribution);
            to_simulation(target, result, &fetched)
        })
        .collect();

    log::info!(
        "复利排名: {} 个周期, {} 只基金",
        request.periods.count,
        simulations.len()
    );
    Ok(rank(simulations, &request.rank))
}

/// 单只基金的定投复利模拟
pub async fn fund_compound(
    funds: &dyn FundDataSource,
    code: &str,
    periods: &PeriodRequest,
    contribution: f64,
) -> ServiceResult<FundSimulation> {
    let universe: HashSet<String> = [code.to_string()].into_iter().collect();
    let fetched = fetch_periods(funds, Some(&universe), periods).await?;

    let target = fetched
        .iter()
        .flat_map(|p| p.records.iter())
        .next()
        .cloned()
        .ok_or_else(|| ServiceError::NotFound(format!("基金 {} 在所选周期内没有数据", code)))?;

    let series = align(&fetched, &[code.to_string()]);
    let rates = series.get(code).map(|s| drop_missing(s)).unwrap_or_default();
    let result = simulate(&rates, contribution);
    Ok(to_simulation(target, result, &fetched))
}

/// 汇率调整后的定投复利排名
///
/// 只保留每个请求周期都有数据的基金（累计投入 = 周期数 × 每期投入）
pub async fn fx_compound_ranking(
    funds: &dyn FundDataSource,
    prices: &dyn PriceSource,
    symbol: &str,
    request: &CompoundRequest,
) -> ServiceResult<Vec<FundSimulation>> {
    let fetched = fetch_periods(funds, None, &request.periods).await?;
    let windows: Vec<PeriodWindow> = fetched.iter().map(|p| p.window).collect();
    let bounds = fetch_fx_bounds(prices, symbol, &windows, request.periods.today).await?;

    let targets = discover_targets(&fetched, request.rank.exclude);
    let series = align_with_fx(&fetched, &bounds, &target_codes(&targets));

    let simulations: Vec<FundSimulation> = targets
        .into_iter()
        .filter_map(|target| {
            let periods = series.get(&target.code)?;
            let result = simulate_fx_adjusted(periods, request.contribution);
            (result.periods == request.periods.count).then(|| to_simulation(target, result, &fetched))
        })
        .collect();

    log::info!(
        "汇率调整排名({}): {} 个周期, {} 只基金数据完整",
        symbol,
        request.periods.count,
        simulations.len()
    );
    Ok(rank(simulations, &request.rank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExclusionScope, FundType, PeriodKind, RankMetric, SortOrder};
    use crate::services::returns::fx::{fx_adjusted_rate, FxPeriod};
    use crate::services::returns::window::period_windows;
    use crate::test_support::{record, FakeFunds, FakePrices, fake_today};

    fn request(count: usize, metric: RankMetric) -> CompoundRequest {
        CompoundRequest {
            periods: PeriodRequest {
                count,
                kind: PeriodKind::Month,
                fund_type: FundType::Securities,
                today: fake_today(),
            },
            contribution: 100.0,
            rank: RankOptions {
                metric,
                order: SortOrder::Desc,
                exclude: ExclusionScope::Equity.substrings(),
                top_n: None,
            },
        }
    }

    fn three_months() -> FakeFunds {
        // 最新周期在前
        FakeFunds::new(vec![
            vec![
                record("AAK", "Hisse Senedi Fonu", Some(10.0)),
                record("TTE", "Hisse Senedi Fonu", Some(1.0)),
                record("PPF", "Para Piyasası Fonu", Some(50.0)),
            ],
            vec![
                record("AAK", "Hisse Senedi Fonu", Some(10.0)),
                record("TTE", "Hisse Senedi Fonu", None),
            ],
            vec![
                record("AAK", "Hisse Senedi Fonu", Some(10.0)),
                record("TTE", "Hisse Senedi Fonu", Some(1.0)),
            ],
        ])
    }

    #[tokio::test]
    async fn test_compound_ranking_end_to_end() {
        let funds = three_months();
        let ranked = compound_ranking(&funds, &request(3, RankMetric::ProfitRate))
            .await
            .unwrap();

        let codes: Vec<&str> = ranked.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["AAK", "TTE"]);

        let aak = &ranked[0].result;
        assert_eq!(aak.invested, 300.0);
        assert!((aak.value - 364.1).abs() < 1e-9);

        // TTE 中间周期为空值，只计 2 期
        let tte = &ranked[1].result;
        assert_eq!(tte.periods, 2);
        assert_eq!(tte.invested, 200.0);
    }

    #[tokio::test]
    async fn test_fund_compound_single_fund() {
        let funds = three_months();
        let sim = fund_compound(&funds, "TTE", &request(3, RankMetric::ProfitRate).periods, 100.0)
            .await
            .unwrap();
        assert_eq!(sim.code, "TTE");
        assert_eq!(sim.result.periods, 2);

        let err = fund_compound(&funds, "XXX", &request(3, RankMetric::ProfitRate).periods, 100.0)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_portfolio_delta_metric() {
        let mut newest = record("AAK", "Hisse Senedi Fonu", Some(1.0));
        newest.portfolio_value = Some(500.0);
        let mut oldest = record("AAK", "Hisse Senedi Fonu", Some(1.0));
        oldest.portfolio_value = Some(200.0);
        let funds = FakeFunds::new(vec![vec![newest], vec![oldest]]);

        let ranked = compound_ranking(&funds, &request(2, RankMetric::PortfolioDelta))
            .await
            .unwrap();
        assert_eq!(ranked[0].portfolio_delta, Some(300.0));
    }

    #[tokio::test]
    async fn test_fx_ranking_drops_incomplete_funds() {
        let funds = FakeFunds::new(vec![
            vec![
                record("AAK", "Hisse Senedi Fonu", Some(0.0)),
                record("TTE", "Hisse Senedi Fonu", Some(5.0)),
            ],
            vec![record("AAK", "Hisse Senedi Fonu", Some(0.0))],
        ]);
        let mut prices = FakePrices::new();
        for window in period_windows(fake_today(), PeriodKind::Month, 2) {
            prices = prices
                .with_close(window.start, 30.0)
                .with_close(window.end.min(fake_today()), 33.0);
        }

        let ranked = fx_compound_ranking(&funds, &prices, "USDTTRY", &request(2, RankMetric::ProfitRate))
            .await
            .unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].code, "AAK");
        assert_eq!(ranked[0].result.invested, 200.0);
        assert!(ranked[0].result.profit_rate < 0.0);
    }

    #[tokio::test]
    async fn test_fx_ranking_counts_null_rate_as_zero() {
        // NUL 两期收益均为空值，MIS 缺少较早一期的记录
        let funds = FakeFunds::new(vec![
            vec![
                record("NUL", "Hisse Senedi Fonu", None),
                record("ZER", "Hisse Senedi Fonu", Some(0.0)),
                record("MIS", "Hisse Senedi Fonu", Some(5.0)),
            ],
            vec![
                record("NUL", "Hisse Senedi Fonu", None),
                record("ZER", "Hisse Senedi Fonu", Some(0.0)),
            ],
        ]);
        let mut prices = FakePrices::new();
        for window in period_windows(fake_today(), PeriodKind::Month, 2) {
            prices = prices
                .with_close(window.start, 30.0)
                .with_close(window.end.min(fake_today()), 33.0);
        }

        let ranked = fx_compound_ranking(&funds, &prices, "USDTTRY", &request(2, RankMetric::ProfitRate))
            .await
            .unwrap();

        let codes: Vec<&str> = ranked.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["NUL", "ZER"]);

        let nul = &ranked[0].result;
        assert_eq!(nul.periods, 2);
        assert_eq!(nul.invested, 200.0);
        assert_eq!(*nul, ranked[1].result);

        // 每期调整后收益即为纯汇率变动
        let fx_move = 100.0 * ((1.0 / 33.0) / (1.0 / 30.0) - 1.0);
        let first = 100.0 * (1.0 + fx_move / 100.0);
        let second = (first + 100.0) * (1.0 + fx_move / 100.0);
        assert!((nul.value - second).abs() < 1e-9);
        let null_period = FxPeriod { rate: None, fx_start: 30.0, fx_end: 33.0 };
        assert_eq!(fx_adjusted_rate(&null_period), fx_move);
    }

    #[tokio::test]
    async fn test_fx_ranking_aborts_on_price_failure() {
        let funds = three_months();
        let prices = FakePrices::new();
        let err = fx_compound_ranking(&funds, &prices, "USDTTRY", &request(3, RankMetric::ProfitRate))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UpstreamData(_)));
    }
}
