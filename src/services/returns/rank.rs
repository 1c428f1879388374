//! 排名与类别过滤
//!
//! 先按类别子串排除，再按指标排序，最后截取前 N 名。
//! 缺失的指标值换成排序方向上的极端值，始终排在末尾

use crate::models::{
    ExclusionScope, FundReturnRecord, FundSimulation, RankMetric, SortOrder,
};

/// 股票类视图排除的类别子串
pub const EQUITY_EXCLUSIONS: &[&str] = &["Serbest", "Para", "Katılım", "Borçlanma", "Kira"];

/// 全类型视图排除的类别子串
pub const ALL_TYPES_EXCLUSIONS: &[&str] = &["Serbest"];

impl ExclusionScope {
    /// 该范围对应的排除子串
    pub fn substrings(&self) -> &'static [&'static str] {
        match self {
            ExclusionScope::Equity => EQUITY_EXCLUSIONS,
            ExclusionScope::All => ALL_TYPES_EXCLUSIONS,
            ExclusionScope::None => &[],
        }
    }
}

/// 可排名的数据
pub trait Rankable {
    fn code(&self) -> &str;
    fn category(&self) -> &str;
    fn metric(&self, metric: RankMetric) -> Option<f64>;
}

impl Rankable for FundReturnRecord {
    fn code(&self) -> &str {
        &self.code
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn metric(&self, metric: RankMetric) -> Option<f64> {
        match metric {
            RankMetric::ReturnRate => self.return_rate,
            RankMetric::PortfolioValue => self.portfolio_value,
            _ => None,
        }
    }
}

impl Rankable for FundSimulation {
    fn code(&self) -> &str {
        &self.code
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn metric(&self, metric: RankMetric) -> Option<f64> {
        match metric {
            RankMetric::ProfitRate => Some(self.result.profit_rate),
            RankMetric::AvgPeriodRate => Some(self.result.avg_period_rate),
            RankMetric::PortfolioDelta => self.portfolio_delta,
            _ => None,
        }
    }
}

/// 排名参数
#[derive(Debug, Clone, Copy)]
pub struct RankOptions {
    pub metric: RankMetric,
    pub order: SortOrder,
    pub exclude: &'static [&'static str],
    pub top_n: Option<usize>,
}

/// 类别是否包含任一排除子串（区分大小写）
pub fn is_excluded(category: &str, exclude: &[&str]) -> bool {
    exclude.iter().any(|s| category.contains(s))
}

/// 按类别子串过滤
pub fn filter_categories<T: Rankable>(items: Vec<T>, exclude: &[&str]) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| !is_excluded(item.category(), exclude))
        .collect()
}

/// 过滤、排序并截取
pub fn rank<T: Rankable>(items: Vec<T>, options: &RankOptions) -> Vec<T> {
    let mut items = filter_categories(items, options.exclude);

    let missing = match options.order {
        SortOrder::Desc => f64::MIN,
        SortOrder::Asc => f64::MAX,
    };
    let key = |item: &T| item.metric(options.metric).unwrap_or(missing);

    match options.order {
        SortOrder::Desc => items.sort_by(|a, b| key(b).total_cmp(&key(a))),
        SortOrder::Asc => items.sort_by(|a, b| key(a).total_cmp(&key(b))),
    }

    if let Some(n) = options.top_n {
        items.truncate(n);
    }
    items
}
