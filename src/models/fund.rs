//! 基金收益数据模型
//!
//! 定义 TEFAS 基金收益相关的数据结构，包括：
//! - 单期基金收益记录
//! - 统计周期窗口
//! - 定投复利模拟结果
//! - 排名参数与热度统计

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// TEFAS 接口使用的日期格式（DD.MM.YYYY）
pub const TEFAS_DATE_FORMAT: &str = "%d.%m.%Y";

/// 单只基金在一个统计周期内的收益记录
///
/// 生命周期仅限一次上游响应，获取后不再修改
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FundReturnRecord {
    /// 基金代码（跨周期稳定）
    pub code: String,
    /// 基金名称
    pub title: Option<String>,
    /// 基金类别描述，用于子串过滤
    pub category: String,
    /// 周期收益率（百分比），缺失表示该周期无数据
    pub return_rate: Option<f64>,
    /// 组合规模
    pub portfolio_value: Option<f64>,
}

/// 统计周期类型
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    /// 自然周（周一至周日）
    Week,
    /// 自然月（月初至月末）
    #[default]
    Month,
}

/// 连续的日历区间，首尾日期均包含在内
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// 起始日期（TEFAS 格式）
    pub fn tefas_start(&self) -> String {
        self.start.format(TEFAS_DATE_FORMAT).to_string()
    }

    /// 结束日期（TEFAS 格式）
    pub fn tefas_end(&self) -> String {
        self.end.format(TEFAS_DATE_FORMAT).to_string()
    }
}

/// TEFAS 基金类型
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum FundType {
    /// 证券投资基金
    #[default]
    #[serde(rename = "YAT")]
    Securities,
    /// 养老金基金
    #[serde(rename = "EMK")]
    Pension,
    /// 交易所交易基金
    #[serde(rename = "BYF")]
    Exchange,
}

impl FundType {
    /// TEFAS 接口参数值
    pub fn as_str(&self) -> &'static str {
        match self {
            FundType::Securities => "YAT",
            FundType::Pension => "EMK",
            FundType::Exchange => "BYF",
        }
    }
}

/// 定投复利模拟结果
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SimulationResult {
    /// 累计投入金额（有效周期数 × 每期投入）
    pub invested: f64,
    /// 期末账户价值
    pub value: f64,
    /// 收益金额
    pub profit: f64,
    /// 总收益率（百分比）
    pub profit_rate: f64,
    /// 每期平均收益率（百分比）
    pub avg_period_rate: f64,
    /// 有效周期数
    pub periods: usize,
}

/// 单只基金的模拟结果
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FundSimulation {
    pub code: String,
    pub title: Option<String>,
    pub category: String,
    #[serde(flatten)]
    pub result: SimulationResult,
    /// 最新周期与最早周期的组合规模差
    pub portfolio_delta: Option<f64>,
}

/// 排名指标
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RankMetric {
    /// 单期收益率（原始记录）
    ReturnRate,
    /// 组合规模（原始记录）
    PortfolioValue,
    /// 总收益率（模拟结果）
    ProfitRate,
    /// 每期平均收益率（模拟结果）
    AvgPeriodRate,
    /// 组合规模变化（模拟结果）
    PortfolioDelta,
}

impl RankMetric {
    /// 是否适用于原始收益记录
    pub fn applies_to_records(&self) -> bool {
        matches!(self, RankMetric::ReturnRate | RankMetric::PortfolioValue)
    }

    /// 是否适用于模拟结果
    pub fn applies_to_simulations(&self) -> bool {
        !self.applies_to_records()
    }
}

/// 排序方向
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Desc,
    Asc,
}

/// 类别排除范围
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExclusionScope {
    /// 股票类视图：排除自由、货币、参与、债券、租赁凭证类基金
    #[default]
    Equity,
    /// 全类型视图：仅排除自由类基金
    All,
    /// 不排除
    None,
}

/// 基金热度统计项
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PopularityEntry {
    pub code: String,
    pub count: usize,
}

/// 日期区间查询参数（TEFAS 直通接口）
#[derive(Debug, Deserialize, Default)]
pub struct DateRangeQuery {
    /// 开始日期（DD.MM.YYYY），默认 30 天前
    pub bastarih: Option<String>,
    /// 结束日期（DD.MM.YYYY），默认今天
    pub bittarih: Option<String>,
    /// 基金类型
    pub fontip: Option<FundType>,
}

/// 单区间排名查询参数
#[derive(Debug, Deserialize, Default)]
pub struct RankingQuery {
    pub bastarih: Option<String>,
    pub bittarih: Option<String>,
    pub fontip: Option<FundType>,
    pub metric: Option<RankMetric>,
    pub order: Option<SortOrder>,
    pub scope: Option<ExclusionScope>,
    pub top: Option<usize>,
}

/// 多周期复利查询参数
#[derive(Debug, Deserialize, Default)]
pub struct CompoundQuery {
    /// 周期数量
    pub periods: Option<usize>,
    /// 周期类型
    pub kind: Option<PeriodKind>,
    /// 每期投入金额
    pub contribution: Option<f64>,
    pub fontip: Option<FundType>,
    pub metric: Option<RankMetric>,
    pub order: Option<SortOrder>,
    pub scope: Option<ExclusionScope>,
    pub top: Option<usize>,
    /// 汇率交易对（仅汇率调整接口使用）
    pub symbol: Option<String>,
}

/// 热度统计查询参数
#[derive(Debug, Deserialize, Default)]
pub struct PopularityQuery {
    /// 逗号分隔的周期数量列表，如 "3,6,12"
    pub periods: Option<String>,
    pub kind: Option<PeriodKind>,
    pub contribution: Option<f64>,
    pub fontip: Option<FundType>,
    pub metric: Option<RankMetric>,
    pub scope: Option<ExclusionScope>,
}
