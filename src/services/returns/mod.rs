//! 基金收益聚合服务
//!
//! 在 TEFAS 数据之上完成多周期收益计算，参考 tefas.gov.tr 的收益对比口径
//!
//! ## 主要功能
//! - 按周/月生成统计窗口并逐期获取收益记录
//! - 按基金代码对齐收益序列
//! - 定投复利模拟（可选汇率调整）
//! - 按指标排名、类别过滤
//! - 多周期长度下的上榜次数统计

pub mod align;
pub mod fetch;
pub mod fx;
pub mod pipeline;
pub mod popularity;
pub mod rank;
pub mod simulate;
pub mod window;

pub use fetch::PeriodRequest;
pub use pipeline::{compound_ranking, fund_compound, fx_compound_ranking, CompoundRequest};
pub use popularity::popularity;
pub use rank::{rank, RankOptions};
