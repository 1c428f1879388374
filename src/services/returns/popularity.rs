//! 基金热度统计
//!
//! 对多个周期长度分别跑一遍复利排名（取前 N 名），统计每只基金上榜次数

use std::collections::HashMap;

use super::fetch::PeriodRequest;
use super::pipeline::{compound_ranking, CompoundRequest};
use crate::error::ServiceResult;
use crate::models::PopularityEntry;
use crate::services::tefas::FundDataSource;

/// 统计各周期长度排名中基金出现的次数，按次数降序
///
/// 次数相同时按基金代码排序
pub async fn popularity(
    funds: &dyn FundDataSource,
    period_counts: &[usize],
    base: &CompoundRequest,
) -> ServiceResult<Vec<PopularityEntry>> {
    let mut tally: HashMap<String, usize> = HashMap::new();

    for &count in period_counts {
        let request = CompoundRequest {
            periods: PeriodRequest { count, ..base.periods },
            ..*base
        };
        for simulation in compound_ranking(funds, &request).await? {
            *tally.entry(simulation.code).or_insert(0) += 1;
        }
    }

    let mut entries: Vec<PopularityEntry> = tally
        .into_iter()
        .map(|(code, count)| PopularityEntry { code, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.code.cmp(&b.code)));
    Ok(entries)
}
