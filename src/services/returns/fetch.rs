//! 多周期数据获取
//!
//! 每个周期窗口向上游发起一次查询，按顺序逐个等待。任一周期失败则整体失败，不返回部分结果

use std::collections::HashSet;

use chrono::NaiveDate;

use super::window::period_windows;
use crate::error::ServiceResult;
use crate::models::{FundReturnRecord, FundType, PeriodKind, PeriodWindow};
use crate::services::tefas::FundDataSource;

/// 多周期请求参数
#[derive(Debug, Clone, Copy)]
pub struct PeriodRequest {
    /// 周期数量
    pub count: usize,
    pub kind: PeriodKind,
    pub fund_type: FundType,
    /// 窗口计算基准日
    pub today: NaiveDate,
}

/// 单个周期的原始记录
#[derive(Debug, Clone)]
pub struct PeriodRecords {
    pub window: PeriodWindow,
    pub records: Vec<FundReturnRecord>,
}

/// 获取最近 `count` 个周期的收益记录，最新周期在前
///
/// `universe` 仅按基金代码限定范围，不做类别过滤
pub async fn fetch_periods(
    source: &dyn FundDataSource,
    universe: Option<&HashSet<String>>,
    request: &PeriodRequest,
) -> ServiceResult<Vec<PeriodRecords>> {
    let windows = period_windows(request.today, request.kind, request.count);
    let mut fetched = Vec::with_capacity(windows.len());

    for window in windows {
        log::debug!("获取周期 {} ~ {}", window.start, window.end);
        let mut records = source.comparison_returns(&window, request.fund_type).await?;
        if let Some(codes) = universe {
            records.retain(|r| codes.contains(&r.code));
        }
        fetched.push(PeriodRecords { window, records });
    }

    Ok(fetched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::test_support::{record, FakeFunds};

    fn request(count: usize) -> PeriodRequest {
        PeriodRequest {
            count,
            kind: PeriodKind::Month,
            fund_type: FundType::Securities,
            today: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_one_query_per_period_newest_first() {
        let funds = FakeFunds::new(vec![
            vec![record("AAK", "Karma Fon", Some(3.0))],
            vec![record("AAK", "Karma Fon", Some(2.0))],
            vec![record("AAK", "Karma Fon", Some(1.0))],
        ]);

        let fetched = fetch_periods(&funds, None, &request(3)).await.unwrap();
        assert_eq!(funds.calls(), 3);
        assert_eq!(fetched.len(), 3);
        assert!(fetched[0].window.start > fetched[1].window.start);
        assert_eq!(fetched[0].records[0].return_rate, Some(3.0));
        assert_eq!(fetched[2].records[0].return_rate, Some(1.0));
    }

    #[tokio::test]
    async fn test_universe_restricts_codes_only() {
        let funds = FakeFunds::new(vec![vec![
            record("AAK", "Serbest Fon", Some(1.0)),
            record("TTE", "Hisse Senedi Fonu", Some(2.0)),
        ]]);
        let universe: HashSet<String> = ["AAK".to_string()].into_iter().collect();

        let fetched = fetch_periods(&funds, Some(&universe), &request(1)).await.unwrap();
        assert_eq!(fetched[0].records.len(), 1);
        assert_eq!(fetched[0].records[0].category, "Serbest Fon");
    }

    #[tokio::test]
    async fn test_failure_aborts_whole_fetch() {
        let funds = FakeFunds::new(vec![
            vec![record("AAK", "Karma Fon", Some(1.0))],
            vec![record("AAK", "Karma Fon", Some(1.0))],
        ])
        .fail_at(1);

        let err = fetch_periods(&funds, None, &request(2)).await.unwrap_err();
        assert!(matches!(err, ServiceError::UpstreamTransport(_)));
        assert_eq!(funds.calls(), 2);
    }
}
