//! 统计周期窗口
//!
//! 序号 0 为当前周期，序号越大越早：
//! - 周：今天所在周向前偏移 N 周的周一至周日
//! - 月：今天所在月向前偏移 N 月的月初至月末

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::models::{PeriodKind, PeriodWindow};

/// 计算第 `offset` 个周期窗口
pub fn period_window(today: NaiveDate, kind: PeriodKind, offset: u32) -> PeriodWindow {
    match kind {
        PeriodKind::Week => {
            let monday = today
                - Duration::days(today.weekday().num_days_from_monday() as i64)
                - Duration::weeks(offset as i64);
            PeriodWindow::new(monday, monday + Duration::days(6))
        }
        PeriodKind::Month => {
            let first = today - Duration::days(today.day0() as i64);
            let start = first - Months::new(offset);
            let end = start + Months::new(1) - Duration::days(1);
            PeriodWindow::new(start, end)
        }
    }
}

/// 生成最近 `count` 个周期窗口，最新的在前
pub fn period_windows(today: NaiveDate, kind: PeriodKind, count: usize) -> Vec<PeriodWindow> {
    (0..count as u32)
        .map(|offset| period_window(today, kind, offset))
        .collect()
}
