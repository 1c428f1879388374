//! 公共常量和辅助函数

use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Europe::Istanbul;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{PeriodWindow, TEFAS_DATE_FORMAT};

/// 通用浏览器 User-Agent
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// 默认查询区间天数
pub const DEFAULT_RANGE_DAYS: i64 = 30;

/// ISO 日期格式（YYYY-MM-DD）
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// 获取伊斯坦布尔时间字符串（ISO 8601 格式，带+03:00时区）
pub fn get_istanbul_time() -> String {
    Utc::now().with_timezone(&Istanbul).to_rfc3339()
}

/// 伊斯坦布尔当地日期
pub fn istanbul_today() -> NaiveDate {
    Utc::now().with_timezone(&Istanbul).date_naive()
}

/// 解析 TEFAS 日期（DD.MM.YYYY）
pub fn parse_tefas_date(s: &str) -> ServiceResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), TEFAS_DATE_FORMAT)
        .map_err(|_| ServiceError::InvalidInput(format!("日期格式应为 DD.MM.YYYY: {}", s)))
}

/// 解析 ISO 日期（YYYY-MM-DD）
pub fn parse_iso_date(s: &str) -> ServiceResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), ISO_DATE_FORMAT)
        .map_err(|_| ServiceError::InvalidInput(format!("日期格式应为 YYYY-MM-DD: {}", s)))
}

/// 按可选的起止日期构造区间，缺省为「30 天前 ~ 今天」
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> ServiceResult<PeriodWindow> {
    let end = end.unwrap_or(today);
    let start = start.unwrap_or(today - Duration::days(DEFAULT_RANGE_DAYS));
    if start > end {
        return Err(ServiceError::InvalidInput(format!(
            "开始日期 {} 晚于结束日期 {}",
            start, end
        )));
    }
    Ok(PeriodWindow::new(start, end))
}

/// 解析 TEFAS 格式的起止日期参数
pub fn resolve_tefas_range(
    bastarih: Option<&str>,
    bittarih: Option<&str>,
    today: NaiveDate,
) -> ServiceResult<PeriodWindow> {
    let start = bastarih.map(parse_tefas_date).transpose()?;
    let end = bittarih.map(parse_tefas_date).transpose()?;
    resolve_range(start, end, today)
}
