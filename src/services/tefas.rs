//! TEFAS 基金数据接口
//!
//! 对接 https://www.tefas.gov.tr 的两个数据接口：
//! - BindComparisonFundReturns：区间内全部基金的收益对比
//! - BindHistoryInfo：单只基金的历史价格
//!
//! 每次调用只请求一次，失败直接返回错误，不做重试和缓存

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::common::USER_AGENT;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{FundReturnRecord, FundType, PeriodWindow};

/// TEFAS 默认地址
pub const TEFAS_BASE_URL: &str = "https://www.tefas.gov.tr";
/// 基金收益对比 API
pub const COMPARISON_RETURNS_PATH: &str = "/api/DB/BindComparisonFundReturns";
/// 基金历史信息 API
pub const HISTORY_INFO_PATH: &str = "/api/DB/BindHistoryInfo";

/// 基金数据源
#[async_trait]
pub trait FundDataSource: Send + Sync {
    /// 区间收益对比的原始响应
    async fn comparison_raw(&self, window: &PeriodWindow, fund_type: FundType) -> ServiceResult<Value>;

    /// 单只基金历史信息的原始响应
    async fn history_info(
        &self,
        code: &str,
        window: &PeriodWindow,
        fund_type: FundType,
    ) -> ServiceResult<Value>;

    /// 区间内全部基金的收益记录
    async fn comparison_returns(
        &self,
        window: &PeriodWindow,
        fund_type: FundType,
    ) -> ServiceResult<Vec<FundReturnRecord>> {
        let raw = self.comparison_raw(window, fund_type).await?;
        parse_comparison_records(&raw)
    }
}

/// TEFAS 收益对比接口的单行数据
#[derive(Debug, Deserialize)]
struct ComparisonRow {
    #[serde(rename = "FONKODU")]
    code: String,
    #[serde(rename = "FONUNVAN", default)]
    title: Option<String>,
    #[serde(rename = "FONTURACIKLAMA")]
    category: String,
    #[serde(rename = "GETIRIORANI", default)]
    return_rate: Option<f64>,
    #[serde(rename = "PORTFOYBUYUKLUK", default)]
    portfolio_value: Option<f64>,
}

impl From<ComparisonRow> for FundReturnRecord {
    fn from(row: ComparisonRow) -> Self {
        FundReturnRecord {
            code: row.code,
            title: row.title,
            category: row.category,
            return_rate: row.return_rate,
            portfolio_value: row.portfolio_value,
        }
    }
}

/// 解析收益对比响应
///
/// 格式: {"draw":0,"recordsTotal":N,"data":[{"FONKODU":"AAK","FONTURACIKLAMA":"...","GETIRIORANI":1.23},...]}
pub fn parse_comparison_records(raw: &Value) -> ServiceResult<Vec<FundReturnRecord>> {
    let rows = raw
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| ServiceError::UpstreamData("TEFAS 响应缺少 data 数组".to_string()))?;

    rows.iter()
        .map(|row| {
            ComparisonRow::deserialize(row)
                .map(FundReturnRecord::from)
                .map_err(|e| ServiceError::UpstreamData(format!("TEFAS 记录格式异常: {}", e)))
        })
        .collect()
}

/// TEFAS 客户端
pub struct TefasClient {
    client: Client,
    base_url: String,
}

impl TefasClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> ServiceResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("请求 TEFAS URL: {} 参数: {:?}", url, form);

        let response = self
            .client
            .post(&url)
            .form(form)
            .header("User-Agent", USER_AGENT)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await
            .map_err(|e| {
                log::warn!("TEFAS 请求失败 {}: {}", url, e);
                ServiceError::from(e)
            })?;

        if !response.status().is_success() {
            log::warn!("TEFAS 返回异常状态 {}: {}", url, response.status());
            return Err(ServiceError::UpstreamTransport(format!(
                "TEFAS 返回状态码 {}",
                response.status()
            )));
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ServiceError::UpstreamData(format!("TEFAS 响应不是有效 JSON: {}", e)))
    }
}

#[async_trait]
impl FundDataSource for TefasClient {
    async fn comparison_raw(&self, window: &PeriodWindow, fund_type: FundType) -> ServiceResult<Value> {
        let start = window.tefas_start();
        let end = window.tefas_end();
        let form = [
            ("calismatipi", "1"),
            ("fontip", fund_type.as_str()),
            ("sfontur", ""),
            ("kurucukod", ""),
            ("fongrup", ""),
            ("bastarih", start.as_str()),
            ("bittarih", end.as_str()),
            ("fonturkod", ""),
            ("fonunvantip", ""),
            ("strperiod", "1,1,1,1,1,1,1"),
            ("islemdurum", "1"),
        ];
        self.post_form(COMPARISON_RETURNS_PATH, &form).await
    }

    async fn history_info(
        &self,
        code: &str,
        window: &PeriodWindow,
        fund_type: FundType,
    ) -> ServiceResult<Value> {
        let start = window.tefas_start();
        let end = window.tefas_end();
        let form = [
            ("fontip", fund_type.as_str()),
            ("sfontur", ""),
            ("fonkod", code),
            ("fongrup", ""),
            ("bastarih", start.as_str()),
            ("bittarih", end.as_str()),
            ("fonturkod", ""),
            ("fonunvantip", ""),
        ];
        self.post_form(HISTORY_INFO_PATH, &form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn window() -> PeriodWindow {
        PeriodWindow::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
    }

    #[test]
    fn test_parse_comparison_records() {
        let raw = json!({
            "draw": 0,
            "recordsTotal": 2,
            "data": [
                {"FONKODU": "AAK", "FONUNVAN": "ATA PORTFÖY", "FONTURACIKLAMA": "Karma Fon", "GETIRIORANI": 2.5},
                {"FONKODU": "TTE", "FONUNVAN": "İŞ PORTFÖY", "FONTURACIKLAMA": "Hisse Senedi Fonu", "GETIRIORANI": null, "PORTFOYBUYUKLUK": 1500.0}
            ]
        });

        let records = parse_comparison_records(&raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, "AAK");
        assert_eq!(records[0].return_rate, Some(2.5));
        assert_eq!(records[0].portfolio_value, None);
        assert_eq!(records[1].return_rate, None);
        assert_eq!(records[1].portfolio_value, Some(1500.0));
    }

    #[test]
    fn test_parse_missing_required_field() {
        let raw = json!({"data": [{"FONUNVAN": "X", "FONTURACIKLAMA": "Karma Fon"}]});
        let err = parse_comparison_records(&raw).unwrap_err();
        assert!(matches!(err, ServiceError::UpstreamData(_)));

        let err = parse_comparison_records(&json!({"error": "x"})).unwrap_err();
        assert!(matches!(err, ServiceError::UpstreamData(_)));
    }

    #[tokio::test]
    async fn test_comparison_returns_over_http() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", COMPARISON_RETURNS_PATH)
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("bastarih".into(), "01.03.2024".into()),
                mockito::Matcher::UrlEncoded("bittarih".into(), "31.03.2024".into()),
                mockito::Matcher::UrlEncoded("fontip".into(), "YAT".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"FONKODU":"AAK","FONTURACIKLAMA":"Karma Fon","GETIRIORANI":1.5}]}"#)
            .create_async()
            .await;

        let client = TefasClient::new(Client::new(), server.url());
        let records = client
            .comparison_returns(&window(), FundType::Securities)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "AAK");
        assert_eq!(records[0].return_rate, Some(1.5));
    }

    #[tokio::test]
    async fn test_error_status_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", COMPARISON_RETURNS_PATH)
            .with_status(503)
            .create_async()
            .await;

        let client = TefasClient::new(Client::new(), server.url());
        let err = client
            .comparison_returns(&window(), FundType::Securities)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UpstreamTransport(_)));
    }

    #[tokio::test]
    async fn test_history_info_passes_through() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", HISTORY_INFO_PATH)
            .match_body(mockito::Matcher::UrlEncoded("fonkod".into(), "AAK".into()))
            .with_status(200)
            .with_body(r#"{"data":[{"TARIH":"1709251200000","FONKODU":"AAK","FIYAT":1.23}]}"#)
            .create_async()
            .await;

        let client = TefasClient::new(Client::new(), server.url());
        let raw = client
            .history_info("AAK", &window(), FundType::Securities)
            .await
            .unwrap();
        assert_eq!(raw["data"][0]["FONKODU"], "AAK");
    }
}
