//! 应用共享状态
//!
//! 数据源与存储在 main 中创建一次，通过 `web::Data<AppState>` 注入处理器

use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::AnalysisConfig;
use crate::services::binance::PriceSource;
use crate::services::common::istanbul_today;
use crate::services::store::DocumentStore;
use crate::services::tefas::FundDataSource;

#[derive(Clone)]
pub struct AppState {
    pub funds: Arc<dyn FundDataSource>,
    pub prices: Arc<dyn PriceSource>,
    pub store: Arc<dyn DocumentStore>,
    pub analysis: AnalysisConfig,
    /// 周期窗口与默认日期的基准日
    clock: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(
        funds: Arc<dyn FundDataSource>,
        prices: Arc<dyn PriceSource>,
        store: Arc<dyn DocumentStore>,
        analysis: AnalysisConfig,
    ) -> Self {
        Self {
            funds,
            prices,
            store,
            analysis,
            clock: istanbul_today,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }
}
