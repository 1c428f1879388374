//! TEFAS 基金数据接口
//!
//! 原始数据透传、单区间排名、多周期定投复利排名与热度统计

use actix_web::{web, HttpResponse, Result};

use crate::config::AnalysisConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::handlers::error_response;
use crate::models::{
    ApiResponse, CompoundQuery, DateRangeQuery, PopularityQuery, RankMetric, RankingQuery,
    SortOrder,
};
use crate::services::common::resolve_tefas_range;
use crate::services::returns::{self, CompoundRequest, PeriodRequest, RankOptions};
use crate::state::AppState;

fn check_periods(count: usize, analysis: &AnalysisConfig) -> ServiceResult<usize> {
    if count == 0 || count > analysis.max_periods {
        return Err(ServiceError::InvalidInput(format!(
            "周期数量应在 1~{} 之间: {}",
            analysis.max_periods, count
        )));
    }
    Ok(count)
}

fn check_contribution(contribution: f64) -> ServiceResult<f64> {
    if !contribution.is_finite() || contribution <= 0.0 {
        return Err(ServiceError::InvalidInput(format!(
            "每期投入金额无效: {}",
            contribution
        )));
    }
    Ok(contribution)
}

fn simulation_metric(metric: Option<RankMetric>) -> ServiceResult<RankMetric> {
    let metric = metric.unwrap_or(RankMetric::ProfitRate);
    if !metric.applies_to_simulations() {
        return Err(ServiceError::InvalidInput(format!(
            "复利排名不支持指标 {:?}",
            metric
        )));
    }
    Ok(metric)
}

fn compound_request(query: &CompoundQuery, state: &AppState) -> ServiceResult<CompoundRequest> {
    let analysis = &state.analysis;
    let count = check_periods(query.periods.unwrap_or(analysis.default_periods), analysis)?;
    Ok(CompoundRequest {
        periods: PeriodRequest {
            count,
            kind: query.kind.unwrap_or_default(),
            fund_type: query.fontip.unwrap_or_default(),
            today: state.today(),
        },
        contribution: check_contribution(query.contribution.unwrap_or(analysis.contribution))?,
        rank: RankOptions {
            metric: simulation_metric(query.metric)?,
            order: query.order.unwrap_or_default(),
            exclude: query.scope.unwrap_or_default().substrings(),
            top_n: query.top,
        },
    })
}

/// 解析逗号分隔的周期长度列表，缺省使用配置
fn popularity_periods(raw: Option<&str>, analysis: &AnalysisConfig) -> ServiceResult<Vec<usize>> {
    let Some(raw) = raw else {
        return Ok(analysis.popularity_periods.clone());
    };
    raw.split(',')
        .map(|part| {
            let count = part
                .trim()
                .parse::<usize>()
                .map_err(|_| ServiceError::InvalidInput(format!("无效的周期数量: {}", part)))?;
            check_periods(count, analysis)
        })
        .collect()
}

/// 区间收益对比原始数据
pub async fn get_comparison(
    state: web::Data<AppState>,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse> {
    let window = match resolve_tefas_range(
        query.bastarih.as_deref(),
        query.bittarih.as_deref(),
        state.today(),
    ) {
        Ok(window) => window,
        Err(e) => return Ok(error_response(&e)),
    };

    match state
        .funds
        .comparison_raw(&window, query.fontip.unwrap_or_default())
        .await
    {
        Ok(raw) => Ok(HttpResponse::Ok().json(ApiResponse::success(raw))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// 单只基金历史原始数据
pub async fn get_history(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse> {
    let code = path.into_inner().to_uppercase();
    let window = match resolve_tefas_range(
        query.bastarih.as_deref(),
        query.bittarih.as_deref(),
        state.today(),
    ) {
        Ok(window) => window,
        Err(e) => return Ok(error_response(&e)),
    };

    match state
        .funds
        .history_info(&code, &window, query.fontip.unwrap_or_default())
        .await
    {
        Ok(raw) => Ok(HttpResponse::Ok().json(ApiResponse::success(raw))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// 单个区间的收益记录排名
pub async fn get_ranking(
    state: web::Data<AppState>,
    query: web::Query<RankingQuery>,
) -> Result<HttpResponse> {
    let metric = query.metric.unwrap_or(RankMetric::ReturnRate);
    if !metric.applies_to_records() {
        let e = ServiceError::InvalidInput(format!("区间排名不支持指标 {:?}", metric));
        return Ok(error_response(&e));
    }
    let window = match resolve_tefas_range(
        query.bastarih.as_deref(),
        query.bittarih.as_deref(),
        state.today(),
    ) {
        Ok(window) => window,
        Err(e) => return Ok(error_response(&e)),
    };

    let options = RankOptions {
        metric,
        order: query.order.unwrap_or_default(),
        exclude: query.scope.unwrap_or_default().substrings(),
        top_n: query.top,
    };

    match state
        .funds
        .comparison_returns(&window, query.fontip.unwrap_or_default())
        .await
    {
        Ok(records) => Ok(HttpResponse::Ok().json(ApiResponse::success(returns::rank(records, &options)))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// 多周期定投复利排名
pub async fn get_compound_ranking(
    state: web::Data<AppState>,
    query: web::Query<CompoundQuery>,
) -> Result<HttpResponse> {
    let request = match compound_request(&query, &state) {
        Ok(request) => request,
        Err(e) => return Ok(error_response(&e)),
    };

    match returns::compound_ranking(state.funds.as_ref(), &request).await {
        Ok(simulations) => Ok(HttpResponse::Ok().json(ApiResponse::success(simulations))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// 单只基金定投复利模拟
pub async fn get_fund_compound(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<CompoundQuery>,
) -> Result<HttpResponse> {
    let code = path.into_inner().to_uppercase();
    let request = match compound_request(&query, &state) {
        Ok(request) => request,
        Err(e) => return Ok(error_response(&e)),
    };

    match returns::fund_compound(
        state.funds.as_ref(),
        &code,
        &request.periods,
        request.contribution,
    )
    .await
    {
        Ok(simulation) => Ok(HttpResponse::Ok().json(ApiResponse::success(simulation))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// 汇率调整后的定投复利排名
pub async fn get_fx_compound_ranking(
    state: web::Data<AppState>,
    query: web::Query<CompoundQuery>,
) -> Result<HttpResponse> {
    let request = match compound_request(&query, &state) {
        Ok(request) => request,
        Err(e) => return Ok(error_response(&e)),
    };
    let symbol = query
        .symbol
        .as_deref()
        .unwrap_or(state.analysis.fx_symbol.as_str())
        .to_uppercase();

    match returns::fx_compound_ranking(
        state.funds.as_ref(),
        state.prices.as_ref(),
        &symbol,
        &request,
    )
    .await
    {
        Ok(simulations) => Ok(HttpResponse::Ok().json(ApiResponse::success(simulations))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// 多个周期长度下的上榜次数统计
pub async fn get_popularity(
    state: web::Data<AppState>,
    query: web::Query<PopularityQuery>,
) -> Result<HttpResponse> {
    let analysis = &state.analysis;
    let prepared = popularity_periods(query.periods.as_deref(), analysis).and_then(|counts| {
        let base = CompoundRequest {
            periods: PeriodRequest {
                count: counts.first().copied().unwrap_or(1),
                kind: query.kind.unwrap_or_default(),
                fund_type: query.fontip.unwrap_or_default(),
                today: state.today(),
            },
            contribution: check_contribution(query.contribution.unwrap_or(analysis.contribution))?,
            rank: RankOptions {
                metric: simulation_metric(query.metric)?,
                order: SortOrder::Desc,
                exclude: query.scope.unwrap_or_default().substrings(),
                top_n: Some(analysis.popularity_top_n),
            },
        };
        Ok((counts, base))
    });
    let (counts, base) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => return Ok(error_response(&e)),
    };

    match returns::popularity(state.funds.as_ref(), &counts, &base).await {
        Ok(entries) => Ok(HttpResponse::Ok().json(ApiResponse::success(entries))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tefas")
            .route("/comparison", web::get().to(get_comparison))
            .route("/history/{code}", web::get().to(get_history))
            .route("/ranking", web::get().to(get_ranking))
            .route("/compound", web::get().to(get_compound_ranking))
            .route("/compound/{code}", web::get().to(get_fund_compound))
            .route("/fx-compound", web::get().to(get_fx_compound_ranking))
            .route("/popularity", web::get().to(get_popularity)),
    );
}
