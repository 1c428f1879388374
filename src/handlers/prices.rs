use actix_web::{web, HttpResponse, Result};

use crate::error::ServiceResult;
use crate::handlers::error_response;
use crate::models::{ApiResponse, Candle, ClosePrice, ClosePriceQuery, KlineQuery};
use crate::services::binance::{day_bounds_millis, DAILY_INTERVAL};
use crate::services::common::{parse_iso_date, resolve_range, ISO_DATE_FORMAT};
use crate::state::AppState;

async fn close_price(state: &AppState, symbol: String, date: Option<&str>) -> ServiceResult<ClosePrice> {
    let date = match date {
        Some(raw) => parse_iso_date(raw)?,
        None => state.today(),
    };
    let close = state.prices.close_on(&symbol, date).await?;
    Ok(ClosePrice {
        symbol,
        date: date.format(ISO_DATE_FORMAT).to_string(),
        close,
    })
}

async fn klines(state: &AppState, symbol: &str, query: &KlineQuery) -> ServiceResult<Vec<Candle>> {
    let start = query.start.as_deref().map(parse_iso_date).transpose()?;
    let end = query.end.as_deref().map(parse_iso_date).transpose()?;
    let range = resolve_range(start, end, state.today())?;

    let (start_ms, _) = day_bounds_millis(range.start);
    let (_, end_ms) = day_bounds_millis(range.end);
    let interval = query.interval.as_deref().unwrap_or(DAILY_INTERVAL);
    state.prices.klines(symbol, interval, start_ms, end_ms).await
}

/// 某日收盘价，缺省为今天
pub async fn get_close_price(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ClosePriceQuery>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner().to_uppercase();

    match close_price(&state, symbol, query.date.as_deref()).await {
        Ok(price) => Ok(HttpResponse::Ok().json(ApiResponse::success(price))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// 区间 K 线，缺省为最近 30 天的日线
pub async fn get_klines(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<KlineQuery>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner().to_uppercase();

    match klines(&state, &symbol, &query).await {
        Ok(candles) => Ok(HttpResponse::Ok().json(ApiResponse::success(candles))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/prices")
            .route("/{symbol}/close", web::get().to(get_close_price))
            .route("/{symbol}/klines", web::get().to(get_klines)),
    );
}
