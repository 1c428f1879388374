use actix_web::{web, HttpResponse, Result};

use crate::error::{ServiceError, ServiceResult};
use crate::handlers::error_response;
use crate::models::{ApiResponse, DeleteResult, TransactionCreate, TransactionList};
use crate::services::ledger;
use crate::state::AppState;

fn parse_serial(raw: &str) -> ServiceResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| ServiceError::InvalidInput(format!("无效的交易序号: {}", raw)))
}

pub async fn create_transaction(
    state: web::Data<AppState>,
    body: web::Json<TransactionCreate>,
) -> Result<HttpResponse> {
    match ledger::create_transaction(state.store.as_ref(), body.into_inner()).await {
        Ok(transaction) => Ok(HttpResponse::Created().json(ApiResponse::success(transaction))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn list_transactions(state: web::Data<AppState>) -> Result<HttpResponse> {
    match ledger::list_transactions(state.store.as_ref()).await {
        Ok(transactions) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(TransactionList { transactions })))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn get_transaction(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let serial = match parse_serial(&path.into_inner()) {
        Ok(serial) => serial,
        Err(e) => return Ok(error_response(&e)),
    };

    match ledger::get_transaction(state.store.as_ref(), serial).await {
        Ok(transaction) => Ok(HttpResponse::Ok().json(ApiResponse::success(transaction))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn delete_transaction(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let serial = match parse_serial(&path.into_inner()) {
        Ok(serial) => serial,
        Err(e) => return Ok(error_response(&e)),
    };

    match ledger::delete_transaction(state.store.as_ref(), serial).await {
        Ok(()) => {
            let result = DeleteResult {
                success: true,
                message: format!("交易 #{} 已删除", serial),
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(result)))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/transactions")
            .route("", web::post().to(create_transaction))
            .route("", web::get().to(list_transactions))
            .route("/{serial}", web::get().to(get_transaction))
            .route("/{serial}", web::delete().to(delete_transaction)),
    );
}
