use actix_web::{web, HttpResponse, Result};

use crate::handlers::error_response;
use crate::models::{AccountCreate, AccountList, ApiResponse, DeleteResult};
use crate::services::ledger;
use crate::state::AppState;

pub async fn create_account(
    state: web::Data<AppState>,
    body: web::Json<AccountCreate>,
) -> Result<HttpResponse> {
    match ledger::create_account(state.store.as_ref(), body.into_inner()).await {
        Ok(account) => Ok(HttpResponse::Created().json(ApiResponse::success(account))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn list_accounts(state: web::Data<AppState>) -> Result<HttpResponse> {
    match ledger::list_accounts(state.store.as_ref()).await {
        Ok(accounts) => Ok(HttpResponse::Ok().json(ApiResponse::success(AccountList { accounts }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn get_account(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path.into_inner();

    match ledger::get_account(state.store.as_ref(), &id).await {
        Ok(account) => Ok(HttpResponse::Ok().json(ApiResponse::success(account))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn update_account(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<AccountCreate>,
) -> Result<HttpResponse> {
    let id = path.into_inner();

    match ledger::update_account(state.store.as_ref(), &id, body.into_inner()).await {
        Ok(account) => Ok(HttpResponse::Ok().json(ApiResponse::success(account))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn delete_account(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path.into_inner();

    match ledger::delete_account(state.store.as_ref(), &id).await {
        Ok(()) => {
            let result = DeleteResult {
                success: true,
                message: format!("账户 {} 已删除", id),
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(result)))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/accounts")
            .route("", web::post().to(create_account))
            .route("", web::get().to(list_accounts))
            .route("/{id}", web::get().to(get_account))
            .route("/{id}", web::put().to(update_account))
            .route("/{id}", web::delete().to(delete_account)),
    );
}
