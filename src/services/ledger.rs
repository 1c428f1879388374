//! 账户与交易服务
//!
//! 在文档存储之上实现账户增删改查和交易记录，交易序号由计数器原子递增生成

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use uuid::Uuid;

use super::store::DocumentStore;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    Account, AccountCreate, Transaction, TransactionCreate, ACCOUNT_NAME_MAX_LEN,
};

pub const ACCOUNTS: &str = "accounts";
pub const TRANSACTIONS: &str = "transactions";
/// 交易序号计数器
pub const TRANSACTION_SERIAL: &str = "transaction_serial";

fn decode<T: DeserializeOwned>(doc: Value) -> ServiceResult<T> {
    serde_json::from_value(doc).map_err(|e| ServiceError::Storage(format!("文档格式异常: {}", e)))
}

fn validate_account_id(id: &str) -> ServiceResult<()> {
    Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| ServiceError::InvalidInput(format!("无效的账户 ID: {}", id)))
}

fn validate_account(account: &AccountCreate) -> ServiceResult<()> {
    let len = account.name.chars().count();
    if len == 0 || len > ACCOUNT_NAME_MAX_LEN {
        return Err(ServiceError::InvalidInput(format!(
            "账户名称长度应在 1~{} 之间",
            ACCOUNT_NAME_MAX_LEN
        )));
    }
    if account.currency.trim().is_empty() {
        return Err(ServiceError::InvalidInput("币种不能为空".to_string()));
    }
    Ok(())
}

// ==================== 账户 ====================

pub async fn create_account(store: &dyn DocumentStore, account: AccountCreate) -> ServiceResult<Account> {
    validate_account(&account)?;
    let now = Utc::now();
    let doc = json!({
        "name": account.name,
        "currency": account.currency,
        "balance": account.balance,
        "type": account.account_type,
        "create_date": now,
        "last_update_date": now,
    });

    let id = store.insert(ACCOUNTS, doc).await?;
    log::info!("创建账户 {}", id);
    get_account(store, &id).await
}

pub async fn list_accounts(store: &dyn DocumentStore) -> ServiceResult<Vec<Account>> {
    store
        .list(ACCOUNTS)
        .await?
        .into_iter()
        .map(decode)
        .collect()
}

pub async fn get_account(store: &dyn DocumentStore, id: &str) -> ServiceResult<Account> {
    validate_account_id(id)?;
    match store.get(ACCOUNTS, id).await? {
        Some(doc) => decode(doc),
        None => Err(ServiceError::NotFound(format!("账户不存在: {}", id))),
    }
}

/// 整体替换账户字段，保留创建时间
pub async fn update_account(
    store: &dyn DocumentStore,
    id: &str,
    account: AccountCreate,
) -> ServiceResult<Account> {
    validate_account(&account)?;
    let existing = get_account(store, id).await?;

    let doc = json!({
        "name": account.name,
        "currency": account.currency,
        "balance": account.balance,
        "type": account.account_type,
        "create_date": existing.create_date,
        "last_update_date": Utc::now(),
    });
    if !store.replace(ACCOUNTS, id, doc).await? {
        return Err(ServiceError::NotFound(format!("账户不存在: {}", id)));
    }
    get_account(store, id).await
}

pub async fn delete_account(store: &dyn DocumentStore, id: &str) -> ServiceResult<()> {
    validate_account_id(id)?;
    if !store.delete(ACCOUNTS, id).await? {
        return Err(ServiceError::NotFound(format!("账户不存在: {}", id)));
    }
    log::info!("删除账户 {}", id);
    Ok(())
}

// ==================== 交易 ====================

pub async fn create_transaction(
    store: &dyn DocumentStore,
    transaction: TransactionCreate,
) -> ServiceResult<Transaction> {
    let serial_number = store.next_sequence(TRANSACTION_SERIAL).await?;
    let now = Utc::now();
    let record = Transaction {
        serial_number,
        account_id_high: transaction.account_id_high,
        amount_high: transaction.amount_high,
        rate: transaction.rate,
        amount_low: transaction.amount_low,
        account_id_low: transaction.account_id_low,
        description: transaction.description,
        create_date: now,
        last_update_date: now,
    };

    let doc = serde_json::to_value(&record)
        .map_err(|e| ServiceError::Storage(format!("交易序列化失败: {}", e)))?;
    store.insert(TRANSACTIONS, doc).await?;
    log::info!("创建交易 #{}", serial_number);
    get_transaction(store, serial_number).await
}

/// 列出全部交易，为空时返回 NotFound
pub async fn list_transactions(store: &dyn DocumentStore) -> ServiceResult<Vec<Transaction>> {
    let docs = store.list(TRANSACTIONS).await?;
    if docs.is_empty() {
        return Err(ServiceError::NotFound("没有交易记录".to_string()));
    }
    docs.into_iter().map(decode).collect()
}

pub async fn get_transaction(store: &dyn DocumentStore, serial_number: i64) -> ServiceResult<Transaction> {
    match store
        .find_one(TRANSACTIONS, "serialNumber", &json!(serial_number))
        .await?
    {
        Some(doc) => decode(doc),
        None => Err(ServiceError::NotFound(format!("交易不存在: #{}", serial_number))),
    }
}

pub async fn delete_transaction(store: &dyn DocumentStore, serial_number: i64) -> ServiceResult<()> {
    if !store
        .delete_one(TRANSACTIONS, "serialNumber", &json!(serial_number))
        .await?
    {
        return Err(ServiceError::NotFound(format!("交易不存在: #{}", serial_number)));
    }
    log::info!("删除交易 #{}", serial_number);
    Ok(())
}
