//! 账户与交易数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 账户名称最大长度
pub const ACCOUNT_NAME_MAX_LEN: usize = 100;

/// 账户
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Account {
    /// 文档 ID（存储中为 _id）
    #[serde(alias = "_id")]
    pub id: String,
    /// 账户名称
    pub name: String,
    /// 币种代码，如 USD、TRY
    pub currency: String,
    /// 余额
    pub balance: f64,
    /// 账户类型
    #[serde(rename = "type")]
    pub account_type: i32,
    pub create_date: DateTime<Utc>,
    pub last_update_date: DateTime<Utc>,
}

/// 创建/更新账户请求
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccountCreate {
    pub name: String,
    pub currency: String,
    pub balance: f64,
    #[serde(rename = "type")]
    pub account_type: i32,
}

/// 账户列表
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountList {
    pub accounts: Vec<Account>,
}

/// 账户间兑换交易
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Transaction {
    /// 交易序号（全局递增）
    #[serde(rename = "serialNumber")]
    pub serial_number: i64,
    #[serde(rename = "account_id_High")]
    pub account_id_high: String,
    #[serde(rename = "amount_High")]
    pub amount_high: f64,
    /// 兑换汇率
    pub rate: f64,
    #[serde(rename = "amount_Low")]
    pub amount_low: f64,
    #[serde(rename = "account_id_Low")]
    pub account_id_low: String,
    pub description: Option<String>,
    pub create_date: DateTime<Utc>,
    pub last_update_date: DateTime<Utc>,
}

/// 创建交易请求
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TransactionCreate {
    #[serde(rename = "account_id_High")]
    pub account_id_high: String,
    #[serde(rename = "amount_High")]
    pub amount_high: f64,
    pub rate: f64,
    #[serde(rename = "amount_Low")]
    pub amount_low: f64,
    #[serde(rename = "account_id_Low")]
    pub account_id_low: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// 交易列表
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionList {
    pub transactions: Vec<Transaction>,
}
