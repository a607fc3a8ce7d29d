//! Ledger API response types.
//!
//! Shapes are owned by the public ledger API. Only the fields the wallet
//! reads are typed; everything else is kept in `extra` and passed through
//! untouched.

use crate::constants::NATIVE_ASSET_TYPE;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// One entry of an account's `balances` list.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceLine {
    #[serde(default)]
    pub balance: String,
    pub asset_type: String,
    #[serde(default)]
    pub asset_code: Option<String>,
    #[serde(default)]
    pub asset_issuer: Option<String>,
}

/// `GET /accounts/{id}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub balances: Vec<BalanceLine>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl AccountRecord {
    /// Native-asset balance, or `"0"` when the account holds no native line.
    pub fn native_balance(&self) -> Balance {
        self.balances
            .iter()
            .find(|b| b.asset_type == NATIVE_ASSET_TYPE)
            .map(|b| Balance(b.balance.clone()))
            .unwrap_or_else(Balance::zero)
    }
}

/// Native-asset balance as the decimal string reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance(pub String);

impl Balance {
    pub fn zero() -> Self {
        Self("0".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entry of `GET /accounts/{id}/transactions`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    #[serde(default)]
    amount: Option<Value>,
    #[serde(default)]
    transaction_amount: Option<Value>,
    #[serde(default)]
    pub created_at: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl TransactionRecord {
    /// Displayed amount: `amount`, falling back to `transaction_amount`.
    pub fn amount(&self) -> Option<String> {
        [&self.amount, &self.transaction_amount]
            .into_iter()
            .flatten()
            .find_map(value_text)
    }
}

fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// HAL page envelope: `{ "_embedded": { "records": [...] } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionPage {
    #[serde(rename = "_embedded", default)]
    embedded: Option<Embedded>,
}

#[derive(Debug, Clone, Deserialize)]
struct Embedded {
    #[serde(default)]
    records: Vec<TransactionRecord>,
}

impl TransactionPage {
    /// Records in the page; a page without `_embedded` has none.
    pub fn into_records(self) -> Vec<TransactionRecord> {
        self.embedded.map(|e| e.records).unwrap_or_default()
    }
}
