//! Wire models for Sequence API responses.
//!
//! The API speaks camelCase; field translation is declared with serde
//! attributes only.

use serde::{Deserialize, Serialize};

/// Classification of an account as reported by Sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// Pooled sub-account held inside Sequence.
    #[serde(rename = "Pod")]
    Pod,
    /// Income source feeding into Sequence.
    #[serde(rename = "Income Source")]
    IncomeSource,
    /// External linked account (bank, card, brokerage).
    #[serde(rename = "Account")]
    Account,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Pod => "Pod",
            AccountType::IncomeSource => "Income Source",
            AccountType::Account => "Account",
        }
    }
}

/// Balance of one account.
///
/// Either `amount_in_dollars` is present, or `error` explains why the
/// balance could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[serde(default)]
    pub amount_in_dollars: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Balance {
    /// True when the amount and error fields agree with each other.
    pub fn is_consistent(&self) -> bool {
        match (&self.amount_in_dollars, &self.error) {
            (Some(_), None) => true,
            (None, Some(err)) => !err.is_empty(),
            _ => false,
        }
    }
}

/// A financial account with its balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub balance: Balance,
    #[serde(rename = "type")]
    pub account_type: AccountType,
}

/// Accounts plus the top-level errors for accounts that failed to enumerate.
///
/// The two lists are independent: an entry in `errors` does not imply a
/// missing row in `accounts`, and vice versa.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountList {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl AccountList {
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Envelope returned by `POST /accounts`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsResponse {
    pub message: String,
    pub request_id: String,
    pub data: AccountList,
}

/// Payload of a trigger response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerRuleData {
    pub request_id: String,
}

/// Response from `POST /remote-api/rules/{ruleId}/trigger`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRuleResponse {
    pub code: String,
    pub message: String,
    pub data: TriggerRuleData,
}

impl TriggerRuleResponse {
    /// Correlation id for support and tracing.
    pub fn request_id(&self) -> &str {
        &self.data.request_id
    }
}
