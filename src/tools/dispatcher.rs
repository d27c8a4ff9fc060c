//! Tool dispatcher — binds tool names to Sequence client calls.
//!
//! `invoke` never fails: validation errors, API errors and unexpected
//! failures all come back as an [`Envelope`].

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use secrecy::SecretString;
use serde::Serialize;
use serde_json::Value;

use super::catalog::{ToolCatalog, ToolDescriptor, GET_ACCOUNTS, TRIGGER_RULE};
use super::credentials::CredentialProvider;
use super::envelope::Envelope;
use crate::client::{AccountList, SequenceClient, TriggerRuleResponse};
use crate::types::{ClientConfig, Error, Result};

/// Stateless dispatcher over the two Sequence tools.
pub struct ToolDispatcher {
    catalog: ToolCatalog,
    client_config: ClientConfig,
    credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for ToolDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDispatcher")
            .field("tools", &self.catalog.len())
            .field("client_config", &self.client_config)
            .field("credentials", &self.credentials.source())
            .finish()
    }
}

impl ToolDispatcher {
    pub fn new(
        client_config: ClientConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self> {
        Ok(Self {
            catalog: ToolCatalog::sequence()?,
            client_config,
            credentials,
        })
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Descriptors for capability discovery. No I/O.
    pub fn describe(&self) -> Vec<ToolDescriptor> {
        self.catalog.descriptors()
    }

    /// Invoke a tool by name.
    ///
    /// Unknown names produce a plain notice rather than an error envelope.
    pub async fn invoke(&self, name: &str, args: Value) -> Envelope {
        if !self.catalog.has_tool(name) {
            tracing::warn!(tool = name, "Unknown tool requested");
            return Envelope::Notice(format!("Unknown tool: {}", name));
        }

        let outcome = AssertUnwindSafe(self.dispatch(name, args))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(envelope)) => envelope,
            Ok(Err(err)) => {
                tracing::info!(tool = name, error = %err, "Tool call failed");
                err.to_envelope()
            }
            Err(_) => {
                tracing::error!(tool = name, "Tool handler panicked");
                Envelope::error(format!("internal error while running {}", name))
            }
        }
    }

    async fn dispatch(&self, name: &str, mut args: Value) -> Result<Envelope> {
        if let Some(first) = self.catalog.validate_params(name, &args)?.into_iter().next() {
            return Err(Error::validation(first));
        }
        self.catalog.fill_defaults(name, &mut args)?;

        match name {
            GET_ACCOUNTS => self.get_accounts().await,
            TRIGGER_RULE => self.trigger_rule(&args).await,
            _ => Err(Error::internal(format!("no handler bound for tool {}", name))),
        }
    }

    async fn get_accounts(&self) -> Result<Envelope> {
        let token = self.credentials.access_token().ok_or_else(|| {
            Error::config(format!(
                "credential not configured: set the {}",
                self.credentials.source()
            ))
        })?;

        let client = SequenceClient::new(self.client_config.clone(), Some(token));
        let accounts = {
            let session = client.session()?;
            session.fetch_accounts().await?
        };

        Ok(Envelope::Success(render_accounts(&accounts)?))
    }

    async fn trigger_rule(&self, args: &Value) -> Result<Envelope> {
        let rule_id = required_str(args, "rule_id")?;
        let secret = SecretString::from(required_str(args, "api_secret")?.to_string());
        let payload = args.get("payload").cloned();
        let idempotency_key = args.get("idempotency_key").and_then(Value::as_str);

        let client = SequenceClient::without_token(self.client_config.clone());
        let response = {
            let session = client.session()?;
            session
                .trigger_rule(rule_id, &secret, payload, idempotency_key)
                .await?
        };

        Ok(Envelope::Success(render_trigger(&response)?))
    }
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::validation(format!("{} is required", key)))
}

// =============================================================================
// Rendering
// =============================================================================

/// One row of the `get_accounts` result.
#[derive(Debug, Serialize)]
struct AccountView<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    account_type: &'static str,
    balance_dollars: Option<f64>,
    balance_error: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct AccountsView<'a> {
    accounts: Vec<AccountView<'a>>,
    total_accounts: usize,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    errors: &'a [String],
}

#[derive(Debug, Serialize)]
struct TriggerView<'a> {
    success: bool,
    code: &'a str,
    message: &'a str,
    request_id: &'a str,
}

fn render_accounts(list: &AccountList) -> Result<Value> {
    let view = AccountsView {
        accounts: list
            .accounts
            .iter()
            .map(|account| AccountView {
                id: &account.id,
                name: &account.name,
                account_type: account.account_type.as_str(),
                balance_dollars: account.balance.amount_in_dollars,
                balance_error: account.balance.error.as_deref(),
            })
            .collect(),
        total_accounts: list.len(),
        errors: &list.errors,
    };
    Ok(serde_json::to_value(view)?)
}

fn render_trigger(response: &TriggerRuleResponse) -> Result<Value> {
    let view = TriggerView {
        success: true,
        code: &response.code,
        message: &response.message,
        request_id: response.request_id(),
    };
    Ok(serde_json::to_value(view)?)
}

// =============================================================================
// Tests
// =============================================================================
