//! Typed client for the Sequence banking API.
//!
//! Two calls, two credential kinds:
//! - `POST /accounts` authenticated by the user's access token
//!   (`x-sequence-access-token`), fixed for the client's lifetime.
//! - `POST /remote-api/rules/{ruleId}/trigger` authenticated by a per-rule
//!   secret (`x-sequence-signature`), supplied with each call.
//!
//! Every failure, local or remote, surfaces as [`ApiError`].

pub mod error;
pub mod models;

pub use error::ApiError;
pub use models::{
    Account, AccountList, AccountType, AccountsResponse, Balance, TriggerRuleData,
    TriggerRuleResponse,
};

use std::ops::Deref;
use std::sync::{Mutex, PoisonError};

use reqwest::header::HeaderValue;
use reqwest::{Client as HttpClient, RequestBuilder, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::ClientConfig;

/// Header carrying the account-listing access token.
pub const ACCESS_TOKEN_HEADER: &str = "x-sequence-access-token";

/// Header carrying a rule's API secret.
pub const SIGNATURE_HEADER: &str = "x-sequence-signature";

/// Optional header deduplicating rule triggers.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

const USER_AGENT: &str = concat!("sequence-mcp/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// SequenceClient
// =============================================================================

/// Client for the Sequence API.
///
/// The underlying HTTP connection pool is created on first use and can be
/// released with [`close`](Self::close). It is cheap to clone out of the lock,
/// so concurrent calls on one client never wait on each other.
#[derive(Debug)]
pub struct SequenceClient {
    config: ClientConfig,
    access_token: Option<SecretString>,
    http: Mutex<Option<HttpClient>>,
}

impl SequenceClient {
    /// Create a client. Does not open any connection.
    pub fn new(config: ClientConfig, access_token: Option<SecretString>) -> Self {
        Self {
            config,
            access_token,
            http: Mutex::new(None),
        }
    }

    /// Client for rule triggers only (no access token).
    pub fn without_token(config: ClientConfig) -> Self {
        Self::new(config, None)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    // =========================================================================
    // Connection lifecycle
    // =========================================================================

    /// Open the connection context now instead of on first request.
    pub fn open(&self) -> Result<(), ApiError> {
        self.http().map(|_| ())
    }

    /// Release the connection context. Idempotent.
    pub fn close(&self) {
        let closed = self
            .http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        if closed {
            tracing::debug!("Sequence client closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Open the client for the lifetime of the returned guard.
    ///
    /// The connection context is released when the guard is dropped, including
    /// on early return and unwinding.
    pub fn session(&self) -> Result<ClientSession<'_>, ApiError> {
        self.open()?;
        Ok(ClientSession { client: self })
    }

    fn http(&self) -> Result<HttpClient, ApiError> {
        let mut slot = self.http.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let client = HttpClient::builder()
            .timeout(self.config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(ApiError::transport)?;
        tracing::debug!(base_url = %self.config.base_url, "Sequence client opened");
        *slot = Some(client.clone());
        Ok(client)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Fetch all accounts with their balances.
    ///
    /// Fails locally, before any request, when no access token was configured.
    pub async fn fetch_accounts(&self) -> Result<AccountList, ApiError> {
        let token = self.access_token.as_ref().ok_or_else(|| {
            ApiError::no_credential(
                "no credential configured: an access token is required for fetching accounts",
            )
        })?;

        let url = self.endpoint(&["accounts"])?;
        let request = self
            .http()?
            .post(url)
            .header(ACCESS_TOKEN_HEADER, bearer(token)?)
            .json(&Value::Object(serde_json::Map::new()));

        let response: AccountsResponse = self.send(request).await?;
        tracing::info!(
            request_id = %response.request_id,
            accounts = response.data.len(),
            errors = response.data.errors.len(),
            "Fetched accounts"
        );

        for account in response.data.accounts.iter().filter(|a| !a.balance.is_consistent()) {
            tracing::warn!(account_id = %account.id, "Account balance has neither amount nor error");
        }

        Ok(response.data)
    }

    /// Trigger an automation rule.
    ///
    /// `payload` defaults to `{}`. The idempotency header is sent only for a
    /// non-empty key.
    pub async fn trigger_rule(
        &self,
        rule_id: &str,
        rule_secret: &SecretString,
        payload: Option<Value>,
        idempotency_key: Option<&str>,
    ) -> Result<TriggerRuleResponse, ApiError> {
        let url = self.endpoint(&["remote-api", "rules", rule_id, "trigger"])?;
        let body = payload.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        let idempotency_key = idempotency_key.filter(|key| !key.is_empty());

        let mut request = self
            .http()?
            .post(url)
            .header(SIGNATURE_HEADER, bearer(rule_secret)?)
            .json(&body);
        if let Some(key) = idempotency_key {
            let value = HeaderValue::from_str(key).map_err(|_| {
                ApiError::invalid_request("idempotency key contains characters not allowed in an HTTP header")
            })?;
            request = request.header(IDEMPOTENCY_KEY_HEADER, value);
        }

        tracing::info!(
            rule_id,
            idempotent = idempotency_key.is_some(),
            "Triggering rule"
        );
        let response: TriggerRuleResponse = self.send(request).await?;
        tracing::info!(
            rule_id,
            code = %response.code,
            request_id = %response.request_id(),
            "Rule triggered"
        );

        Ok(response)
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// Build an endpoint URL, percent-encoding each path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| {
            ApiError::invalid_request(format!("invalid base URL '{}': {}", self.config.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::invalid_request(format!(
                    "base URL '{}' cannot carry a path",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and decode a success body, normalizing every failure.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(ApiError::transport)?;
        let status = response.status().as_u16();
        let success = response.status().is_success();
        let body = response.text().await.map_err(ApiError::transport)?;

        if !success {
            let err = ApiError::from_response(status, &body);
            tracing::warn!(status, code = %err.code, "Sequence API returned an error");
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(status, error = %e, "Sequence API returned an unexpected body");
            ApiError::malformed(status, &e)
        })
    }
}

fn bearer(secret: &SecretString) -> Result<HeaderValue, ApiError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", secret.expose_secret()))
        .map_err(|_| {
            ApiError::invalid_credential("credential contains characters not allowed in an HTTP header")
        })?;
    value.set_sensitive(true);
    Ok(value)
}

// =============================================================================
// ClientSession
// =============================================================================

/// Scope guard returned by [`SequenceClient::session`]. Closes on drop.
#[derive(Debug)]
pub struct ClientSession<'a> {
    client: &'a SequenceClient,
}

impl Deref for ClientSession<'_> {
    type Target = SequenceClient;

    fn deref(&self) -> &SequenceClient {
        self.client
    }
}

impl Drop for ClientSession<'_> {
    fn drop(&mut self) {
        self.client.close();
    }
}

// =============================================================================
// Tests
// =============================================================================
