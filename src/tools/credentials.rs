//! Ambient credential lookup.
//!
//! The access token for `get_accounts` is read through [`CredentialProvider`]
//! on every invocation, so tests can substitute it without touching process
//! environment.

use secrecy::SecretString;

use crate::types::DEFAULT_ACCESS_TOKEN_ENV;

/// Source of the account-listing access token.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialProvider: Send + Sync {
    /// Current access token, or `None` when none is configured.
    fn access_token(&self) -> Option<SecretString>;

    /// Where the token comes from, for operator-facing messages.
    fn source(&self) -> String;
}

/// Reads the token from an environment variable on each call.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(DEFAULT_ACCESS_TOKEN_ENV)
    }
}

impl CredentialProvider for EnvCredentials {
    fn access_token(&self) -> Option<SecretString> {
        std::env::var(&self.var)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from)
    }

    fn source(&self) -> String {
        format!("{} environment variable", self.var)
    }
}

/// Fixed token, for embedding and tests.
///
/// The token is held as a [`SecretString`], so `Debug` output is redacted.
#[derive(Debug, Default)]
pub struct StaticCredentials {
    token: Option<SecretString>,
}

impl StaticCredentials {
    /// An empty token is the same as none.
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()).map(SecretString::from),
        }
    }

    pub fn none() -> Self {
        Self { token: None }
    }
}

impl CredentialProvider for StaticCredentials {
    fn access_token(&self) -> Option<SecretString> {
        self.token.clone()
    }

    fn source(&self) -> String {
        "static configuration".to_string()
    }
}
