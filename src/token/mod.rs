//! Token layer: exchanging credentials for short-lived access tokens and caching them.
//!
//! [`TokenCache`] hands out a valid [`AccessToken`], calling its injected [`TokenFetcher`]
//! only when the cached token is missing or past its lifetime. Concurrent callers that
//! find the cache empty share one fetch and its outcome.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

mod cache;
mod fetcher;

pub use cache::{TokenCache, TokenCacheOptions};
pub use fetcher::{HttpTokenFetcher, TokenFetcher};

pub use crate::transport::http::BoxFuture;

#[derive(Clone, PartialEq, Eq, Hash)]
/// Short-lived token sent in the `x-sms-ir-secure-token` header.
///
/// Invariant: non-empty. `Debug` output is redacted.
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a token issued by the provider; `None` when the value is empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Clone, PartialEq, Eq)]
/// Long-lived credentials exchanged for an [`AccessToken`].
pub struct Credentials {
    api_key: String,
    secret_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
/// Why an access token could not be obtained.
///
/// The error is `Clone` so that a single failed fetch can be handed to every caller that
/// was waiting on it.
pub enum TokenError {
    /// The token endpoint could not be reached (DNS, TLS, connection, timeout).
    #[error("token transport error: {0}")]
    Transport(#[source] Arc<dyn StdError + Send + Sync>),

    /// The token endpoint answered with a non-2xx HTTP status.
    #[error("token endpoint returned HTTP status {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The provider rejected the credentials or issued no token.
    #[error("authentication failed: {}", .message.as_deref().unwrap_or("invalid credentials"))]
    Authentication { message: Option<String> },

    /// The token endpoint answered with a body of unexpected shape.
    #[error("malformed token response: {0}")]
    Protocol(#[source] Arc<dyn StdError + Send + Sync>),
}

impl TokenError {
    /// `true` when the provider reachably refused the credentials.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

/// Source of the current valid access token for authenticated requests.
pub trait TokenProvider: Send + Sync {
    fn access_token(&self) -> BoxFuture<'_, Result<AccessToken, TokenError>>;

    /// Called when the API rejected `token`. Providers without state ignore it.
    fn invalidate(&self, _token: &AccessToken) {}
}

impl TokenProvider for AccessToken {
    fn access_token(&self) -> BoxFuture<'_, Result<AccessToken, TokenError>> {
        Box::pin(async move { Ok(self.clone()) })
    }
}
