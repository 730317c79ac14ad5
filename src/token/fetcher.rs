use std::sync::Arc;

use tracing::debug;

use super::{AccessToken, BoxFuture, Credentials, TokenError};
use crate::config::join_url;
use crate::transport::http::{HttpRequest, HttpTransport, ReqwestTransport};
use crate::transport::{decode_token_json_response, encode_token_request};

/// Exchanges [`Credentials`] for a fresh [`AccessToken`].
///
/// Implementations hold no state between calls. [`super::TokenCache`] takes one as a trait
/// object, so tests can substitute their own.
pub trait TokenFetcher: Send + Sync {
    fn fetch<'a>(
        &'a self,
        credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<AccessToken, TokenError>>;
}

#[derive(Clone)]
/// [`TokenFetcher`] calling the SMS.IR `Token` endpoint.
pub struct HttpTokenFetcher {
    endpoint: String,
    http: Arc<dyn HttpTransport>,
}

impl HttpTokenFetcher {
    /// Path of the token endpoint below the base URL.
    pub const PATH: &'static str = "Token";

    /// Fetch tokens from `{base_url}/Token` using `client`.
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self::with_transport(base_url, Arc::new(ReqwestTransport::new(client)))
    }

    pub(crate) fn with_transport(base_url: &str, http: Arc<dyn HttpTransport>) -> Self {
        Self {
            endpoint: join_url(base_url, Self::PATH),
            http,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TokenFetcher for HttpTokenFetcher {
    fn fetch<'a>(
        &'a self,
        credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<AccessToken, TokenError>> {
        Box::pin(async move {
            debug!(endpoint = %self.endpoint, "requesting access token");

            let body = encode_token_request(credentials.api_key(), credentials.secret_key());
            let response = self
                .http
                .send(HttpRequest::post(&self.endpoint, body))
                .await
                .map_err(|err| TokenError::Transport(Arc::from(err)))?;

            if !response.is_success() {
                return Err(TokenError::HttpStatus {
                    status: response.status,
                    body: response.error_body(),
                });
            }

            let reply = decode_token_json_response(&response.body)
                .map_err(|err| TokenError::Protocol(Arc::new(err)))?;

            match (reply.is_successful, reply.value.and_then(AccessToken::new)) {
                (true, Some(token)) => Ok(token),
                _ => Err(TokenError::Authentication {
                    message: reply.message,
                }),
            }
        })
    }
}
