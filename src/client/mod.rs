//! Client layer: obtains tokens, orchestrates transport calls and maps transport ↔ domain.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{Config, ConfigError};
use crate::domain::{
    CreditResponse, SendByTemplate, SendResponse, SendVerificationCode, ValidationError,
};
use crate::token::{
    AccessToken, Credentials, HttpTokenFetcher, TokenCache, TokenCacheOptions, TokenError,
    TokenProvider,
};
use crate::transport::http::{BoxError, HttpMethod, HttpRequest, HttpTransport, ReqwestTransport};
use crate::transport::{ApiReply, TransportError};

const CREDIT_PATH: &str = "credit";
const VERIFICATION_CODE_PATH: &str = "VerificationCode";
const ULTRA_FAST_SEND_PATH: &str = "UltraFastSend";

const HTTP_UNAUTHORIZED: u16 = 401;

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`SmsIrClient`].
///
/// This error preserves:
/// - token acquisition failures,
/// - HTTP-level failures (non-2xx status or transport failures),
/// - API-level failures (`IsSuccessful == false`),
/// - validation/parse/configuration failures.
pub enum SmsIrError {
    /// No valid access token could be obtained.
    #[error("access token error: {0}")]
    Token(#[from] TokenError),

    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// Non-successful HTTP status code returned by the server.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// SMS.IR answered with `IsSuccessful: false`.
    #[error("API error: {}", .message.as_deref().unwrap_or("request was not successful"))]
    Api { message: Option<String> },

    /// Response body could not be parsed as the expected format.
    #[error("parse error: {0}")]
    Parse(#[source] BoxError),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The client configuration is unusable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Clone)]
/// Builder for [`SmsIrClient`].
///
/// Use this when you need to customize the timeout or user-agent, or to supply your own
/// [`TokenProvider`] instead of the built-in [`TokenCache`].
pub struct SmsIrClientBuilder {
    config: Config,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    token_provider: Option<Arc<dyn TokenProvider>>,
}

impl SmsIrClientBuilder {
    /// Create a builder from `config` with no timeout/user-agent override.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            timeout: None,
            user_agent: None,
            token_provider: None,
        }
    }

    /// Override the base URL (for tests or alternate environments).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Fetch a fresh token for every request instead of caching it.
    pub fn disable_cache(mut self, disable_cache: bool) -> Self {
        self.config.disable_cache = disable_cache;
        self
    }

    /// Override how long a cached token is reused.
    pub fn token_ttl(mut self, ttl: Duration) -> Self {
        self.config.token_ttl = ttl;
        self
    }

    /// Set an HTTP client timeout applied to the entire request, token requests included.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Take tokens from `provider`; the API and secret keys are then unused.
    pub fn token_provider(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.token_provider = Some(Arc::new(provider));
        self
    }

    /// Build a [`SmsIrClient`].
    pub fn build(self) -> Result<SmsIrClient, SmsIrError> {
        self.config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| SmsIrError::Transport(Box::new(err)))?;

        Ok(SmsIrClient::from_parts(
            &self.config,
            Arc::new(ReqwestTransport::new(client)),
            self.token_provider,
        ))
    }
}

#[derive(Clone)]
/// High-level SMS.IR client.
///
/// Every request carries the current access token in the `x-sms-ir-secure-token` header.
/// Tokens come from a [`TokenCache`] built from the configured keys unless a custom
/// [`TokenProvider`] was supplied. Clones share the same token cache.
pub struct SmsIrClient {
    credit_endpoint: String,
    verification_code_endpoint: String,
    ultra_fast_send_endpoint: String,
    tokens: Arc<dyn TokenProvider>,
    http: Arc<dyn HttpTransport>,
}

impl SmsIrClient {
    /// Create a client from `config`.
    ///
    /// For more customization, use [`SmsIrClient::builder`].
    pub fn new(config: Config) -> Result<Self, SmsIrError> {
        Self::builder(config).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(config: Config) -> SmsIrClientBuilder {
        SmsIrClientBuilder::new(config)
    }

    fn from_parts(
        config: &Config,
        http: Arc<dyn HttpTransport>,
        token_provider: Option<Arc<dyn TokenProvider>>,
    ) -> Self {
        let tokens = token_provider.unwrap_or_else(|| {
            let fetcher = HttpTokenFetcher::with_transport(&config.base_url, Arc::clone(&http));
            let cache: Arc<dyn TokenProvider> = Arc::new(TokenCache::new(
                Credentials::new(config.api_key.clone(), config.secret_key.clone()),
                Arc::new(fetcher),
                TokenCacheOptions {
                    ttl: config.token_ttl,
                    disable_cache: config.disable_cache,
                },
            ));
            cache
        });

        Self {
            credit_endpoint: config.endpoint(CREDIT_PATH),
            verification_code_endpoint: config.endpoint(VERIFICATION_CODE_PATH),
            ultra_fast_send_endpoint: config.endpoint(ULTRA_FAST_SEND_PATH),
            tokens,
            http,
        }
    }

    /// Current valid access token, fetched if necessary.
    pub async fn access_token(&self) -> Result<AccessToken, SmsIrError> {
        Ok(self.tokens.access_token().await?)
    }

    /// Remaining account credit.
    ///
    /// Errors:
    /// - [`SmsIrError::Token`] when no access token could be obtained,
    /// - [`SmsIrError::HttpStatus`] for non-2xx HTTP responses,
    /// - [`SmsIrError::Api`] when SMS.IR answers `IsSuccessful: false`.
    pub async fn get_credit(&self) -> Result<CreditResponse, SmsIrError> {
        let body = self
            .execute(HttpMethod::Get, &self.credit_endpoint, None)
            .await?;
        let reply = crate::transport::decode_credit_json_response(&body)
            .map_err(|err| SmsIrError::Parse(Box::new(err)))?;
        let (credit, message) = accept(reply, "Credit")?;
        Ok(CreditResponse { credit, message })
    }

    /// Send a one-time verification code to a single mobile number.
    ///
    /// Errors are the same as for [`SmsIrClient::get_credit`].
    pub async fn send_verification_code(
        &self,
        request: SendVerificationCode,
    ) -> Result<SendResponse, SmsIrError> {
        let body = crate::transport::encode_verification_code_body(&request);
        let body = self
            .execute(HttpMethod::Post, &self.verification_code_endpoint, Some(body))
            .await?;
        decode_send_response(&body)
    }

    /// Send a message built from a template registered in the SMS.IR panel.
    ///
    /// Errors are the same as for [`SmsIrClient::get_credit`].
    pub async fn send_by_template(
        &self,
        request: SendByTemplate,
    ) -> Result<SendResponse, SmsIrError> {
        let body = crate::transport::encode_ultra_fast_send_body(&request);
        let body = self
            .execute(HttpMethod::Post, &self.ultra_fast_send_endpoint, Some(body))
            .await?;
        decode_send_response(&body)
    }

    async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<String>,
    ) -> Result<String, SmsIrError> {
        let token = self.tokens.access_token().await?;
        debug!(?method, url, "sending authenticated request");

        let request = HttpRequest {
            method,
            url,
            token: Some(token.as_str()),
            body,
        };
        let response = self
            .http
            .send(request)
            .await
            .map_err(SmsIrError::Transport)?;

        if !response.is_success() {
            if response.status == HTTP_UNAUTHORIZED {
                warn!(url, "access token rejected; dropping cached token");
                self.tokens.invalidate(&token);
            }
            return Err(SmsIrError::HttpStatus {
                status: response.status,
                body: response.error_body(),
            });
        }

        Ok(response.body)
    }
}

fn decode_send_response(body: &str) -> Result<SendResponse, SmsIrError> {
    let reply = crate::transport::decode_send_json_response(body)
        .map_err(|err| SmsIrError::Parse(Box::new(err)))?;
    let (verification_code_id, message) = accept(reply, "VerificationCodeId")?;
    Ok(SendResponse {
        verification_code_id,
        message,
    })
}

/// Split a successful reply into its value and message.
fn accept<T>(reply: ApiReply<T>, field: &'static str) -> Result<(T, Option<String>), SmsIrError> {
    if !reply.is_successful {
        return Err(SmsIrError::Api {
            message: reply.message,
        });
    }
    let value = reply
        .value
        .ok_or_else(|| SmsIrError::Parse(Box::new(TransportError::MissingField { field })))?;
    Ok((value, reply.message))
}

#[cfg(test)]
mod tests {
    use crate::domain::{MobileNumber, TemplateId, VerificationCode};
    use crate::transport::http::SECURE_TOKEN_HEADER;
    use crate::transport::http::fake::{FailingTransport, FakeTransport};

    use super::*;

    const BASE_URL: &str = "https://example.invalid/api";

    fn config() -> Config {
        Config {
            base_url: BASE_URL.to_owned(),
            ..Config::new("fake_api_key", "fake_secret_key")
        }
    }

    fn static_token(value: &str) -> Arc<dyn TokenProvider> {
        Arc::new(AccessToken::new(value).unwrap())
    }

    fn make_client(
        tokens: Arc<dyn TokenProvider>,
        transport: impl HttpTransport + 'static,
    ) -> SmsIrClient {
        SmsIrClient::from_parts(&config(), Arc::new(transport), Some(tokens))
    }

    fn verification_request(mobile: &str) -> SendVerificationCode {
        SendVerificationCode::new(
            MobileNumber::new(mobile).unwrap(),
            VerificationCode::new("fake_code").unwrap(),
        )
    }

    fn body_json(body: Option<&str>) -> serde_json::Value {
        serde_json::from_str(body.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn get_credit_uses_token_and_credit_endpoint() {
        let transport = FakeTransport::new(200, r#"{"Credit":1,"IsSuccessful":true}"#);
        let client = make_client(static_token("fake_token"), transport.clone());

        let response = client.get_credit().await.unwrap();
        assert_eq!(response.credit, "1");

        let request = transport.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://example.invalid/api/credit");
        assert_eq!(request.token.as_deref(), Some("fake_token"));
        assert_eq!(request.body, None);
    }

    #[tokio::test]
    async fn get_credit_maps_unsuccessful_reply_to_api_error() {
        let transport = FakeTransport::new(
            200,
            r#"{"Credit":0,"IsSuccessful":false,"Message":"invalid token"}"#,
        );
        let client = make_client(static_token("by_invalid_token"), transport);

        let err = client.get_credit().await.unwrap_err();
        match err {
            SmsIrError::Api { message } => assert_eq!(message.as_deref(), Some("invalid token")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_credit_maps_missing_credit_to_parse_error() {
        let transport = FakeTransport::new(200, r#"{"IsSuccessful":true}"#);
        let client = make_client(static_token("t"), transport);

        let err = client.get_credit().await.unwrap_err();
        assert!(matches!(err, SmsIrError::Parse(_)));
    }

    #[tokio::test]
    async fn send_verification_code_posts_code_and_mobile() {
        let transport = FakeTransport::new(
            200,
            r#"{"VerificationCodeId":53160177228.0,"IsSuccessful":true}"#,
        );
        let client = make_client(static_token("fake_token"), transport.clone());

        let response = client
            .send_verification_code(verification_request("fake_mobile"))
            .await
            .unwrap();
        assert_eq!(response.verification_code_id, "53160177228");

        let request = transport.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://example.invalid/api/VerificationCode");
        assert_eq!(request.token.as_deref(), Some("fake_token"));
        let body = body_json(request.body.as_deref());
        assert_eq!(body["MobileNumber"], "fake_mobile");
        assert_eq!(body["Code"], "fake_code");
    }

    #[tokio::test]
    async fn send_verification_code_maps_unsuccessful_reply_to_api_error() {
        let transport = FakeTransport::new(
            200,
            r#"{"VerificationCodeId":0,"IsSuccessful":false,"Message":"invalid mobile"}"#,
        );
        let client = make_client(static_token("fake_token"), transport);

        let err = client
            .send_verification_code(verification_request("by_invalid_mobile"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "API error: invalid mobile");
    }

    #[tokio::test]
    async fn send_by_template_posts_template_body() {
        let transport = FakeTransport::new(
            200,
            r#"{"VerificationCodeId":42,"IsSuccessful":true,"Message":"sent"}"#,
        );
        let client = make_client(static_token("fake_token"), transport.clone());

        let request = SendByTemplate::with_pairs(
            MobileNumber::new("fake_mobile").unwrap(),
            TemplateId::new(123).unwrap(),
            [("param1", "value1"), ("param2", "value2")],
        )
        .unwrap();
        let response = client.send_by_template(request).await.unwrap();
        assert_eq!(response.verification_code_id, "42");
        assert_eq!(response.message.as_deref(), Some("sent"));

        let request = transport.last_request().unwrap();
        assert_eq!(request.url, "https://example.invalid/api/UltraFastSend");
        assert_eq!(request.token.as_deref(), Some("fake_token"));
        let body = body_json(request.body.as_deref());
        assert_eq!(body["Mobile"], "fake_mobile");
        assert_eq!(body["TemplateId"], 123);
        assert_eq!(body["ParameterArray"][0]["Parameter"], "param1");
        assert_eq!(body["ParameterArray"][1]["ParameterValue"], "value2");
    }

    #[tokio::test]
    async fn non_success_http_status_is_reported_with_body() {
        let transport = FakeTransport::new(500, "oops");
        let client = make_client(static_token("t"), transport);

        let err = client.get_credit().await.unwrap_err();
        assert!(matches!(
            err,
            SmsIrError::HttpStatus {
                status: 500,
                body: Some(_)
            }
        ));
    }

    #[tokio::test]
    async fn empty_http_body_maps_to_none() {
        let transport = FakeTransport::new(503, "   ");
        let client = make_client(static_token("t"), transport);

        let err = client.get_credit().await.unwrap_err();
        assert!(matches!(
            err,
            SmsIrError::HttpStatus {
                status: 503,
                body: None
            }
        ));
    }

    #[tokio::test]
    async fn invalid_json_maps_to_parse_error() {
        let transport = FakeTransport::new(200, "{ not json }");
        let client = make_client(static_token("t"), transport);

        let err = client
            .send_verification_code(verification_request("09121234567"))
            .await
            .unwrap_err();
        assert!(matches!(err, SmsIrError::Parse(_)));
    }

    #[tokio::test]
    async fn transport_failure_is_reported() {
        let client = make_client(static_token("t"), FailingTransport);

        let err = client.get_credit().await.unwrap_err();
        assert!(matches!(err, SmsIrError::Transport(_)));
    }

    #[tokio::test]
    async fn built_in_cache_fetches_token_before_request() {
        // One body serves both endpoints: unknown fields are ignored by each decoder.
        let transport = FakeTransport::new(
            200,
            r#"{"TokenKey":"issued","Credit":7,"IsSuccessful":true}"#,
        );
        let client = SmsIrClient::from_parts(&config(), Arc::new(transport.clone()), None);

        client.get_credit().await.unwrap();
        client.get_credit().await.unwrap();

        let requests = transport.requests();
        let urls = requests.iter().map(|r| r.url.as_str()).collect::<Vec<_>>();
        assert_eq!(
            urls,
            [
                "https://example.invalid/api/Token",
                "https://example.invalid/api/credit",
                "https://example.invalid/api/credit",
            ]
        );
        assert_eq!(requests[1].token.as_deref(), Some("issued"));
        assert_eq!(requests[2].token.as_deref(), Some("issued"));
    }

    #[tokio::test]
    async fn disabled_cache_fetches_token_for_every_request() {
        let transport = FakeTransport::new(
            200,
            r#"{"TokenKey":"issued","Credit":7,"IsSuccessful":true}"#,
        );
        let config = Config {
            disable_cache: true,
            ..config()
        };
        let client = SmsIrClient::from_parts(&config, Arc::new(transport.clone()), None);

        client.get_credit().await.unwrap();
        client.get_credit().await.unwrap();

        let token_requests = transport
            .requests()
            .iter()
            .filter(|r| r.url.ends_with("/Token"))
            .count();
        assert_eq!(token_requests, 2);
    }

    #[tokio::test]
    async fn token_failure_stops_request() {
        let transport = FakeTransport::new(200, r#"{"TokenKey":"","IsSuccessful":false}"#);
        let client = SmsIrClient::from_parts(&config(), Arc::new(transport.clone()), None);

        let err = client.get_credit().await.unwrap_err();
        assert!(matches!(
            err,
            SmsIrError::Token(TokenError::Authentication { .. })
        ));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn unauthorized_response_invalidates_cached_token() {
        let cache = Arc::new(TokenCache::new(
            Credentials::new("k", "s"),
            Arc::new(HttpTokenFetcher::with_transport(
                BASE_URL,
                Arc::new(FakeTransport::new(
                    200,
                    r#"{"TokenKey":"issued","IsSuccessful":true}"#,
                )),
            )),
            TokenCacheOptions::default(),
        ));
        let provider: Arc<dyn TokenProvider> = cache.clone();
        let client = make_client(provider, FakeTransport::new(401, ""));

        let err = client.get_credit().await.unwrap_err();
        assert!(matches!(
            err,
            SmsIrError::HttpStatus {
                status: 401,
                body: None
            }
        ));
        assert!(format!("{cache:?}").contains("cached: false"));
    }

    /// Static token that records which tokens were reported as rejected.
    struct RecordingProvider {
        token: AccessToken,
        rejected: std::sync::Mutex<Vec<AccessToken>>,
    }

    impl TokenProvider for RecordingProvider {
        fn access_token(&self) -> crate::token::BoxFuture<'_, Result<AccessToken, TokenError>> {
            Box::pin(async move { Ok(self.token.clone()) })
        }

        fn invalidate(&self, token: &AccessToken) {
            self.rejected.lock().unwrap().push(token.clone());
        }
    }

    #[tokio::test]
    async fn unauthorized_response_reports_the_token_that_was_sent() {
        let provider = Arc::new(RecordingProvider {
            token: AccessToken::new("sent").unwrap(),
            rejected: std::sync::Mutex::new(Vec::new()),
        });
        let client = make_client(provider.clone(), FakeTransport::new(401, ""));

        client.get_credit().await.unwrap_err();
        assert_eq!(
            provider.rejected.lock().unwrap().as_slice(),
            [AccessToken::new("sent").unwrap()]
        );

        let client = make_client(provider.clone(), FakeTransport::new(500, ""));
        client.get_credit().await.unwrap_err();
        assert_eq!(provider.rejected.lock().unwrap().len(), 1);
    }

    #[test]
    fn builder_rejects_invalid_base_url() {
        let err = SmsIrClient::builder(Config::default())
            .base_url("not a url")
            .build()
            .err()
            .unwrap();
        assert!(matches!(
            err,
            SmsIrError::Config(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn builder_overrides_are_applied() {
        let client = SmsIrClient::builder(Config::default())
            .base_url("http://127.0.0.1:9/api/")
            .disable_cache(true)
            .token_ttl(Duration::from_secs(5))
            .timeout(Duration::from_secs(1))
            .user_agent("smsir-tests")
            .build()
            .unwrap();
        assert_eq!(client.credit_endpoint, "http://127.0.0.1:9/api/credit");
        assert_eq!(
            client.verification_code_endpoint,
            "http://127.0.0.1:9/api/VerificationCode"
        );
        assert_eq!(
            client.ultra_fast_send_endpoint,
            "http://127.0.0.1:9/api/UltraFastSend"
        );
    }

    #[test]
    fn secure_token_header_name_matches_provider() {
        assert_eq!(SECURE_TOKEN_HEADER, "x-sms-ir-secure-token");
    }
}
