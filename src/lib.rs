//! Typed Rust client for the SMS.IR HTTP API.
//!
//! The crate is split into a domain layer of validated types, a transport layer for
//! wire-format quirks, a token layer that keeps one short-lived access token per client
//! and a small client layer orchestrating requests.
//!
//! Access tokens are cached for [`config::DEFAULT_TOKEN_TTL`] by default. Concurrent
//! requests that find no valid token share a single call to the token endpoint.
//!
//! ```rust,no_run
//! use smsir::{Config, MobileNumber, SendVerificationCode, SmsIrClient, VerificationCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), smsir::SmsIrError> {
//!     let client = SmsIrClient::new(Config::new("api-key", "secret-key"))?;
//!     let credit = client.get_credit().await?;
//!     println!("credit: {}", credit.credit);
//!
//!     let request = SendVerificationCode::new(
//!         MobileNumber::new("09121234567")?,
//!         VerificationCode::new("12345")?,
//!     );
//!     let _resp = client.send_verification_code(request).await?;
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod domain;
pub mod token;
mod transport;

pub use client::{SmsIrClient, SmsIrClientBuilder, SmsIrError};
pub use config::{Config, ConfigError};
pub use domain::{
    CreditResponse, MobileNumber, PhoneNumber, SendByTemplate, SendResponse,
    SendVerificationCode, TemplateId, TemplateParameter, ValidationError, VerificationCode,
};
pub use token::{
    AccessToken, Credentials, HttpTokenFetcher, TokenCache, TokenCacheOptions, TokenError,
    TokenFetcher, TokenProvider,
};
