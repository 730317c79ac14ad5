//! Transport layer: HTTP and wire-format details (serialization/deserialization).

mod credit;
pub mod http;
mod number;
mod send;
mod token;

pub use credit::decode_credit_json_response;
pub use send::{
    decode_send_json_response, encode_ultra_fast_send_body, encode_verification_code_body,
};
pub use token::{decode_token_json_response, encode_token_request};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("successful response without `{field}`")]
    MissingField { field: &'static str },
}

/// Common envelope of every SMS.IR reply: a success flag, an optional message, and the
/// endpoint-specific value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply<T> {
    pub is_successful: bool,
    pub message: Option<String>,
    pub value: Option<T>,
}

impl<T> ApiReply<T> {
    fn new(is_successful: bool, message: Option<String>, value: Option<T>) -> Self {
        Self {
            is_successful,
            message: message.filter(|message| !message.trim().is_empty()),
            value,
        }
    }
}
