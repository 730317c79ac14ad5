use serde::Deserialize;

use super::{ApiReply, TransportError};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TokenJsonResponse {
    #[serde(default)]
    token_key: Option<String>,
    is_successful: bool,
    #[serde(default)]
    message: Option<String>,
}

pub fn encode_token_request(api_key: &str, secret_key: &str) -> String {
    serde_json::json!({
        "UserApiKey": api_key,
        "SecretKey": secret_key,
    })
    .to_string()
}

/// An empty `TokenKey` decodes as no value.
pub fn decode_token_json_response(json: &str) -> Result<ApiReply<String>, TransportError> {
    let parsed: TokenJsonResponse = serde_json::from_str(json)?;
    Ok(ApiReply::new(
        parsed.is_successful,
        parsed.message,
        parsed.token_key.filter(|token| !token.is_empty()),
    ))
}
