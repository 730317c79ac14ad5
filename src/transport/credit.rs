use serde::Deserialize;

use super::number::TransportNumber;
use super::{ApiReply, TransportError};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreditJsonResponse {
    #[serde(default)]
    credit: Option<TransportNumber>,
    is_successful: bool,
    #[serde(default)]
    message: Option<String>,
}

pub fn decode_credit_json_response(json: &str) -> Result<ApiReply<String>, TransportError> {
    let parsed: CreditJsonResponse = serde_json::from_str(json)?;
    Ok(ApiReply::new(
        parsed.is_successful,
        parsed.message,
        parsed.credit.map(TransportNumber::into_string),
    ))
}
