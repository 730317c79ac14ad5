use serde::Deserialize;

use super::number::TransportNumber;
use super::{ApiReply, TransportError};
use crate::domain::{SendByTemplate, SendVerificationCode};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SendJsonResponse {
    #[serde(default)]
    verification_code_id: Option<TransportNumber>,
    is_successful: bool,
    #[serde(default)]
    message: Option<String>,
}

pub fn encode_verification_code_body(request: &SendVerificationCode) -> String {
    serde_json::json!({
        "Code": request.code().as_str(),
        "MobileNumber": request.mobile().as_str(),
    })
    .to_string()
}

pub fn encode_ultra_fast_send_body(request: &SendByTemplate) -> String {
    let parameters = request
        .parameters()
        .iter()
        .map(|parameter| {
            serde_json::json!({
                "Parameter": parameter.name(),
                "ParameterValue": parameter.value(),
            })
        })
        .collect::<Vec<_>>();

    serde_json::json!({
        "Mobile": request.mobile().as_str(),
        "TemplateId": request.template_id().value(),
        "ParameterArray": parameters,
    })
    .to_string()
}

/// Shared by `VerificationCode` and `UltraFastSend`; both answer with a `VerificationCodeId`.
pub fn decode_send_json_response(json: &str) -> Result<ApiReply<String>, TransportError> {
    let parsed: SendJsonResponse = serde_json::from_str(json)?;
    Ok(ApiReply::new(
        parsed.is_successful,
        parsed.message,
        parsed.verification_code_id.map(TransportNumber::into_string),
    ))
}
