#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditResponse {
    /// Remaining credit exactly as reported by the provider (`"1"`, `"12.5"`).
    pub credit: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendResponse {
    pub verification_code_id: String,
    pub message: Option<String>,
}
