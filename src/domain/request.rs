use crate::domain::validation::ValidationError;
use crate::domain::value::{MobileNumber, TemplateId, TemplateParameter, VerificationCode};

#[derive(Debug, Clone)]
pub struct SendVerificationCode {
    mobile: MobileNumber,
    code: VerificationCode,
}

impl SendVerificationCode {
    pub fn new(mobile: MobileNumber, code: VerificationCode) -> Self {
        Self { mobile, code }
    }

    pub fn mobile(&self) -> &MobileNumber {
        &self.mobile
    }

    pub fn code(&self) -> &VerificationCode {
        &self.code
    }
}

#[derive(Debug, Clone)]
pub struct SendByTemplate {
    mobile: MobileNumber,
    template_id: TemplateId,
    parameters: Vec<TemplateParameter>,
}

impl SendByTemplate {
    /// Parameters are sent in the order given.
    pub fn new(
        mobile: MobileNumber,
        template_id: TemplateId,
        parameters: Vec<TemplateParameter>,
    ) -> Self {
        Self {
            mobile,
            template_id,
            parameters,
        }
    }

    /// Build a request from `(name, value)` pairs, validating every name.
    pub fn with_pairs<I, K, V>(
        mobile: MobileNumber,
        template_id: TemplateId,
        pairs: I,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let parameters = pairs
            .into_iter()
            .map(|(name, value)| TemplateParameter::new(name, value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(mobile, template_id, parameters))
    }

    pub fn mobile(&self) -> &MobileNumber {
        &self.mobile
    }

    pub fn template_id(&self) -> TemplateId {
        self.template_id
    }

    pub fn parameters(&self) -> &[TemplateParameter] {
        &self.parameters
    }
}
