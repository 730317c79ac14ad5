use crate::domain::validation::ValidationError;

use phonenumber::country;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Unvalidated mobile number as sent to SMS.IR.
///
/// Invariant: non-empty after trimming. This type does not normalize; if you want the
/// national digits form, parse into [`PhoneNumber`] and convert it into [`MobileNumber`].
pub struct MobileNumber(String);

impl MobileNumber {
    /// Field name used by the `VerificationCode` endpoint.
    pub const FIELD: &'static str = "MobileNumber";

    /// Create a validated (non-empty) mobile number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Raw (trimmed) value as sent to SMS.IR.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<PhoneNumber> for MobileNumber {
    /// Convert an already-parsed phone number into its national digits (`09121234567`).
    fn from(value: PhoneNumber) -> Self {
        Self(value.national)
    }
}

#[derive(Debug, Clone)]
/// Parsed phone number with E.164 and national representations.
///
/// Equality, ordering, and hashing are based on the E.164 form.
pub struct PhoneNumber {
    raw: String,
    e164: String,
    national: String,
    parsed: phonenumber::PhoneNumber,
}

impl PhoneNumber {
    /// Parse a phone number and normalize it.
    ///
    /// `default_region` is used when the input does not contain an explicit country prefix,
    /// typically `Some(phonenumber::country::Id::IR)`.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty {
                field: MobileNumber::FIELD,
            });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();
        // National formatting inserts spaces; the provider expects bare digits.
        let national = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::National)
            .to_string()
            .chars()
            .filter(char::is_ascii_digit)
            .collect::<String>();

        Ok(Self {
            raw,
            e164,
            national,
            parsed,
        })
    }

    /// Raw input after trimming.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized E.164 representation.
    pub fn e164(&self) -> &str {
        &self.e164
    }

    /// National representation reduced to digits.
    pub fn national(&self) -> &str {
        &self.national
    }

    /// The parsed phone number from the `phonenumber` crate.
    pub fn parsed(&self) -> &phonenumber::PhoneNumber {
        &self.parsed
    }
}

impl PartialEq for PhoneNumber {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for PhoneNumber {}

impl std::hash::Hash for PhoneNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.e164.hash(state);
    }
}

impl std::cmp::PartialOrd for PhoneNumber {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for PhoneNumber {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.e164.cmp(&other.e164)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// One-time verification code delivered by the `VerificationCode` endpoint.
///
/// Invariant: non-empty after trimming.
pub struct VerificationCode(String);

impl VerificationCode {
    /// Field name used by SMS.IR (`Code`).
    pub const FIELD: &'static str = "Code";

    /// Create a validated [`VerificationCode`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Identifier of a message template registered in the SMS.IR panel (`TemplateId`).
pub struct TemplateId(i64);

impl TemplateId {
    /// Field name used by SMS.IR (`TemplateId`).
    pub const FIELD: &'static str = "TemplateId";

    /// Create a template id; SMS.IR issues only positive ids.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if value <= 0 {
            return Err(ValidationError::NotPositive {
                field: Self::FIELD,
                value,
            });
        }
        Ok(Self(value))
    }

    /// Get the underlying id.
    pub fn value(self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A named placeholder value substituted into a template.
///
/// Invariant: the parameter name is non-empty after trimming. The value is kept as provided.
pub struct TemplateParameter {
    name: String,
    value: String,
}

impl TemplateParameter {
    /// Field name used by SMS.IR for the parameter name (`Parameter`).
    pub const FIELD: &'static str = "Parameter";

    /// Create a validated template parameter.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self {
            name: trimmed.to_owned(),
            value: value.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}
