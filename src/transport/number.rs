use serde::Deserialize;
use serde::de::Error as DeError;

/// Numeric value returned by SMS.IR as either JSON number or JSON string.
///
/// The raw JSON token is preserved to avoid float formatting drift: a large id such as
/// `53160177228` stays `"53160177228"`, and an integral float token (`53160177228.0`) is
/// rendered without the fractional part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportNumber(String);

impl TransportNumber {
    pub fn into_string(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for TransportNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: Box<serde_json::value::RawValue> = Deserialize::deserialize(deserializer)?;
        let token = raw.get();

        match token.as_bytes().first().copied() {
            Some(b'"') => {
                let parsed = serde_json::from_str::<String>(token).map_err(D::Error::custom)?;
                Ok(Self(parsed.trim().to_owned()))
            }
            Some(b'-' | b'0'..=b'9') => Ok(Self(strip_integral_fraction(token).to_owned())),
            _ => Err(D::Error::custom(
                "expected numeric field to be JSON number or string",
            )),
        }
    }
}

fn strip_integral_fraction(token: &str) -> &str {
    match token.split_once('.') {
        Some((whole, fraction)) if !fraction.is_empty() && fraction.bytes().all(|b| b == b'0') => {
            whole
        }
        _ => token,
    }
}
