//! Zipcode types and client input normalization.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors that can occur when parsing zipcodes.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ZipcodeError {
    /// A single zipcode is not exactly five ASCII digits.
    #[error("zipcode must be a 5-digit number")]
    Invalid,
    /// A zipcode list was neither an array nor a comma-separated string.
    #[error("zipcodes must be an array of 5-digit strings")]
    InvalidFormat,
}

/// A US zipcode: exactly five ASCII digits.
///
/// ```
/// use leadmarket_core::Zipcode;
///
/// assert!(Zipcode::is_valid("75001"));
/// assert!(!Zipcode::is_valid("7500"));
/// assert!(!Zipcode::is_valid("75001-1234"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Zipcode(String);

impl Zipcode {
    /// Number of digits in a zipcode.
    pub const LENGTH: usize = 5;

    /// Returns `true` if `s` is exactly five ASCII digits.
    #[must_use]
    pub fn is_valid(s: &str) -> bool {
        s.len() == Self::LENGTH && s.bytes().all(|b| b.is_ascii_digit())
    }

    /// Parse a zipcode. Surrounding whitespace is not tolerated here.
    ///
    /// # Errors
    ///
    /// Returns `ZipcodeError::Invalid` unless `s` is exactly five ASCII digits.
    pub fn parse(s: &str) -> Result<Self, ZipcodeError> {
        if Self::is_valid(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(ZipcodeError::Invalid)
        }
    }

    /// Returns the zipcode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Zipcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Zipcode {
    type Err = ZipcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Zipcode {
    type Error = ZipcodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if Self::is_valid(&value) {
            Ok(Self(value))
        } else {
            Err(ZipcodeError::Invalid)
        }
    }
}

impl From<Zipcode> for String {
    fn from(zipcode: Zipcode) -> Self {
        zipcode.0
    }
}

impl AsRef<str> for Zipcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Zipcode list as sent by clients at registration.
///
/// Mobile clients send a JSON array of strings. Older clients sent a single
/// comma-separated string, which is still accepted. Anything else is kept as
/// `Invalid` so the caller can reject it with a clear message.
///
/// The variant is decided once during deserialization; downstream code only
/// sees the normalized `Vec<Zipcode>`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ZipcodeInput {
    /// Canonical shape: `["75001", "75002"]`.
    Sequence(Vec<Value>),
    /// Legacy shape: `"75001, 75002"`.
    CommaSeparated(String),
    /// Any other JSON value.
    Invalid(Value),
}

impl ZipcodeInput {
    /// Normalize to the valid zipcodes, in input order.
    ///
    /// Non-string array elements are dropped. Every candidate is trimmed and
    /// kept only if it is then exactly five digits. Duplicates are preserved.
    ///
    /// # Errors
    ///
    /// Returns `ZipcodeError::InvalidFormat` for the `Invalid` variant.
    ///
    /// ```
    /// use leadmarket_core::{Zipcode, ZipcodeInput};
    ///
    /// let input: ZipcodeInput =
    ///     serde_json::from_str(r#"["75001","75002","abc","7500"]"#).unwrap();
    /// let zips: Vec<String> = input.normalize().unwrap().into_iter().map(String::from).collect();
    /// assert_eq!(zips, ["75001", "75002"]);
    /// ```
    pub fn normalize(&self) -> Result<Vec<Zipcode>, ZipcodeError> {
        match self {
            Self::Sequence(values) => Ok(values
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|s| Zipcode::parse(s.trim()).ok())
                .collect()),
            Self::CommaSeparated(raw) => Ok(raw
                .split(',')
                .filter_map(|s| Zipcode::parse(s.trim()).ok())
                .collect()),
            Self::Invalid(_) => Err(ZipcodeError::InvalidFormat),
        }
    }

    /// Number of entries the client sent, before filtering.
    #[must_use]
    pub fn received_len(&self) -> usize {
        match self {
            Self::Sequence(values) => values.len(),
            Self::CommaSeparated(raw) => raw.split(',').count(),
            Self::Invalid(_) => 0,
        }
    }

    /// Returns `true` for the legacy comma-separated shape.
    #[must_use]
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::CommaSeparated(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn strings(zips: Vec<Zipcode>) -> Vec<String> {
        zips.into_iter().map(String::from).collect()
    }

    #[test]
    fn test_is_valid() {
        assert!(Zipcode::is_valid("00000"));
        assert!(Zipcode::is_valid("75001"));
        assert!(Zipcode::is_valid("99999"));
    }

    #[test]
    fn test_is_valid_rejects_wrong_length_and_non_digits() {
        for bad in ["", "7500", "750011", "7500a", "a5001", " 7500", "75 01", "75-01"] {
            assert!(!Zipcode::is_valid(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_is_valid_rejects_unicode_digits() {
        // Arabic-Indic digits are numeric but not ASCII
        assert!(!Zipcode::is_valid("٧٥٠٠١"));
        // Fullwidth digits
        assert!(!Zipcode::is_valid("７５００１"));
    }

    #[test]
    fn test_serde_validates() {
        let zip: Zipcode = serde_json::from_str("\"75001\"").unwrap();
        assert_eq!(zip.as_str(), "75001");
        assert!(serde_json::from_str::<Zipcode>("\"7500\"").is_err());
        assert_eq!(serde_json::to_string(&zip).unwrap(), "\"75001\"");
    }

    #[test]
    fn test_input_sequence_filters_invalid() {
        let input: ZipcodeInput =
            serde_json::from_value(json!(["75001", "75002", "abc", "7500"])).unwrap();
        assert!(matches!(input, ZipcodeInput::Sequence(_)));
        assert_eq!(strings(input.normalize().unwrap()), ["75001", "75002"]);
        assert_eq!(input.received_len(), 4);
    }

    #[test]
    fn test_input_sequence_drops_non_strings_and_trims() {
        let input: ZipcodeInput =
            serde_json::from_value(json!([75001, null, " 75002 ", "75003"])).unwrap();
        assert_eq!(strings(input.normalize().unwrap()), ["75002", "75003"]);
    }

    #[test]
    fn test_input_sequence_keeps_duplicates() {
        let input: ZipcodeInput = serde_json::from_value(json!(["75001", "75001"])).unwrap();
        assert_eq!(strings(input.normalize().unwrap()), ["75001", "75001"]);
    }

    #[test]
    fn test_input_comma_separated() {
        let input: ZipcodeInput =
            serde_json::from_value(json!("75001, 75002 ,bad,,7500")).unwrap();
        assert!(input.is_legacy());
        assert_eq!(strings(input.normalize().unwrap()), ["75001", "75002"]);
    }

    #[test]
    fn test_input_empty_string() {
        let input: ZipcodeInput = serde_json::from_value(json!("")).unwrap();
        assert!(input.normalize().unwrap().is_empty());
    }

    #[test]
    fn test_input_invalid_shapes() {
        for value in [json!(75001), json!({"zip": "75001"}), json!(true)] {
            let input: ZipcodeInput = serde_json::from_value(value).unwrap();
            assert_eq!(input.normalize(), Err(ZipcodeError::InvalidFormat));
        }
    }
}
