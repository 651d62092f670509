//! Currency codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a three-letter currency code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid currency code: '{0}'")]
pub struct InvalidCurrencyCode(pub String);

/// ISO 4217 style currency code, always stored upper-case (e.g. "LKR").
///
/// Rate sources publish lower-case codes; parsing normalizes them so that
/// `"usd"` and `"USD"` compare equal everywhere in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses and normalizes a currency code.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is exactly three ASCII letters.
    pub fn parse(code: &str) -> Result<Self, InvalidCurrencyCode> {
        let trimmed = code.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(InvalidCurrencyCode(code.to_string()))
        }
    }

    /// Returns the upper-case code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the lower-case form used by public rate feeds.
    #[must_use]
    pub fn to_lowercase(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = InvalidCurrencyCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = InvalidCurrencyCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn usd() -> CurrencyCode {
        CurrencyCode::parse("USD").unwrap()
    }

    #[rstest]
    #[case("USD", "USD")]
    #[case("usd", "USD")]
    #[case(" lkr ", "LKR")]
    #[case("eUr", "EUR")]
    fn test_currency_code_normalizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(CurrencyCode::parse(input).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("US")]
    #[case("USDT")]
    #[case("U5D")]
    fn test_currency_code_rejects(#[case] input: &str) {
        assert!(CurrencyCode::parse(input).is_err());
    }

    #[test]
    fn test_currency_code_lowercase() {
        assert_eq!(usd().to_lowercase(), "usd");
    }

    #[test]
    fn test_currency_code_serde_roundtrip() {
        let json = serde_json::to_string(&usd()).unwrap();
        assert_eq!(json, "\"USD\"");
        let parsed: CurrencyCode = serde_json::from_str("\"lkr\"").unwrap();
        assert_eq!(parsed.as_str(), "LKR");
        assert!(serde_json::from_str::<CurrencyCode>("\"dollars\"").is_err());
    }
}
