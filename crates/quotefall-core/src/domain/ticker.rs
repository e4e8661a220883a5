use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_TICKER_LEN: usize = 15;

/// Exchange qualifier appended to bare Taiwan stock codes.
pub const TAIWAN_SUFFIX: &str = ".TW";

/// Validated ticker string.
///
/// Case is preserved as entered; upper-casing happens only when the final
/// report is assembled. A bare 4-digit code is rewritten to the
/// exchange-qualified Taiwan form by [`Ticker::normalize`]; every other
/// input passes through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTicker);
        }

        let len = trimmed.chars().count();
        if len > MAX_TICKER_LEN {
            return Err(ValidationError::TickerTooLong {
                len,
                max: MAX_TICKER_LEN,
            });
        }

        for (index, ch) in trimmed.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || ch == '.' || ch == '-';
            if !valid {
                return Err(ValidationError::TickerInvalidChar { ch, index });
            }
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Rewrite a purely 4-digit code to its exchange-qualified form.
    /// Pure and infallible; non-numeric input is returned untouched.
    pub fn normalize(&self) -> Self {
        if self.0.len() == 4 && self.0.bytes().all(|byte| byte.is_ascii_digit()) {
            return Self(format!("{}{TAIWAN_SUFFIX}", self.0));
        }
        self.clone()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-cased form used in the assembled report.
    pub fn display_symbol(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl Display for Ticker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Ticker {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Ticker {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_digit_code_gains_taiwan_suffix() {
        let ticker = Ticker::parse("2330").expect("ticker should parse");
        assert_eq!(ticker.normalize().as_str(), "2330.TW");
    }

    #[test]
    fn non_numeric_input_passes_through() {
        let ticker = Ticker::parse("AAPL").expect("ticker should parse");
        assert_eq!(ticker.normalize().as_str(), "AAPL");
    }

    #[test]
    fn five_digit_code_passes_through() {
        let ticker = Ticker::parse("00878").expect("ticker should parse");
        assert_eq!(ticker.normalize().as_str(), "00878");
    }

    #[test]
    fn case_is_preserved_until_display() {
        let ticker = Ticker::parse("brk-b").expect("ticker should parse");
        assert_eq!(ticker.normalize().as_str(), "brk-b");
        assert_eq!(ticker.display_symbol(), "BRK-B");
    }

    #[test]
    fn rejects_empty_input() {
        let err = Ticker::parse("   ").expect_err("must fail");
        assert!(matches!(err, ValidationError::EmptyTicker));
    }

    #[test]
    fn rejects_invalid_chars() {
        let err = Ticker::parse("AAPL$").expect_err("must fail");
        assert!(matches!(err, ValidationError::TickerInvalidChar { .. }));
    }
}
