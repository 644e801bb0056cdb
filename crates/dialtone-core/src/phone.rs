//! Mobile number validation for the login form.
//!
//! The session manager never looks at the number; this gate lives in the
//! presentation layers (TUI form, `dialtone login`).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// 11 digits starting with `09`.
static MOBILE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^09\d{9}$").expect("mobile number regex is valid"));

/// Placeholder shown in empty inputs.
pub const PLACEHOLDER: &str = "09123456789";

/// Number of digits in a valid mobile number.
pub const MOBILE_NUMBER_LEN: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhoneError {
    #[error("Phone number is required")]
    Empty,
    #[error("Please enter a valid mobile number (09XXXXXXXXX)")]
    InvalidFormat,
}

/// A validated mobile number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validates `input` (surrounding whitespace is ignored).
    ///
    /// # Errors
    /// Returns `PhoneError` when the input is empty or not `09` + 9 digits.
    pub fn parse(input: &str) -> Result<Self, PhoneError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }
        if !MOBILE_NUMBER.is_match(trimmed) {
            return Err(PhoneError::InvalidFormat);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns true if `input` is a valid mobile number.
pub fn is_valid(input: &str) -> bool {
    PhoneNumber::parse(input).is_ok()
}
