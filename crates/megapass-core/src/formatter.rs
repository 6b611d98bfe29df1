//! Credential formatting and validation
//!
//! A credential is always `Mega` followed by a zero-padded decimal number
//! and a trailing `*`. The digit count is governed by the user's
//! [`DigitWidth`] preference.

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// Fixed credential prefix
pub const CREDENTIAL_PREFIX: &str = "Mega";

/// Fixed credential suffix
pub const CREDENTIAL_SUFFIX: char = '*';

/// Number of decimal digits in a credential
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigitWidth {
    #[default]
    Three,
    Four,
}

impl DigitWidth {
    /// Digit count
    pub fn digits(&self) -> usize {
        match self {
            DigitWidth::Three => 3,
            DigitWidth::Four => 4,
        }
    }

    /// Size of the candidate space (10^digits)
    pub fn space(&self) -> u32 {
        match self {
            DigitWidth::Three => 1_000,
            DigitWidth::Four => 10_000,
        }
    }
}

impl std::fmt::Display for DigitWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DigitWidth::Three => write!(f, "three"),
            DigitWidth::Four => write!(f, "four"),
        }
    }
}

/// Produce a syntactically valid candidate credential
///
/// Pure with respect to state; the random draw is the only external input.
pub fn format_credential(rng: &mut dyn RandomSource, width: DigitWidth) -> String {
    let number = rng.next_int(width.space());
    format!(
        "{}{:0w$}{}",
        CREDENTIAL_PREFIX,
        number,
        CREDENTIAL_SUFFIX,
        w = width.digits()
    )
}

/// Check a candidate against the exact credential format for `width`
///
/// The digit count must match `width` exactly; a three-digit value is not
/// accepted while the four-digit preference is active, and vice versa.
pub fn is_valid_format(candidate: &str, width: DigitWidth) -> bool {
    let rest = match candidate.strip_prefix(CREDENTIAL_PREFIX) {
        Some(rest) => rest,
        None => return false,
    };
    let digits = match rest.strip_suffix(CREDENTIAL_SUFFIX) {
        Some(digits) => digits,
        None => return false,
    };

    digits.len() == width.digits() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(u32);

    impl RandomSource for FixedSource {
        fn next_int(&mut self, bound: u32) -> u32 {
            self.0 % bound
        }
    }

    #[test]
    fn test_format_zero_pads() {
        let mut rng = FixedSource(7);
        assert_eq!(format_credential(&mut rng, DigitWidth::Three), "Mega007*");
        assert_eq!(format_credential(&mut rng, DigitWidth::Four), "Mega0007*");
    }

    #[test]
    fn test_format_upper_bound() {
        let mut rng = FixedSource(999);
        assert_eq!(format_credential(&mut rng, DigitWidth::Three), "Mega999*");
    }

    #[test]
    fn test_valid_format_exact_width() {
        assert!(is_valid_format("Mega042*", DigitWidth::Three));
        assert!(is_valid_format("Mega0042*", DigitWidth::Four));

        // Width mismatch is rejected in both directions
        assert!(!is_valid_format("Mega042*", DigitWidth::Four));
        assert!(!is_valid_format("Mega0042*", DigitWidth::Three));
    }

    #[test]
    fn test_invalid_formats() {
        assert!(!is_valid_format("", DigitWidth::Three));
        assert!(!is_valid_format("Mega042", DigitWidth::Three));
        assert!(!is_valid_format("mega042*", DigitWidth::Three));
        assert!(!is_valid_format("Mega04a*", DigitWidth::Three));
        assert!(!is_valid_format("Mega 42*", DigitWidth::Three));
        assert!(!is_valid_format("Mega042**", DigitWidth::Three));
        assert!(!is_valid_format("XMega042*", DigitWidth::Three));
    }

    #[test]
    fn test_digit_width_serde() {
        assert_eq!(
            serde_json::to_string(&DigitWidth::Three).unwrap(),
            "\"three\""
        );
        let parsed: DigitWidth = serde_json::from_str("\"four\"").unwrap();
        assert_eq!(parsed, DigitWidth::Four);
    }
}
