//! Shared field-validation engine.
//!
//! # Responsibility
//! - Evaluate the per-field rule set used by every `Client` construction path.
//! - Keep rule ordering fixed: required, letters-only, pattern.
//!
//! # Invariants
//! - The first failing check determines the reported error.
//! - A value returned from `validate_field` satisfies every active rule.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Full-match pattern required for phone numbers.
pub const PHONE_PATTERN: &str = r"^\+\d{1,3}-\d{3}-\d{3}-\d{4}$";

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(PHONE_PATTERN).expect("valid phone regex"));

/// Compiled phone pattern shared by all construction paths.
pub fn phone_regex() -> &'static Regex {
    &PHONE_RE
}

/// Field-level contract violation raised at construction or parse time.
#[derive(Debug)]
pub enum ValidationError {
    EmptyField { field: &'static str },
    NotLetters { field: &'static str },
    PatternMismatch { field: &'static str, pattern: String },
    WrongFieldCount { expected: usize, actual: usize },
    Decode(serde_json::Error),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { field } => write!(f, "{field} cannot be empty"),
            Self::NotLetters { field } => write!(f, "{field} must contain only letters"),
            Self::PatternMismatch { field, pattern } => {
                write!(f, "{field} is invalid, expected format {pattern}")
            }
            Self::WrongFieldCount { expected, actual } => write!(
                f,
                "record must contain exactly {expected} delimited fields, got {actual}"
            ),
            Self::Decode(err) => write!(f, "failed to decode client document: {err}"),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

/// Validates one field value against the active rule set.
///
/// Checks run in fixed order: required, letters-only, pattern. The pattern
/// must match the full value. Returns the trimmed value on success.
///
/// # Errors
/// - `EmptyField` when `required` and the value is empty or whitespace-only.
/// - `NotLetters` when `letters_only` and the value (interior spaces
///   stripped) contains a non-alphabetic character.
/// - `PatternMismatch` when `pattern` is set and does not match in full.
pub fn validate_field(
    value: &str,
    field: &'static str,
    required: bool,
    letters_only: bool,
    pattern: Option<&Regex>,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();

    if required && trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }

    if letters_only {
        let stripped: String = trimmed.chars().filter(|c| *c != ' ').collect();
        if !stripped.chars().all(char::is_alphabetic) {
            return Err(ValidationError::NotLetters { field });
        }
    }

    if let Some(re) = pattern {
        if !re.is_match(trimmed) {
            return Err(ValidationError::PatternMismatch {
                field,
                pattern: re.as_str().to_string(),
            });
        }
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{phone_regex, validate_field, ValidationError};

    #[test]
    fn required_check_runs_before_letters_check() {
        let err = validate_field("   ", "Surname", true, true, None).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyField { field: "Surname" }));
    }

    #[test]
    fn letters_check_ignores_interior_spaces() {
        let value = validate_field("Anna Maria", "Name", true, true, None).unwrap();
        assert_eq!(value, "Anna Maria");
    }

    #[test]
    fn letters_check_rejects_digits() {
        let err = validate_field("Iv4nov", "Surname", true, true, None).unwrap_err();
        assert!(matches!(err, ValidationError::NotLetters { field: "Surname" }));
    }

    #[test]
    fn optional_empty_value_skips_letters_check() {
        let value = validate_field("", "Patronymic", false, true, None).unwrap();
        assert_eq!(value, "");
    }

    #[test]
    fn pattern_must_match_in_full() {
        let err =
            validate_field("5551234567", "Phone", true, false, Some(phone_regex())).unwrap_err();
        match err {
            ValidationError::PatternMismatch { field, pattern } => {
                assert_eq!(field, "Phone");
                assert!(pattern.contains(r"\+"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn valid_phone_passes_pattern() {
        let value =
            validate_field("+1-555-123-4567", "Phone", true, false, Some(phone_regex())).unwrap();
        assert_eq!(value, "+1-555-123-4567");
    }
}
