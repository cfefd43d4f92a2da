//! Validation helpers
//!
//! Field-level checks and text-to-type conversions used by the record model.
//! Every helper reports the field it was checking.

use crate::utils::errors::{ValidationError, ValidationKind};
use std::fmt::Display;
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

/// Trim a required text field, rejecting blank values
pub fn validate_not_empty(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(
            ValidationKind::MissingField,
            field,
            "value is required",
        ));
    }
    Ok(trimmed.to_string())
}

/// Parse an integer field from text.
/// A well-formed integer too large for `T` is out of range, not a type mismatch.
pub fn parse_integer<T>(field: &'static str, value: &str) -> Result<T, ValidationError>
where
    T: FromStr<Err = ParseIntError>,
{
    let trimmed = value.trim();
    trimmed.parse::<T>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ValidationError::new(
            ValidationKind::OutOfRange,
            field,
            format!("{} does not fit the accepted range", trimmed),
        ),
        _ => ValidationError::new(
            ValidationKind::TypeMismatch,
            field,
            format!("'{}' is not an integer", trimmed),
        ),
    })
}

/// Check that a value lies within `min..=max`
pub fn validate_range<T: PartialOrd + Display>(
    field: &'static str,
    value: T,
    min: T,
    max: T,
) -> Result<T, ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::new(
            ValidationKind::OutOfRange,
            field,
            format!("{} is outside {}..={}", value, min, max),
        ));
    }
    Ok(value)
}

/// Check that a value is not negative
pub fn validate_non_negative(field: &'static str, value: i64) -> Result<i64, ValidationError> {
    if value < 0 {
        return Err(ValidationError::new(
            ValidationKind::OutOfRange,
            field,
            format!("{} must not be negative", value),
        ));
    }
    Ok(value)
}

/// Match a value against a fixed set of names, listing the accepted set on failure
pub fn validate_enum<T: Copy>(
    field: &'static str,
    value: &str,
    allowed: &[(&'static str, T)],
) -> Result<T, ValidationError> {
    let trimmed = value.trim();
    allowed
        .iter()
        .find(|(name, _)| *name == trimmed)
        .map(|(_, variant)| *variant)
        .ok_or_else(|| {
            let accepted: Vec<&str> = allowed.iter().map(|(name, _)| *name).collect();
            ValidationError::new(
                ValidationKind::InvalidEnum,
                field,
                format!("'{}' is not one of: {}", trimmed, accepted.join(", ")),
            )
        })
}
