//! Validator — raw query strings to typed, bounds-checked values.
//!
//! Every function is pure and returns a `Validated<T>`; none of them
//! short-circuit a caller that wants to check several fields at once.

use crate::config::PALETTE_SIZE;
use crate::services::identity::{IdentityStore, Session};

pub type Validated<T> = Result<T, FieldError>;

/// Why a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("missing")]
    Missing,
    #[error("not an integer")]
    NotInteger,
    #[error("must be an integer from {min} to {max}")]
    OutOfRange { min: i64, max: i64 },
    #[error("unknown token")]
    UnknownToken,
}

/// Non-empty after trimming. Returns the trimmed slice.
pub fn validate_string(raw: Option<&str>) -> Validated<&str> {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(FieldError::Missing),
    }
}

/// Base-10 integer after trimming.
pub fn validate_int(raw: Option<&str>) -> Validated<i64> {
    validate_string(raw)?
        .parse::<i64>()
        .map_err(|_| FieldError::NotInteger)
}

/// Integer in the half-open range `[min, max)`.
pub fn validate_bounds(raw: Option<&str>, min: i64, max: i64) -> Validated<i64> {
    let value = validate_int(raw)?;
    if value < min || value >= max {
        return Err(FieldError::OutOfRange { min, max });
    }
    Ok(value)
}

/// Grid coordinate in `[0, size)`.
pub fn validate_coord(raw: Option<&str>, size: u32) -> Validated<u32> {
    let value = validate_bounds(raw, 0, i64::from(size))?;
    u32::try_from(value).map_err(|_| FieldError::OutOfRange { min: 0, max: i64::from(size) })
}

/// Palette index in `[0, 16)`.
pub fn validate_color(raw: Option<&str>) -> Validated<u8> {
    let max = i64::from(PALETTE_SIZE);
    let value = validate_bounds(raw, 0, max)?;
    u8::try_from(value).map_err(|_| FieldError::OutOfRange { min: 0, max })
}

/// Token naming a live session. Tokens are opaque and matched verbatim.
pub fn validate_token<'s>(raw: Option<&str>, store: &'s IdentityStore) -> Validated<&'s Session> {
    let token = raw.filter(|s| !s.is_empty()).ok_or(FieldError::Missing)?;
    store.lookup(token).ok_or(FieldError::UnknownToken)
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
