//! Field validation for incoming submissions.
//!
//! Rules are checked in priority order and the first violated rule wins;
//! failures are never aggregated. The returned message is user-facing and
//! surfaced verbatim with HTTP 400.

use serde_json::Value;
use thiserror::Error;

use crate::models::NewSubmission;

pub const MIN_UNIT_NUMBER: i64 = 1;
pub const MAX_UNIT_NUMBER: i64 = 9999;
pub const MAX_NAME_LEN: usize = 50;

/// User input violated a field rule. Recovered locally; never a server fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Validate a raw JSON request body into a [`NewSubmission`].
///
/// Expects an object with `unitNumber` (integer in [1, 9999]) and `name`
/// (1–50 characters after trimming). No side effects.
pub fn validate_submission(body: &Value) -> Result<NewSubmission, ValidationError> {
    let unit_number = validate_unit_number(body.get("unitNumber"))?;
    let name = validate_name(body.get("name"))?;
    Ok(NewSubmission { unit_number, name })
}

fn validate_unit_number(value: Option<&Value>) -> Result<u16, ValidationError> {
    let value = value
        .filter(|v| !v.is_null())
        .ok_or_else(|| ValidationError::new("Unit number must be a number"))?;
    if !value.is_number() {
        return Err(ValidationError::new("Unit number must be a number"));
    }
    let unit_number = value
        .as_i64()
        .ok_or_else(|| ValidationError::new("Unit number must be an integer"))?;
    if unit_number < MIN_UNIT_NUMBER {
        return Err(ValidationError::new(format!(
            "Unit number must be at least {MIN_UNIT_NUMBER}"
        )));
    }
    if unit_number > MAX_UNIT_NUMBER {
        return Err(ValidationError::new(format!(
            "Unit number must be {MAX_UNIT_NUMBER} or less"
        )));
    }
    assert!(
        unit_number >= 1 && unit_number <= i64::from(u16::MAX),
        "Validated unit number out of u16 bounds"
    );
    Ok(unit_number as u16)
}

fn validate_name(value: Option<&Value>) -> Result<String, ValidationError> {
    let name = value
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::new("Please enter a name"))?;
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("Please enter a name"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::new(format!(
            "Name must be {MAX_NAME_LEN} characters or fewer"
        )));
    }
    Ok(trimmed.to_string())
}
