//! Field checks shared by the create and update inputs.

use crate::error::{JoblyError, JoblyResult};
use rust_decimal::Decimal;
use std::sync::OnceLock;

/// Best-effort email validation.
///
/// This is intentionally not fully RFC-compliant.
pub fn is_email(s: &str) -> bool {
    static EMAIL_RE: OnceLock<regex::Regex> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| {
            regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid built-in email regex")
        })
        .is_match(s)
}

pub fn is_url(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}

/// Text must be between `min` and `max` characters.
pub fn check_length(field: &str, value: &str, min: usize, max: usize) -> JoblyResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(JoblyError::validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

pub fn check_not_blank(field: &str, value: &str) -> JoblyResult<()> {
    if value.trim().is_empty() {
        return Err(JoblyError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

pub fn check_non_negative(field: &str, value: i32) -> JoblyResult<()> {
    if value < 0 {
        return Err(JoblyError::validation(format!(
            "{field} must be greater than or equal to 0"
        )));
    }
    Ok(())
}

/// Equity is a fraction in `[0, 1]`.
pub fn check_equity(value: Decimal) -> JoblyResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(JoblyError::validation("equity must be between 0 and 1"));
    }
    Ok(())
}

pub fn check_url(field: &str, value: &str) -> JoblyResult<()> {
    if !is_url(value) {
        return Err(JoblyError::validation(format!("{field} must be a valid URL")));
    }
    Ok(())
}

pub fn check_email(field: &str, value: &str) -> JoblyResult<()> {
    if !is_email(value) {
        return Err(JoblyError::validation(format!("{field} must be a valid email")));
    }
    Ok(())
}
