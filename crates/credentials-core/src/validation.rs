//! Input validation rules applied before anything reaches the store

use once_cell::sync::Lazy;
use regex::Regex;
use validator::{Validate, ValidationError};

use crate::types::SignupRequest;
use crate::{Error, Result};

static MARKUP_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Display names are shown back to other services verbatim, so no markup
/// and no control characters.
pub fn validate_display_name(name: &str) -> std::result::Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("blank_name"));
    }
    if name.chars().any(char::is_control) {
        return Err(ValidationError::new("control_characters"));
    }
    if MARKUP_REGEX.is_match(name) {
        return Err(ValidationError::new("markup_not_allowed"));
    }
    Ok(())
}

/// Run every signup rule; the resulting error names the offending fields
/// but never echoes the password.
pub fn validate_signup(request: &SignupRequest) -> Result<()> {
    request.validate().map_err(Error::from)
}
