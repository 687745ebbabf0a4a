//! Validation helpers for DTOs.

use validator::{ValidateUrl, ValidationError};

/// Longest member name accepted anywhere in the API.
pub const MAX_NAME_LEN: usize = 64;

/// Validates that a member name has visible characters and stays within [`MAX_NAME_LEN`].
///
/// # Examples
///
/// ```ignore
/// validate_member_name("Alice")   // Ok
/// validate_member_name("   ")     // Err - blank
/// ```
pub fn validate_member_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("name_blank");
        err.message = Some("Name must not be blank".into());
        return Err(err);
    }

    let len = trimmed.chars().count();
    if len > MAX_NAME_LEN {
        let mut err = ValidationError::new("name_length");
        err.message = Some(
            format!("Name must be at most {MAX_NAME_LEN} characters (got {len})").into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that a free-text field is not only whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Validates an optional link: blank is accepted, anything else must be a URL.
pub fn validate_link(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.validate_url() {
        return Ok(());
    }
    let mut err = ValidationError::new("link_format");
    err.message = Some("Link must be an absolute URL".into());
    Err(err)
}
