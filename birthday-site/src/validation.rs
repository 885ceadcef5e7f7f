//! Input validation shared by the endpoints and the resource hooks
//!
//! Validation always runs before any store, relay or backend call.

use crate::error::{AppError, Result};

/// Reject the first empty (or whitespace-only) field, naming it.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Permissive `local@domain.tld` check.
///
/// Accepts anything shaped like `^[^\s@]+@[^\s@]+\.[^\s@]+$`, implemented
/// by hand to keep the `regex` crate out of the dependency tree.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    let clean = |part: &str| !part.is_empty() && !part.chars().any(|c| c == '@' || c.is_whitespace());

    if !clean(local) || !clean(domain) {
        return false;
    }

    // Some dot must have at least one character on each side
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Reject malformed email addresses with a descriptive error.
pub fn require_email(email: &str) -> Result<()> {
    if is_valid_email(email.trim()) {
        Ok(())
    } else {
        Err(AppError::validation("Invalid email address"))
    }
}

/// Validate the name/email/message triple used by contact and wish forms.
pub fn validate_message_form(name: &str, email: &str, message: &str) -> Result<()> {
    require_fields(&[("name", name), ("email", email), ("message", message)])?;
    require_email(email)
}
