// Validation utilities module
// Custom field rules for user registration and updates

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use validator::ValidationError;

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9_]+$").expect("username pattern is valid"))
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Usernames are non-empty and use only small letters, digits and underscore
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username_pattern().is_match(username) {
        Ok(())
    } else {
        Err(invalid(
            "invalid_username",
            "username can contain only small letters, digits, and underscore",
        ))
    }
}

/// Phone numbers are exactly 10 digits
pub fn validate_phone_no(phone_no: &str) -> Result<(), ValidationError> {
    if phone_no.len() == 10 && phone_no.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(invalid("invalid_phone_no", "phone_no must have 10 digits"))
    }
}
