use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{AppError, AppResult};

pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims and lowercases an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn required(field: &'static str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(field, format!("\"{field}\" is required")));
    }
    Ok(())
}

pub fn email(field: &'static str, value: &str) -> AppResult<()> {
    required(field, value)?;
    if !is_valid_email(value) {
        return Err(AppError::validation(
            field,
            format!("\"{field}\" must be a valid email"),
        ));
    }
    Ok(())
}

pub fn password(field: &'static str, value: &str) -> AppResult<()> {
    required(field, value)?;
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(
            field,
            format!("\"{field}\" length must be at least {MIN_PASSWORD_LEN} characters long"),
        ));
    }
    Ok(())
}

/// `confirm` must repeat `password` exactly.
pub fn confirmation(field: &'static str, password: &str, confirm: &str) -> AppResult<()> {
    if password != confirm {
        return Err(AppError::validation(
            field,
            format!("\"{field}\" must match \"password\""),
        ));
    }
    Ok(())
}

/// Empty strings count as "not supplied" on partial updates.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex() {
        assert!(is_valid_email("jane@example.com"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
    }

    #[test]
    fn password_length_is_enforced() {
        assert!(password("password", "abcdef").is_ok());
        let err = password("password", "abc").unwrap_err();
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "password"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn confirmation_must_match() {
        assert!(confirmation("confirmPassword", "secret1", "secret1").is_ok());
        assert!(confirmation("confirmPassword", "secret1", "secret2").is_err());
    }

    #[test]
    fn blank_strings_are_absent() {
        assert_eq!(non_empty(Some("".into())), None);
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some("x".into())), Some("x".into()));
        assert_eq!(non_empty(None), None);
    }
}
