//! Input checks shared by several domains.

use lazy_static::lazy_static;
use regex::Regex;

use super::errors::{DomainError, DomainResult};

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

pub fn require_email(email: &str) -> DomainResult<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(DomainError::validation(format!("Invalid email address: {}", email)))
    }
}

pub fn require_non_blank(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        Err(DomainError::validation(format!("{} must not be empty", field)))
    } else {
        Ok(())
    }
}

/// Images are referenced by URL; uploads happen elsewhere.
pub fn require_image_url(url: &str) -> DomainResult<()> {
    let url = url.trim();
    if url.is_empty() {
        return Err(DomainError::validation("Image URL must not be empty"));
    }
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(DomainError::validation(format!(
            "Image URL must be http(s): {}",
            url
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("guest@example.com"));
        assert!(is_valid_email(" Host.Name+events@mail.co.kr "));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("guest"));
        assert!(!is_valid_email("guest@"));
        assert!(!is_valid_email("guest@example"));
        assert!(require_email("nope").is_err());
    }

    #[test]
    fn image_urls_must_be_http() {
        assert!(require_image_url("https://cdn.example.com/a.png").is_ok());
        assert!(require_image_url("   ").is_err());
        assert!(require_image_url("ftp://files/a.png").is_err());
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert!(require_non_blank("name", "  ").is_err());
        assert!(require_non_blank("name", "Picnic").is_ok());
    }
}
