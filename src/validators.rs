/// Input validators
/// 1. Email format and length
/// 2. Chirp length and profanity cleaning

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MAX_LOCAL_PART_LENGTH: usize = 64;
pub const MAX_CHIRP_LENGTH: usize = 140;

const PROFANITIES: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const CENSORED: &str = "****";

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("email regex is valid");
}

/// Validates an email address and returns it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    if let Some((local, _)) = trimmed.split_once('@') {
        if local.len() > MAX_LOCAL_PART_LENGTH {
            return Err(ValidationError::InvalidFormat("email".to_string()));
        }
    }

    Ok(trimmed.to_string())
}

/// Validates a chirp body and returns it with profanities masked
pub fn clean_chirp_body(body: &str) -> Result<String, ValidationError> {
    if body.is_empty() {
        return Err(ValidationError::EmptyField("body".to_string()));
    }

    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ValidationError::TooLong("Chirp".to_string(), MAX_CHIRP_LENGTH));
    }

    Ok(censor_profanities(body))
}

/// Replaces whole space-separated profane words, ignoring case.
/// Words with attached punctuation are left alone.
fn censor_profanities(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if PROFANITIES.contains(&word.to_lowercase().as_str()) {
                CENSORED
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("test.email@domain.co.uk").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
        assert_eq!(is_valid_email("  walt@breakingbad.com ").unwrap(), "walt@breakingbad.com");
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(is_valid_email("invalid").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
        assert!(is_valid_email("").is_err());
    }

    #[test]
    fn test_email_length_limits() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(is_valid_email(&too_long).is_err());

        let long_local = format!("{}@example.com", "a".repeat(65));
        assert!(is_valid_email(&long_local).is_err());
    }

    #[test]
    fn test_chirp_cleaning() {
        assert_eq!(
            clean_chirp_body("This is a kerfuffle opinion I need to share with the world").unwrap(),
            "This is a **** opinion I need to share with the world"
        );
        assert_eq!(
            clean_chirp_body("I hear Mastodon is better than Chirpy. sharbert I need to migrate").unwrap(),
            "I hear Mastodon is better than Chirpy. **** I need to migrate"
        );
        assert_eq!(clean_chirp_body("FORNAX Fornax fornax").unwrap(), "**** **** ****");
        assert_eq!(clean_chirp_body("Sharbert!").unwrap(), "Sharbert!");
    }

    #[test]
    fn test_chirp_length() {
        assert!(clean_chirp_body(&"a".repeat(MAX_CHIRP_LENGTH)).is_ok());
        assert!(clean_chirp_body(&"a".repeat(MAX_CHIRP_LENGTH + 1)).is_err());
        assert!(clean_chirp_body("").is_err());
    }
}
