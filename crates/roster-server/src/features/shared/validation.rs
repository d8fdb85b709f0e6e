//! Shared validation utilities
//!
//! Common input validation for commands and queries.

use thiserror::Error;

/// Errors that can occur during name validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    #[error("Name is required and cannot be empty")]
    Required,

    #[error("Name must be between 1 and {max_length} characters")]
    TooLong { max_length: usize },
}

/// Validate a display name
///
/// # Rules
/// - Must not be empty (after trimming)
/// - Must not exceed max_length characters
pub fn validate_name(name: &str, max_length: usize) -> Result<(), NameValidationError> {
    if name.trim().is_empty() {
        return Err(NameValidationError::Required);
    }

    if name.len() > max_length {
        return Err(NameValidationError::TooLong { max_length });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_name() {
        assert!(validate_name("My List", 256).is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(validate_name("", 256), Err(NameValidationError::Required));
        assert_eq!(validate_name("   ", 256), Err(NameValidationError::Required));
    }

    #[test]
    fn test_too_long_name_rejected() {
        let name = "a".repeat(257);
        assert_eq!(
            validate_name(&name, 256),
            Err(NameValidationError::TooLong { max_length: 256 })
        );
    }
}
