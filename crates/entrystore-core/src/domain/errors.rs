//! Domain error types
//!
//! Validation failures detected before a request reaches the store.

use thiserror::Error;

/// Errors raised while validating entry requests
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field was not supplied
    #[error("Missing field: {0}")]
    MissingField(String),

    /// A required field was supplied but is blank
    #[error("Empty field: {0}")]
    EmptyField(String),

    /// Page parameters cannot describe a page
    #[error("Invalid page request: page {page_number} with size {page_size}")]
    InvalidPageRequest {
        /// Requested zero-based page index
        page_number: u32,
        /// Requested page size
        page_size: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::MissingField("entry".to_string());
        assert_eq!(err.to_string(), "Missing field: entry");

        let err = DomainError::EmptyField("entry.key".to_string());
        assert_eq!(err.to_string(), "Empty field: entry.key");

        let err = DomainError::InvalidPageRequest {
            page_number: 2,
            page_size: 0,
        };
        assert_eq!(err.to_string(), "Invalid page request: page 2 with size 0");
    }

    #[test]
    fn test_error_equality() {
        let err1 = DomainError::MissingField("key".to_string());
        let err2 = DomainError::MissingField("key".to_string());
        let err3 = DomainError::MissingField("entry".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
