//! Error types for cursor-pages
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Cache failures never show up here from `Paginator::page`: the cache is
//! advisory and the paginator degrades to a slower path instead. The `Cache`
//! variant is what backends themselves return.

use crate::types::OutOfRange;
use thiserror::Error;

/// The main error type for cursor-pages
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // Page Request Errors
    // ============================================================================
    #[error("That page number is not an integer: '{input}'")]
    InvalidPageNumber { input: String },

    #[error("Page {number} is out of range: {reason}")]
    PageOutOfRange { number: i64, reason: OutOfRange },

    // ============================================================================
    // Source Errors
    // ============================================================================
    #[error("Object source error: {message}")]
    Source { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to extract records from path '{path}': {message}")]
    RecordExtraction { path: String, message: String },

    // ============================================================================
    // Cache Errors
    // ============================================================================
    #[error("Cache error: {message}")]
    Cache { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid page number error
    pub fn invalid_page(input: impl Into<String>) -> Self {
        Self::InvalidPageNumber {
            input: input.into(),
        }
    }

    /// Create a page out of range error
    pub fn out_of_range(number: i64, reason: OutOfRange) -> Self {
        Self::PageOutOfRange { number, reason }
    }

    /// Create an object source error
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a record extraction error
    pub fn extraction(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecordExtraction {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a cache error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// True for errors caused by the page request itself rather than the
    /// source, cache or configuration.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidPageNumber { .. } | Error::PageOutOfRange { .. }
        )
    }

    /// True when the requested page exists in range but holds no items
    pub fn is_empty_page(&self) -> bool {
        matches!(
            self,
            Error::PageOutOfRange {
                reason: OutOfRange::NoResults,
                ..
            }
        )
    }
}

/// Result type alias for cursor-pages
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::invalid_page("x");
        assert_eq!(err.to_string(), "That page number is not an integer: 'x'");

        let err = Error::out_of_range(0, OutOfRange::LessThanOne);
        assert_eq!(
            err.to_string(),
            "Page 0 is out of range: page number is less than 1"
        );

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");
    }

    #[test]
    fn test_user_errors() {
        assert!(Error::invalid_page("abc").is_user_error());
        assert!(Error::out_of_range(4, OutOfRange::NoResults).is_user_error());
        assert!(!Error::source("boom").is_user_error());
        assert!(!Error::cache("down").is_user_error());
    }

    #[test]
    fn test_empty_page_classification() {
        assert!(Error::out_of_range(4, OutOfRange::NoResults).is_empty_page());
        assert!(!Error::out_of_range(0, OutOfRange::LessThanOne).is_empty_page());
    }

    #[test]
    fn test_io_and_yaml_conversions() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(err.to_string().starts_with("IO error: "));

        let yaml = serde_yaml::from_str::<u32>("[").unwrap_err();
        let err: Error = yaml.into();
        assert!(matches!(err, Error::YamlParse(_)));
        assert!(!err.is_user_error());
    }
}
