//! Error types for cache operations
//!
//! This module defines custom error types for the cachetrace library,
//! covering connection failures, typed-retrieval failures, and health checks.

use thiserror::Error;

/// Main error type for cache operations
#[derive(Error, Debug)]
pub enum CacheError {
    /// Connection error - network or connection manager issues
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Command execution error
    #[error("Command error: {0}")]
    CommandError(String),

    /// Operation timeout
    #[error("Operation timed out after {timeout_seconds}s: {context}")]
    TimeoutError {
        timeout_seconds: u64,
        context: String,
    },

    /// No value stored under the requested key
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Stored value is not valid UTF-8 text
    #[error("Value for key {key} is not valid UTF-8")]
    DecodeError {
        key: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Stored value is not a valid integer representation
    #[error("Value for key {key} is not a valid integer")]
    ParseError {
        key: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Redis driver error (wrapper)
    #[error("Redis driver error: {0}")]
    DriverError(#[from] redis::RedisError),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

impl From<String> for CacheError {
    fn from(s: String) -> Self {
        CacheError::Other(s)
    }
}

impl From<&str> for CacheError {
    fn from(s: &str) -> Self {
        CacheError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CacheError::ConnectionError("Failed to connect".to_string());
        assert_eq!(error.to_string(), "Connection error: Failed to connect");

        let timeout_error = CacheError::TimeoutError {
            timeout_seconds: 5,
            context: "health check".to_string(),
        };
        assert!(timeout_error.to_string().contains("timed out after 5s"));

        let missing = CacheError::KeyNotFound("abc-123".to_string());
        assert_eq!(missing.to_string(), "Key not found: abc-123");
    }

    #[test]
    fn test_error_conversion() {
        let error: CacheError = "test error".into();
        assert!(matches!(error, CacheError::Other(_)));

        let error: CacheError = "test error".to_string().into();
        assert!(matches!(error, CacheError::Other(_)));
    }

    #[test]
    fn test_parse_error_source() {
        let source = "not a number".parse::<i64>().unwrap_err();
        let error = CacheError::ParseError {
            key: "k1".to_string(),
            source,
        };
        assert!(error.to_string().contains("k1"));
        assert!(std::error::Error::source(&error).is_some());
    }
}
