//! Error types for sqlward.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for sqlward operations.
#[derive(Error, Debug)]
pub enum SqlwardError {
    /// Oracle API errors (rate limits, auth, timeouts, malformed responses).
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// Warehouse errors (query failures, permission errors, bad references).
    #[error("Warehouse error: {0}")]
    Warehouse(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SqlwardError {
    /// Creates an oracle error with the given message.
    pub fn oracle(msg: impl Into<String>) -> Self {
        Self::Oracle(msg.into())
    }

    /// Creates a warehouse error with the given message.
    pub fn warehouse(msg: impl Into<String>) -> Self {
        Self::Warehouse(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Oracle(_) => "Oracle Error",
            Self::Warehouse(_) => "Warehouse Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using SqlwardError.
pub type Result<T> = std::result::Result<T, SqlwardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_oracle() {
        let err = SqlwardError::oracle("Rate limited. Please wait.");
        assert_eq!(err.to_string(), "Oracle error: Rate limited. Please wait.");
        assert_eq!(err.category(), "Oracle Error");
    }

    #[test]
    fn test_error_display_warehouse() {
        let err = SqlwardError::warehouse("table `sales.tickets` not found");
        assert_eq!(
            err.to_string(),
            "Warehouse error: table `sales.tickets` not found"
        );
        assert_eq!(err.category(), "Warehouse Error");
    }

    #[test]
    fn test_error_display_config() {
        let err = SqlwardError::config("missing field 'project' in [warehouse]");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing field 'project' in [warehouse]"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_display_internal() {
        let err = SqlwardError::internal("unexpected state");
        assert_eq!(err.to_string(), "Internal error: unexpected state");
        assert_eq!(err.category(), "Internal Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqlwardError>();
    }
}
