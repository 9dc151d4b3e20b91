//! Error types for kcwater
//!
//! This module defines the error types used throughout the kcwater crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use kcwater_core::error::{KcWaterError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to KcWaterError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Main error type for kcwater operations
///
/// Nothing in kcwater retries: every variant surfaces to the immediate
/// caller as soon as it happens.
#[derive(Error, Debug)]
pub enum KcWaterError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A charge date matched none of the accepted formats
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// A read time was not of the form "<hour> AM|PM"
    #[error("Invalid read time: {0}")]
    InvalidReadTime(String),

    /// Token or customer-info response was rejected or malformed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A usage fetch was attempted before a successful login
    #[error("Must log in first")]
    NotLoggedIn,

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// The status code returned by the server
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// A usage response did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

impl KcWaterError {
    /// Whether this error came from an unparseable date or time string
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            KcWaterError::InvalidDate(_) | KcWaterError::InvalidReadTime(_)
        )
    }
}

/// Convenience type alias for Results in kcwater
///
/// # Example
///
/// ```
/// use kcwater_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, KcWaterError>;
