//! Unified error handling for the fast-rewriter library.
//!
//! This module provides the error hierarchy using `thiserror` so callers can
//! tell a truncated input stream apart from a bad configuration value.
//!
//! ## Error Categories
//!
//! - [`StreamError`]: Errors raised while reading or rewriting a stream
//! - [`ConfigError`]: Errors from configuration loading and validation
//!
//! ## Example
//!
//! ```rust,no_run
//! use fast_rewriter::error::{RewriterError, StreamError};
//!
//! fn example() -> Result<(), RewriterError> {
//!     // Errors are automatically converted via From trait
//!     Err(StreamError::NoActiveRecord {
//!         token: "mark :1".to_string(),
//!     })?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the fast-rewriter library.
#[derive(Error, Debug)]
pub enum RewriterError {
    /// An error occurred while processing the stream.
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// An error occurred while loading or validating configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that can occur while reading, rewriting or writing a stream.
///
/// Every variant is fatal: a partially consumed stream cannot be resynchronized.
#[derive(Error, Debug)]
pub enum StreamError {
    /// The input ended while a fixed-length payload was still outstanding.
    #[error("Unexpected end of stream: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Number of bytes the payload header declared.
        expected: usize,
        /// Number of bytes actually available.
        actual: usize,
    },

    /// A commit field arrived while no reset or commit record was open.
    #[error("No active reset or commit record for token: {token}")]
    NoActiveRecord {
        /// The token that could not be attached to a record.
        token: String,
    },

    /// A length-prefixed header did not carry a valid byte count.
    #[error("Malformed length header: {token}")]
    MalformedHeader {
        /// The offending header token.
        token: String,
    },

    /// A second data block appeared inside a record that already has a message.
    #[error("Unexpected data block inside a record that already has a message: {token}")]
    UnexpectedData {
        /// The data header token.
        token: String,
    },

    /// An I/O error occurred on the input or output channel.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An invalid value was provided for a configuration field.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        /// Name of the field with invalid value.
        field: String,
        /// Description of why the value is invalid.
        message: String,
    },

    /// A bug pattern failed to compile or lacks an id capture group.
    #[error("Invalid pattern for {field} '{pattern}': {message}")]
    InvalidPattern {
        /// Name of the pattern field.
        field: String,
        /// The pattern source.
        pattern: String,
        /// Why the pattern was rejected.
        message: String,
    },

    /// Failed to read the configuration file.
    #[error("Failed to read config file at {path}: {message}")]
    FileReadError {
        /// Path to the config file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Failed to parse the configuration file.
    #[error("Failed to parse config file at {path}: {message}")]
    ParseError {
        /// Path to the config file.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Failed to create config directory.
    #[error("Failed to create config directory at {path}: {message}")]
    DirectoryCreationError {
        /// Path where directory creation failed.
        path: PathBuf,
        /// Error message.
        message: String,
    },
}

/// Type alias for Results using StreamError.
pub type StreamResult<T> = std::result::Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    /// # Stream Error Display
    ///
    /// Tests that stream errors display correctly formatted messages.
    ///
    /// ## Test Scenario
    /// - Creates the fatal StreamError variants
    /// - Tests their Display implementation
    ///
    /// ## Expected Outcome
    /// - Each message names the byte counts or offending token
    #[test]
    fn test_stream_error_display() {
        let short = StreamError::ShortRead {
            expected: 10,
            actual: 4,
        };
        let msg = short.to_string();
        assert!(msg.contains("expected 10"));
        assert!(msg.contains("got 4"));

        let no_record = StreamError::NoActiveRecord {
            token: "committer A <a@x> 0 +0000".to_string(),
        };
        assert!(no_record.to_string().contains("committer A"));

        let header = StreamError::MalformedHeader {
            token: "data <<EOF".to_string(),
        };
        assert!(header.to_string().contains("data <<EOF"));

        let data = StreamError::UnexpectedData {
            token: "data 3".to_string(),
        };
        assert!(data.to_string().contains("data 3"));
    }

    /// # Config Error Display
    ///
    /// Tests that Config errors display correctly formatted messages.
    ///
    /// ## Test Scenario
    /// - Creates InvalidValue and InvalidPattern errors
    ///
    /// ## Expected Outcome
    /// - Field names and patterns appear in the message
    #[test]
    fn test_config_error_display() {
        let invalid = ConfigError::InvalidValue {
            field: "chunk_size".to_string(),
            message: "must be greater than zero".to_string(),
        };
        let msg = invalid.to_string();
        assert!(msg.contains("chunk_size"));
        assert!(msg.contains("greater than zero"));

        let pattern = ConfigError::InvalidPattern {
            field: "message_bug_pattern".to_string(),
            pattern: "bug(".to_string(),
            message: "unclosed group".to_string(),
        };
        assert!(pattern.to_string().contains("bug("));
    }

    /// # Error Conversion
    ///
    /// Tests that errors convert correctly through the From trait.
    ///
    /// ## Test Scenario
    /// - Converts io, stream and config errors upward
    ///
    /// ## Expected Outcome
    /// - Each lands in the matching wrapper variant
    #[test]
    fn test_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let stream: StreamError = io.into();
        assert!(matches!(stream, StreamError::Io(_)));

        let top: RewriterError = stream.into();
        assert!(matches!(top, RewriterError::Stream(_)));

        let config = ConfigError::InvalidValue {
            field: "line_ending".to_string(),
            message: "unknown".to_string(),
        };
        let top: RewriterError = config.into();
        assert!(matches!(top, RewriterError::Config(_)));
    }
}
