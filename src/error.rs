//! Error types for tabdump.
//!
//! Every failure in a conversion run is fatal: configuration problems are
//! detected before any I/O, and decode or parse failures abort the run
//! before a single byte of output is produced.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for tabdump operations.
#[derive(Error, Debug)]
pub enum TabdumpError {
    /// The session document could not be decoded.
    #[error("Failed to decode session dump: {message}")]
    DecodeError {
        /// Human-readable error message.
        message: String,
        /// Underlying serde_json error, if available.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// A date/time value matched none of the recognised precisions.
    #[error("Invalid date/time '{value}': {reason}")]
    TimeParseError {
        /// The value that failed to parse.
        value: String,
        /// Why parsing failed.
        reason: String,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Permission denied when accessing a file.
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// Path where access was denied.
        path: PathBuf,
    },

    /// Nonsensical option combination.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Human-readable error message.
        message: String,
    },

    /// Invalid argument.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Name of the invalid argument.
        name: String,
        /// Reason why the argument is invalid.
        reason: String,
    },

    /// Invalid configuration file.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {context}")]
    IoError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Unsupported operation or feature.
    #[error("Unsupported: {feature}")]
    Unsupported {
        /// Name of the unsupported feature.
        feature: String,
    },
}

impl TabdumpError {
    /// Create a new decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::DecodeError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new decode error with source.
    #[must_use]
    pub fn decode_with_source(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::DecodeError {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a new date/time parse error.
    #[must_use]
    pub fn time(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TimeParseError {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new invalid argument error.
    #[must_use]
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a new I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            context: context.into(),
            source,
        }
    }

    /// Map an I/O error on `path` to the most specific variant.
    #[must_use]
    pub fn from_io_at(path: impl Into<PathBuf>, context: impl Into<String>, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound { path: path.into() },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path: path.into() },
            _ => Self::io(context, source),
        }
    }

    /// Get the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::DecodeError { .. } => exit_codes::EXIT_DATA_ERROR,
            Self::TimeParseError { .. } | Self::InvalidArgument { .. } => exit_codes::EXIT_USAGE_ERROR,
            Self::FileNotFound { .. } => exit_codes::EXIT_FILE_NOT_FOUND,
            Self::PermissionDenied { .. } => exit_codes::EXIT_PERMISSION_DENIED,
            Self::ConfigError { .. } | Self::InvalidConfig { .. } => exit_codes::EXIT_CONFIG_ERROR,
            Self::IoError { .. } => exit_codes::EXIT_IO_ERROR,
            Self::Unsupported { .. } => exit_codes::EXIT_GENERAL_ERROR,
        }
    }
}

/// Result type alias for tabdump operations.
pub type Result<T> = std::result::Result<T, TabdumpError>;

impl From<std::io::Error> for TabdumpError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            context: "I/O operation failed".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for TabdumpError {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodeError {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<std::string::FromUtf8Error> for TabdumpError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::DecodeError {
            message: format!("Invalid UTF-8: {err}"),
            source: None,
        }
    }
}

/// Exit codes for CLI operations.
pub mod exit_codes {
    /// Operation completed successfully.
    pub const EXIT_SUCCESS: i32 = 0;
    /// General/unspecified error.
    pub const EXIT_GENERAL_ERROR: i32 = 1;
    /// Specified file not found.
    pub const EXIT_FILE_NOT_FOUND: i32 = 3;
    /// Insufficient permissions.
    pub const EXIT_PERMISSION_DENIED: i32 = 4;
    /// Invalid configuration.
    pub const EXIT_CONFIG_ERROR: i32 = 5;
    /// Invalid command-line usage (BSD standard).
    pub const EXIT_USAGE_ERROR: i32 = 64;
    /// Input data format error (BSD standard).
    pub const EXIT_DATA_ERROR: i32 = 65;
    /// I/O error (BSD standard).
    pub const EXIT_IO_ERROR: i32 = 74;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(TabdumpError::decode("bad").exit_code(), 65);
        assert_eq!(TabdumpError::config("range is nonsensical").exit_code(), 5);
        assert_eq!(TabdumpError::time("yesterday", "no date").exit_code(), 64);

        let not_found = TabdumpError::FileNotFound {
            path: PathBuf::from("/test"),
        };
        assert_eq!(not_found.exit_code(), 3);
    }

    #[test]
    fn test_from_io_at_classifies_kind() {
        let err = TabdumpError::from_io_at(
            "/missing.json",
            "open",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(err, TabdumpError::FileNotFound { .. }));

        let err = TabdumpError::from_io_at(
            "/locked.json",
            "open",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, TabdumpError::PermissionDenied { .. }));

        let err = TabdumpError::from_io_at(
            "/odd.json",
            "open",
            std::io::Error::from(std::io::ErrorKind::Interrupted),
        );
        assert_eq!(err.exit_code(), exit_codes::EXIT_IO_ERROR);
    }

    #[test]
    fn test_display_messages() {
        let err = TabdumpError::time("2017-13-01", "input is out of range");
        assert_eq!(
            err.to_string(),
            "Invalid date/time '2017-13-01': input is out of range"
        );
    }
}
