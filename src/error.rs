//! Error types for armoury.
//!
//! The clause builder itself never fails. Errors come from the layers around
//! it: parsing filter text, loading configuration, talking to the database.
//! Every error is classified into one of three [`ErrorKind`]s so callers at a
//! transport boundary can map it to a status code without matching variants.

use std::fmt;

use thiserror::Error;

/// Coarse classification of an error, for translation at a service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorKind {
    /// The reason for the error is not known.
    #[default]
    Unknown,
    /// The service itself failed (database down, I/O fault, ...).
    Internal,
    /// The caller supplied a value that cannot be used.
    InvalidArgument,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Unknown => write!(f, "unknown"),
            ErrorKind::Internal => write!(f, "internal"),
            ErrorKind::InvalidArgument => write!(f, "invalid argument"),
        }
    }
}

/// The main error type for armoury operations.
#[derive(Debug, Error)]
pub enum ArmouryError {
    /// Failed to parse filter or sort text.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// A caller-supplied argument has an invalid value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An internal service fault.
    #[error("Internal error: {0}")]
    Internal(String),

    /// An error whose reason is not known.
    #[error("{0}")]
    Unknown(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArmouryError {
    /// Create an error of the given kind from a message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Internal => Self::Internal(message),
            ErrorKind::InvalidArgument => Self::InvalidArgument(message),
            ErrorKind::Unknown => Self::Unknown(message),
        }
    }

    /// Classify an arbitrary error under the given kind.
    pub fn wrap<E: std::error::Error>(kind: ErrorKind, err: E) -> Self {
        Self::new(kind, err.to_string())
    }

    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } | Self::InvalidArgument(_) | Self::Config(_) => {
                ErrorKind::InvalidArgument
            }
            Self::Internal(_) | Self::Connection(_) | Self::Execution(_) | Self::Io(_) => {
                ErrorKind::Internal
            }
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }
}

impl From<sqlx::Error> for ArmouryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(e) => Self::Config(e.to_string()),
            sqlx::Error::Io(e) => Self::Connection(e.to_string()),
            sqlx::Error::Tls(e) => Self::Connection(e.to_string()),
            other @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
                Self::Connection(other.to_string())
            }
            other => Self::Execution(other.to_string()),
        }
    }
}

/// Result type alias for armoury operations.
pub type ArmouryResult<T> = Result<T, ArmouryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ArmouryError::parse(5, "unexpected character");
        assert_eq!(
            err.to_string(),
            "Parse error at position 5: unexpected character"
        );
    }

    #[test]
    fn test_new_classifies_by_kind() {
        let err = ArmouryError::new(ErrorKind::InvalidArgument, "\"xx\" is not a valid region name");
        assert!(matches!(err, ArmouryError::InvalidArgument(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = ArmouryError::new(ErrorKind::Internal, "upstream returned 503");
        assert_eq!(err.kind(), ErrorKind::Internal);

        let err = ArmouryError::new(ErrorKind::Unknown, "mystery");
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.to_string(), "mystery");
    }

    #[test]
    fn test_kind_of_each_variant() {
        assert_eq!(ArmouryError::parse(0, "x").kind(), ErrorKind::InvalidArgument);
        assert_eq!(ArmouryError::Config("x".into()).kind(), ErrorKind::InvalidArgument);
        assert_eq!(ArmouryError::Connection("x".into()).kind(), ErrorKind::Internal);
        assert_eq!(ArmouryError::Execution("x".into()).kind(), ErrorKind::Internal);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(ArmouryError::from(io).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_wrap_keeps_message() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = ArmouryError::wrap(ErrorKind::Internal, io);
        assert_eq!(err.to_string(), "Internal error: disk on fire");
    }

    #[test]
    fn test_default_kind_is_unknown() {
        assert_eq!(ErrorKind::default(), ErrorKind::Unknown);
        assert_eq!(ErrorKind::InvalidArgument.to_string(), "invalid argument");
    }
}
