//! File storage error types.

use strongbox_crypto::{CryptoError, ErrorKind};
use thiserror::Error;

/// Result type for file storage operations.
pub type FileResult<T> = Result<T, FileError>;

/// Generic response text for any file that cannot be served.
pub const FILE_UNAVAILABLE: &str = "file unavailable";

/// Generic response text for failures the caller cannot fix.
pub const SERVER_ERROR: &str = "internal server error";

/// Errors that can occur while storing or serving encrypted files.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("object storage failed: {0}")]
    Storage(String),

    #[error("metadata store failed: {0}")]
    Metadata(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    #[error("file too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

impl FileError {
    /// Text safe to show an end user.
    ///
    /// Cryptographic failures and missing records all read the same, so a
    /// caller cannot probe which stage of a download failed.
    pub fn user_message(&self) -> String {
        match self {
            Self::Crypto(e) => match e.kind() {
                ErrorKind::MalformedInput
                | ErrorKind::AuthenticationFailure
                | ErrorKind::UnwrapFailure => FILE_UNAVAILABLE.to_string(),
                ErrorKind::Configuration | ErrorKind::Internal => SERVER_ERROR.to_string(),
            },
            Self::NotFound(_) => FILE_UNAVAILABLE.to_string(),
            Self::InvalidUpload(_) | Self::TooLarge { .. } => self.to_string(),
            Self::Storage(_)
            | Self::Metadata(_)
            | Self::Config(_)
            | Self::Serialization(_)
            | Self::Io(_)
            | Self::Task(_) => SERVER_ERROR.to_string(),
        }
    }

    /// True for misconfiguration that an operator has to fix.
    pub fn is_operator_error(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Crypto(e) => e.kind() == ErrorKind::Configuration,
            _ => false,
        }
    }
}
