//! Error types for the envelope encryption core.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while sealing or opening a stored file.
///
/// Messages are deliberately coarse: nothing here distinguishes a bad OAEP
/// padding from a wrong private key, or a forged tag from a wrong file key.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("authentication failed (wrong key or tampered data)")]
    AuthenticationFailure,

    #[error("key unwrap failed")]
    UnwrapFailure,

    #[error("key configuration error: {0}")]
    Configuration(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),
}

/// Coarse classification of a [`CryptoError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Structurally invalid packed ciphertext or wrapped key.
    MalformedInput,
    /// AEAD tag did not verify.
    AuthenticationFailure,
    /// RSA-OAEP decryption failed.
    UnwrapFailure,
    /// Server key material is missing or unusable.
    Configuration,
    /// The primitive itself failed while producing output.
    Internal,
}

impl CryptoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedInput(_) | Self::InvalidKeyLength { .. } => ErrorKind::MalformedInput,
            Self::AuthenticationFailure => ErrorKind::AuthenticationFailure,
            Self::UnwrapFailure => ErrorKind::UnwrapFailure,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Encryption(_) | Self::KeyGeneration(_) => ErrorKind::Internal,
        }
    }
}
