//! RSA-OAEP key wrapping.
//!
//! A [`FileKey`] is encrypted under the server public key with OAEP
//! (SHA-256 digest, MGF1-SHA-256) and stored as standard padded base64 next
//! to the file record. For a 2048-bit modulus the raw wrapped key is always
//! 256 bytes.

use crate::error::{CryptoError, CryptoResult};
use crate::key::FileKey;
use crate::keypair::ServerKeys;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

/// Base64 text of an RSA-OAEP-wrapped file key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WrappedKey(String);

impl WrappedKey {
    /// Adopts a value read from the metadata store. Not validated until unwrap.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for WrappedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wraps a file key under the server public key.
pub fn wrap_key(key: &FileKey, keys: &ServerKeys) -> CryptoResult<WrappedKey> {
    wrap_key_with(key, keys.public_key()?)
}

/// Wraps a file key under an explicit public key.
pub fn wrap_key_with(key: &FileKey, public_key: &RsaPublicKey) -> CryptoResult<WrappedKey> {
    let wrapped = public_key
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), key.as_bytes())
        .map_err(|e| CryptoError::Encryption(format!("RSA-OAEP wrap failed: {e}")))?;
    Ok(WrappedKey(STANDARD.encode(wrapped)))
}

/// Recovers a file key with the server private key.
pub fn unwrap_key(wrapped: &WrappedKey, keys: &ServerKeys) -> CryptoResult<FileKey> {
    unwrap_key_with(wrapped, keys.private_key()?)
}

/// Recovers a file key with an explicit private key.
///
/// Every failure after decoding collapses to [`CryptoError::UnwrapFailure`].
pub fn unwrap_key_with(wrapped: &WrappedKey, private_key: &RsaPrivateKey) -> CryptoResult<FileKey> {
    let raw = STANDARD
        .decode(wrapped.as_str().trim())
        .map_err(|_| CryptoError::MalformedInput("wrapped key is not valid base64".to_string()))?;

    let expected = private_key.size();
    if raw.len() != expected {
        return Err(CryptoError::MalformedInput(format!(
            "wrapped key is {} bytes, expected {expected}",
            raw.len()
        )));
    }

    let plain = Zeroizing::new(
        private_key
            .decrypt_blinded(&mut OsRng, Oaep::new::<Sha256>(), &raw)
            .map_err(|_| CryptoError::UnwrapFailure)?,
    );

    FileKey::from_slice(&plain).map_err(|_| CryptoError::UnwrapFailure)
}
