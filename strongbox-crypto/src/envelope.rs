//! Envelope encryption for stored files.
//!
//! Binds the file cipher and the key wrapper into the two flows the storage
//! layer uses:
//!
//! - upload: plaintext -> (packed ciphertext, wrapped key)
//! - download: (packed ciphertext, wrapped key) -> plaintext
//!
//! The raw file key lives only for the duration of one call and is zeroed
//! when dropped. Both flows are stateless and safe to run concurrently.

use crate::cipher::{PackedCiphertext, decrypt_file, encrypt_file};
use crate::error::CryptoResult;
use crate::keypair::ServerKeys;
use crate::wrap::{WrappedKey, unwrap_key, wrap_key};
use std::sync::Arc;

/// The two artifacts persisted for every file. Always stored together.
#[derive(Clone, Debug)]
pub struct StoredEnvelope {
    pub packed: PackedCiphertext,
    pub wrapped_key: WrappedKey,
}

/// Envelope pipeline bound to the server key pair.
#[derive(Clone, Debug)]
pub struct EnvelopeCipher {
    keys: Arc<ServerKeys>,
}

impl EnvelopeCipher {
    pub fn new(keys: Arc<ServerKeys>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &ServerKeys {
        &self.keys
    }

    /// Encrypts file content and wraps its one-time key.
    ///
    /// On error nothing is returned, so there is nothing for the caller to persist.
    pub fn encrypt_for_storage(&self, plaintext: &[u8]) -> CryptoResult<StoredEnvelope> {
        let sealed = encrypt_file(plaintext)?;
        let wrapped_key = wrap_key(&sealed.key, &self.keys)?;
        let packed = sealed.packed;
        // sealed.key is dropped (and zeroed) here
        Ok(StoredEnvelope {
            packed,
            wrapped_key,
        })
    }

    /// Unwraps the file key, then verifies and decrypts the content.
    ///
    /// The wrapped key is checked before the ciphertext is touched.
    pub fn decrypt_from_storage(
        &self,
        packed: &[u8],
        wrapped_key: &WrappedKey,
    ) -> CryptoResult<Vec<u8>> {
        let key = unwrap_key(wrapped_key, &self.keys)?;
        decrypt_file(packed, &key)
    }
}
