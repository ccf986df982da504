//! AES-256-GCM file cipher.
//!
//! Every file is sealed under its own [`FileKey`] with a random 96-bit nonce
//! and no associated data. The persisted artifact is self-describing:
//!
//! ```text
//! [nonce: 12][tag: 16][ciphertext: N]
//! ```
//!
//! Only the key is needed to open it again.

use crate::error::{CryptoError, CryptoResult};
use crate::key::FileKey;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce, Tag};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroize;

/// Size of the GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Fixed-width prefix of every packed ciphertext (nonce + tag).
pub const HEADER_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// Packed `nonce ‖ tag ‖ ciphertext` buffer, at least [`HEADER_SIZE`] bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct PackedCiphertext(Vec<u8>);

impl PackedCiphertext {
    /// Wraps bytes read back from storage, checking the minimum length.
    pub fn from_bytes(bytes: Vec<u8>) -> CryptoResult<Self> {
        check_len(&bytes)?;
        Ok(Self(bytes))
    }

    pub fn nonce(&self) -> &[u8] {
        &self.0[..NONCE_SIZE]
    }

    pub fn tag(&self) -> &[u8] {
        &self.0[NONCE_SIZE..HEADER_SIZE]
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.0[HEADER_SIZE..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true: the header alone is [`HEADER_SIZE`] bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for PackedCiphertext {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<Vec<u8>> for PackedCiphertext {
    type Error = CryptoError;

    fn try_from(bytes: Vec<u8>) -> CryptoResult<Self> {
        Self::from_bytes(bytes)
    }
}

impl std::fmt::Debug for PackedCiphertext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackedCiphertext")
            .field("len", &self.0.len())
            .finish()
    }
}

/// Output of [`encrypt_file`]: the packed blob plus the key that opens it.
///
/// The key must be wrapped and then dropped by the caller.
#[derive(Debug)]
pub struct SealedFile {
    pub packed: PackedCiphertext,
    pub key: FileKey,
}

/// Encrypts file content under a freshly generated key and nonce.
pub fn encrypt_file(plaintext: &[u8]) -> CryptoResult<SealedFile> {
    let key = FileKey::generate();
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let packed = seal_with(&key, &nonce, plaintext)?;
    Ok(SealedFile { packed, key })
}

/// Verifies and decrypts a packed ciphertext.
///
/// Nothing is returned unless the tag verifies.
pub fn decrypt_file(packed: &[u8], key: &FileKey) -> CryptoResult<Vec<u8>> {
    check_len(packed)?;

    let (nonce, rest) = packed.split_at(NONCE_SIZE);
    let (tag, ciphertext) = rest.split_at(TAG_SIZE);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let mut buffer = ciphertext.to_vec();

    match cipher.decrypt_in_place_detached(
        Nonce::from_slice(nonce),
        &[],
        &mut buffer,
        Tag::from_slice(tag),
    ) {
        Ok(()) => Ok(buffer),
        Err(_) => {
            buffer.zeroize();
            Err(CryptoError::AuthenticationFailure)
        }
    }
}

/// Seals with caller-chosen key and nonce. Callers outside this module must
/// never reuse a nonce with the same key.
pub(crate) fn seal_with(
    key: &FileKey,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> CryptoResult<PackedCiphertext> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    let mut out = Vec::with_capacity(HEADER_SIZE + plaintext.len());
    out.extend_from_slice(nonce);
    out.extend_from_slice(&[0u8; TAG_SIZE]);
    out.extend_from_slice(plaintext);

    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(nonce), &[], &mut out[HEADER_SIZE..])
        .map_err(|e| CryptoError::Encryption(format!("AES-GCM seal failed: {e}")))?;
    out[NONCE_SIZE..HEADER_SIZE].copy_from_slice(&tag);

    Ok(PackedCiphertext(out))
}

fn check_len(packed: &[u8]) -> CryptoResult<()> {
    if packed.len() < HEADER_SIZE {
        return Err(CryptoError::MalformedInput(format!(
            "packed ciphertext is {} bytes, need at least {HEADER_SIZE}",
            packed.len()
        )));
    }
    Ok(())
}
