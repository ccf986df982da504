//! Envelope encryption core for Strongbox.
//!
//! Files are stored encrypted at rest using:
//! - AES-256-GCM with a fresh key and nonce per file
//! - RSA-OAEP (SHA-256) wrapping of that key under a server-held key pair
//! - Zeroization of the raw file key as soon as it has been used
//!
//! # Architecture
//!
//! 1. **File Key**: 256 random bits, generated per upload, used for exactly
//!    one file and never persisted in raw form.
//!
//! 2. **Server Key Pair**: a long-lived 2048-bit RSA pair loaded at startup.
//!    The public half wraps file keys; the private half unwraps them.
//!
//! Each stored file therefore has two artifacts: the packed ciphertext
//! (`nonce ‖ tag ‖ ciphertext`) kept in the object store, and the base64
//! wrapped key kept in the file's metadata record.

mod cipher;
pub mod envelope;
mod error;
mod key;
mod keypair;
pub mod wrap;

pub use cipher::{
    HEADER_SIZE, NONCE_SIZE, PackedCiphertext, SealedFile, TAG_SIZE, decrypt_file, encrypt_file,
};
pub use envelope::{EnvelopeCipher, StoredEnvelope};
pub use error::{CryptoError, CryptoResult, ErrorKind};
pub use key::{FileKey, KEY_SIZE};
pub use keypair::{DEFAULT_MODULUS_BITS, MIN_MODULUS_BITS, ServerKeys};
pub use wrap::{WrappedKey, unwrap_key, unwrap_key_with, wrap_key, wrap_key_with};

pub use rsa::{RsaPrivateKey, RsaPublicKey};
