//! Server-held RSA key pair used for key wrapping.
//!
//! The pair is loaded once at startup from configuration and shared
//! read-only (behind an `Arc`) by every upload and download. Either half may
//! be absent: a node that only accepts uploads needs no private key.

use crate::error::{CryptoError, CryptoResult};
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

/// Smallest accepted modulus.
pub const MIN_MODULUS_BITS: usize = 2048;

/// Modulus used when generating new server keys.
pub const DEFAULT_MODULUS_BITS: usize = 2048;

/// Immutable handle to the server's wrapping keys.
#[derive(Clone)]
pub struct ServerKeys {
    public: Option<RsaPublicKey>,
    private: Option<RsaPrivateKey>,
}

impl ServerKeys {
    /// Builds a handle from already-parsed keys.
    ///
    /// A private key without a public key derives the public half. If both
    /// are given they must belong to the same pair.
    pub fn new(public: Option<RsaPublicKey>, private: Option<RsaPrivateKey>) -> CryptoResult<Self> {
        let public = match (public, &private) {
            (Some(public), Some(private)) => {
                if RsaPublicKey::from(private) != public {
                    return Err(CryptoError::Configuration(
                        "public and private keys do not belong to the same pair".to_string(),
                    ));
                }
                Some(public)
            }
            (None, Some(private)) => Some(RsaPublicKey::from(private)),
            (public, None) => public,
        };

        if let Some(public) = &public {
            let bits = public.size() * 8;
            if bits < MIN_MODULUS_BITS {
                return Err(CryptoError::Configuration(format!(
                    "RSA modulus is {bits} bits, need at least {MIN_MODULUS_BITS}"
                )));
            }
        }

        Ok(Self { public, private })
    }

    /// Parses PEM-encoded keys.
    ///
    /// Public keys may be SPKI (`BEGIN PUBLIC KEY`) or PKCS#1
    /// (`BEGIN RSA PUBLIC KEY`); private keys PKCS#8 or PKCS#1.
    pub fn from_pem(public_pem: Option<&str>, private_pem: Option<&str>) -> CryptoResult<Self> {
        let public = public_pem.map(parse_public_pem).transpose()?;
        let private = private_pem.map(parse_private_pem).transpose()?;
        Self::new(public, private)
    }

    /// Generates a fresh pair. Used by key provisioning tooling, never per request.
    pub fn generate(bits: usize) -> CryptoResult<Self> {
        if bits < MIN_MODULUS_BITS {
            return Err(CryptoError::KeyGeneration(format!(
                "refusing to generate a {bits}-bit key, need at least {MIN_MODULUS_BITS}"
            )));
        }
        let private = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        let public = RsaPublicKey::from(&private);
        Ok(Self {
            public: Some(public),
            private: Some(private),
        })
    }

    /// The wrapping half, or a configuration error if it was not loaded.
    pub fn public_key(&self) -> CryptoResult<&RsaPublicKey> {
        self.public
            .as_ref()
            .ok_or_else(|| CryptoError::Configuration("missing RSA public key".to_string()))
    }

    /// The unwrapping half, or a configuration error if it was not loaded.
    pub fn private_key(&self) -> CryptoResult<&RsaPrivateKey> {
        self.private
            .as_ref()
            .ok_or_else(|| CryptoError::Configuration("missing RSA private key".to_string()))
    }

    pub fn has_public_key(&self) -> bool {
        self.public.is_some()
    }

    pub fn has_private_key(&self) -> bool {
        self.private.is_some()
    }

    /// Modulus size in bytes, which is also the exact length of a wrapped key.
    pub fn modulus_size(&self) -> Option<usize> {
        self.public.as_ref().map(|k| k.size())
    }

    /// Exports `(SPKI public PEM, PKCS#8 private PEM)`.
    pub fn to_pem(&self) -> CryptoResult<(String, Zeroizing<String>)> {
        let public_pem = self
            .public_key()?
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyGeneration(format!("public key export failed: {e}")))?;
        let private_pem = self
            .private_key()?
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyGeneration(format!("private key export failed: {e}")))?;
        Ok((public_pem, private_pem))
    }
}

impl std::fmt::Debug for ServerKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerKeys")
            .field("public", &self.public.is_some())
            .field("private", &self.private.is_some())
            .field("modulus_bits", &self.modulus_size().map(|s| s * 8))
            .finish()
    }
}

fn parse_public_pem(pem: &str) -> CryptoResult<RsaPublicKey> {
    let pem = pem.trim();
    RsaPublicKey::from_public_key_pem(pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
        .map_err(|_| CryptoError::Configuration("unreadable RSA public key PEM".to_string()))
}

fn parse_private_pem(pem: &str) -> CryptoResult<RsaPrivateKey> {
    let pem = pem.trim();
    let key = RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        .map_err(|_| CryptoError::Configuration("unreadable RSA private key PEM".to_string()))?;
    key.validate()
        .map_err(|_| CryptoError::Configuration("invalid RSA private key".to_string()))?;
    Ok(key)
}
