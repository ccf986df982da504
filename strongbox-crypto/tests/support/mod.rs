//! Shared fixtures. RSA generation is slow, so each test binary builds its
//! key pairs once.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};
use strongbox_crypto::{DEFAULT_MODULUS_BITS, ServerKeys};

pub const SECRET_MESSAGE: &str = "This is a secret message that needs to be encrypted! 🔒";

/// The primary server key pair.
pub fn server_keys() -> Arc<ServerKeys> {
    static KEYS: OnceLock<Arc<ServerKeys>> = OnceLock::new();
    KEYS.get_or_init(|| {
        Arc::new(ServerKeys::generate(DEFAULT_MODULUS_BITS).expect("key generation must succeed"))
    })
    .clone()
}

/// An unrelated key pair for wrong-key tests.
pub fn other_server_keys() -> Arc<ServerKeys> {
    static KEYS: OnceLock<Arc<ServerKeys>> = OnceLock::new();
    KEYS.get_or_init(|| {
        Arc::new(ServerKeys::generate(DEFAULT_MODULUS_BITS).expect("key generation must succeed"))
    })
    .clone()
}

/// Public half only, as an upload-only node would load it.
pub fn public_only(keys: &ServerKeys) -> ServerKeys {
    ServerKeys::new(Some(keys.public_key().unwrap().clone()), None).unwrap()
}
