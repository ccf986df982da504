//! RSA-OAEP key wrapping: round-trips, encoding contract, wrong-key and
//! tamper rejection, and missing key configuration.

mod support;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use strongbox_crypto::{
    CryptoError, ErrorKind, FileKey, ServerKeys, WrappedKey, unwrap_key, unwrap_key_with, wrap_key,
    wrap_key_with,
};

#[test]
fn wrap_unwrap_roundtrip() {
    let keys = support::server_keys();
    let key = FileKey::generate();

    let wrapped = wrap_key(&key, &keys).unwrap();
    let recovered = unwrap_key(&wrapped, &keys).unwrap();

    assert_eq!(recovered.as_bytes(), key.as_bytes());
}

#[test]
fn wrapped_key_is_base64_of_modulus_size() {
    let keys = support::server_keys();
    let wrapped = wrap_key(&FileKey::generate(), &keys).unwrap();

    let raw = STANDARD.decode(wrapped.as_str()).unwrap();
    assert_eq!(raw.len(), 256);
    assert_eq!(keys.modulus_size(), Some(256));
    // 256 bytes -> 344 base64 chars with padding
    assert_eq!(wrapped.as_str().len(), 344);
}

#[test]
fn wrapping_is_randomized() {
    let keys = support::server_keys();
    let key = FileKey::generate();

    let a = wrap_key(&key, &keys).unwrap();
    let b = wrap_key(&key, &keys).unwrap();
    assert_ne!(a, b, "OAEP must use a fresh seed per wrap");
    assert_eq!(unwrap_key(&a, &keys).unwrap().as_bytes(), key.as_bytes());
    assert_eq!(unwrap_key(&b, &keys).unwrap().as_bytes(), key.as_bytes());
}

#[test]
fn explicit_key_variants_match_server_keys() {
    let keys = support::server_keys();
    let key = FileKey::generate();

    let wrapped = wrap_key_with(&key, keys.public_key().unwrap()).unwrap();
    let via_handle = unwrap_key(&wrapped, &keys).unwrap();
    let via_private = unwrap_key_with(&wrapped, keys.private_key().unwrap()).unwrap();

    assert_eq!(via_handle.as_bytes(), key.as_bytes());
    assert_eq!(via_private.as_bytes(), key.as_bytes());
}

#[test]
fn secret_message_key_scenario() {
    let keys = support::server_keys();
    let sealed = strongbox_crypto::encrypt_file(support::SECRET_MESSAGE.as_bytes()).unwrap();

    let wrapped = wrap_key(&sealed.key, &keys).unwrap();
    let unwrapped = unwrap_key(&wrapped, &keys).unwrap();
    assert_eq!(unwrapped.as_bytes(), sealed.key.as_bytes());

    let opened = strongbox_crypto::decrypt_file(sealed.packed.as_bytes(), &unwrapped).unwrap();
    assert_eq!(opened, support::SECRET_MESSAGE.as_bytes());
}

// ── Failure modes ──

#[test]
fn wrong_private_key_is_unwrap_failure() {
    let keys = support::server_keys();
    let other = support::other_server_keys();

    let wrapped = wrap_key(&FileKey::generate(), &keys).unwrap();
    let err = unwrap_key(&wrapped, &other).unwrap_err();

    assert!(matches!(err, CryptoError::UnwrapFailure), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::UnwrapFailure);
}

#[test]
fn tampered_wrapped_key_is_unwrap_failure() {
    let keys = support::server_keys();
    let wrapped = wrap_key(&FileKey::generate(), &keys).unwrap();

    let mut raw = STANDARD.decode(wrapped.as_str()).unwrap();
    raw[100] ^= 0x01;
    let tampered = WrappedKey::from_encoded(STANDARD.encode(&raw));

    assert!(matches!(
        unwrap_key(&tampered, &keys),
        Err(CryptoError::UnwrapFailure)
    ));
}

#[test]
fn unwrap_failure_message_is_generic() {
    let keys = support::server_keys();
    let other = support::other_server_keys();
    let wrapped = wrap_key(&FileKey::generate(), &keys).unwrap();

    let msg = unwrap_key(&wrapped, &other).unwrap_err().to_string();
    assert_eq!(msg, "key unwrap failed");
}

#[test]
fn invalid_base64_is_malformed() {
    let keys = support::server_keys();
    let err = unwrap_key(&WrappedKey::from_encoded("not*base64!"), &keys).unwrap_err();
    assert!(matches!(err, CryptoError::MalformedInput(_)), "got {err:?}");
}

#[test]
fn wrong_length_is_malformed() {
    let keys = support::server_keys();

    for len in [0usize, 32, 255, 257, 512] {
        let encoded = WrappedKey::from_encoded(STANDARD.encode(vec![0x11u8; len]));
        let err = unwrap_key(&encoded, &keys).unwrap_err();
        assert!(
            matches!(err, CryptoError::MalformedInput(_)),
            "len {len} gave {err:?}"
        );
    }
}

#[test]
fn missing_public_key_is_configuration_error() {
    let keys = ServerKeys::new(None, None).unwrap();
    let err = wrap_key(&FileKey::generate(), &keys).unwrap_err();

    assert!(matches!(err, CryptoError::Configuration(_)), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn missing_private_key_is_configuration_error() {
    let keys = support::server_keys();
    let upload_only = support::public_only(&keys);

    let wrapped = wrap_key(&FileKey::generate(), &upload_only).unwrap();
    let err = unwrap_key(&wrapped, &upload_only).unwrap_err();
    assert!(matches!(err, CryptoError::Configuration(_)), "got {err:?}");
}

#[test]
fn wrapped_key_serializes_as_plain_string() {
    let wrapped = WrappedKey::from_encoded("QUJD");
    let json = serde_json::to_string(&wrapped).unwrap();
    assert_eq!(json, "\"QUJD\"");

    let back: WrappedKey = serde_json::from_str(&json).unwrap();
    assert_eq!(back, wrapped);
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn any_key_roundtrips(bytes in any::<[u8; 32]>()) {
            let keys = support::server_keys();
            let key = FileKey::from_bytes(bytes);
            let wrapped = wrap_key(&key, &keys).unwrap();
            let recovered = unwrap_key(&wrapped, &keys).unwrap();
            prop_assert_eq!(recovered.as_bytes(), &bytes);
        }
    }
}
