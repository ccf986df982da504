//! Upload and download flows through the envelope pipeline.

mod support;

use std::sync::Arc;
use std::thread;
use strongbox_crypto::{CryptoError, EnvelopeCipher, ErrorKind, HEADER_SIZE, ServerKeys, WrappedKey};

fn pipeline() -> EnvelopeCipher {
    EnvelopeCipher::new(support::server_keys())
}

#[test]
fn upload_download_roundtrip() {
    let envelope = pipeline();
    let stored = envelope
        .encrypt_for_storage(support::SECRET_MESSAGE.as_bytes())
        .unwrap();

    let plaintext = envelope
        .decrypt_from_storage(stored.packed.as_bytes(), &stored.wrapped_key)
        .unwrap();
    assert_eq!(plaintext, support::SECRET_MESSAGE.as_bytes());
}

#[test]
fn empty_file_roundtrip() {
    let envelope = pipeline();
    let stored = envelope.encrypt_for_storage(b"").unwrap();
    assert_eq!(stored.packed.len(), HEADER_SIZE);

    let plaintext = envelope
        .decrypt_from_storage(stored.packed.as_bytes(), &stored.wrapped_key)
        .unwrap();
    assert!(plaintext.is_empty());
}

#[test]
fn each_upload_gets_its_own_key() {
    let envelope = pipeline();
    let a = envelope.encrypt_for_storage(b"same bytes").unwrap();
    let b = envelope.encrypt_for_storage(b"same bytes").unwrap();

    assert_ne!(a.packed, b.packed);
    assert_ne!(a.wrapped_key, b.wrapped_key);

    // Swapping wrapped keys between files must not decrypt.
    let err = envelope
        .decrypt_from_storage(a.packed.as_bytes(), &b.wrapped_key)
        .unwrap_err();
    assert!(matches!(err, CryptoError::AuthenticationFailure));
}

#[test]
fn upload_without_public_key_produces_nothing() {
    let envelope = EnvelopeCipher::new(Arc::new(ServerKeys::new(None, None).unwrap()));
    let err = envelope.encrypt_for_storage(b"never stored").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn download_without_private_key_is_configuration_error() {
    let keys = support::server_keys();
    let stored = pipeline().encrypt_for_storage(b"payload").unwrap();

    let upload_only = EnvelopeCipher::new(Arc::new(support::public_only(&keys)));
    let err = upload_only
        .decrypt_from_storage(stored.packed.as_bytes(), &stored.wrapped_key)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn bad_wrapped_key_fails_before_ciphertext_is_inspected() {
    let envelope = pipeline();
    // Ciphertext is too short to be valid, but the unwrap error must win.
    let err = envelope
        .decrypt_from_storage(&[0u8; 3], &WrappedKey::from_encoded("%%%"))
        .unwrap_err();
    assert!(matches!(err, CryptoError::MalformedInput(_)));
    assert!(err.to_string().contains("base64"));

    let stored = envelope.encrypt_for_storage(b"x").unwrap();
    let foreign = EnvelopeCipher::new(support::other_server_keys());
    let err = foreign
        .decrypt_from_storage(&[0u8; 3], &stored.wrapped_key)
        .unwrap_err();
    assert!(matches!(err, CryptoError::UnwrapFailure));
}

#[test]
fn truncated_blob_with_valid_key_is_malformed() {
    let envelope = pipeline();
    let stored = envelope.encrypt_for_storage(b"some content").unwrap();

    let err = envelope
        .decrypt_from_storage(&stored.packed.as_bytes()[..HEADER_SIZE - 1], &stored.wrapped_key)
        .unwrap_err();
    assert!(matches!(err, CryptoError::MalformedInput(_)));
}

#[test]
fn tampered_blob_is_authentication_failure() {
    let envelope = pipeline();
    let stored = envelope.encrypt_for_storage(b"some content").unwrap();

    let mut blob = stored.packed.into_bytes();
    let last = blob.len() - 1;
    blob[last] ^= 0x40;

    let err = envelope
        .decrypt_from_storage(&blob, &stored.wrapped_key)
        .unwrap_err();
    assert!(matches!(err, CryptoError::AuthenticationFailure));
}

#[test]
fn concurrent_uploads_and_downloads() {
    let envelope = pipeline();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let envelope = envelope.clone();
            thread::spawn(move || {
                let content = format!("file number {i}").into_bytes();
                let stored = envelope.encrypt_for_storage(&content).unwrap();
                let back = envelope
                    .decrypt_from_storage(stored.packed.as_bytes(), &stored.wrapped_key)
                    .unwrap();
                assert_eq!(back, content);
                stored.packed.nonce().to_vec()
            })
        })
        .collect();

    let mut nonces: Vec<Vec<u8>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    nonces.sort();
    nonces.dedup();
    assert_eq!(nonces.len(), 8);
}
