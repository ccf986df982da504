//! Shared test helpers: one RSA key pair per test binary and a service
//! wired to in-memory stores.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use strongbox_crypto::{DEFAULT_MODULUS_BITS, EnvelopeCipher, ServerKeys};
use strongbox_files::{
    FileError, FileRecord, FileResult, FileService, MemoryMetadataStore, MemoryObjectStore,
    MetadataStore, NewFileRecord,
};
use uuid::Uuid;

pub const SECRET_MESSAGE: &str = "This is a secret message that needs to be encrypted! 🔒";

pub fn server_keys() -> Arc<ServerKeys> {
    static KEYS: OnceLock<Arc<ServerKeys>> = OnceLock::new();
    KEYS.get_or_init(|| {
        Arc::new(ServerKeys::generate(DEFAULT_MODULUS_BITS).expect("key generation must succeed"))
    })
    .clone()
}

pub fn other_server_keys() -> Arc<ServerKeys> {
    static KEYS: OnceLock<Arc<ServerKeys>> = OnceLock::new();
    KEYS.get_or_init(|| {
        Arc::new(ServerKeys::generate(DEFAULT_MODULUS_BITS).expect("key generation must succeed"))
    })
    .clone()
}

/// `(public_pem, private_pem)` for the shared key pair.
pub fn server_pems() -> (String, String) {
    let (public_pem, private_pem) = server_keys().to_pem().expect("PEM export must succeed");
    (public_pem, private_pem.to_string())
}

pub struct Harness {
    pub service: FileService,
    pub objects: MemoryObjectStore,
    pub metadata: MemoryMetadataStore,
}

/// Service over fresh in-memory stores.
pub fn harness() -> Harness {
    harness_with_keys(server_keys())
}

pub fn harness_with_keys(keys: Arc<ServerKeys>) -> Harness {
    let objects = MemoryObjectStore::new();
    let metadata = MemoryMetadataStore::new();
    let service = FileService::new(
        EnvelopeCipher::new(keys),
        Arc::new(objects.clone()),
        Arc::new(metadata.clone()),
    );
    Harness {
        service,
        objects,
        metadata,
    }
}

/// A metadata store whose writes always fail.
pub struct FailingMetadataStore;

#[async_trait]
impl MetadataStore for FailingMetadataStore {
    async fn insert(&self, _record: NewFileRecord) -> FileResult<FileRecord> {
        Err(FileError::Metadata("insert rejected".into()))
    }

    async fn get(&self, _file_id: Uuid, _user_id: Uuid) -> FileResult<Option<FileRecord>> {
        Ok(None)
    }

    async fn list(&self, _user_id: Uuid) -> FileResult<Vec<FileRecord>> {
        Ok(Vec::new())
    }

    async fn delete(&self, _file_id: Uuid) -> FileResult<()> {
        Err(FileError::Metadata("delete rejected".into()))
    }
}
