//! Storage collaborators.
//!
//! The object store holds packed ciphertext blobs; the metadata store holds
//! file records (including the wrapped key). Neither ever sees plaintext.

use crate::error::{FileError, FileResult};
use crate::types::{FileRecord, NewFileRecord};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Opaque byte-addressed blob storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores a new object. Fails if `path` already exists.
    async fn put(&self, path: &str, data: Vec<u8>) -> FileResult<()>;

    /// Returns the object's bytes unmodified.
    async fn get(&self, path: &str) -> FileResult<Vec<u8>>;

    async fn remove(&self, path: &str) -> FileResult<()>;
}

/// Persistence for file records.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn insert(&self, record: NewFileRecord) -> FileResult<FileRecord>;

    /// Looks up a record owned by `user_id`. Other users' records are invisible.
    async fn get(&self, file_id: Uuid, user_id: Uuid) -> FileResult<Option<FileRecord>>;

    /// All records owned by `user_id`, newest first.
    async fn list(&self, user_id: Uuid) -> FileResult<Vec<FileRecord>>;

    async fn delete(&self, file_id: Uuid) -> FileResult<()>;
}

/// In-memory object store.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.objects.read().await.contains_key(path)
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Overwrites an object in place, bypassing the no-overwrite rule.
    pub async fn replace(&self, path: &str, data: Vec<u8>) {
        self.objects.write().await.insert(path.to_string(), data);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, path: &str, data: Vec<u8>) -> FileResult<()> {
        let mut objects = self.objects.write().await;
        if objects.contains_key(path) {
            return Err(FileError::Storage(format!("object already exists: {path}")));
        }
        objects.insert(path.to_string(), data);
        Ok(())
    }

    async fn get(&self, path: &str) -> FileResult<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| FileError::NotFound(format!("object {path}")))
    }

    async fn remove(&self, path: &str) -> FileResult<()> {
        self.objects
            .write()
            .await
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| FileError::NotFound(format!("object {path}")))
    }
}

/// In-memory metadata store.
#[derive(Clone, Default)]
pub struct MemoryMetadataStore {
    records: Arc<RwLock<HashMap<Uuid, FileRecord>>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn insert(&self, record: NewFileRecord) -> FileResult<FileRecord> {
        let record = record.into_record(Utc::now());
        self.records
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, file_id: Uuid, user_id: Uuid) -> FileResult<Option<FileRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(&file_id)
            .filter(|r| r.user_id == user_id)
            .cloned())
    }

    async fn list(&self, user_id: Uuid) -> FileResult<Vec<FileRecord>> {
        let mut records: Vec<FileRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn delete(&self, file_id: Uuid) -> FileResult<()> {
        self.records
            .write()
            .await
            .remove(&file_id)
            .map(|_| ())
            .ok_or_else(|| FileError::NotFound(format!("file {file_id}")))
    }
}
