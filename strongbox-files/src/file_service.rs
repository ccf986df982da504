//! Encrypted file upload, listing, download and deletion.
//!
//! Encrypts file content with a one-time key before it reaches the object
//! store, and records the wrapped key in the metadata store. The object and
//! the record are written as a pair: if the record cannot be written the
//! object is removed again.

use crate::config::{DEFAULT_MAX_UPLOAD_BYTES, VaultConfig};
use crate::error::{FileError, FileResult};
use crate::fs_store::FsObjectStore;
use crate::paths::file_storage_path;
use crate::store::{MemoryObjectStore, MetadataStore, ObjectStore};
use crate::types::{DecryptedFile, FileRecord, NewFileRecord, UploadRequest};
use chrono::Utc;
use std::sync::Arc;
use strongbox_crypto::{EnvelopeCipher, WrappedKey};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Coordinates the envelope cipher with the object and metadata stores.
#[derive(Clone)]
pub struct FileService {
    envelope: EnvelopeCipher,
    objects: Arc<dyn ObjectStore>,
    metadata: Arc<dyn MetadataStore>,
    max_upload_bytes: u64,
}

impl FileService {
    pub fn new(
        envelope: EnvelopeCipher,
        objects: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            envelope,
            objects,
            metadata,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Builds a service from configuration.
    ///
    /// Loads the server keys and picks a filesystem object store when
    /// `storage_dir` is set, an in-memory one otherwise.
    pub fn from_config(
        config: &VaultConfig,
        metadata: Arc<dyn MetadataStore>,
    ) -> FileResult<Self> {
        let keys = Arc::new(config.load_server_keys()?);
        let objects: Arc<dyn ObjectStore> = match &config.storage_dir {
            Some(dir) => Arc::new(FsObjectStore::new(dir.clone())),
            None => Arc::new(MemoryObjectStore::new()),
        };
        Ok(Self::new(EnvelopeCipher::new(keys), objects, metadata)
            .with_max_upload_bytes(config.max_upload_bytes))
    }

    pub fn with_max_upload_bytes(mut self, limit: u64) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    pub fn envelope(&self) -> &EnvelopeCipher {
        &self.envelope
    }

    /// Encrypts and stores a file for `user_id`.
    pub async fn upload(&self, user_id: Uuid, request: UploadRequest) -> FileResult<FileRecord> {
        let UploadRequest {
            file_name,
            mime_type,
            data,
        } = request;

        if file_name.trim().is_empty() {
            return Err(FileError::InvalidUpload("missing file name".to_string()));
        }
        let size = data.len() as u64;
        if size > self.max_upload_bytes {
            return Err(FileError::TooLarge {
                size,
                limit: self.max_upload_bytes,
            });
        }

        let envelope = self.envelope.clone();
        let stored = tokio::task::spawn_blocking(move || envelope.encrypt_for_storage(&data))
            .await
            .map_err(|e| FileError::Task(e.to_string()))??;

        let storage_path = file_storage_path(user_id, Utc::now().timestamp_millis(), &file_name);
        let encrypted_len = stored.packed.len();
        self.objects
            .put(&storage_path, stored.packed.into_bytes())
            .await?;
        debug!("stored {encrypted_len} encrypted bytes at {storage_path}");

        let new_record = NewFileRecord {
            user_id,
            file_name,
            mime_type,
            size,
            storage_path: storage_path.clone(),
            encrypted_aes_key: stored.wrapped_key,
        };

        match self.metadata.insert(new_record).await {
            Ok(record) => {
                info!("uploaded file {} ({size} bytes) for user {user_id}", record.id);
                Ok(record)
            }
            Err(e) => {
                warn!("metadata insert failed for {storage_path}, removing stored object: {e}");
                if let Err(cleanup) = self.objects.remove(&storage_path).await {
                    warn!("failed to remove orphaned object {storage_path}: {cleanup}");
                }
                Err(e)
            }
        }
    }

    /// Lists a user's files, newest first.
    pub async fn list(&self, user_id: Uuid) -> FileResult<Vec<FileRecord>> {
        self.metadata.list(user_id).await
    }

    /// Fetches and decrypts a file owned by `user_id`.
    pub async fn download(&self, file_id: Uuid, user_id: Uuid) -> FileResult<DecryptedFile> {
        let record = self.owned_record(file_id, user_id).await?;
        let packed = self.objects.get(&record.storage_path).await?;

        let data = self
            .decrypt_blob(packed, record.encrypted_aes_key.clone())
            .await
            .inspect_err(|e| warn!("could not open file {file_id}: {e}"))?;

        debug!("decrypted file {file_id} ({} bytes)", data.len());
        Ok(DecryptedFile {
            file_name: record.file_name,
            mime_type: record.mime_type,
            data,
        })
    }

    /// Deletes a file owned by `user_id`.
    ///
    /// A failed object removal leaves an orphan that is logged; the record is
    /// still deleted so the file disappears for the user.
    pub async fn delete(&self, file_id: Uuid, user_id: Uuid) -> FileResult<()> {
        let record = self.owned_record(file_id, user_id).await?;

        if let Err(e) = self.objects.remove(&record.storage_path).await {
            warn!(
                "failed to remove object {} for file {file_id}, leaving orphan: {e}",
                record.storage_path
            );
        }

        self.metadata.delete(record.id).await?;
        info!("deleted file {file_id} for user {user_id}");
        Ok(())
    }

    async fn owned_record(&self, file_id: Uuid, user_id: Uuid) -> FileResult<FileRecord> {
        self.metadata
            .get(file_id, user_id)
            .await?
            .ok_or_else(|| FileError::NotFound(format!("file {file_id}")))
    }

    async fn decrypt_blob(&self, packed: Vec<u8>, wrapped_key: WrappedKey) -> FileResult<Vec<u8>> {
        let envelope = self.envelope.clone();
        let plaintext = tokio::task::spawn_blocking(move || {
            envelope.decrypt_from_storage(&packed, &wrapped_key)
        })
        .await
        .map_err(|e| FileError::Task(e.to_string()))??;
        Ok(plaintext)
    }
}
