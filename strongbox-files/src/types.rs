//! File records and request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strongbox_crypto::WrappedKey;
use uuid::Uuid;

/// A stored file's metadata row.
///
/// `encrypted_aes_key` and the object at `storage_path` are written and
/// read together; a record with only one of them is corrupt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    /// Plaintext size in bytes.
    pub size: u64,
    pub storage_path: String,
    pub encrypted_aes_key: WrappedKey,
    pub created_at: DateTime<Utc>,
}

/// Metadata for a file that has just been encrypted and stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewFileRecord {
    pub user_id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
    pub storage_path: String,
    pub encrypted_aes_key: WrappedKey,
}

impl NewFileRecord {
    /// Assigns an id and creation time.
    pub fn into_record(self, created_at: DateTime<Utc>) -> FileRecord {
        FileRecord {
            id: Uuid::now_v7(),
            user_id: self.user_id,
            file_name: self.file_name,
            mime_type: self.mime_type,
            size: self.size,
            storage_path: self.storage_path,
            encrypted_aes_key: self.encrypted_aes_key,
            created_at,
        }
    }
}

/// An incoming plaintext file.
#[derive(Clone, Debug)]
pub struct UploadRequest {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl UploadRequest {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }
}

/// A decrypted file ready to hand back to its owner.
#[derive(Clone, Debug, PartialEq)]
pub struct DecryptedFile {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}
