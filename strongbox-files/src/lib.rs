//! Encrypted file storage for Strongbox.
//!
//! Provides envelope-encrypted file handling with:
//! - Upload: encrypt, store the packed ciphertext, record the wrapped key
//! - Rollback of the stored object if its record cannot be written
//! - Owner-scoped listing, download and deletion
//! - Pluggable object and metadata stores (in-memory and filesystem included)
//! - Environment-driven configuration for the server key pair
//! - Key pair provisioning as `.env` lines or PEM files

pub mod config;
pub mod error;
pub mod file_service;
pub mod fs_store;
pub mod key_files;
pub mod paths;
pub mod store;
pub mod types;

pub use config::VaultConfig;
pub use error::{FileError, FileResult};
pub use file_service::FileService;
pub use fs_store::FsObjectStore;
pub use store::{MemoryMetadataStore, MemoryObjectStore, MetadataStore, ObjectStore};
pub use types::*;
