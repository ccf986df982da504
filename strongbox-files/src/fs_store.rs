//! Filesystem-backed object store.

use crate::error::{FileError, FileResult};
use crate::store::ObjectStore;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Stores each object as a file under a root directory.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps an object path onto the root, refusing anything that could
    /// resolve outside it.
    fn resolve(&self, path: &str) -> FileResult<PathBuf> {
        let relative = Path::new(path);
        if path.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(FileError::Storage(format!("invalid object path: {path}")));
        }
        Ok(self.root.join(relative))
    }
}

/// Hidden sibling of `target` that is unique to one write.
fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.{}.partial", Uuid::new_v4()))
}

async fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(data).await?;
    file.sync_all().await
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, path: &str, data: Vec<u8>) -> FileResult<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        // The object only becomes visible under its path once fully written;
        // linking refuses an existing target.
        let staging = staging_path(&target);
        let published = match write_synced(&staging, &data).await {
            Ok(()) => fs::hard_link(&staging, &target).await,
            Err(e) => Err(e),
        };
        if let Err(e) = fs::remove_file(&staging).await {
            if e.kind() != ErrorKind::NotFound {
                warn!("could not remove staging file {}: {e}", staging.display());
            }
        }

        match published {
            Ok(()) => {
                debug!("stored {} bytes at {}", data.len(), target.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(FileError::Storage(format!("object already exists: {path}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, path: &str) -> FileResult<Vec<u8>> {
        let target = self.resolve(path)?;
        match fs::read(&target).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(FileError::NotFound(format!("object {path}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, path: &str) -> FileResult<()> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => {
                debug!("removed {}", target.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(FileError::NotFound(format!("object {path}")))
            }
            Err(e) => Err(e.into()),
        }
    }
}
