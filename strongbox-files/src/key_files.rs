//! Writes the server key pair to disk as PEM files.

use crate::error::{FileError, FileResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PUBLIC_PEM_FILE: &str = "public.pem";
pub const PRIVATE_PEM_FILE: &str = "private.pem";

/// Paths of a written key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFiles {
    pub public: PathBuf,
    pub private: PathBuf,
}

/// Writes `public.pem` and `private.pem` into `dir`, creating it if needed.
///
/// Existing files are refused unless `overwrite` is set; nothing is written
/// when either one is refused. On unix the private key is always created
/// fresh with mode 0600, also when it replaces an older file.
pub fn write_pem_files(
    dir: &Path,
    public_pem: &str,
    private_pem: &str,
    overwrite: bool,
) -> FileResult<KeyFiles> {
    fs::create_dir_all(dir)?;
    let files = KeyFiles {
        public: dir.join(PUBLIC_PEM_FILE),
        private: dir.join(PRIVATE_PEM_FILE),
    };

    if !overwrite {
        for path in [&files.public, &files.private] {
            if path.exists() {
                return Err(FileError::Config(format!(
                    "{} already exists, refusing to overwrite",
                    path.display()
                )));
            }
        }
    }

    fs::write(&files.public, public_pem)?;

    // A truncated file keeps its old permissions, so replace it instead.
    match fs::remove_file(&files.private) {
        Ok(()) => debug!("replacing {}", files.private.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    let mut file = create_private(&files.private)?;
    file.write_all(private_pem.as_bytes())?;
    file.sync_all()?;

    Ok(files)
}

#[cfg(unix)]
fn create_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create_new(true).open(path)
}
