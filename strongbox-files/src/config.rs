//! Storage service configuration.

use crate::error::{FileError, FileResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strongbox_crypto::ServerKeys;
use tracing::{error, warn};

/// Default upload limit (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

pub const ENV_PUBLIC_KEY: &str = "RSA_PUBLIC_KEY";
pub const ENV_PRIVATE_KEY: &str = "RSA_PRIVATE_KEY";
pub const ENV_MAX_UPLOAD_BYTES: &str = "STRONGBOX_MAX_UPLOAD_BYTES";
pub const ENV_STORAGE_DIR: &str = "STRONGBOX_STORAGE_DIR";

/// Configuration for the encrypted file service.
#[derive(Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Root directory for the filesystem object store. `None` keeps objects in memory.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    /// Largest accepted plaintext upload, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// SPKI (or PKCS#1) PEM public key used to wrap file keys.
    #[serde(default)]
    pub rsa_public_key_pem: Option<String>,

    /// PKCS#8 (or PKCS#1) PEM private key. Only ever read from the environment;
    /// config files neither carry nor supply it.
    #[serde(skip)]
    pub rsa_private_key_pem: Option<String>,
}

fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            rsa_public_key_pem: None,
            rsa_private_key_pem: None,
        }
    }
}

impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field("storage_dir", &self.storage_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("rsa_public_key_pem", &self.rsa_public_key_pem.is_some())
            .field(
                "rsa_private_key_pem",
                &self.rsa_private_key_pem.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl VaultConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> FileResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset. PEM values may be stored on one line with
    /// literal `\n` escapes, as `.env` files usually hold them.
    pub fn from_lookup<F>(lookup: F) -> FileResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let max_upload_bytes = match get(ENV_MAX_UPLOAD_BYTES) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                FileError::Config(format!("{ENV_MAX_UPLOAD_BYTES} must be an integer, got {raw:?}"))
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            storage_dir: get(ENV_STORAGE_DIR).map(PathBuf::from),
            max_upload_bytes,
            rsa_public_key_pem: get(ENV_PUBLIC_KEY).map(|v| unescape_pem(&v)),
            rsa_private_key_pem: get(ENV_PRIVATE_KEY).map(|v| unescape_pem(&v)),
        })
    }

    /// Loads a JSON config file. A `rsa_private_key_pem` entry in the file is
    /// ignored.
    pub fn from_json(json: &str) -> FileResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.get("rsa_private_key_pem").is_some() {
            warn!("ignoring rsa_private_key_pem in config file; set {ENV_PRIVATE_KEY} instead");
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Parses the configured key material.
    ///
    /// At least one half must be present; which operations work then depends
    /// on which halves were supplied.
    pub fn load_server_keys(&self) -> FileResult<ServerKeys> {
        if self.rsa_public_key_pem.is_none() && self.rsa_private_key_pem.is_none() {
            error!("no RSA key material configured ({ENV_PUBLIC_KEY} / {ENV_PRIVATE_KEY})");
            return Err(FileError::Config(format!(
                "missing {ENV_PUBLIC_KEY} and {ENV_PRIVATE_KEY}"
            )));
        }

        ServerKeys::from_pem(
            self.rsa_public_key_pem.as_deref(),
            self.rsa_private_key_pem.as_deref(),
        )
        .map_err(|e| {
            error!("failed to load RSA key material: {e}");
            FileError::Crypto(e)
        })
    }
}

/// Renders the key pair as `.env` lines, one quoted single-line value per
/// key, in the form [`VaultConfig::from_lookup`] reads back.
pub fn render_env_lines(public_pem: &str, private_pem: &str) -> String {
    format!(
        "{ENV_PUBLIC_KEY}=\"{}\"\n{ENV_PRIVATE_KEY}=\"{}\"\n",
        escape_pem(public_pem),
        escape_pem(private_pem)
    )
}

fn escape_pem(pem: &str) -> String {
    pem.replace('\n', "\\n")
}

/// Turns literal `\n` sequences into newlines and strips surrounding quotes.
fn unescape_pem(value: &str) -> String {
    let trimmed = value.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.replace("\\n", "\n")
}
