//! Scoped access to wallet private keys.
//!
//! Sources are asked for one key at a time: the batch runner loads a key, derives the
//! wallet signer, and lets both drop before moving to the next wallet.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use zeroize::Zeroizing;

use super::WalletSigner;
use crate::models::SignerError;

pub trait CredentialSource: Send + Sync {
    /// Number of credentials the source exposes.
    fn len(&self) -> usize;

    /// Loads the credential at `index`. The returned string is wiped on drop.
    fn load(&self, index: usize) -> Result<Zeroizing<String>, SignerError>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loads the credential at `index` and derives its signer.
    fn load_signer(&self, index: usize) -> Result<WalletSigner, SignerError> {
        let secret = self.load(index)?;
        WalletSigner::from_secret(&secret)
    }
}

fn split_keys(raw: &str, separator: char) -> impl Iterator<Item = &str> {
    raw.split(separator)
        .map(str::trim)
        .filter(|entry| !entry.is_empty() && !entry.starts_with('#'))
}

fn pick(raw: &str, separator: char, index: usize) -> Result<Zeroizing<String>, SignerError> {
    split_keys(raw, separator)
        .nth(index)
        .map(|entry| Zeroizing::new(entry.to_string()))
        .ok_or_else(|| SignerError::CredentialUnavailable {
            index,
            reason: "index out of range".to_string(),
        })
}

/// Comma-separated keys read from an environment variable on every load.
#[derive(Debug, Clone)]
pub struct EnvCredentialSource {
    var_name: String,
    count: usize,
}

impl EnvCredentialSource {
    pub fn new(var_name: &str) -> Result<Self, SignerError> {
        let raw = Self::read(var_name)?;
        let count = split_keys(&raw, ',').count();
        Ok(Self {
            var_name: var_name.to_string(),
            count,
        })
    }

    fn read(var_name: &str) -> Result<Zeroizing<String>, SignerError> {
        env::var(var_name)
            .map(Zeroizing::new)
            .map_err(|e| SignerError::Source(format!("{var_name}: {e}")))
    }
}

impl CredentialSource for EnvCredentialSource {
    fn len(&self) -> usize {
        self.count
    }

    fn load(&self, index: usize) -> Result<Zeroizing<String>, SignerError> {
        let raw = Self::read(&self.var_name)?;
        pick(&raw, ',', index)
    }
}

/// One key per line; blank lines and `#` comments are skipped. The file is re-read on
/// every load.
#[derive(Debug, Clone)]
pub struct FileCredentialSource {
    path: PathBuf,
    count: usize,
}

impl FileCredentialSource {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, SignerError> {
        let path = path.into();
        let raw = Self::read(&path)?;
        let count = split_keys(&raw, '\n').count();
        Ok(Self { path, count })
    }

    fn read(path: &Path) -> Result<Zeroizing<String>, SignerError> {
        fs::read_to_string(path)
            .map(Zeroizing::new)
            .map_err(|e| SignerError::Source(format!("{}: {e}", path.display())))
    }
}

impl CredentialSource for FileCredentialSource {
    fn len(&self) -> usize {
        self.count
    }

    fn load(&self, index: usize) -> Result<Zeroizing<String>, SignerError> {
        let raw = Self::read(&self.path)?;
        pick(&raw, '\n', index)
    }
}

/// Keys supplied directly by the caller.
pub struct InMemoryCredentialSource {
    keys: Vec<Zeroizing<String>>,
}

impl InMemoryCredentialSource {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(|key| Zeroizing::new(key.into()))
                .collect(),
        }
    }
}

impl CredentialSource for InMemoryCredentialSource {
    fn len(&self) -> usize {
        self.keys.len()
    }

    fn load(&self, index: usize) -> Result<Zeroizing<String>, SignerError> {
        self.keys
            .get(index)
            .cloned()
            .ok_or_else(|| SignerError::CredentialUnavailable {
                index,
                reason: "index out of range".to_string(),
            })
    }
}
