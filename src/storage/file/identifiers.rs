//! File-based identifier store.
//!
//! Issued names are appended to a newline-delimited log. The log is read once
//! when the store is opened and mirrored in memory, so `exists` never touches
//! the disk.

use std::collections::HashSet;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::domain::Identifier;
use crate::error::{StorageError, StorageResult};
use crate::storage::traits::IdentifierStore;

/// Append-only identifier log with an in-memory index.
pub struct FileIdentifierStore {
    /// Path of the log file.
    log_path: PathBuf,
    /// Names read from or appended to the log.
    names: RwLock<HashSet<String>>,
    /// Serializes appends within this process.
    lock: Mutex<()>,
}

impl FileIdentifierStore {
    /// Open the store, loading every name already in the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the log exists but cannot be read.
    pub fn open(log_path: PathBuf) -> StorageResult<Self> {
        let names = read_log(&log_path)?;
        tracing::debug!(path = ?log_path, count = names.len(), "Loaded identifier log");

        Ok(Self {
            log_path,
            names: RwLock::new(names),
            lock: Mutex::new(()),
        })
    }

    /// Append names to the log under an exclusive file lock.
    fn append_locked(&self, identifiers: &[Identifier]) -> StorageResult<()> {
        let mut buffer = String::new();
        for identifier in identifiers {
            buffer.push_str(identifier.name());
            buffer.push('\n');
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        file.lock_exclusive()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;

        file.write_all(buffer.as_bytes())?;
        file.sync_all()?;

        file.unlock()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;

        Ok(())
    }
}

fn read_log(path: &Path) -> StorageResult<HashSet<String>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }

    let file = std::fs::File::open(path)?;
    file.lock_shared()
        .map_err(|e| StorageError::LockFailed(e.to_string()))?;

    let mut names = HashSet::new();
    for line in BufReader::new(&file).lines() {
        let line = line?;
        let name = line.trim();
        if !name.is_empty() {
            names.insert(name.to_string());
        }
    }

    file.unlock()
        .map_err(|e| StorageError::LockFailed(e.to_string()))?;

    Ok(names)
}

#[async_trait]
impl IdentifierStore for FileIdentifierStore {
    async fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.names.read().contains(name))
    }

    async fn save_all(&self, identifiers: &[Identifier]) -> StorageResult<()> {
        if identifiers.is_empty() {
            return Ok(());
        }

        let _guard = self.lock.lock().await;
        self.append_locked(identifiers)?;

        let mut names = self.names.write();
        names.extend(identifiers.iter().map(|id| id.name().to_string()));

        Ok(())
    }

    async fn count(&self) -> StorageResult<u64> {
        Ok(self.names.read().len() as u64)
    }
}
