//! File-based storage backend.
//!
//! This backend stores data as JSON files and an append-only log, using file
//! locking for atomic operations. Suitable for development and single-node
//! deployments.
//!
//! Directory structure:
//! ```text
//! data/
//! ├── identifiers.log
//! └── config/
//!     ├── active.json
//!     └── usage/
//!         └── {fingerprint key}.json
//! ```

mod config;
mod identifiers;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::config::FileStorageConfig;
use crate::domain::{Fingerprint, Identifier, MintConfiguration, UsageState};
use crate::error::{StorageError, StorageResult};
use crate::storage::traits::{ConfigStore, IdentifierStore, Storage};

pub use config::FileConfigStore;
pub use identifiers::FileIdentifierStore;

/// File-based storage implementation.
pub struct FileStorage {
    /// Base data directory.
    base_dir: PathBuf,
    /// Issued identifier log.
    identifier_store: FileIdentifierStore,
    /// Active configuration and usage counters.
    config_store: FileConfigStore,
}

impl FileStorage {
    /// Create a new file storage instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directories cannot be created or the
    /// identifier log cannot be read.
    pub fn new(config: &FileStorageConfig) -> StorageResult<Self> {
        let base_dir = config.data_dir.clone();

        Self::ensure_directories(&base_dir)?;

        Ok(Self {
            identifier_store: FileIdentifierStore::open(base_dir.join("identifiers.log"))?,
            config_store: FileConfigStore::new(base_dir.join("config")),
            base_dir,
        })
    }

    /// Ensure all required directories exist.
    fn ensure_directories(base_dir: &Path) -> StorageResult<()> {
        let dirs = [
            base_dir.to_path_buf(),
            base_dir.join("config"),
            base_dir.join("config/usage"),
        ];

        for dir in &dirs {
            std::fs::create_dir_all(dir).map_err(|e| {
                StorageError::FileIO(format!("Failed to create directory {dir:?}: {e}"))
            })?;
        }

        Ok(())
    }
}

#[async_trait]
impl IdentifierStore for FileStorage {
    async fn exists(&self, name: &str) -> StorageResult<bool> {
        self.identifier_store.exists(name).await
    }

    async fn save_all(&self, identifiers: &[Identifier]) -> StorageResult<()> {
        self.identifier_store.save_all(identifiers).await
    }

    async fn count(&self) -> StorageResult<u64> {
        self.identifier_store.count().await
    }
}

#[async_trait]
impl ConfigStore for FileStorage {
    async fn load_active(&self) -> StorageResult<Option<MintConfiguration>> {
        self.config_store.load_active().await
    }

    async fn save_active(&self, config: &MintConfiguration) -> StorageResult<()> {
        self.config_store.save_active(config).await
    }

    async fn get_usage(&self, fingerprint: &Fingerprint) -> StorageResult<Option<UsageState>> {
        self.config_store.get_usage(fingerprint).await
    }

    async fn set_usage(&self, fingerprint: &Fingerprint, used: u64) -> StorageResult<UsageState> {
        self.config_store.set_usage(fingerprint, used).await
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn health_check(&self) -> StorageResult<()> {
        if !self.base_dir.exists() {
            return Err(StorageError::Unavailable);
        }

        // Try to create a test file
        let test_file = self.base_dir.join(".health_check");
        tokio::fs::write(&test_file, b"ok")
            .await
            .map_err(|e| StorageError::FileIO(format!("Health check failed: {e}")))?;
        tokio::fs::remove_file(&test_file)
            .await
            .map_err(|e| StorageError::FileIO(format!("Health check cleanup failed: {e}")))?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlphabetSpec, CharClass, SpaceModel};
    use tempfile::TempDir;

    fn create_test_storage() -> (FileStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = FileStorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
        };
        let storage = FileStorage::new(&config).unwrap();
        (storage, temp_dir)
    }

    #[tokio::test]
    async fn test_health_check() {
        let (storage, _temp) = create_test_storage();
        assert!(storage.health_check().await.is_ok());
        assert_eq!(storage.backend_name(), "file");
    }

    #[tokio::test]
    async fn test_state_survives_restart() {
        let temp_dir = TempDir::new().unwrap();
        let config = FileStorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
        };
        let model = SpaceModel::new("", AlphabetSpec::from_classes(&[CharClass::Digits], true));
        let fingerprint = MintConfiguration::custom("", "d").fingerprint().unwrap();

        {
            let storage = FileStorage::new(&config).unwrap();
            storage
                .save_all(&[model.identifier_at(0), model.identifier_at(1)])
                .await
                .unwrap();
            storage.set_usage(&fingerprint, 2).await.unwrap();
        }

        let storage = FileStorage::new(&config).unwrap();
        assert!(storage.exists("1").await.unwrap());
        assert_eq!(storage.count().await.unwrap(), 2);
        assert_eq!(storage.get_usage(&fingerprint).await.unwrap().unwrap().used, 2);
    }
}
