//! File-based configuration and usage storage.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tokio::sync::Mutex;

use crate::domain::{Fingerprint, MintConfiguration, UsageState};
use crate::error::{StorageError, StorageResult};
use crate::storage::traits::ConfigStore;

/// File-based configuration store.
///
/// The active configuration lives in `active.json`; each identifier space
/// has its own `usage/{key}.json`.
pub struct FileConfigStore {
    /// Base directory for configuration files.
    config_dir: PathBuf,
    /// Mutex for coordinating file operations within this process.
    lock: Mutex<()>,
}

impl FileConfigStore {
    /// Create a new file config store.
    #[must_use]
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_dir,
            lock: Mutex::new(()),
        }
    }

    fn active_path(&self) -> PathBuf {
        self.config_dir.join("active.json")
    }

    fn usage_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.config_dir
            .join("usage")
            .join(format!("{}.json", fingerprint.storage_key()))
    }

    /// Read a JSON file under a shared lock.
    fn read_locked<T: serde::de::DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }

        let file = std::fs::File::open(path)?;
        file.lock_shared()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;

        let value: T = serde_json::from_reader(&file)?;
        file.unlock()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;

        Ok(Some(value))
    }

    /// Write a JSON file under an exclusive lock.
    fn write_locked<T: serde::Serialize>(path: &Path, value: &T) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        file.lock_exclusive()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;

        serde_json::to_writer_pretty(&file, value)?;
        file.sync_all()?;
        file.unlock()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;

        Ok(())
    }

    /// Read-modify-write the usage state of a space under one exclusive lock.
    fn update_usage(&self, fingerprint: &Fingerprint, used: u64) -> StorageResult<UsageState> {
        let path = self.usage_path(fingerprint);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        file.lock_exclusive()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let mut state = if contents.trim().is_empty() {
            UsageState::new(fingerprint)
        } else {
            serde_json::from_str(&contents)?
        };

        state.used = used;
        state.version += 1;
        state.updated_at = chrono::Utc::now().timestamp_millis();

        file.seek(SeekFrom::Start(0))?;
        file.set_len(0)?;

        let json = serde_json::to_string_pretty(&state)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        file.unlock()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;

        Ok(state)
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load_active(&self) -> StorageResult<Option<MintConfiguration>> {
        let _guard = self.lock.lock().await;
        Self::read_locked(&self.active_path())
    }

    async fn save_active(&self, config: &MintConfiguration) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        Self::write_locked(&self.active_path(), config)
    }

    async fn get_usage(&self, fingerprint: &Fingerprint) -> StorageResult<Option<UsageState>> {
        let _guard = self.lock.lock().await;
        Self::read_locked(&self.usage_path(fingerprint))
    }

    async fn set_usage(&self, fingerprint: &Fingerprint, used: u64) -> StorageResult<UsageState> {
        let _guard = self.lock.lock().await;
        self.update_usage(fingerprint, used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Strategy;
    use tempfile::TempDir;

    fn create_test_store() -> (FileConfigStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileConfigStore::new(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_active_configuration_round_trip() {
        let (store, _temp) = create_test_store();
        assert!(store.load_active().await.unwrap().is_none());

        let config = MintConfiguration::custom("ark", "ddl").with_random(true);
        store.save_active(&config).await.unwrap();

        let loaded = store.load_active().await.unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_usage_versioning() {
        let (store, _temp) = create_test_store();
        let fingerprint = MintConfiguration::custom("", "d").fingerprint().unwrap();

        assert!(store.get_usage(&fingerprint).await.unwrap().is_none());

        let state = store.set_usage(&fingerprint, 5).await.unwrap();
        assert_eq!(state.used, 5);
        assert_eq!(state.version, 1);
        assert_eq!(state.strategy, Strategy::Sequential);

        let state = store.set_usage(&fingerprint, 8).await.unwrap();
        assert_eq!(state.used, 8);
        assert_eq!(state.version, 2);

        let loaded = store.get_usage(&fingerprint).await.unwrap().unwrap();
        assert_eq!(loaded.used, 8);
        assert_eq!(loaded.key, fingerprint.storage_key());
    }

    #[tokio::test]
    async fn test_usage_is_per_fingerprint() {
        let (store, _temp) = create_test_store();
        let digits = MintConfiguration::custom("", "d").fingerprint().unwrap();
        let letters = MintConfiguration::custom("", "l").fingerprint().unwrap();

        store.set_usage(&digits, 3).await.unwrap();
        assert!(store.get_usage(&letters).await.unwrap().is_none());
    }
}
