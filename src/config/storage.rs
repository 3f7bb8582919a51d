//! Storage configuration.

use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// File-based storage (development/single-node).
    #[default]
    File,
    /// Process-local storage, lost on restart.
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Storage backend type.
    #[serde(default)]
    pub backend: StorageBackend,

    /// File storage configuration.
    #[serde(default)]
    pub file: FileStorageConfig,
}

impl StorageConfig {
    /// Validate the storage configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file backend is selected without a data directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            StorageBackend::File if self.file.data_dir.as_os_str().is_empty() => Err(
                ConfigError::Message("storage.file.data_dir cannot be empty".to_string()),
            ),
            StorageBackend::File | StorageBackend::Memory => Ok(()),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FileStorageConfig {
    /// Directory for storing data files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}
