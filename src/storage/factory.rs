//! Storage backend factory.
//!
//! Creates the appropriate storage backend based on configuration.

use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::AppError;
use crate::storage::file::FileStorage;
use crate::storage::memory::MemoryStorage;
use crate::storage::traits::Storage;

/// Create a storage backend based on configuration.
///
/// # Errors
///
/// Returns an error if the storage backend cannot be initialized or fails its
/// first health check.
pub async fn create_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>, AppError> {
    let storage: Arc<dyn Storage> = match config.backend {
        StorageBackend::File => Arc::new(FileStorage::new(&config.file)?),
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
    };

    storage.health_check().await?;

    tracing::info!(backend = storage.backend_name(), "Storage initialized");

    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_file_storage() {
        let temp_dir = TempDir::new().unwrap();

        let config = StorageConfig {
            backend: StorageBackend::File,
            file: crate::config::FileStorageConfig {
                data_dir: temp_dir.path().to_path_buf(),
            },
        };

        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_name(), "file");
    }

    #[tokio::test]
    async fn test_create_memory_storage() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            ..Default::default()
        };

        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_name(), "memory");
    }
}
