//! In-memory storage backend.
//!
//! Nothing survives a restart. Used for tests and throwaway deployments.

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::domain::{Fingerprint, Identifier, MintConfiguration, UsageState};
use crate::error::StorageResult;
use crate::storage::traits::{ConfigStore, IdentifierStore, Storage};

/// In-memory storage implementation.
#[derive(Default)]
pub struct MemoryStorage {
    names: RwLock<HashSet<String>>,
    active: RwLock<Option<MintConfiguration>>,
    usage: DashMap<String, UsageState>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentifierStore for MemoryStorage {
    async fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.names.read().contains(name))
    }

    async fn save_all(&self, identifiers: &[Identifier]) -> StorageResult<()> {
        let mut names = self.names.write();
        names.extend(identifiers.iter().map(|id| id.name().to_string()));
        Ok(())
    }

    async fn count(&self) -> StorageResult<u64> {
        Ok(self.names.read().len() as u64)
    }
}

#[async_trait]
impl ConfigStore for MemoryStorage {
    async fn load_active(&self) -> StorageResult<Option<MintConfiguration>> {
        Ok(self.active.read().clone())
    }

    async fn save_active(&self, config: &MintConfiguration) -> StorageResult<()> {
        *self.active.write() = Some(config.clone());
        Ok(())
    }

    async fn get_usage(&self, fingerprint: &Fingerprint) -> StorageResult<Option<UsageState>> {
        Ok(self
            .usage
            .get(&fingerprint.storage_key())
            .map(|entry| entry.value().clone()))
    }

    async fn set_usage(&self, fingerprint: &Fingerprint, used: u64) -> StorageResult<UsageState> {
        let mut entry = self
            .usage
            .entry(fingerprint.storage_key())
            .or_insert_with(|| UsageState::new(fingerprint));

        entry.used = used;
        entry.version += 1;
        entry.updated_at = chrono::Utc::now().timestamp_millis();

        Ok(entry.value().clone())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
