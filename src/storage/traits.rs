//! Storage trait definitions.
//!
//! These traits define the interface for storage backends, enabling swapping
//! between different implementations without changing minting logic.

use async_trait::async_trait;

use crate::domain::{Fingerprint, Identifier, MintConfiguration, UsageState};
use crate::error::StorageResult;

/// Persisted set of issued identifier names.
#[async_trait]
pub trait IdentifierStore: Send + Sync {
    /// Check whether a name has already been issued.
    async fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Persist a batch of newly issued identifiers.
    ///
    /// Either the whole batch is recorded or, on error, none of it is
    /// visible to later `exists` calls.
    async fn save_all(&self, identifiers: &[Identifier]) -> StorageResult<()>;

    /// Number of names persisted so far.
    async fn count(&self) -> StorageResult<u64>;
}

/// Active configuration and per-space usage counters.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the active configuration, if one was ever saved.
    async fn load_active(&self) -> StorageResult<Option<MintConfiguration>>;

    /// Replace the active configuration.
    async fn save_active(&self, config: &MintConfiguration) -> StorageResult<()>;

    /// Get the usage counter of a space.
    async fn get_usage(&self, fingerprint: &Fingerprint) -> StorageResult<Option<UsageState>>;

    /// Set the usage counter of a space, bumping its version.
    async fn set_usage(&self, fingerprint: &Fingerprint, used: u64) -> StorageResult<UsageState>;
}

/// Combined storage trait for all storage operations.
#[async_trait]
pub trait Storage: IdentifierStore + ConfigStore {
    /// Check if the storage backend is healthy and reachable.
    async fn health_check(&self) -> StorageResult<()>;

    /// Get the storage backend name.
    fn backend_name(&self) -> &'static str;
}
