//! Collision checks against the persisted identifier store.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{StorageError, StorageResult};
use crate::storage::traits::Storage;

/// Boundary to the persisted store: "has this name been issued before?"
///
/// Every check is bounded by a timeout; a timed-out check is an error, never
/// an implicit "free".
#[derive(Clone)]
pub struct CollisionGate {
    storage: Arc<dyn Storage>,
    timeout: Duration,
}

impl CollisionGate {
    /// Create a gate over `storage` with a per-check timeout.
    pub fn new(storage: Arc<dyn Storage>, timeout: Duration) -> Self {
        Self { storage, timeout }
    }

    /// Check whether `name` already exists in the store.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Timeout`] if the store does not answer in time,
    /// or the store's own error.
    pub async fn exists(&self, name: &str) -> StorageResult<bool> {
        let exists = tokio::time::timeout(self.timeout, self.storage.exists(name))
            .await
            .map_err(|_| {
                StorageError::Timeout(format!(
                    "exists({name}) exceeded {}ms",
                    self.timeout.as_millis()
                ))
            })??;

        if exists {
            tracing::debug!(name, "Collision with persisted identifier");
            metrics::counter!("pidminter_collisions_total", "source" => "store").increment(1);
        }

        Ok(exists)
    }
}
