//! Prefetch cache of validated identifiers.
//!
//! Holds identifiers generated ahead of demand for one space. Entries are
//! not issued until the allocator persists them, so peeking never consumes.

use std::collections::{HashSet, VecDeque};

use rand::RngCore;

use super::gate::CollisionGate;
use super::generator::{Draw, Generator};
use crate::domain::{Fingerprint, Identifier, Strategy};
use crate::error::StorageResult;

/// Ready-to-serve identifiers bound to one fingerprint.
#[derive(Debug, Default)]
pub struct PrefetchCache {
    fingerprint: Option<Fingerprint>,
    queue: VecDeque<Identifier>,
    /// Offset after the last slot visited by a sequential refill.
    next_offset: u64,
}

impl PrefetchCache {
    /// Create an empty cache with no fingerprint.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint of the queued identifiers, if any.
    #[must_use]
    pub const fn fingerprint(&self) -> Option<&Fingerprint> {
        self.fingerprint.as_ref()
    }

    /// Whether the queue was filled for `fingerprint`.
    #[must_use]
    pub fn matches(&self, fingerprint: &Fingerprint) -> bool {
        self.fingerprint.as_ref() == Some(fingerprint)
    }

    /// Number of queued identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Offset a sequential refill would resume from.
    #[must_use]
    pub const fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// Whether the cache should be topped up for `fingerprint`.
    #[must_use]
    pub fn needs_refill(&self, fingerprint: &Fingerprint, threshold: usize) -> bool {
        !self.matches(fingerprint) || self.queue.len() < threshold
    }

    /// Up to `n` identifiers from the front of the queue, without removing them.
    pub fn peek(&self, n: usize) -> impl Iterator<Item = &Identifier> {
        self.queue.iter().take(n)
    }

    /// Names of every queued identifier.
    #[must_use]
    pub fn names(&self) -> HashSet<String> {
        self.queue
            .iter()
            .map(|identifier| identifier.name().to_string())
            .collect()
    }

    /// Remove and return up to `n` identifiers from the front of the queue.
    pub fn collect(&mut self, n: usize) -> Vec<Identifier> {
        let n = n.min(self.queue.len());
        self.queue.drain(..n).collect()
    }

    /// Drop queued identifiers matching `stale`. Returns how many were dropped.
    pub fn discard(&mut self, mut stale: impl FnMut(&Identifier) -> bool) -> usize {
        let before = self.queue.len();
        self.queue.retain(|identifier| !stale(identifier));
        before - self.queue.len()
    }

    /// Move the sequential resume point forward to at least `offset`.
    pub fn advance(&mut self, offset: u64) {
        self.next_offset = self.next_offset.max(offset);
    }

    /// Empty the queue and forget the fingerprint.
    pub fn clear(&mut self) {
        self.fingerprint = None;
        self.queue.clear();
        self.next_offset = 0;
    }

    /// Top the queue up to `target` identifiers of `fingerprint`.
    ///
    /// A different fingerprint discards the queue first. Sequential refills
    /// resume after the last queued slot, or at `usage` when that is further.
    /// A refill that reaches the end of the space keeps what it produced.
    /// Returns the number of identifiers added.
    ///
    /// # Errors
    ///
    /// Returns the gate's error if a collision check fails or times out; the
    /// queue is left as it was before the call.
    pub async fn refill(
        &mut self,
        fingerprint: &Fingerprint,
        target: usize,
        usage: u64,
        gate: &CollisionGate,
        rng: &mut (dyn RngCore + Send),
    ) -> StorageResult<usize> {
        if !self.matches(fingerprint) {
            self.clear();
            self.fingerprint = Some(fingerprint.clone());
            self.next_offset = usage;
        }

        let shortfall = target.saturating_sub(self.queue.len());
        if shortfall == 0 {
            return Ok(0);
        }

        let space = fingerprint.space();
        let exclude = self.names();
        let draw = match fingerprint.strategy() {
            Strategy::Sequential => Draw::Sequential {
                start: self.next_offset.max(usage),
            },
            Strategy::Random => Draw::Random { rng },
        };

        let generated = Generator::new(&space, gate)
            .generate(shortfall, draw, &exclude)
            .await?;

        if fingerprint.strategy() == Strategy::Sequential {
            self.advance(generated.next_offset);
        }

        let added = generated.identifiers.len();
        self.queue.extend(generated.identifiers);

        tracing::debug!(
            key = %fingerprint.storage_key(),
            added,
            queued = self.queue.len(),
            exhausted = generated.exhausted,
            "Prefetch cache refilled"
        );

        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::domain::MintConfiguration;
    use crate::storage::memory::MemoryStorage;
    use crate::storage::traits::IdentifierStore;

    fn gate(storage: Arc<MemoryStorage>) -> CollisionGate {
        CollisionGate::new(storage, Duration::from_secs(1))
    }

    fn names(identifiers: &[Identifier]) -> Vec<&str> {
        identifiers.iter().map(Identifier::name).collect()
    }

    async fn filled(char_map: &str, target: usize) -> (PrefetchCache, Fingerprint) {
        let fingerprint = MintConfiguration::custom("", char_map)
            .fingerprint()
            .unwrap();
        let mut cache = PrefetchCache::new();
        let mut rng = StdRng::seed_from_u64(0);
        cache
            .refill(
                &fingerprint,
                target,
                0,
                &gate(Arc::new(MemoryStorage::new())),
                &mut rng,
            )
            .await
            .unwrap();
        (cache, fingerprint)
    }

    #[tokio::test]
    async fn test_peek_is_idempotent() {
        let (cache, _) = filled("dd", 10).await;
        let first: Vec<_> = cache.peek(4).cloned().collect();
        let second: Vec<_> = cache.peek(4).cloned().collect();
        assert_eq!(first, second);
        assert_eq!(names(&first), vec!["00", "01", "02", "03"]);
        assert_eq!(cache.len(), 10);
    }

    #[tokio::test]
    async fn test_collect_agrees_with_peek() {
        let (mut cache, _) = filled("dd", 10).await;
        let peeked: Vec<_> = cache.peek(3).cloned().collect();
        let collected = cache.collect(3);
        assert_eq!(peeked, collected);
        assert_eq!(cache.len(), 7);

        let rest = cache.collect(100);
        assert_eq!(rest.len(), 7);
        assert!(cache.is_empty());
        assert!(cache.collect(1).is_empty());
    }

    #[tokio::test]
    async fn test_refill_tops_up_shortfall_only() {
        let (mut cache, fingerprint) = filled("dd", 10).await;
        cache.collect(4);
        assert!(cache.needs_refill(&fingerprint, 8));

        let storage = Arc::new(MemoryStorage::new());
        let mut rng = StdRng::seed_from_u64(0);
        let added = cache
            .refill(&fingerprint, 10, 0, &gate(storage), &mut rng)
            .await
            .unwrap();

        assert_eq!(added, 4);
        let queued: Vec<_> = cache.peek(10).map(|id| id.name().to_string()).collect();
        assert_eq!(queued.first().map(String::as_str), Some("04"));
        assert_eq!(queued.last().map(String::as_str), Some("13"));
        assert_eq!(cache.next_offset(), 14);
    }

    #[tokio::test]
    async fn test_refill_swaps_on_fingerprint_mismatch() {
        let (mut cache, _) = filled("dd", 5).await;
        let letters = MintConfiguration::custom("", "l").fingerprint().unwrap();

        assert!(cache.needs_refill(&letters, 0));
        let mut rng = StdRng::seed_from_u64(0);
        cache
            .refill(
                &letters,
                3,
                0,
                &gate(Arc::new(MemoryStorage::new())),
                &mut rng,
            )
            .await
            .unwrap();

        assert!(cache.matches(&letters));
        let queued: Vec<_> = cache.peek(10).cloned().collect();
        assert_eq!(names(&queued), vec!["b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_refill_resumes_from_usage_and_skips_issued() {
        let fingerprint = MintConfiguration::custom("", "d").fingerprint().unwrap();
        let space = fingerprint.space();
        let storage = Arc::new(MemoryStorage::new());
        storage.save_all(&[space.identifier_at(6)]).await.unwrap();

        let mut cache = PrefetchCache::new();
        let mut rng = StdRng::seed_from_u64(0);
        let added = cache
            .refill(&fingerprint, 10, 5, &gate(storage), &mut rng)
            .await
            .unwrap();

        // Only 5, 7, 8, 9 remain in the space.
        assert_eq!(added, 4);
        let queued: Vec<_> = cache.peek(10).cloned().collect();
        assert_eq!(names(&queued), vec!["5", "7", "8", "9"]);
    }

    #[tokio::test]
    async fn test_random_refill_has_no_duplicates() {
        let (cache, _) = {
            let fingerprint = MintConfiguration::custom("", "dd")
                .with_random(true)
                .fingerprint()
                .unwrap();
            let mut cache = PrefetchCache::new();
            let mut rng = StdRng::seed_from_u64(99);
            let storage = Arc::new(MemoryStorage::new());
            cache
                .refill(&fingerprint, 60, 0, &gate(storage.clone()), &mut rng)
                .await
                .unwrap();
            cache
                .refill(&fingerprint, 90, 0, &gate(storage), &mut rng)
                .await
                .unwrap();
            (cache, fingerprint)
        };

        assert_eq!(cache.len(), 90);
        assert_eq!(cache.names().len(), 90);
    }

    #[tokio::test]
    async fn test_clear() {
        let (mut cache, fingerprint) = filled("d", 3).await;
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.fingerprint().is_none());
        assert!(cache.needs_refill(&fingerprint, 0));
    }

    #[tokio::test]
    async fn test_discard() {
        let (mut cache, _) = filled("d", 5).await;
        let dropped = cache.discard(|id| id.name() == "1" || id.name() == "3");
        assert_eq!(dropped, 2);
        let queued: Vec<_> = cache.peek(10).cloned().collect();
        assert_eq!(names(&queued), vec!["0", "2", "4"]);
    }
}
