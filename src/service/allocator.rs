//! Identifier allocation.
//!
//! The [`Allocator`] turns a mint request into a persisted batch: it checks
//! capacity, serves what it can from the prefetch cache, generates the rest,
//! persists the batch, records usage and finally tops the cache back up.
//! One mint runs at a time.

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tokio::sync::Mutex;
use tracing::Instrument;

use super::cache::PrefetchCache;
use super::gate::CollisionGate;
use super::generator::{Draw, Generator};
use crate::config::MinterConfig;
use crate::domain::{Capacity, Fingerprint, Identifier, MintConfiguration, Strategy};
use crate::error::{AppError, Result};
use crate::storage::traits::Storage;

/// State owned by the mint lock.
struct MintState {
    cache: PrefetchCache,
    rng: Box<dyn RngCore + Send>,
}

/// Mint orchestrator.
pub struct Allocator {
    storage: Arc<dyn Storage>,
    gate: CollisionGate,
    settings: MinterConfig,
    state: Mutex<MintState>,
}

impl Allocator {
    /// Create an allocator seeded from `settings.seed`, or from the OS when
    /// no seed is configured.
    pub fn new(storage: Arc<dyn Storage>, settings: MinterConfig) -> Self {
        let rng = settings
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self::with_rng(storage, settings, Box::new(rng))
    }

    /// Create an allocator with an explicit randomness source.
    pub fn with_rng(
        storage: Arc<dyn Storage>,
        settings: MinterConfig,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        let gate = CollisionGate::new(Arc::clone(&storage), settings.gate_timeout());
        Self {
            storage,
            gate,
            settings,
            state: Mutex::new(MintState {
                cache: PrefetchCache::new(),
                rng,
            }),
        }
    }

    /// Minting settings.
    pub const fn settings(&self) -> &MinterConfig {
        &self.settings
    }

    /// The stored active configuration, or the configured default.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the active configuration cannot be read.
    pub async fn active_configuration(&self) -> Result<MintConfiguration> {
        Ok(self
            .storage
            .load_active()
            .await?
            .unwrap_or_else(|| self.settings.defaults.clone()))
    }

    /// Validate and store a new active configuration.
    ///
    /// The prefetch cache is dropped when the space changes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadParameter`] for a malformed configuration, or a
    /// storage error if it cannot be saved.
    pub async fn replace_active_configuration(&self, config: &MintConfiguration) -> Result<()> {
        let fingerprint = config.fingerprint()?;
        self.storage.save_active(config).await?;

        let mut state = self.state.lock().await;
        if !state.cache.matches(&fingerprint) {
            state.cache.clear();
        }

        tracing::info!(
            key = %fingerprint.storage_key(),
            prefix = fingerprint.prefix(),
            strategy = %fingerprint.strategy(),
            "Active configuration replaced"
        );

        Ok(())
    }

    /// Capacity of the space `configuration` describes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadParameter`] for a malformed configuration, or a
    /// storage error if usage cannot be read.
    pub async fn capacity(&self, configuration: &MintConfiguration) -> Result<Capacity> {
        let fingerprint = configuration.fingerprint()?;
        self.capacity_of(&fingerprint).await
    }

    async fn capacity_of(&self, fingerprint: &Fingerprint) -> Result<Capacity> {
        let used = self
            .storage
            .get_usage(fingerprint)
            .await?
            .map_or(0, |state| state.used);
        let total = fingerprint.space().total_permutations();
        Ok(Capacity::new(fingerprint.strategy(), total, used))
    }

    /// Drop every prefetched identifier.
    pub async fn invalidate_cache(&self) {
        self.state.lock().await.cache.clear();
    }

    /// Number of prefetched identifiers.
    pub async fn cached(&self) -> usize {
        self.state.lock().await.cache.len()
    }

    /// Mint `amount` identifiers of the space `configuration` describes.
    ///
    /// Nothing is persisted unless the whole batch is. Sequential batches are
    /// strictly increasing; random batches are unique.
    ///
    /// # Errors
    ///
    /// - [`AppError::BadParameter`] if the configuration is malformed
    /// - [`AppError::CapacityExceeded`] if the space cannot supply `amount`
    ///   identifiers
    /// - [`AppError::Storage`] if a collision check times out or the batch
    ///   cannot be persisted
    pub async fn mint(
        &self,
        configuration: &MintConfiguration,
        amount: u64,
    ) -> Result<Vec<Identifier>> {
        let fingerprint = configuration.fingerprint()?;
        let span = tracing::info_span!(
            "mint",
            key = %fingerprint.storage_key(),
            strategy = %fingerprint.strategy(),
            amount,
        );

        let started = Instant::now();
        let result = self.mint_locked(&fingerprint, amount).instrument(span).await;
        metrics::histogram!("pidminter_mint_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        if let Err(AppError::CapacityExceeded { .. }) = &result {
            metrics::counter!("pidminter_capacity_exceeded_total").increment(1);
        }

        result
    }

    async fn mint_locked(&self, fingerprint: &Fingerprint, amount: u64) -> Result<Vec<Identifier>> {
        let mut state = self.state.lock().await;
        let MintState { cache, rng } = &mut *state;

        let capacity = self.capacity_of(fingerprint).await?;
        if amount > capacity.remaining {
            tracing::warn!(
                remaining = capacity.remaining,
                requested = amount,
                "Not enough permutations"
            );
            return Err(AppError::CapacityExceeded {
                remaining: capacity.remaining,
                requested: amount,
            });
        }

        let wanted = usize::try_from(amount)
            .map_err(|_| AppError::bad_parameter("amount", amount.to_string()))?;
        let space = fingerprint.space();
        let strategy = fingerprint.strategy();

        // Serve from the cache.
        let mut served = Vec::new();
        if cache.matches(fingerprint) && wanted > 0 {
            if strategy == Strategy::Sequential {
                let dropped = cache.discard(|id| space.offset_of(id.indices()) < capacity.used);
                if dropped > 0 {
                    tracing::debug!(dropped, "Dropped cached identifiers behind usage");
                }
            }
            served = self.validated_from_cache(cache, wanted).await?;
        }

        // Generate the shortfall.
        let shortfall = wanted - served.len();
        let mut next_offset = None;
        let mut batch = served.clone();
        if shortfall > 0 {
            let draw = match strategy {
                Strategy::Sequential => {
                    let resume = if cache.matches(fingerprint) {
                        cache.next_offset().max(capacity.used)
                    } else {
                        capacity.used
                    };
                    Draw::Sequential { start: resume }
                }
                Strategy::Random => Draw::Random { rng: &mut **rng },
            };

            let mut exclude = cache.names();
            exclude.extend(served.iter().map(|id| id.name().to_string()));

            let generated = Generator::new(&space, &self.gate)
                .generate(shortfall, draw, &exclude)
                .await?;

            if generated.exhausted {
                let produced = (served.len() + generated.identifiers.len()) as u64;
                tracing::warn!(
                    produced,
                    requested = amount,
                    collisions = generated.collisions,
                    "Space exhausted during generation"
                );
                return Err(AppError::CapacityExceeded {
                    remaining: produced,
                    requested: amount,
                });
            }

            if strategy == Strategy::Sequential {
                next_offset = Some(generated.next_offset);
            }
            batch.extend(generated.identifiers);
        }

        // Persist, then record usage.
        self.storage.save_all(&batch).await?;

        let used = match strategy {
            Strategy::Sequential => next_offset
                .or_else(|| {
                    batch
                        .last()
                        .map(|id| space.offset_of(id.indices()).saturating_add(1))
                })
                .map_or(capacity.used, |offset| offset.max(capacity.used)),
            Strategy::Random => capacity
                .used
                .saturating_add(batch.len() as u64)
                .min(capacity.total),
        };
        // The batch is issued once persisted. A lagging counter only costs
        // sequential walks some gate hits.
        if used != capacity.used
            && let Err(e) = self.storage.set_usage(fingerprint, used).await
        {
            metrics::counter!("pidminter_usage_write_failures_total").increment(1);
            tracing::warn!(
                error = %e,
                used,
                minted = batch.len(),
                "Failed to record usage after persisting batch"
            );
        }

        // The served entries are issued now.
        if !served.is_empty() {
            cache.collect(served.len());
            metrics::counter!("pidminter_cache_served_total").increment(served.len() as u64);
        }
        if let Some(offset) = next_offset
            && cache.matches(fingerprint)
        {
            cache.advance(offset);
        }

        metrics::counter!("pidminter_minted_total", "strategy" => strategy.as_str())
            .increment(batch.len() as u64);
        tracing::info!(
            minted = batch.len(),
            from_cache = served.len(),
            used,
            "Identifiers minted"
        );

        self.top_up(cache, &mut **rng, fingerprint, used).await;

        Ok(batch)
    }

    /// Peek up to `wanted` cached identifiers, dropping any the store has
    /// since seen, until the peeked prefix is clean.
    async fn validated_from_cache(
        &self,
        cache: &mut PrefetchCache,
        wanted: usize,
    ) -> Result<Vec<Identifier>> {
        loop {
            let peeked: Vec<Identifier> = cache.peek(wanted).cloned().collect();

            let mut stale = Vec::new();
            for identifier in &peeked {
                if self.gate.exists(identifier.name()).await? {
                    stale.push(identifier.name().to_string());
                }
            }

            if stale.is_empty() {
                return Ok(peeked);
            }

            tracing::debug!(stale = stale.len(), "Dropping cached identifiers already issued");
            cache.discard(|id| stale.iter().any(|name| name == id.name()));
        }
    }

    async fn top_up(
        &self,
        cache: &mut PrefetchCache,
        rng: &mut (dyn RngCore + Send),
        fingerprint: &Fingerprint,
        usage: u64,
    ) {
        let target = self.settings.prefetch_size;
        if target == 0 || !cache.needs_refill(fingerprint, self.settings.prefetch_threshold) {
            return;
        }

        if let Err(e) = cache
            .refill(fingerprint, target, usage, &self.gate, rng)
            .await
        {
            tracing::warn!(error = %e, "Prefetch cache refill failed");
        }
    }
}
