//! Candidate generation over an identifier space.
//!
//! Both strategies share the odometer of [`SpaceModel`]: sequential minting
//! walks it from a starting offset, random minting uses it to step away from
//! a collision.

use std::collections::HashSet;

use rand::{Rng, RngCore};

use super::gate::CollisionGate;
use crate::domain::{Identifier, SpaceModel};
use crate::error::StorageResult;

/// Where candidates come from.
pub enum Draw<'a> {
    /// Consecutive slots starting at `start`. Never wraps.
    Sequential {
        /// Offset of the first slot to consider.
        start: u64,
    },
    /// Independent uniform draws per position.
    Random {
        /// Randomness source.
        rng: &'a mut (dyn RngCore + Send),
    },
}

/// Result of a generation run.
#[derive(Debug)]
pub struct Generated {
    /// Accepted identifiers in generation order.
    pub identifiers: Vec<Identifier>,

    /// Offset after the last slot visited (sequential only).
    pub next_offset: u64,

    /// Candidates rejected as duplicates or store hits.
    pub collisions: u64,

    /// The space ran out before the requested amount was produced.
    pub exhausted: bool,
}

/// Produces validated candidates from one space.
pub struct Generator<'a> {
    space: &'a SpaceModel,
    gate: &'a CollisionGate,
}

impl<'a> Generator<'a> {
    /// Create a generator over `space`, checking candidates with `gate`.
    pub const fn new(space: &'a SpaceModel, gate: &'a CollisionGate) -> Self {
        Self { space, gate }
    }

    /// Generate up to `amount` identifiers that are not in `exclude`, not
    /// already issued and unique within the run.
    ///
    /// Running out of space is reported through [`Generated::exhausted`] and
    /// keeps whatever was produced.
    ///
    /// # Errors
    ///
    /// Returns the gate's error if a collision check fails or times out.
    pub async fn generate(
        &self,
        amount: usize,
        draw: Draw<'_>,
        exclude: &HashSet<String>,
    ) -> StorageResult<Generated> {
        match draw {
            Draw::Sequential { start } => self.sequential(amount, start, exclude).await,
            Draw::Random { rng } => self.random(amount, rng, exclude).await,
        }
    }

    async fn sequential(
        &self,
        amount: usize,
        start: u64,
        exclude: &HashSet<String>,
    ) -> StorageResult<Generated> {
        let total = self.space.total_permutations();
        let mut identifiers = Vec::with_capacity(amount);
        let mut collisions = 0;
        let mut offset = start;
        let mut wrapped = start >= total;
        let mut indices = self.space.indices_at(start);

        while !wrapped && identifiers.len() < amount {
            let candidate = self.space.identifier(indices.clone());
            offset += 1;
            wrapped = self.space.increment(&mut indices);

            if exclude.contains(candidate.name()) || self.gate.exists(candidate.name()).await? {
                collisions += 1;
                continue;
            }
            identifiers.push(candidate);
        }

        let exhausted = identifiers.len() < amount;
        Ok(Generated {
            identifiers,
            next_offset: offset,
            collisions,
            exhausted,
        })
    }

    async fn random(
        &self,
        amount: usize,
        rng: &mut (dyn RngCore + Send),
        exclude: &HashSet<String>,
    ) -> StorageResult<Generated> {
        let total = self.space.total_permutations();
        let mut identifiers = Vec::with_capacity(amount);
        let mut seen: HashSet<String> = HashSet::with_capacity(amount);
        let mut collisions = 0;
        let mut exhausted = false;

        'batch: while identifiers.len() < amount {
            let mut indices: Vec<usize> = self
                .space
                .alphabets()
                .positions()
                .map(|alphabet| rng.random_range(0..alphabet.len()))
                .collect();
            let mut candidate = self.space.identifier(indices.clone());
            let mut attempts = 0u64;

            while seen.contains(candidate.name())
                || exclude.contains(candidate.name())
                || self.gate.exists(candidate.name()).await?
            {
                collisions += 1;
                attempts += 1;
                if attempts >= total {
                    exhausted = true;
                    break 'batch;
                }
                self.space.increment(&mut indices);
                candidate = self.space.identifier(indices.clone());
            }

            seen.insert(candidate.name().to_string());
            identifiers.push(candidate);
        }

        Ok(Generated {
            identifiers,
            next_offset: 0,
            collisions,
            exhausted,
        })
    }
}
