//! Per-space usage bookkeeping.

use serde::{Deserialize, Serialize};

use super::config::{Fingerprint, Strategy};

/// Persistent usage counter of one identifier space.
///
/// For sequential spaces `used` is the offset the next mint resumes from;
/// for random spaces it is the number of identifiers issued so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageState {
    /// Fingerprint storage key.
    pub key: String,

    /// Identifier prefix, kept for readability of stored state.
    pub prefix: String,

    /// Issuance strategy of the space.
    pub strategy: Strategy,

    /// Slots consumed so far.
    pub used: u64,

    /// Version for optimistic locking.
    pub version: u64,

    /// Last update timestamp (milliseconds since epoch).
    pub updated_at: i64,
}

impl UsageState {
    /// Create a fresh usage state for a fingerprint.
    #[must_use]
    pub fn new(fingerprint: &Fingerprint) -> Self {
        Self {
            key: fingerprint.storage_key(),
            prefix: fingerprint.prefix().to_string(),
            strategy: fingerprint.strategy(),
            used: 0,
            version: 0,
            updated_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Capacity summary of an identifier space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    /// Total number of identifiers in the space (saturating at `u64::MAX`).
    pub total: u64,

    /// Slots already consumed.
    pub used: u64,

    /// Slots a mint may still ask for.
    pub remaining: u64,
}

impl Capacity {
    /// Compute the capacity of a space of `total` slots with `used` consumed.
    ///
    /// Random spaces are not offset based, so their remaining capacity is
    /// always the full space.
    #[must_use]
    pub const fn new(strategy: Strategy, total: u64, used: u64) -> Self {
        let remaining = match strategy {
            Strategy::Sequential => total.saturating_sub(used),
            Strategy::Random => total,
        };
        Self {
            total,
            used,
            remaining,
        }
    }
}
