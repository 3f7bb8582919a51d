//! Data Transfer Objects for API requests and responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::alphabet::CharClass;
use super::config::MintConfiguration;
use super::identifier::Identifier;
use crate::error::{AppError, Result};

/// Standard API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response code (0 = success, non-zero = error).
    pub code: i32,

    /// Human-readable message.
    pub message: String,

    /// Response data (null on error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a success response.
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            message: "success".to_string(),
            data: Some(data),
        }
    }
}

/// Per-request overrides applied on top of the active configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigOverrides {
    /// Identifier prefix.
    pub prefix: Option<String>,

    /// Class of every position in auto mode.
    pub token_type: Option<CharClass>,

    /// Number of positions in auto mode.
    pub root_length: Option<usize>,

    /// Free-form char map; switches to custom mode.
    pub char_map: Option<String>,

    /// Vowel exclusion.
    pub sans_vowel: Option<bool>,

    /// Random issuance.
    pub random: Option<bool>,
}

impl ConfigOverrides {
    /// Apply the overrides to `base`.
    ///
    /// Overriding `token_type` or `root_length` without a char map switches
    /// the result back to auto mode.
    #[must_use]
    pub fn apply(&self, base: &MintConfiguration) -> MintConfiguration {
        let mut config = base.clone();

        if let Some(prefix) = &self.prefix {
            config.prefix.clone_from(prefix);
        }
        if let Some(token_type) = self.token_type {
            config.token_type = token_type;
            config.char_map = None;
        }
        if let Some(root_length) = self.root_length {
            config.root_length = root_length;
            config.char_map = None;
        }
        if let Some(char_map) = &self.char_map {
            config.char_map = Some(char_map.clone());
        }
        if let Some(sans_vowel) = self.sans_vowel {
            config.sans_vowel = sans_vowel;
        }
        if let Some(random) = self.random {
            config.random = random;
        }

        config
    }
}

/// Request to mint identifiers.
#[derive(Debug, Clone, Deserialize)]
pub struct MintRequest {
    /// Number of identifiers to mint.
    #[serde(default = "default_amount")]
    pub amount: i64,

    /// Overrides of the active configuration.
    #[serde(flatten)]
    pub overrides: ConfigOverrides,

    /// Keys matching neither the amount nor an override.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

const fn default_amount() -> i64 {
    1
}

impl MintRequest {
    /// Reject keys that are not part of the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadParameter`] naming the first unknown key.
    pub fn check_fields(&self) -> Result<()> {
        match self.unknown.keys().next() {
            Some(key) => Err(AppError::bad_parameter("request", key.clone())),
            None => Ok(()),
        }
    }

    /// Validate the amount against the configured batch limit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadParameter`] if the amount is negative or above
    /// `max_batch`.
    pub fn validated_amount(&self, max_batch: u64) -> Result<u64> {
        u64::try_from(self.amount)
            .ok()
            .filter(|amount| *amount <= max_batch)
            .ok_or_else(|| AppError::bad_parameter("amount", self.amount.to_string()))
    }
}

/// One minted identifier in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintedIdentifier {
    /// Position in the minted batch.
    pub index: usize,

    /// Identifier name.
    pub name: String,
}

/// Response of a mint request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintResponse {
    /// Minted identifiers in issue order.
    pub ids: Vec<MintedIdentifier>,
}

impl MintResponse {
    /// Build the response from a minted batch.
    #[must_use]
    pub fn new(identifiers: Vec<Identifier>) -> Self {
        let ids = identifiers
            .into_iter()
            .enumerate()
            .map(|(index, identifier)| MintedIdentifier {
                index,
                name: identifier.into_name(),
            })
            .collect();
        Self { ids }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,

    /// Service version.
    pub version: String,
}

/// Readiness check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    /// Overall readiness status.
    pub ready: bool,

    /// Individual component statuses.
    pub components: ReadyComponents,
}

/// Component readiness statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyComponents {
    /// Storage backend status.
    pub storage: bool,
}
