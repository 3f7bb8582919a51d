//! Domain models for the PID minter.
//!
//! This module contains the identifier space model, mint configurations,
//! usage bookkeeping and API contracts.

pub mod alphabet;
pub mod config;
pub mod dto;
pub mod identifier;
pub mod space;
pub mod usage;

pub use alphabet::{CharClass, parse_char_map};
pub use config::{Fingerprint, MintConfiguration, Strategy};
pub use dto::{
    ApiResponse, ConfigOverrides, HealthResponse, MintRequest, MintResponse, MintedIdentifier,
    ReadyComponents, ReadyResponse,
};
pub use identifier::{Identifier, compare_chars, compare_names};
pub use space::{AlphabetSpec, SpaceModel, increment, total_permutations};
pub use usage::{Capacity, UsageState};
