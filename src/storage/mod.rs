//! Storage layer module.
//!
//! This module provides trait-based storage abstraction allowing different backends
//! to be used without changing minting logic.

pub mod factory;
pub mod file;
pub mod memory;
pub mod traits;

pub use crate::error::StorageError;
pub use factory::create_storage;
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use traits::{ConfigStore, IdentifierStore, Storage};
