//! Service layer module.
//!
//! Contains the minting logic: candidate generation, collision checks, the
//! prefetch cache and the allocator that ties them together.

pub mod allocator;
pub mod cache;
pub mod gate;
pub mod generator;

pub use allocator::Allocator;
pub use cache::PrefetchCache;
pub use gate::CollisionGate;
pub use generator::{Draw, Generated, Generator};
