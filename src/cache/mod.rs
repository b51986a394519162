//! Versioned response caching for offline support.
//!
//! This module provides the storage side of the offline controller:
//! - Named generations of `<namespace>-<suffix>-<version>`
//! - Entries keyed by method + URL, GET only, status 200 only
//! - Cache-first, network-first and network-only strategies

mod generation;
mod layer;
mod storage;
mod traits;

pub use generation::GenerationName;
pub use layer::CacheLayer;
#[cfg(test)]
pub use storage::MemoryStorage;
pub use storage::{CacheStorage, SqliteStorage};
pub use traits::CacheResult;
#[cfg(test)]
pub use traits::CacheSource;
