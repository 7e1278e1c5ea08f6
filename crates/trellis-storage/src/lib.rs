//! Trellis Storage - Graph store adapters
//!
//! Implementations of [`trellis_core::GraphStore`] that own the vertex, edge
//! and adjacency data the frame engine works over.

#![allow(clippy::result_large_err)]

pub mod error;
pub mod traits;

#[cfg(feature = "redb")]
pub mod redb;

pub mod memory;

pub use error::{StorageError, StorageResult};
pub use traits::{StorageBackend, StoreCounts};

#[cfg(feature = "redb")]
pub use self::redb::RedbGraphStore;

pub use memory::MemoryGraphStore;
