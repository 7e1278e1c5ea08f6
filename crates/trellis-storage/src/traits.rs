//! Storage backend trait definitions

use crate::error::StorageResult;
use serde::Serialize;
use trellis_core::{Direction, Edge, GraphStore, Vertex};

/// One end of an edge as stored in an adjacency index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Out,
    In,
}

impl Side {
    /// The stored sides a query in `direction` reads, outgoing first
    pub(crate) fn of(direction: Direction) -> &'static [Side] {
        match direction {
            Direction::Out => &[Side::Out],
            Direction::In => &[Side::In],
            Direction::Both => &[Side::Out, Side::In],
        }
    }
}

/// Element totals held by a backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub vertices: usize,
    pub edges: usize,
}

/// A [`GraphStore`] that can also be inspected as a whole
pub trait StorageBackend: GraphStore {
    /// Health check
    fn health_check(&self) -> StorageResult<bool>;

    /// Every stored vertex, ordered by id
    fn vertices(&self) -> StorageResult<Vec<Vertex>>;

    /// Every stored edge, ordered by id
    fn edges(&self) -> StorageResult<Vec<Edge>>;

    fn counts(&self) -> StorageResult<StoreCounts> {
        Ok(StoreCounts {
            vertices: self.vertices()?.len(),
            edges: self.edges()?.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_expansion() {
        assert_eq!(Side::of(Direction::Out), &[Side::Out]);
        assert_eq!(Side::of(Direction::In), &[Side::In]);
        assert_eq!(Side::of(Direction::Both), &[Side::Out, Side::In]);
    }
}
