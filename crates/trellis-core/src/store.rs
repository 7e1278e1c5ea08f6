//! Graph store adapter contract
//!
//! The engine never owns graph data. Every read and write goes through a
//! [`GraphStore`], which is implemented by the storage crate (or by callers
//! wrapping their own engine).

use crate::adjacency::Direction;
use crate::element::{Edge, ElementId, Properties, Vertex};
use crate::error::{Error, Result};

/// Lazy sequence of elements produced by a store query
pub type ElementIter<'a, T> = Box<dyn Iterator<Item = Result<T>> + 'a>;

/// Primitive element CRUD and adjacency lookup
///
/// Each method is expected to be atomic on its own. Nothing is assumed about
/// atomicity across calls.
pub trait GraphStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a vertex. `None` means the store's default label.
    fn add_vertex(&self, label: Option<&str>, properties: Properties) -> Result<Vertex>;

    /// Create an edge `out_vertex -[label]-> in_vertex`
    fn add_edge(
        &self,
        out_vertex: &ElementId,
        in_vertex: &ElementId,
        label: &str,
        properties: Properties,
    ) -> Result<Edge>;

    /// Set a single property on a vertex or an edge
    fn set_property(&self, id: &ElementId, key: &str, value: serde_json::Value) -> Result<()>;

    /// Delete an edge
    fn remove_edge(&self, id: &ElementId) -> Result<()>;

    /// Delete a vertex together with every edge touching it
    fn remove_vertex(&self, id: &ElementId) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    fn vertex(&self, id: &ElementId) -> Result<Option<Vertex>>;

    fn edge(&self, id: &ElementId) -> Result<Option<Edge>>;

    /// Edges touching `vertex` with the given label, in store order.
    ///
    /// The engine only ever asks for [`Direction::Out`] or [`Direction::In`].
    /// Implementations that receive [`Direction::Both`] yield outgoing edges
    /// before incoming ones.
    fn adjacent_edges<'a>(
        &'a self,
        vertex: &ElementId,
        direction: Direction,
        label: &str,
    ) -> Result<ElementIter<'a, Edge>>;

    /// Vertices on the far side of [`GraphStore::adjacent_edges`]
    fn adjacent_vertices<'a>(
        &'a self,
        vertex: &ElementId,
        direction: Direction,
        label: &str,
    ) -> Result<ElementIter<'a, Vertex>> {
        let source = *vertex;
        let edges = self.adjacent_edges(vertex, direction, label)?;
        Ok(Box::new(edges.map(move |edge| {
            let edge = edge?;
            let far = match direction {
                Direction::Out => edge.in_vertex,
                Direction::In => edge.out_vertex,
                Direction::Both => edge.opposite(&source),
            };
            self.vertex(&far)?
                .ok_or_else(|| Error::VertexNotFound(far.to_string()))
        })))
    }

    /// Load a vertex, failing if it does not exist
    fn require_vertex(&self, id: &ElementId) -> Result<Vertex> {
        self.vertex(id)?
            .ok_or_else(|| Error::VertexNotFound(id.to_string()))
    }

    /// Load an edge, failing if it does not exist
    fn require_edge(&self, id: &ElementId) -> Result<Edge> {
        self.edge(id)?
            .ok_or_else(|| Error::EdgeNotFound(id.to_string()))
    }
}
