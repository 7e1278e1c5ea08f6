//! Trellis Core - Typed frames over a property graph
//!
//! This crate provides the typed adjacency-traversal and mutation engine:
//! frames that bind stored vertices and edges to declared types, direction
//! and label queries over them, and edge-rewiring operations. Storage is
//! reached only through the [`GraphStore`] contract.

pub mod adjacency;
pub mod element;
pub mod error;
pub mod frame;
pub mod graph;
pub mod limits;
pub mod mutation;
pub mod store;
pub mod traversal;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use adjacency::{AdjacencyRequest, Direction};
pub use element::{
    Edge, Element, ElementId, ElementKind, GraphElement, Properties, Vertex, DEFAULT_EDGE_LABEL,
    DEFAULT_VERTEX_LABEL,
};
pub use error::{Error, Result};
pub use frame::{EdgeFrame, Framed, VertexFrame};
pub use graph::{ClassInitializer, FramedGraph};
pub use mutation::{MutationEngine, MutationStats};
pub use store::{ElementIter, GraphStore};
pub use traversal::{EdgeTraversal, Traversal, TraversalEngine};
pub use types::{
    filter_by_type, FrameType, PolymorphicTypeResolver, TypeRegistry, TypeResolver,
    UntypedTypeResolver, EDGE_ROOT, TYPE_PROPERTY, VERTEX_ROOT,
};
