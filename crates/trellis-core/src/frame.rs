//! Typed views over stored vertices and edges
//!
//! A frame is a transient projection: it holds a snapshot of one element and
//! the graph handle it came from. Dropping a frame never touches the store,
//! and any frame can be rebuilt from its element id.

use crate::adjacency::{AdjacencyRequest, Direction};
use crate::element::{Edge, ElementId, Vertex};
use crate::error::Result;
use crate::graph::{ClassInitializer, FramedGraph};
use crate::limits;
use crate::mutation::{MutationEngine, MutationStats};
use crate::traversal::{EdgeTraversal, Traversal, TraversalEngine};
use crate::types::FrameType;

/// A compile-time frame type wrapping a [`VertexFrame`]
///
/// ```ignore
/// struct Person(VertexFrame);
///
/// impl From<VertexFrame> for Person {
///     fn from(frame: VertexFrame) -> Self {
///         Self(frame)
///     }
/// }
///
/// impl Framed for Person {
///     const TYPE_NAME: &'static str = "Person";
///     fn frame(&self) -> &VertexFrame {
///         &self.0
///     }
/// }
/// ```
pub trait Framed: From<VertexFrame> {
    const TYPE_NAME: &'static str;

    fn frame(&self) -> &VertexFrame;
}

/// Typed view of one vertex
#[derive(Debug, Clone)]
pub struct VertexFrame {
    graph: FramedGraph,
    vertex: Vertex,
    frame_type: FrameType,
}

impl PartialEq for VertexFrame {
    fn eq(&self, other: &Self) -> bool {
        self.vertex.id == other.vertex.id
    }
}

impl Eq for VertexFrame {}

impl VertexFrame {
    pub(crate) fn new(graph: FramedGraph, vertex: Vertex, frame_type: FrameType) -> Self {
        Self {
            graph,
            vertex,
            frame_type,
        }
    }

    pub fn id(&self) -> &ElementId {
        &self.vertex.id
    }

    pub fn label(&self) -> &str {
        &self.vertex.label
    }

    /// Element snapshot taken when this frame was built
    pub fn vertex(&self) -> &Vertex {
        &self.vertex
    }

    pub fn frame_type(&self) -> &FrameType {
        &self.frame_type
    }

    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.vertex.properties.get(key)
    }

    /// Graph this frame belongs to
    pub fn graph(&self) -> &FramedGraph {
        &self.graph
    }

    /// Rebuild the frame from the current stored state
    pub fn refresh(&self) -> Result<VertexFrame> {
        let vertex = self.graph.store().require_vertex(self.id())?;
        self.graph.frame_vertex(vertex)
    }

    /// Write a property through to the store and the snapshot
    pub fn set_property(&mut self, key: &str, value: impl Into<serde_json::Value>) -> Result<()> {
        limits::validate_property_key(key)?;
        let value = value.into();
        self.graph.store().set_property(self.id(), key, value.clone())?;
        self.vertex.properties.insert(key.to_string(), value);
        Ok(())
    }

    /// Delete the vertex and every edge touching it
    pub fn remove(self) -> Result<()> {
        self.graph.store().remove_vertex(self.id())
    }

    /// Whether this vertex may be exposed as `T`
    pub fn is<T: Framed>(&self) -> Result<bool> {
        self.graph
            .resolver()
            .matches(&self.vertex, &FrameType::new(T::TYPE_NAME))
    }

    /// Reinterpret as `T` if the resolver allows it
    pub fn reframe<T: Framed>(self) -> Result<Option<T>> {
        Ok(if self.is::<T>()? { Some(T::from(self)) } else { None })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Traversal
    // ─────────────────────────────────────────────────────────────────────────

    /// Start an adjacency request with this vertex as source
    pub fn adjacency(&self, direction: Direction, label: &str) -> Result<AdjacencyRequest<'_>> {
        AdjacencyRequest::new(self, direction, label)
    }

    /// Vertices one `label` edge away in `direction`
    pub fn traverse(&self, direction: Direction, label: &str) -> Result<Traversal<'_>> {
        TraversalEngine::traverse(&self.adjacency(direction, label)?)
    }

    /// Like [`VertexFrame::traverse`], keeping only targets assignable to `target`
    pub fn traverse_typed(
        &self,
        direction: Direction,
        label: &str,
        target: impl Into<FrameType>,
    ) -> Result<Traversal<'_>> {
        TraversalEngine::traverse_typed(&self.adjacency(direction, label)?, target.into())
    }

    /// First adjacent vertex, if any
    pub fn traverse_singleton(&self, direction: Direction, label: &str) -> Result<Option<VertexFrame>> {
        TraversalEngine::traverse_singleton(&self.adjacency(direction, label)?)
    }

    /// Adjacent vertices of compile-time type `T`
    pub fn traverse_as<T: Framed>(
        &self,
        direction: Direction,
        label: &str,
    ) -> Result<impl Iterator<Item = Result<T>> + '_> {
        let traversal = self.traverse_typed(direction, label, T::TYPE_NAME)?;
        Ok(traversal.map(|frame| frame.map(T::from)))
    }

    /// Edges touching this vertex with `label`
    pub fn traverse_edges(&self, direction: Direction, label: &str) -> Result<EdgeTraversal<'_>> {
        TraversalEngine::traverse_edges(&self.adjacency(direction, label)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Connect `peer` to this vertex in `direction`
    pub fn link(
        &self,
        direction: Direction,
        label: &str,
        peer: &VertexFrame,
        edge_initializer: Option<&ClassInitializer>,
    ) -> Result<Vec<EdgeFrame>> {
        MutationEngine::link(&self.adjacency(direction, label)?, peer, edge_initializer)
    }

    /// Create a new vertex and connect it to this one
    pub fn add_adjacent(
        &self,
        direction: Direction,
        label: &str,
        vertex_initializer: Option<&ClassInitializer>,
        edge_initializer: Option<&ClassInitializer>,
    ) -> Result<VertexFrame> {
        MutationEngine::add_adjacent_vertex(
            &self.adjacency(direction, label)?,
            vertex_initializer,
            edge_initializer,
        )
    }

    /// Replace every `label` adjacency in `direction` with edges to `peers`
    pub fn set_adjacent(
        &self,
        direction: Direction,
        label: &str,
        peers: &[VertexFrame],
    ) -> Result<MutationStats> {
        MutationEngine::replace_edge_set(&self.adjacency(direction, label)?, peers)
    }

    /// Remove `label` edges in `direction`, optionally only those leading to `peer`
    pub fn remove_adjacent(
        &self,
        direction: Direction,
        label: &str,
        peer: Option<&VertexFrame>,
    ) -> Result<MutationStats> {
        let mut request = self.adjacency(direction, label)?;
        if let Some(peer) = peer {
            request = request.with_peer(peer);
        }
        MutationEngine::remove_edges(&request)
    }
}

/// Typed view of one edge
#[derive(Debug, Clone)]
pub struct EdgeFrame {
    graph: FramedGraph,
    edge: Edge,
    frame_type: FrameType,
}

impl PartialEq for EdgeFrame {
    fn eq(&self, other: &Self) -> bool {
        self.edge.id == other.edge.id
    }
}

impl Eq for EdgeFrame {}

impl EdgeFrame {
    pub(crate) fn new(graph: FramedGraph, edge: Edge, frame_type: FrameType) -> Self {
        Self {
            graph,
            edge,
            frame_type,
        }
    }

    pub fn id(&self) -> &ElementId {
        &self.edge.id
    }

    pub fn label(&self) -> &str {
        &self.edge.label
    }

    pub fn edge(&self) -> &Edge {
        &self.edge
    }

    pub fn frame_type(&self) -> &FrameType {
        &self.frame_type
    }

    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.edge.properties.get(key)
    }

    pub fn graph(&self) -> &FramedGraph {
        &self.graph
    }

    /// Vertex the edge points away from
    pub fn out_vertex(&self) -> Result<VertexFrame> {
        let vertex = self.graph.store().require_vertex(&self.edge.out_vertex)?;
        self.graph.frame_vertex(vertex)
    }

    /// Vertex the edge points toward
    pub fn in_vertex(&self) -> Result<VertexFrame> {
        let vertex = self.graph.store().require_vertex(&self.edge.in_vertex)?;
        self.graph.frame_vertex(vertex)
    }

    pub fn remove(self) -> Result<()> {
        self.graph.store().remove_edge(self.id())
    }
}
