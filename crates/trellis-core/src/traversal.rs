//! Adjacency traversal
//!
//! All direction dispatch happens here: a request in [`Direction::Both`] is
//! answered as the outgoing results followed by the incoming results, with
//! no deduplication. Results are lazy, single-use iterators; each call runs
//! the query again against the current graph state.

use crate::adjacency::{AdjacencyRequest, Direction};
use crate::element::{Edge, ElementId, Vertex};
use crate::error::Result;
use crate::frame::{EdgeFrame, VertexFrame};
use crate::graph::FramedGraph;
use crate::store::ElementIter;
use crate::types::{filter_by_type, FrameType};

/// The endpoint of `edge` across from the source, given the single side
/// (`Out` or `In`) the edge was found on.
pub(crate) fn far_end(side: Direction, edge: &Edge) -> ElementId {
    match side {
        Direction::In => edge.out_vertex,
        Direction::Out | Direction::Both => edge.in_vertex,
    }
}

/// Lazy sequence of adjacent vertices
pub struct Traversal<'a> {
    graph: &'a FramedGraph,
    vertices: ElementIter<'a, Vertex>,
}

impl<'a> Traversal<'a> {
    /// Drain into frames, stopping at the first error
    pub fn into_frames(self) -> Result<Vec<VertexFrame>> {
        self.collect()
    }

    /// Drain into element ids, stopping at the first error
    pub fn ids(self) -> Result<Vec<ElementId>> {
        self.map(|frame| frame.map(|f| *f.id())).collect()
    }
}

impl Iterator for Traversal<'_> {
    type Item = Result<VertexFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        let vertex = self.vertices.next()?;
        Some(vertex.and_then(|v| self.graph.frame_vertex(v)))
    }
}

/// Lazy sequence of adjacent edges
pub struct EdgeTraversal<'a> {
    graph: &'a FramedGraph,
    edges: ElementIter<'a, Edge>,
}

impl<'a> EdgeTraversal<'a> {
    pub fn into_frames(self) -> Result<Vec<EdgeFrame>> {
        self.collect()
    }
}

impl Iterator for EdgeTraversal<'_> {
    type Item = Result<EdgeFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        let edge = self.edges.next()?;
        Some(edge.and_then(|e| self.graph.frame_edge(e)))
    }
}

/// Read-only adjacency queries
pub struct TraversalEngine;

impl TraversalEngine {
    /// Vertices one `label` edge away from the source.
    ///
    /// Honors the request's peer and target type when they are set.
    pub fn traverse<'a>(request: &AdjacencyRequest<'a>) -> Result<Traversal<'a>> {
        let graph = request.source.graph();
        tracing::debug!(
            "Traversing {} -[{}]- {} (type={:?})",
            request.source_id(),
            request.label,
            request.direction,
            request.target_type
        );

        let vertices = Self::adjacent_vertices(graph, request.source_id(), request.direction, &request.label)?;
        let vertices: ElementIter<'a, Vertex> = match request.peer {
            Some(peer) => Box::new(vertices.filter(move |v| v.as_ref().map_or(true, |v| v.id == peer))),
            None => vertices,
        };
        let vertices: ElementIter<'a, Vertex> = match &request.target_type {
            Some(target) => Box::new(filter_by_type(graph.resolver(), vertices, target.clone())),
            None => vertices,
        };

        Ok(Traversal { graph, vertices })
    }

    /// [`TraversalEngine::traverse`] restricted to targets assignable to `target`
    pub fn traverse_typed<'a>(request: &AdjacencyRequest<'a>, target: FrameType) -> Result<Traversal<'a>> {
        let typed = request.clone().of_type(target);
        Self::traverse(&typed)
    }

    /// First matching vertex, or `None`.
    ///
    /// Pulls from the underlying sequence only until the first match.
    pub fn traverse_singleton(request: &AdjacencyRequest<'_>) -> Result<Option<VertexFrame>> {
        Self::traverse(request)?.next().transpose()
    }

    /// Edges touching the source with the request's label.
    ///
    /// A peer keeps only edges whose far end is that vertex; a target type
    /// keeps only edges assignable to it.
    pub fn traverse_edges<'a>(request: &AdjacencyRequest<'a>) -> Result<EdgeTraversal<'a>> {
        let graph = request.source.graph();
        let store = graph.store();
        let source = *request.source_id();
        tracing::debug!(
            "Listing edges {} -[{}]- {} (type={:?}, peer={:?})",
            source,
            request.label,
            request.direction,
            request.target_type,
            request.peer.map(|p| p.to_string())
        );

        let mut edges: ElementIter<'a, Edge> = Box::new(std::iter::empty());
        for &side in request.direction.sides() {
            let next = store.adjacent_edges(&source, side, &request.label)?;
            let next: ElementIter<'a, Edge> = match request.peer {
                Some(peer) => Box::new(
                    next.filter(move |e| e.as_ref().map_or(true, |e| far_end(side, e) == peer)),
                ),
                None => next,
            };
            edges = Box::new(edges.chain(next));
        }

        let edges: ElementIter<'a, Edge> = match &request.target_type {
            Some(target) => Box::new(filter_by_type(graph.resolver(), edges, target.clone())),
            None => edges,
        };

        Ok(EdgeTraversal { graph, edges })
    }

    /// Materialize every edge matching the request, tagged with the side it
    /// was found on. An edge seen from both sides (a self-loop) is kept once.
    pub(crate) fn matching_edges(request: &AdjacencyRequest<'_>) -> Result<Vec<(Direction, Edge)>> {
        let store = request.source.graph().store();
        let source = *request.source_id();
        let mut seen = std::collections::HashSet::new();
        let mut matched = Vec::new();

        for side in request.direction.sides() {
            for edge in store.adjacent_edges(&source, *side, &request.label)? {
                let edge = edge?;
                if seen.insert(edge.id) {
                    matched.push((*side, edge));
                }
            }
        }

        Ok(matched)
    }

    fn adjacent_vertices<'a>(
        graph: &'a FramedGraph,
        source: &ElementId,
        direction: Direction,
        label: &str,
    ) -> Result<ElementIter<'a, Vertex>> {
        let store = graph.store();
        let mut vertices: ElementIter<'a, Vertex> = Box::new(std::iter::empty());
        for side in direction.sides() {
            let next = store.adjacent_vertices(source, *side, label)?;
            vertices = Box::new(vertices.chain(next));
        }
        Ok(vertices)
    }
}
