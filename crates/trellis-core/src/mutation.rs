//! Adjacency mutation: vertex creation, edge linking, edge-set replacement
//! and edge removal.
//!
//! Every operation validates its inputs before the first write and then
//! issues writes to the store immediately, one primitive call at a time.
//! There is no rollback. If a write fails after earlier writes of the same
//! operation succeeded, the error comes back as
//! [`Error::PartialMutation`] and the graph keeps whatever was applied.

use crate::adjacency::{AdjacencyRequest, Direction};
use crate::element::{ElementId, ElementKind, Properties};
use crate::error::{Error, Result};
use crate::frame::{EdgeFrame, VertexFrame};
use crate::graph::{ClassInitializer, FramedGraph};
use crate::limits;
use crate::traversal::{far_end, TraversalEngine};
use serde::{Deserialize, Serialize};

/// Edge counts of what an edge-set mutation changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationStats {
    pub edges_added: usize,
    pub edges_removed: usize,
}

/// Tracks applied writes so a late failure can be reported as partial
struct Progress {
    operation: &'static str,
    applied: usize,
}

impl Progress {
    fn new(operation: &'static str) -> Self {
        Self {
            operation,
            applied: 0,
        }
    }

    fn write<T>(&mut self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.applied += 1;
                Ok(value)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&self, err: Error) -> Error {
        if self.applied == 0 {
            return err;
        }
        tracing::warn!(
            "{} failed after {} applied write(s); graph left partially updated: {}",
            self.operation,
            self.applied,
            err
        );
        Error::PartialMutation {
            operation: self.operation,
            applied: self.applied,
            source: Box::new(err),
        }
    }
}

/// Edges to create, as `(out_vertex, in_vertex)` pairs, for linking `peer`
/// to `source` in `direction`.
///
/// `Both` is two directed edges, peer to source first.
fn link_plan(direction: Direction, source: ElementId, peer: ElementId) -> Vec<(ElementId, ElementId)> {
    match direction {
        Direction::Out => vec![(source, peer)],
        Direction::In => vec![(peer, source)],
        Direction::Both => vec![(peer, source), (source, peer)],
    }
}

/// Graph-mutating adjacency operations
pub struct MutationEngine;

impl MutationEngine {
    /// Create a vertex, typed and labeled per `initializer` when given
    pub fn add_vertex(graph: &FramedGraph, initializer: Option<&ClassInitializer>) -> Result<VertexFrame> {
        let Some(initializer) = initializer else {
            let vertex = graph.store().add_vertex(None, Properties::new())?;
            tracing::debug!("Added vertex {}", vertex.id);
            return graph.frame_vertex(vertex);
        };

        initializer.validate(graph.resolver(), ElementKind::Vertex)?;
        let properties = initializer.initial_properties(graph.resolver());
        let vertex = graph.store().add_vertex(initializer.label(), properties)?;
        tracing::debug!(
            "Added vertex {} as {}",
            vertex.id,
            initializer.initialization_type()
        );

        Ok(VertexFrame::new(
            graph.clone(),
            vertex,
            initializer.initialization_type().clone(),
        ))
    }

    /// Create one edge `out_vertex -[label]-> in_vertex`
    pub fn add_edge(
        graph: &FramedGraph,
        out_vertex: &VertexFrame,
        in_vertex: &VertexFrame,
        label: &str,
        initializer: Option<&ClassInitializer>,
    ) -> Result<EdgeFrame> {
        limits::validate_label(label)?;
        if let Some(init) = initializer {
            init.validate(graph.resolver(), ElementKind::Edge)?;
        }
        Self::write_edge(graph, out_vertex.id(), in_vertex.id(), label, initializer)
    }

    /// Connect `peer` to the request's source.
    ///
    /// `Out` creates source→peer, `In` creates peer→source, and `Both`
    /// creates both edges (peer→source first).
    pub fn link(
        request: &AdjacencyRequest<'_>,
        peer: &VertexFrame,
        edge_initializer: Option<&ClassInitializer>,
    ) -> Result<Vec<EdgeFrame>> {
        let graph = request.source.graph();
        if let Some(init) = edge_initializer {
            init.validate(graph.resolver(), ElementKind::Edge)?;
        }

        let mut progress = Progress::new("link");
        let edges = Self::link_with(&mut progress, request, peer.id(), edge_initializer)?;
        tracing::debug!(
            "Linked {} -[{}]- {} ({}): {} edge(s)",
            request.source_id(),
            request.label,
            peer.id(),
            request.direction,
            edges.len()
        );
        Ok(edges)
    }

    /// Create a vertex and link it to the request's source
    pub fn add_adjacent_vertex(
        request: &AdjacencyRequest<'_>,
        vertex_initializer: Option<&ClassInitializer>,
        edge_initializer: Option<&ClassInitializer>,
    ) -> Result<VertexFrame> {
        let graph = request.source.graph();
        if let Some(init) = vertex_initializer {
            init.validate(graph.resolver(), ElementKind::Vertex)?;
        }
        if let Some(init) = edge_initializer {
            init.validate(graph.resolver(), ElementKind::Edge)?;
        }

        let mut progress = Progress::new("add_adjacent_vertex");
        let vertex = progress.write(Self::add_vertex(graph, vertex_initializer))?;
        Self::link_with(&mut progress, request, vertex.id(), edge_initializer)?;
        Ok(vertex)
    }

    /// Delete every edge matching the request, then link each of `peers`.
    ///
    /// For `Both`, every `label` edge touching the source is deleted whatever
    /// its orientation, and each peer gets two new edges.
    pub fn replace_edge_set(request: &AdjacencyRequest<'_>, peers: &[VertexFrame]) -> Result<MutationStats> {
        limits::validate_peer_count(peers.len())?;
        let store = request.source.graph().store();
        let stale = TraversalEngine::matching_edges(request)?;

        let mut progress = Progress::new("replace_edge_set");
        let mut stats = MutationStats::default();

        for (_, edge) in &stale {
            progress.write(store.remove_edge(&edge.id))?;
            stats.edges_removed += 1;
        }
        for peer in peers {
            let created = Self::link_with(&mut progress, request, peer.id(), None)?;
            stats.edges_added += created.len();
        }

        tracing::debug!(
            "Replaced {} -[{}]- {}: removed {}, added {}",
            request.source_id(),
            request.label,
            request.direction,
            stats.edges_removed,
            stats.edges_added
        );
        Ok(stats)
    }

    /// Delete edges matching the request whose opposite endpoint is the
    /// request's peer, or every matching edge when no peer is set.
    ///
    /// The opposite endpoint is taken from each edge's actual orientation:
    /// the in-vertex of an outgoing edge, the out-vertex of an incoming one.
    pub fn remove_edges(request: &AdjacencyRequest<'_>) -> Result<MutationStats> {
        let store = request.source.graph().store();
        let candidates = TraversalEngine::matching_edges(request)?;

        let mut progress = Progress::new("remove_edges");
        let mut stats = MutationStats::default();

        for (side, edge) in &candidates {
            if request.peer.map_or(true, |peer| peer == far_end(*side, edge)) {
                progress.write(store.remove_edge(&edge.id))?;
                stats.edges_removed += 1;
            }
        }

        tracing::debug!(
            "Removed {} edge(s) {} -[{}]- {} (peer={:?})",
            stats.edges_removed,
            request.source_id(),
            request.label,
            request.direction,
            request.peer.map(|p| p.to_string())
        );
        Ok(stats)
    }

    fn link_with(
        progress: &mut Progress,
        request: &AdjacencyRequest<'_>,
        peer: &ElementId,
        edge_initializer: Option<&ClassInitializer>,
    ) -> Result<Vec<EdgeFrame>> {
        let graph = request.source.graph();
        link_plan(request.direction, *request.source_id(), *peer)
            .into_iter()
            .map(|(out_vertex, in_vertex)| {
                progress.write(Self::write_edge(
                    graph,
                    &out_vertex,
                    &in_vertex,
                    &request.label,
                    edge_initializer,
                ))
            })
            .collect()
    }

    fn write_edge(
        graph: &FramedGraph,
        out_vertex: &ElementId,
        in_vertex: &ElementId,
        label: &str,
        initializer: Option<&ClassInitializer>,
    ) -> Result<EdgeFrame> {
        let properties = initializer
            .map(|init| init.initial_properties(graph.resolver()))
            .unwrap_or_default();
        let edge = graph.store().add_edge(out_vertex, in_vertex, label, properties)?;

        match initializer {
            Some(init) => Ok(EdgeFrame::new(
                graph.clone(),
                edge,
                init.initialization_type().clone(),
            )),
            None => graph.frame_edge(edge),
        }
    }
}
