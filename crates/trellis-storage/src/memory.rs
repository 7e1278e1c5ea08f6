//! In-memory graph store
//!
//! Useful for testing and for short-lived graphs. Adjacency is kept per
//! vertex, per side and per label in insertion order, so adjacency queries
//! return edges in the order they were created.

use crate::error::{StorageError, StorageResult};
use crate::traits::{Side, StorageBackend};
use std::collections::HashMap;
use std::sync::RwLock;
use trellis_core::{
    Direction, Edge, ElementId, ElementIter, GraphStore, Properties, Result, Vertex,
    DEFAULT_VERTEX_LABEL,
};

/// Edge ids touching one vertex, keyed by label
#[derive(Debug, Default)]
struct Adjacency {
    out: HashMap<String, Vec<ElementId>>,
    incoming: HashMap<String, Vec<ElementId>>,
}

impl Adjacency {
    fn side(&self, side: Side) -> &HashMap<String, Vec<ElementId>> {
        match side {
            Side::Out => &self.out,
            Side::In => &self.incoming,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut HashMap<String, Vec<ElementId>> {
        match side {
            Side::Out => &mut self.out,
            Side::In => &mut self.incoming,
        }
    }

    fn snapshot(&self, direction: Direction, label: &str) -> Vec<ElementId> {
        Side::of(direction)
            .iter()
            .flat_map(|&side| self.side(side).get(label).cloned().unwrap_or_default())
            .collect()
    }

    fn all_edges(&self) -> impl Iterator<Item = &ElementId> {
        self.out.values().chain(self.incoming.values()).flatten()
    }

    fn attach(&mut self, side: Side, label: &str, edge: ElementId) {
        self.side_mut(side).entry(label.to_string()).or_default().push(edge);
    }

    fn detach(&mut self, side: Side, label: &str, edge: &ElementId) {
        if let Some(ids) = self.side_mut(side).get_mut(label) {
            ids.retain(|id| id != edge);
        }
    }
}

/// In-memory graph store
///
/// Locks are always taken in the order vertices, edges, adjacency.
pub struct MemoryGraphStore {
    vertices: RwLock<HashMap<ElementId, Vertex>>,
    edges: RwLock<HashMap<ElementId, Edge>>,
    adjacency: RwLock<HashMap<ElementId, Adjacency>>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self {
            vertices: RwLock::new(HashMap::new()),
            edges: RwLock::new(HashMap::new()),
            adjacency: RwLock::new(HashMap::new()),
        }
    }

    fn unlink(adjacency: &mut HashMap<ElementId, Adjacency>, edge: &Edge) {
        if let Some(adj) = adjacency.get_mut(&edge.out_vertex) {
            adj.detach(Side::Out, &edge.label, &edge.id);
        }
        if let Some(adj) = adjacency.get_mut(&edge.in_vertex) {
            adj.detach(Side::In, &edge.label, &edge.id);
        }
    }

    fn snapshot(&self, vertex: &ElementId, direction: Direction, label: &str) -> StorageResult<Vec<ElementId>> {
        let adjacency = self.adjacency.read().map_err(StorageError::lock)?;
        Ok(adjacency
            .get(vertex)
            .map(|adj| adj.snapshot(direction, label))
            .unwrap_or_default())
    }
}

impl Default for MemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore for MemoryGraphStore {
    fn add_vertex(&self, label: Option<&str>, properties: Properties) -> Result<Vertex> {
        let vertex = Vertex::new(label.unwrap_or(DEFAULT_VERTEX_LABEL)).with_properties(properties);

        let mut vertices = self.vertices.write().map_err(StorageError::lock)?;
        let mut adjacency = self.adjacency.write().map_err(StorageError::lock)?;
        vertices.insert(vertex.id, vertex.clone());
        adjacency.insert(vertex.id, Adjacency::default());

        Ok(vertex)
    }

    fn add_edge(
        &self,
        out_vertex: &ElementId,
        in_vertex: &ElementId,
        label: &str,
        properties: Properties,
    ) -> Result<Edge> {
        let vertices = self.vertices.read().map_err(StorageError::lock)?;
        for endpoint in [out_vertex, in_vertex] {
            if !vertices.contains_key(endpoint) {
                return Err(StorageError::VertexNotFound(endpoint.to_string()).into());
            }
        }

        let edge = Edge::new(*out_vertex, *in_vertex, label).with_properties(properties);
        let mut edges = self.edges.write().map_err(StorageError::lock)?;
        let mut adjacency = self.adjacency.write().map_err(StorageError::lock)?;

        edges.insert(edge.id, edge.clone());
        adjacency.entry(*out_vertex).or_default().attach(Side::Out, label, edge.id);
        adjacency.entry(*in_vertex).or_default().attach(Side::In, label, edge.id);

        Ok(edge)
    }

    fn set_property(&self, id: &ElementId, key: &str, value: serde_json::Value) -> Result<()> {
        let mut vertices = self.vertices.write().map_err(StorageError::lock)?;
        if let Some(vertex) = vertices.get_mut(id) {
            vertex.properties.insert(key.to_string(), value);
            return Ok(());
        }

        let mut edges = self.edges.write().map_err(StorageError::lock)?;
        match edges.get_mut(id) {
            Some(edge) => {
                edge.properties.insert(key.to_string(), value);
                Ok(())
            }
            None => Err(StorageError::VertexNotFound(id.to_string()).into()),
        }
    }

    fn remove_edge(&self, id: &ElementId) -> Result<()> {
        let mut edges = self.edges.write().map_err(StorageError::lock)?;
        let mut adjacency = self.adjacency.write().map_err(StorageError::lock)?;

        let edge = edges
            .remove(id)
            .ok_or_else(|| StorageError::EdgeNotFound(id.to_string()))?;
        Self::unlink(&mut adjacency, &edge);
        Ok(())
    }

    fn remove_vertex(&self, id: &ElementId) -> Result<()> {
        let mut vertices = self.vertices.write().map_err(StorageError::lock)?;
        let mut edges = self.edges.write().map_err(StorageError::lock)?;
        let mut adjacency = self.adjacency.write().map_err(StorageError::lock)?;

        if vertices.remove(id).is_none() {
            return Err(StorageError::VertexNotFound(id.to_string()).into());
        }

        let touching: Vec<ElementId> = adjacency
            .get(id)
            .map(|adj| adj.all_edges().copied().collect())
            .unwrap_or_default();
        for edge_id in touching {
            if let Some(edge) = edges.remove(&edge_id) {
                Self::unlink(&mut adjacency, &edge);
            }
        }
        adjacency.remove(id);

        Ok(())
    }

    fn vertex(&self, id: &ElementId) -> Result<Option<Vertex>> {
        let vertices = self.vertices.read().map_err(StorageError::lock)?;
        Ok(vertices.get(id).cloned())
    }

    fn edge(&self, id: &ElementId) -> Result<Option<Edge>> {
        let edges = self.edges.read().map_err(StorageError::lock)?;
        Ok(edges.get(id).cloned())
    }

    fn adjacent_edges<'a>(
        &'a self,
        vertex: &ElementId,
        direction: Direction,
        label: &str,
    ) -> Result<ElementIter<'a, Edge>> {
        let ids = self.snapshot(vertex, direction, label)?;
        // Edges removed after the snapshot are skipped
        Ok(Box::new(ids.into_iter().filter_map(move |id| self.edge(&id).transpose())))
    }
}

impl StorageBackend for MemoryGraphStore {
    fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }

    fn vertices(&self) -> StorageResult<Vec<Vertex>> {
        let vertices = self.vertices.read().map_err(StorageError::lock)?;
        let mut all: Vec<Vertex> = vertices.values().cloned().collect();
        all.sort_by_key(|v| v.id);
        Ok(all)
    }

    fn edges(&self) -> StorageResult<Vec<Edge>> {
        let edges = self.edges.read().map_err(StorageError::lock)?;
        let mut all: Vec<Edge> = edges.values().cloned().collect();
        all.sort_by_key(|e| e.id);
        Ok(all)
    }
}
