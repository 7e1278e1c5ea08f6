//! Test fixtures: an instrumented in-process store and a small typed schema

use crate::adjacency::Direction;
use crate::element::{Edge, ElementId, Properties, Vertex, DEFAULT_VERTEX_LABEL};
use crate::error::{Error, Result};
use crate::frame::{Framed, VertexFrame};
use crate::graph::FramedGraph;
use crate::store::{ElementIter, GraphStore};
use crate::types::{PolymorphicTypeResolver, TypeRegistry, EDGE_ROOT, VERTEX_ROOT};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const NO_FAILURE: usize = usize::MAX;

/// Vec-backed store that counts element loads and writes, and can be told
/// to start failing writes.
#[derive(Default)]
pub(crate) struct RecordingStore {
    vertices: Mutex<Vec<Vertex>>,
    edges: Mutex<Vec<Edge>>,
    vertex_loads: AtomicUsize,
    edge_loads: AtomicUsize,
    writes: AtomicUsize,
    writes_allowed: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        let store = Self::default();
        store.writes_allowed.store(NO_FAILURE, Ordering::SeqCst);
        store
    }

    pub fn vertex_loads(&self) -> usize {
        self.vertex_loads.load(Ordering::SeqCst)
    }

    pub fn edge_loads(&self) -> usize {
        self.edge_loads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn reset_counters(&self) {
        self.vertex_loads.store(0, Ordering::SeqCst);
        self.edge_loads.store(0, Ordering::SeqCst);
    }

    /// Let `n` more writes succeed, then fail every write
    pub fn fail_after_writes(&self, n: usize) {
        self.writes_allowed.store(n, Ordering::SeqCst);
    }

    pub fn clear_failure(&self) {
        self.writes_allowed.store(NO_FAILURE, Ordering::SeqCst);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.lock().unwrap().len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.lock().unwrap().len()
    }

    fn begin_write(&self) -> Result<()> {
        let allowed = self.writes_allowed.load(Ordering::SeqCst);
        if allowed == 0 {
            return Err(Error::Storage("injected write failure".to_string()));
        }
        if allowed != NO_FAILURE {
            self.writes_allowed.store(allowed - 1, Ordering::SeqCst);
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl GraphStore for RecordingStore {
    fn add_vertex(&self, label: Option<&str>, properties: Properties) -> Result<Vertex> {
        self.begin_write()?;
        let vertex = Vertex::new(label.unwrap_or(DEFAULT_VERTEX_LABEL)).with_properties(properties);
        self.vertices.lock().unwrap().push(vertex.clone());
        Ok(vertex)
    }

    fn add_edge(
        &self,
        out_vertex: &ElementId,
        in_vertex: &ElementId,
        label: &str,
        properties: Properties,
    ) -> Result<Edge> {
        self.require_vertex(out_vertex)?;
        self.require_vertex(in_vertex)?;
        self.begin_write()?;
        let edge = Edge::new(*out_vertex, *in_vertex, label).with_properties(properties);
        self.edges.lock().unwrap().push(edge.clone());
        Ok(edge)
    }

    fn set_property(&self, id: &ElementId, key: &str, value: serde_json::Value) -> Result<()> {
        self.begin_write()?;
        let mut vertices = self.vertices.lock().unwrap();
        if let Some(v) = vertices.iter_mut().find(|v| v.id == *id) {
            v.properties.insert(key.to_string(), value);
            return Ok(());
        }
        let mut edges = self.edges.lock().unwrap();
        match edges.iter_mut().find(|e| e.id == *id) {
            Some(e) => {
                e.properties.insert(key.to_string(), value);
                Ok(())
            }
            None => Err(Error::VertexNotFound(id.to_string())),
        }
    }

    fn remove_edge(&self, id: &ElementId) -> Result<()> {
        self.begin_write()?;
        let mut edges = self.edges.lock().unwrap();
        let before = edges.len();
        edges.retain(|e| e.id != *id);
        if edges.len() == before {
            return Err(Error::EdgeNotFound(id.to_string()));
        }
        Ok(())
    }

    fn remove_vertex(&self, id: &ElementId) -> Result<()> {
        self.begin_write()?;
        self.edges.lock().unwrap().retain(|e| !e.touches(id));
        self.vertices.lock().unwrap().retain(|v| v.id != *id);
        Ok(())
    }

    fn vertex(&self, id: &ElementId) -> Result<Option<Vertex>> {
        self.vertex_loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.vertices.lock().unwrap().iter().find(|v| v.id == *id).cloned())
    }

    fn edge(&self, id: &ElementId) -> Result<Option<Edge>> {
        self.edge_loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.edges.lock().unwrap().iter().find(|e| e.id == *id).cloned())
    }

    fn adjacent_edges<'a>(
        &'a self,
        vertex: &ElementId,
        direction: Direction,
        label: &str,
    ) -> Result<ElementIter<'a, Edge>> {
        let ids: Vec<ElementId> = self
            .edges
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.label == label)
            .filter(|e| match direction {
                Direction::Out => e.out_vertex == *vertex,
                Direction::In => e.in_vertex == *vertex,
                Direction::Both => e.touches(vertex),
            })
            .map(|e| e.id)
            .collect();

        Ok(Box::new(ids.into_iter().filter_map(move |id| {
            self.edge(&id).transpose()
        })))
    }
}

/// Compile-time frame type used across the engine tests
#[derive(Debug, Clone)]
pub(crate) struct Person(VertexFrame);

impl From<VertexFrame> for Person {
    fn from(frame: VertexFrame) -> Self {
        Self(frame)
    }
}

impl Framed for Person {
    const TYPE_NAME: &'static str = "Person";

    fn frame(&self) -> &VertexFrame {
        &self.0
    }
}

/// Typed graph over a fresh [`RecordingStore`]:
/// `Person <: Vertex`, `Programmer <: Person`, `Knows <: Edge`
pub(crate) fn person_graph() -> (FramedGraph, Arc<RecordingStore>) {
    let mut registry = TypeRegistry::new();
    registry
        .register_all([
            ("Person", VERTEX_ROOT),
            ("Programmer", "Person"),
            ("Knows", EDGE_ROOT),
        ])
        .unwrap();
    let store = Arc::new(RecordingStore::new());
    let graph = FramedGraph::new(
        store.clone(),
        Arc::new(PolymorphicTypeResolver::new(registry)),
    );
    (graph, store)
}
