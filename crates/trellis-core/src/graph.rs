//! Framed graph handle and class initializers

use crate::element::{Edge, ElementId, ElementKind, Properties, Vertex};
use crate::error::Result;
use crate::frame::{EdgeFrame, Framed, VertexFrame};
use crate::limits;
use crate::mutation::MutationEngine;
use crate::store::GraphStore;
use crate::types::{FrameType, TypeResolver, UntypedTypeResolver};
use std::sync::Arc;

/// Handle pairing a graph store with the resolver used to type its elements
///
/// Cheap to clone; every frame carries one.
#[derive(Clone)]
pub struct FramedGraph {
    store: Arc<dyn GraphStore>,
    resolver: Arc<dyn TypeResolver>,
}

impl std::fmt::Debug for FramedGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramedGraph").finish_non_exhaustive()
    }
}

impl FramedGraph {
    pub fn new(store: Arc<dyn GraphStore>, resolver: Arc<dyn TypeResolver>) -> Self {
        Self { store, resolver }
    }

    /// Graph whose elements are never type-checked
    pub fn untyped(store: Arc<dyn GraphStore>) -> Self {
        Self::new(store, Arc::new(UntypedTypeResolver))
    }

    pub fn store(&self) -> &dyn GraphStore {
        self.store.as_ref()
    }

    pub fn resolver(&self) -> &dyn TypeResolver {
        self.resolver.as_ref()
    }

    /// Wrap a stored vertex, resolving its frame type
    pub fn frame_vertex(&self, vertex: Vertex) -> Result<VertexFrame> {
        let frame_type = self.resolver.resolve(&vertex)?;
        Ok(VertexFrame::new(self.clone(), vertex, frame_type))
    }

    /// Wrap a stored edge, resolving its frame type
    pub fn frame_edge(&self, edge: Edge) -> Result<EdgeFrame> {
        let frame_type = self.resolver.resolve(&edge)?;
        Ok(EdgeFrame::new(self.clone(), edge, frame_type))
    }

    pub fn vertex(&self, id: &ElementId) -> Result<Option<VertexFrame>> {
        self.store.vertex(id)?.map(|v| self.frame_vertex(v)).transpose()
    }

    pub fn edge(&self, id: &ElementId) -> Result<Option<EdgeFrame>> {
        self.store.edge(id)?.map(|e| self.frame_edge(e)).transpose()
    }

    /// Create a vertex, optionally shaped by an initializer
    pub fn add_vertex(&self, initializer: Option<&ClassInitializer>) -> Result<VertexFrame> {
        MutationEngine::add_vertex(self, initializer)
    }

    /// Create a vertex typed as `T`
    pub fn add_framed_vertex<T: Framed>(&self) -> Result<T> {
        let initializer = ClassInitializer::for_type::<T>();
        self.add_vertex(Some(&initializer)).map(T::from)
    }

    /// Create an edge `out_vertex -[label]-> in_vertex`
    pub fn add_edge(
        &self,
        out_vertex: &VertexFrame,
        in_vertex: &VertexFrame,
        label: &str,
        initializer: Option<&ClassInitializer>,
    ) -> Result<EdgeFrame> {
        MutationEngine::add_edge(self, out_vertex, in_vertex, label, initializer)
    }
}

/// Factory descriptor for a new vertex or edge
///
/// The created element is exposed as `initialization_type`. A label override
/// applies to vertices only; edges always take the relationship label.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInitializer {
    initialization_type: FrameType,
    label: Option<String>,
    properties: Properties,
}

impl ClassInitializer {
    pub fn new(initialization_type: impl Into<FrameType>) -> Self {
        Self {
            initialization_type: initialization_type.into(),
            label: None,
            properties: Properties::new(),
        }
    }

    /// Initializer producing frames of the compile-time type `T`
    pub fn for_type<T: Framed>() -> Self {
        Self::new(T::TYPE_NAME)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn initialization_type(&self) -> &FrameType {
        &self.initialization_type
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Check the initializer against the resolver before anything is written
    pub(crate) fn validate(&self, resolver: &dyn TypeResolver, kind: ElementKind) -> Result<()> {
        resolver.validate_initializer(&self.initialization_type, kind)?;
        if let Some(label) = &self.label {
            limits::validate_label(label)?;
        }
        for key in self.properties.keys() {
            limits::validate_property_key(key)?;
        }
        Ok(())
    }

    /// Initial properties with type metadata stamped in
    pub(crate) fn initial_properties(&self, resolver: &dyn TypeResolver) -> Properties {
        let mut properties = self.properties.clone();
        resolver.init(&mut properties, &self.initialization_type);
        properties
    }
}
