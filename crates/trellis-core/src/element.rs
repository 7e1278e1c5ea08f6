//! Graph element (vertex and edge) types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use ulid::Ulid;

/// Label given to vertices created without one
pub const DEFAULT_VERTEX_LABEL: &str = "vertex";

/// Label given to edges created without one
pub const DEFAULT_EDGE_LABEL: &str = "edge";

/// Mutable property bag attached to every element
pub type Properties = HashMap<String, serde_json::Value>;

/// Unique identifier for a vertex or an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub Ulid);

impl ElementId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ElementId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

/// Which kind of element something is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Vertex,
    Edge,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Edge => write!(f, "edge"),
        }
    }
}

/// A vertex in the property graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Unique identifier
    pub id: ElementId,

    /// Vertex label
    pub label: String,

    /// Arbitrary properties
    #[serde(default)]
    pub properties: Properties,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Vertex {
    /// Create a vertex with a fresh id
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: ElementId::new(),
            label: label.into(),
            properties: Properties::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }
}

/// A directed edge between two vertices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier
    pub id: ElementId,

    /// Relationship label (e.g., "knows", "owns")
    pub label: String,

    /// Vertex the edge points away from
    pub out_vertex: ElementId,

    /// Vertex the edge points toward
    pub in_vertex: ElementId,

    /// Arbitrary properties
    #[serde(default)]
    pub properties: Properties,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Edge {
    /// Create an edge `out_vertex -[label]-> in_vertex` with a fresh id
    pub fn new(out_vertex: ElementId, in_vertex: ElementId, label: impl Into<String>) -> Self {
        Self {
            id: ElementId::new(),
            label: label.into(),
            out_vertex,
            in_vertex,
            properties: Properties::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// The endpoint on the other side of `vertex`.
    ///
    /// For a self-loop both endpoints are `vertex`, so `vertex` is returned.
    pub fn opposite(&self, vertex: &ElementId) -> ElementId {
        if self.out_vertex == *vertex {
            self.in_vertex
        } else {
            self.out_vertex
        }
    }

    /// Whether `vertex` is one of the two endpoints
    pub fn touches(&self, vertex: &ElementId) -> bool {
        self.out_vertex == *vertex || self.in_vertex == *vertex
    }
}

/// Read access shared by every element type
pub trait GraphElement {
    fn id(&self) -> &ElementId;
    fn label(&self) -> &str;
    fn properties(&self) -> &Properties;
    fn kind(&self) -> ElementKind;

    fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties().get(key)
    }
}

impl GraphElement for Vertex {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Vertex
    }
}

impl GraphElement for Edge {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Edge
    }
}

/// Either kind of graph element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Element {
    Vertex(Vertex),
    Edge(Edge),
}

impl GraphElement for Element {
    fn id(&self) -> &ElementId {
        match self {
            Self::Vertex(v) => &v.id,
            Self::Edge(e) => &e.id,
        }
    }

    fn label(&self) -> &str {
        match self {
            Self::Vertex(v) => &v.label,
            Self::Edge(e) => &e.label,
        }
    }

    fn properties(&self) -> &Properties {
        match self {
            Self::Vertex(v) => &v.properties,
            Self::Edge(e) => &e.properties,
        }
    }

    fn kind(&self) -> ElementKind {
        match self {
            Self::Vertex(_) => ElementKind::Vertex,
            Self::Edge(_) => ElementKind::Edge,
        }
    }
}

impl From<Vertex> for Element {
    fn from(v: Vertex) -> Self {
        Self::Vertex(v)
    }
}

impl From<Edge> for Element {
    fn from(e: Edge) -> Self {
        Self::Edge(e)
    }
}
