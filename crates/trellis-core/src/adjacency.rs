//! Direction and the adjacency request passed to the engines

use crate::element::ElementId;
use crate::error::{Error, Result};
use crate::frame::VertexFrame;
use crate::limits;
use crate::types::FrameType;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Direction of an adjacency relative to its source vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Edges pointing away from the source
    Out,
    /// Edges pointing toward the source
    In,
    /// Both of the above, outgoing first
    Both,
}

impl Direction {
    /// The single-sided directions a query in this direction expands to,
    /// in the order their results are yielded.
    pub fn sides(self) -> &'static [Direction] {
        match self {
            Self::Out => &[Self::Out],
            Self::In => &[Self::In],
            Self::Both => &[Self::Out, Self::In],
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Out => write!(f, "out"),
            Self::In => write!(f, "in"),
            Self::Both => write!(f, "both"),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "out" | "outgoing" => Ok(Self::Out),
            "in" | "incoming" => Ok(Self::In),
            "both" => Ok(Self::Both),
            other => Err(Error::configuration(format!(
                "direction not recognized: '{}' (expected in, out or both)",
                other
            ))),
        }
    }
}

/// One adjacency operation: a source vertex, a direction, a label, and the
/// optional target-type and peer filters.
///
/// Built once per call and never stored.
#[derive(Debug, Clone)]
pub struct AdjacencyRequest<'a> {
    pub source: &'a VertexFrame,
    pub direction: Direction,
    pub label: String,
    pub target_type: Option<FrameType>,
    pub peer: Option<ElementId>,
}

impl<'a> AdjacencyRequest<'a> {
    pub fn new(source: &'a VertexFrame, direction: Direction, label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        limits::validate_label(&label)?;
        Ok(Self {
            source,
            direction,
            label,
            target_type: None,
            peer: None,
        })
    }

    /// Build a request from an untyped direction name, as read from
    /// configuration or a command line.
    pub fn parse(source: &'a VertexFrame, direction: &str, label: impl Into<String>) -> Result<Self> {
        Self::new(source, direction.parse()?, label)
    }

    /// Only yield targets assignable to `target_type`
    pub fn of_type(mut self, target_type: impl Into<FrameType>) -> Self {
        self.target_type = Some(target_type.into());
        self
    }

    /// Only touch edges whose opposite endpoint is `peer`
    pub fn with_peer(mut self, peer: &VertexFrame) -> Self {
        self.peer = Some(*peer.id());
        self
    }

    pub fn source_id(&self) -> &ElementId {
        self.source.id()
    }
}
