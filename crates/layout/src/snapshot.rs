//! Read-only views handed to renderers. A renderer keeps no reference into
//! the simulation; it asks for a fresh snapshot every frame.

use serde::{Deserialize, Serialize};

use crate::engine::RunState;
use crate::graph::{EdgeId, VertexId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexView {
    pub id: VertexId,
    pub position: Vec<f64>,
    /// Apparent size; tracks depth in 3D.
    pub radius: f64,
    pub fixed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeView {
    pub id: EdgeId,
    pub from: VertexId,
    pub to: VertexId,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub step: u64,
    pub temperature: f64,
    pub state: RunState,
    pub vertices: Vec<VertexView>,
    pub edges: Vec<EdgeView>,
}

impl Snapshot {
    pub fn fixed_vertices(&self) -> impl Iterator<Item = &VertexView> {
        self.vertices.iter().filter(|v| v.fixed)
    }

    pub fn visible_edges(&self) -> impl Iterator<Item = &EdgeView> {
        self.edges.iter().filter(|e| !e.hidden)
    }
}
