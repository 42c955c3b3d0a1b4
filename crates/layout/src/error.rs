use crate::graph::{EdgeId, VertexId};

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("topology must contain at least one vertex")]
    EmptyGraph,
    #[error("edge {edge} references vertex {vertex}, but the graph has {vertex_count} vertices")]
    VertexOutOfRange {
        edge: EdgeId,
        vertex: VertexId,
        vertex_count: usize,
    },
    #[error("edge {edge} is a self-loop on vertex {vertex}")]
    SelfLoop { edge: EdgeId, vertex: VertexId },
    #[error("expected {expected} labels, found {found}")]
    LabelCount { expected: usize, found: usize },
    #[error("expected {expected} colors, found {found}")]
    ColorCount { expected: usize, found: usize },
    #[error("vertex {vertex} does not exist (graph has {vertex_count} vertices)")]
    UnknownVertex {
        vertex: VertexId,
        vertex_count: usize,
    },
    #[error("edge {edge} does not exist (graph has {edge_count} edges)")]
    UnknownEdge { edge: EdgeId, edge_count: usize },
    #[error("invalid viewport: {0}")]
    InvalidViewport(String),
    #[error("invalid force parameter: {0}")]
    InvalidForceParams(String),
    #[error("malformed KDL topology: {0}")]
    MalformedKdl(String),
    #[error(transparent)]
    Kdl(#[from] kdl::KdlError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
