use crate::error::{LayoutError, Result};
use crate::vector::Vector;

pub type VertexId = usize;
pub type EdgeId = usize;

/// RGB-like color triple used by color-scaled forces.
pub type ColorTag = [u8; 3];

#[derive(Debug, Clone)]
pub struct Vertex<const D: usize> {
    pub position: Vector<D>,
    /// Force accumulator, reset at the start of every step.
    pub disp: Vector<D>,
    /// Pinned by the user; excluded from force-driven movement.
    pub fixed: bool,
    /// Held by an external drag; excluded from force-driven movement.
    pub suspended: bool,
    pub color: Option<ColorTag>,
    pub label: Option<String>,
    /// Incident edges in the order they were added.
    pub edges: Vec<EdgeId>,
}

impl<const D: usize> Vertex<D> {
    pub fn new(position: Vector<D>) -> Self {
        Self {
            position,
            disp: Vector::zeros(),
            fixed: false,
            suspended: false,
            color: None,
            label: None,
            edges: Vec::new(),
        }
    }

    /// Whether forces are allowed to move this vertex.
    pub fn is_free(&self) -> bool {
        !self.fixed && !self.suspended
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub vertex1: VertexId,
    pub vertex2: VertexId,
    /// Renderer-only; hidden edges still attract.
    pub hidden: bool,
}

impl Edge {
    pub fn new(vertex1: VertexId, vertex2: VertexId) -> Self {
        Self {
            vertex1,
            vertex2,
            hidden: false,
        }
    }

    /// The endpoint opposite to `vertex`.
    pub fn other(&self, vertex: VertexId) -> VertexId {
        if self.vertex1 == vertex {
            self.vertex2
        } else {
            self.vertex1
        }
    }
}

/// Vertices and edges of one loaded topology. Indices are stable for the
/// lifetime of the graph; a reload builds a new `Graph` instead of mutating
/// this one.
#[derive(Debug, Clone)]
pub struct Graph<const D: usize> {
    pub vertices: Vec<Vertex<D>>,
    pub edges: Vec<Edge>,
    /// Scale forces per pair by color distance.
    pub colored: bool,
}

impl<const D: usize> Graph<D> {
    pub fn new(vertices: Vec<Vertex<D>>) -> Self {
        Self {
            vertices,
            edges: Vec::new(),
            colored: false,
        }
    }

    /// Adds an edge and records it on both endpoints. Parallel edges are
    /// accepted; each one contributes its own attraction term.
    pub fn add_edge(&mut self, vertex1: VertexId, vertex2: VertexId) -> Result<EdgeId> {
        let id = self.edges.len();
        for vertex in [vertex1, vertex2] {
            if vertex >= self.vertices.len() {
                return Err(LayoutError::VertexOutOfRange {
                    edge: id,
                    vertex,
                    vertex_count: self.vertices.len(),
                });
            }
        }
        if vertex1 == vertex2 {
            return Err(LayoutError::SelfLoop {
                edge: id,
                vertex: vertex1,
            });
        }
        self.edges.push(Edge::new(vertex1, vertex2));
        self.vertices[vertex1].edges.push(id);
        self.vertices[vertex2].edges.push(id);
        Ok(id)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex(&self, id: VertexId) -> Result<&Vertex<D>> {
        let vertex_count = self.vertices.len();
        self.vertices.get(id).ok_or(LayoutError::UnknownVertex {
            vertex: id,
            vertex_count,
        })
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut Vertex<D>> {
        let vertex_count = self.vertices.len();
        self.vertices.get_mut(id).ok_or(LayoutError::UnknownVertex {
            vertex: id,
            vertex_count,
        })
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge> {
        let edge_count = self.edges.len();
        self.edges
            .get_mut(id)
            .ok_or(LayoutError::UnknownEdge { edge: id, edge_count })
    }

    /// Neighbors of `id`, one entry per incident edge, in edge-add order.
    pub fn neighbors(&self, id: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .get(id)
            .into_iter()
            .flat_map(move |v| v.edges.iter().map(move |&e| self.edges[e].other(id)))
    }

    pub fn positions(&self) -> impl Iterator<Item = &Vector<D>> + '_ {
        self.vertices.iter().map(|v| &v.position)
    }

    pub fn reset_displacements(&mut self) {
        for vertex in &mut self.vertices {
            vertex.disp = Vector::zeros();
        }
    }
}
