use crate::graph::Graph;
use crate::vector::Vector;

/// Plain Hooke springs with a fixed rest length, relaxed one manual
/// invocation at a time. Vertex 0 is the anchor and never moves; there is no
/// temperature and no viewport clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct SpringModel {
    pub rest_length: f64,
    pub stiffness: f64,
}

impl Default for SpringModel {
    fn default() -> Self {
        Self {
            rest_length: 50.0,
            stiffness: 1.0,
        }
    }
}

impl SpringModel {
    /// Spring force on `vertex`: the sum over incident edges of
    /// `stiffness * (length - rest_length)` toward the neighbor.
    pub fn force_on<const D: usize>(&self, graph: &Graph<D>, vertex: usize) -> Vector<D> {
        let here = graph.vertices[vertex].position;
        let mut force = Vector::<D>::zeros();
        for neighbor in graph.neighbors(vertex) {
            let along = graph.vertices[neighbor].position - here;
            let length = along.norm();
            if length < f64::EPSILON {
                continue;
            }
            force += along * (self.stiffness * (length - self.rest_length) / length);
        }
        force
    }

    /// Moves every non-anchor, non-fixed vertex by its spring force. Forces
    /// are gathered for all vertices before any of them moves.
    pub fn relax<const D: usize>(&self, graph: &mut Graph<D>) {
        let forces: Vec<Vector<D>> = (0..graph.vertex_count())
            .map(|v| self.force_on(graph, v))
            .collect();
        for (vertex, force) in graph.vertices.iter_mut().zip(forces).skip(1) {
            if vertex.is_free() {
                vertex.position += force;
            }
        }
    }
}
