use rand::Rng;
use tracing::trace;

use crate::config::ForceParams;
use crate::graph::{ColorTag, Graph, VertexId};
use crate::vector::{self, Vector};

/// Repulsion between every vertex pair and spring attraction along edges,
/// balanced by the layout constant `k`.
#[derive(Debug, Clone, Default)]
pub struct ForceModel {
    pub params: ForceParams,
}

impl ForceModel {
    pub fn new(params: ForceParams) -> Self {
        Self { params }
    }

    /// `k = sqrt(area / n / divisor) * (e / n)`.
    pub fn layout_constant(&self, area: f64, vertex_count: usize, edge_count: usize) -> f64 {
        if vertex_count == 0 {
            return 0.0;
        }
        let n = vertex_count as f64;
        (area / n / self.params.density_divisor).sqrt() * (edge_count as f64 / n)
    }

    /// Multiplier applied to `k` for a vertex pair in color-scaled mode.
    /// Identical colors still keep a minimal constant so attraction stays
    /// finite; vertices without a color are unscaled.
    pub fn color_factor(&self, a: Option<ColorTag>, b: Option<ColorTag>) -> f64 {
        let (Some(a), Some(b)) = (a, b) else {
            return 1.0;
        };
        let distance = a
            .iter()
            .zip(b.iter())
            .map(|(&x, &y)| (f64::from(x) - f64::from(y)).powi(2))
            .sum::<f64>()
            .sqrt();
        let scale = self.params.color_scale;
        (distance / scale).max(1.0 / scale)
    }

    fn pair_constant<const D: usize>(
        &self,
        graph: &Graph<D>,
        k: f64,
        i: VertexId,
        j: VertexId,
    ) -> f64 {
        if graph.colored {
            k * self.color_factor(graph.vertices[i].color, graph.vertices[j].color)
        } else {
            k
        }
    }

    pub fn repulsive_forces<const D: usize, R: Rng + ?Sized>(
        &self,
        graph: &mut Graph<D>,
        k: f64,
        rng: &mut R,
    ) {
        let n = graph.vertex_count();
        for i in 0..n {
            let mut change = Vector::<D>::zeros();
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut diff = graph.vertices[i].position - graph.vertices[j].position;
                if diff.norm() < self.params.collision_epsilon {
                    diff = vector::jitter(rng);
                }
                if D >= 3 && diff[2].abs() < self.params.depth_epsilon {
                    diff[2] = rng.random_range(-0.5..0.5);
                }
                let length_squared = diff.norm_squared();
                if length_squared > 0.0 {
                    let kp = self.pair_constant(graph, k, i, j);
                    change += diff * (kp * kp / length_squared);
                }
            }
            graph.vertices[i].disp += change;
        }
    }

    pub fn attractive_forces<const D: usize>(&self, graph: &mut Graph<D>, k: f64) {
        for e in 0..graph.edge_count() {
            let (v1, v2) = (graph.edges[e].vertex1, graph.edges[e].vertex2);
            let kp = self.pair_constant(graph, k, v1, v2);
            if kp <= 0.0 {
                continue;
            }
            let diff = graph.vertices[v1].position - graph.vertices[v2].position;
            let change = diff * (diff.norm() / kp);
            graph.vertices[v1].disp -= change;
            graph.vertices[v2].disp += change;
        }
    }

    /// Resets every accumulator, then adds repulsion and attraction.
    pub fn displacement<const D: usize, R: Rng + ?Sized>(
        &self,
        graph: &mut Graph<D>,
        k: f64,
        rng: &mut R,
    ) {
        graph.reset_displacements();
        self.repulsive_forces(graph, k, rng);
        self.attractive_forces(graph, k);
        trace!(k, vertices = graph.vertex_count(), "computed displacement");
    }

    /// Adds the same translation to every vertex so that the centroid moves
    /// onto `target`.
    pub fn centering<const D: usize>(&self, graph: &mut Graph<D>, target: &Vector<D>) {
        let Some(center) = vector::centroid(graph.positions()) else {
            return;
        };
        let change = target - center;
        for vertex in &mut graph.vertices {
            vertex.disp += change;
        }
    }
}
