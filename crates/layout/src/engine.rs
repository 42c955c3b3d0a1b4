use std::f64::consts::PI;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::anneal::Annealer;
use crate::config::LayoutConfig;
use crate::error::Result;
use crate::force::ForceModel;
use crate::graph::{EdgeId, Graph, Vertex, VertexId};
use crate::rotate::Rotator;
use crate::snapshot::{EdgeView, Snapshot, VertexView};
use crate::spring::SpringModel;
use crate::topology::{Topology, TopologySource};
use crate::vector::{self, Vector, Vector2, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// No active run; ticks are ignored.
    Idle,
    /// Every tick advances the layout by one step.
    Stepping,
    /// Temperature fell to the convergence threshold; stepping halted.
    Converged,
}

/// How long [`LayoutEngine::run`] keeps stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCondition {
    /// At most this many steps (fewer if an auto-stopping run converges).
    Steps(usize),
    /// Until the temperature reaches the convergence threshold.
    UntilConverged,
}

/// Drives the force simulation for one graph at a time.
///
/// The engine never loops on its own: a caller delivers ticks (or asks for a
/// bounded run) and reads positions between them. Commands such as pinning,
/// color toggling and dragging are applied between steps.
pub struct LayoutEngine<const D: usize> {
    config: LayoutConfig,
    graph: Graph<D>,
    forces: ForceModel,
    annealer: Annealer,
    state: RunState,
    rng: StdRng,
    edges_hidden: bool,
    rotator: Option<Rotator>,
}

pub type PlanarEngine = LayoutEngine<2>;
pub type SpatialEngine = LayoutEngine<3>;

impl<const D: usize> LayoutEngine<D> {
    pub fn new<S: TopologySource + ?Sized>(config: LayoutConfig, source: &S) -> Result<Self> {
        const { assert!(D == 2 || D == 3, "layouts are planar or spatial") };
        config.validate()?;
        let topology = source.load()?;
        topology.validate()?;

        let graph = build_graph(&config, &topology, false)?;
        let annealer = Annealer::new(
            config.viewport.temperature_extent::<D>(),
            config.viewport.area(),
        );
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        debug!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            dimensions = D,
            "loaded graph"
        );
        Ok(Self {
            forces: ForceModel::new(config.forces.clone()),
            config,
            graph,
            annealer,
            state: RunState::Idle,
            rng,
            edges_hidden: false,
            rotator: None,
        })
    }

    /// Replaces the whole graph. Fixed flags and positions of the previous
    /// graph are discarded even if the vertex count is unchanged. On error
    /// the current graph stays in place.
    pub fn load_graph<S: TopologySource + ?Sized>(&mut self, source: &S) -> Result<()> {
        let topology = source.load()?;
        topology.validate()?;
        self.graph = build_graph(&self.config, &topology, self.edges_hidden)?;
        self.annealer.reset();
        self.state = RunState::Idle;
        self.rotator = None;
        debug!(
            vertices = self.graph.vertex_count(),
            edges = self.graph.edge_count(),
            "reloaded graph"
        );
        Ok(())
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph<D> {
        &self.graph
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Steps since the last reload or re-heat, starting at 1.
    pub fn step_count(&self) -> u64 {
        self.annealer.step()
    }

    pub fn temperature(&self) -> f64 {
        self.annealer.temperature()
    }

    pub fn area(&self) -> f64 {
        self.annealer.area()
    }

    /// Layout constant `k` for the current area and graph density.
    pub fn layout_constant(&self) -> f64 {
        self.forces.layout_constant(
            self.annealer.area(),
            self.graph.vertex_count(),
            self.graph.edge_count(),
        )
    }

    pub fn position(&self, vertex: VertexId) -> Result<&Vector<D>> {
        Ok(&self.graph.vertex(vertex)?.position)
    }

    pub fn positions(&self) -> Vec<Vector<D>> {
        self.graph.positions().copied().collect()
    }

    fn is_hot(&self) -> bool {
        self.temperature() > self.config.forces.convergence_temperature
    }

    /// One simulation step: forces, bounded movement of every free vertex,
    /// clamping of every vertex into the viewport, then the schedule
    /// advances.
    pub fn step(&mut self) {
        let temperature = self.annealer.temperature();
        let k = self.layout_constant();
        let center = self.config.viewport.center::<D>();

        self.forces.displacement(&mut self.graph, k, &mut self.rng);
        if self.config.centering {
            self.forces.centering(&mut self.graph, &center);
        }

        let lo = self.config.viewport.lower::<D>();
        let hi = self.config.viewport.upper::<D>();
        for vertex in self.graph.vertices.iter_mut() {
            if vertex.is_free() {
                if let Some(step) = vector::bounded_step(&vertex.disp, temperature) {
                    vertex.position += step;
                }
            }
            // Pinned vertices are clamped too; a rotation or a large initial
            // radius can leave them outside the box.
            vertex.position = vector::clamp_into(&vertex.position, &lo, &hi);
        }

        self.annealer.advance();
        if self.config.auto_zoom {
            let radius = self
                .graph
                .positions()
                .map(|p| (p - center).norm())
                .fold(0.0, f64::max);
            self.annealer.auto_zoom(radius, self.config.viewport.height);
        }
        trace!(
            step = self.annealer.step(),
            temperature,
            k,
            area = self.annealer.area(),
            "layout step"
        );
    }

    /// Start (or resume) stepping on subsequent ticks.
    pub fn stabilize(&mut self) {
        self.state = RunState::Stepping;
    }

    pub fn stop(&mut self) {
        self.state = RunState::Idle;
    }

    /// One external timer tick. Returns whether a step was taken.
    pub fn tick(&mut self) -> bool {
        if self.state != RunState::Stepping {
            return false;
        }
        if self.config.auto_stop && !self.is_hot() {
            self.state = RunState::Converged;
            debug!(step = self.annealer.step(), "layout converged");
            return false;
        }
        self.step();
        true
    }

    /// Ticks while `keep_going` allows and the run has not converged.
    /// Returns the number of steps taken.
    pub fn run_while(&mut self, mut keep_going: impl FnMut(&Self) -> bool) -> usize {
        self.stabilize();
        let mut steps = 0;
        while self.state == RunState::Stepping && keep_going(self) {
            if self.tick() {
                steps += 1;
            }
        }
        steps
    }

    pub fn run(&mut self, until: StopCondition) -> usize {
        match until {
            StopCondition::Steps(limit) => {
                let mut remaining = limit;
                self.run_while(|_| {
                    if remaining == 0 {
                        return false;
                    }
                    remaining -= 1;
                    true
                })
            }
            StopCondition::UntilConverged => {
                let steps = self.final_move();
                self.state = RunState::Converged;
                steps
            }
        }
    }

    /// Steps synchronously until the temperature reaches the convergence
    /// threshold; used for a fully settled layout without rendering in
    /// between.
    pub fn final_move(&mut self) -> usize {
        let mut steps = 0;
        while self.is_hot() {
            self.step();
            steps += 1;
        }
        debug!(steps, "final move finished");
        steps
    }

    /// Pin a vertex in place and re-heat.
    pub fn fix(&mut self, vertex: VertexId) -> Result<()> {
        self.graph.vertex_mut(vertex)?.fixed = true;
        self.reheat();
        Ok(())
    }

    /// Unpin a vertex and re-heat.
    pub fn release(&mut self, vertex: VertexId) -> Result<()> {
        self.graph.vertex_mut(vertex)?.fixed = false;
        self.reheat();
        Ok(())
    }

    /// Flip the pin on a vertex; returns the new state.
    pub fn toggle_fixed(&mut self, vertex: VertexId) -> Result<bool> {
        let v = self.graph.vertex_mut(vertex)?;
        v.fixed = !v.fixed;
        let fixed = v.fixed;
        self.reheat();
        Ok(fixed)
    }

    pub fn release_all(&mut self) {
        for vertex in &mut self.graph.vertices {
            vertex.fixed = false;
        }
        self.reheat();
    }

    pub fn is_fixed(&self, vertex: VertexId) -> Result<bool> {
        Ok(self.graph.vertex(vertex)?.fixed)
    }

    fn reheat(&mut self) {
        self.annealer.reheat(self.config.forces.reheat_cap);
    }

    /// Toggle color-scaled forces. Either way the schedule restarts from
    /// step 1 and stepping resumes.
    pub fn set_colored(&mut self, colored: bool) {
        self.graph.colored = colored;
        self.annealer.restart();
        self.state = RunState::Stepping;
        debug!(colored, "color scaling changed");
    }

    /// Take a vertex under direct control; forces stop moving it.
    pub fn grab(&mut self, vertex: VertexId) -> Result<()> {
        self.graph.vertex_mut(vertex)?.suspended = true;
        Ok(())
    }

    /// Move a grabbed (or any) vertex to `position`, clamped into the
    /// viewport.
    pub fn drag_to(&mut self, vertex: VertexId, position: Vector<D>) -> Result<()> {
        let lo = self.config.viewport.lower::<D>();
        let hi = self.config.viewport.upper::<D>();
        self.graph.vertex_mut(vertex)?.position = vector::clamp_into(&position, &lo, &hi);
        Ok(())
    }

    /// Hand a grabbed vertex back to the simulation and re-heat so its
    /// neighborhood settles around the new position.
    pub fn drop_vertex(&mut self, vertex: VertexId) -> Result<()> {
        self.graph.vertex_mut(vertex)?.suspended = false;
        self.reheat();
        Ok(())
    }

    pub fn set_edge_hidden(&mut self, edge: EdgeId, hidden: bool) -> Result<()> {
        self.graph.edge_mut(edge)?.hidden = hidden;
        Ok(())
    }

    /// Hide or show every edge; the setting also applies to graphs loaded
    /// later.
    pub fn set_all_edges_hidden(&mut self, hidden: bool) {
        self.edges_hidden = hidden;
        for edge in &mut self.graph.edges {
            edge.hidden = hidden;
        }
    }

    /// One manual relaxation with the spring-only model.
    pub fn relax_springs(&mut self, model: &SpringModel) {
        model.relax(&mut self.graph);
    }

    /// Apparent vertex radius: scales with depth in 3D, constant in 2D.
    pub fn vertex_radius(&self, vertex: VertexId) -> Result<f64> {
        Ok(self.radius_at(&self.graph.vertex(vertex)?.position))
    }

    fn radius_at(&self, position: &Vector<D>) -> f64 {
        if D >= 3 {
            10.0 * position[2] / self.config.viewport.height
        } else {
            self.config.vertex_radius
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let vertices = self
            .graph
            .vertices
            .iter()
            .enumerate()
            .map(|(id, v)| VertexView {
                id,
                position: v.position.iter().copied().collect(),
                radius: self.radius_at(&v.position),
                fixed: v.fixed,
                label: v.label.clone(),
            })
            .collect();
        let edges = self
            .graph
            .edges
            .iter()
            .enumerate()
            .map(|(id, e)| EdgeView {
                id,
                from: e.vertex1,
                to: e.vertex2,
                hidden: e.hidden,
            })
            .collect();
        Snapshot {
            step: self.annealer.step(),
            temperature: self.annealer.temperature(),
            state: self.state,
            vertices,
            edges,
        }
    }
}

impl LayoutEngine<3> {
    /// Start a drag rotation about the viewport center.
    pub fn begin_rotation(&mut self) {
        let pivot = self.config.viewport.center::<3>();
        self.begin_rotation_about(pivot);
    }

    /// Start a drag rotation about `pivot`. Stepping pauses until
    /// [`end_rotation`](Self::end_rotation).
    pub fn begin_rotation_about(&mut self, pivot: Vector3) {
        self.rotator = Some(Rotator::begin(self.graph.positions(), pivot));
        self.state = RunState::Idle;
    }

    /// Rotate every vertex for the drag `delta` accumulated since the drag
    /// started. Returns `false` when no drag is in progress.
    pub fn rotate_by_drag(&mut self, delta: Vector2) -> bool {
        let Some(rotator) = &self.rotator else {
            return false;
        };
        for (vertex, position) in self.graph.vertices.iter_mut().zip(rotator.rotated(&delta)) {
            vertex.position = position;
        }
        true
    }

    /// Finish the drag and resume stepping.
    pub fn end_rotation(&mut self) {
        self.rotator = None;
        self.state = RunState::Stepping;
    }
}

/// Vertices evenly spaced on a circle around the viewport center, then edges
/// in topology order.
fn build_graph<const D: usize>(
    config: &LayoutConfig,
    topology: &Topology,
    edges_hidden: bool,
) -> Result<Graph<D>> {
    let n = topology.vertex_count;
    let center = config.viewport.center::<D>();
    let radius = config.initial_radius;

    let vertices = (0..n)
        .map(|i| {
            let angle = (i as f64 / n as f64) * (2.0 * PI);
            let mut position = center;
            position[0] += radius * angle.cos();
            position[1] += radius * angle.sin();
            let mut vertex = Vertex::new(position);
            vertex.label = topology.labels.as_ref().map(|l| l[i].clone());
            vertex.color = topology.colors.as_ref().map(|c| c[i]);
            vertex
        })
        .collect();

    let mut graph = Graph::new(vertices);
    for &(a, b) in &topology.edges {
        let id = graph.add_edge(a, b)?;
        graph.edges[id].hidden = edges_hidden;
    }
    Ok(graph)
}
