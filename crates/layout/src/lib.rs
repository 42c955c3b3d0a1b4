//! Force-directed graph layout.
//!
//! Vertices repel each other pairwise and attract along edges; an annealed
//! temperature bounds how far any vertex may move per step. Layouts are
//! planar ([`PlanarEngine`]) or spatial ([`SpatialEngine`]); the spatial
//! engine also centers and auto-zooms itself and can be rotated by a screen
//! drag.
//!
//! ```no_run
//! use visgraph_layout::{LayoutConfig, PlanarEngine, Topology};
//!
//! let topology = Topology::new(4, vec![(0, 1), (1, 2), (2, 3), (3, 0)]);
//! let mut engine = PlanarEngine::new(LayoutConfig::planar(300.0, 300.0), &topology)?;
//! engine.final_move();
//! for vertex in engine.snapshot().vertices {
//!     println!("{:?}", vertex.position);
//! }
//! # Ok::<(), visgraph_layout::LayoutError>(())
//! ```

pub mod anneal;
pub mod config;
pub mod engine;
pub mod error;
pub mod force;
pub mod graph;
pub mod rotate;
pub mod snapshot;
pub mod spring;
pub mod topology;
pub mod vector;

pub use anneal::Annealer;
pub use config::{ForceParams, LayoutConfig, Viewport};
pub use engine::{LayoutEngine, PlanarEngine, RunState, SpatialEngine, StopCondition};
pub use error::{LayoutError, Result};
pub use force::ForceModel;
pub use graph::{ColorTag, Edge, EdgeId, Graph, Vertex, VertexId};
pub use rotate::Rotator;
pub use snapshot::{EdgeView, Snapshot, VertexView};
pub use spring::SpringModel;
pub use topology::{JsonFile, KdlFile, Topology, TopologySource, parse_kdl, source_for_path};
pub use vector::{Vector, Vector2, Vector3};
