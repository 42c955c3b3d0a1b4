//! Topology records and the sources they are loaded from.
//!
//! A topology is plain data: a vertex count, an ordered edge list and
//! optional per-vertex labels and colors. It is validated in full before an
//! engine builds any simulation state from it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::graph::{ColorTag, VertexId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub vertex_count: usize,
    pub edges: Vec<(VertexId, VertexId)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<ColorTag>>,
}

impl Topology {
    pub fn new(vertex_count: usize, edges: Vec<(VertexId, VertexId)>) -> Self {
        Self {
            vertex_count,
            edges,
            labels: None,
            colors: None,
        }
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn with_colors(mut self, colors: Vec<ColorTag>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let n = self.vertex_count;
        if n == 0 {
            return Err(LayoutError::EmptyGraph);
        }
        for (edge, &(a, b)) in self.edges.iter().enumerate() {
            for vertex in [a, b] {
                if vertex >= n {
                    return Err(LayoutError::VertexOutOfRange {
                        edge,
                        vertex,
                        vertex_count: n,
                    });
                }
            }
            if a == b {
                return Err(LayoutError::SelfLoop { edge, vertex: a });
            }
        }
        if let Some(labels) = &self.labels {
            if labels.len() != n {
                return Err(LayoutError::LabelCount {
                    expected: n,
                    found: labels.len(),
                });
            }
        }
        if let Some(colors) = &self.colors {
            if colors.len() != n {
                return Err(LayoutError::ColorCount {
                    expected: n,
                    found: colors.len(),
                });
            }
        }
        Ok(())
    }
}

/// Anything that can produce a topology record: an in-memory fixture, a file,
/// a network fetch.
pub trait TopologySource {
    fn load(&self) -> Result<Topology>;
}

impl TopologySource for Topology {
    fn load(&self) -> Result<Topology> {
        Ok(self.clone())
    }
}

/// JSON document shaped like [`Topology`].
#[derive(Debug, Clone)]
pub struct JsonFile(pub PathBuf);

impl TopologySource for JsonFile {
    fn load(&self) -> Result<Topology> {
        let content = std::fs::read_to_string(&self.0)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// KDL document, see [`parse_kdl`] for the node set.
#[derive(Debug, Clone)]
pub struct KdlFile(pub PathBuf);

impl TopologySource for KdlFile {
    fn load(&self) -> Result<Topology> {
        let content = std::fs::read_to_string(&self.0)?;
        parse_kdl(&content)
    }
}

/// Picks a source by file extension: `.kdl` is KDL, everything else JSON.
pub fn source_for_path(path: impl AsRef<Path>) -> Box<dyn TopologySource> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("kdl") => Box::new(KdlFile(path.to_path_buf())),
        _ => Box::new(JsonFile(path.to_path_buf())),
    }
}

/// Parse a KDL topology:
///
/// ```kdl
/// vertices 4
/// edge 0 1
/// edge 1 2
/// label 0 "alpha"
/// color 0 255 0 0
/// ```
///
/// Vertices without a `label` get an empty one once any label is present;
/// likewise vertices without a `color` are black.
pub fn parse_kdl(content: &str) -> Result<Topology> {
    let doc = kdl::KdlDocument::parse(content)?;

    let mut vertex_count: Option<usize> = None;
    let mut edges = Vec::new();
    let mut labels: Vec<(VertexId, String)> = Vec::new();
    let mut colors: Vec<(VertexId, ColorTag)> = Vec::new();

    for node in doc.nodes() {
        let name = node.name().value();
        match name {
            "vertices" => {
                let [count] = integer_args::<1>(node)?;
                vertex_count = Some(to_index(count, name)?);
            }
            "edge" => {
                let [a, b] = integer_args::<2>(node)?;
                edges.push((to_index(a, name)?, to_index(b, name)?));
            }
            "label" => {
                let mut args = node.entries().iter().filter(|e| e.name().is_none());
                let vertex = args
                    .next()
                    .and_then(|e| e.value().as_integer())
                    .ok_or_else(|| malformed(name, "expected a vertex index"))?;
                let text = args
                    .next()
                    .and_then(|e| e.value().as_string())
                    .ok_or_else(|| malformed(name, "expected a label string"))?;
                labels.push((to_index(vertex, name)?, text.to_string()));
            }
            "color" => {
                let [vertex, r, g, b] = integer_args::<4>(node)?;
                let channel = |c: i128| {
                    u8::try_from(c).map_err(|_| malformed(name, "color channels must be 0..=255"))
                };
                colors.push((to_index(vertex, name)?, [channel(r)?, channel(g)?, channel(b)?]));
            }
            other => return Err(malformed(other, "unknown node")),
        }
    }

    let vertex_count =
        vertex_count.ok_or_else(|| LayoutError::MalformedKdl("missing `vertices` node".into()))?;

    let mut topology = Topology::new(vertex_count, edges);
    if !labels.is_empty() {
        let mut all = vec![String::new(); vertex_count];
        for (vertex, text) in labels {
            let slot = all.get_mut(vertex).ok_or(LayoutError::UnknownVertex {
                vertex,
                vertex_count,
            })?;
            *slot = text;
        }
        topology.labels = Some(all);
    }
    if !colors.is_empty() {
        let mut all = vec![[0, 0, 0]; vertex_count];
        for (vertex, color) in colors {
            let slot = all.get_mut(vertex).ok_or(LayoutError::UnknownVertex {
                vertex,
                vertex_count,
            })?;
            *slot = color;
        }
        topology.colors = Some(all);
    }
    Ok(topology)
}

fn malformed(node: &str, reason: &str) -> LayoutError {
    LayoutError::MalformedKdl(format!("`{node}`: {reason}"))
}

fn to_index(value: i128, node: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| malformed(node, "indices must be non-negative"))
}

/// Exactly `N` positional integer arguments.
fn integer_args<const N: usize>(node: &kdl::KdlNode) -> Result<[i128; N]> {
    let name = node.name().value();
    let values = node
        .entries()
        .iter()
        .filter(|e| e.name().is_none())
        .map(|e| e.value().as_integer())
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| malformed(name, "arguments must be integers"))?;
    <[i128; N]>::try_from(values)
        .map_err(|v| malformed(name, &format!("expected {N} arguments, found {}", v.len())))
}
