//! Undirected weighted graph with vertices kept in insertion order.
//!
//! Vertex positions (`0..num_vertices()`) follow the order in which vertices
//! were added. That order drives worker partitioning and every output file, so
//! it is never changed after construction.

use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug)]
pub struct Vertex {
    pub id: i64,
    /// Fields of the node line as written; the first one is the raw id text.
    pub fields: Vec<String>,
    /// Accumulated centrality count, persists across shortest-path runs.
    pub centrality: u64,
}

impl Vertex {
    /// The id as it was written in the input file.
    pub fn printed_id(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
    pub line: String,
}

impl Edge {
    pub fn opposite(&self, position: usize) -> usize {
        if self.source == position {
            self.target
        } else {
            self.source
        }
    }
}

/// Outcome of [`Graph::add_edge`] for edges whose endpoints both exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeInsertion {
    Added(usize),
    /// Both endpoints are the same vertex; the edge was not added.
    SelfLoop,
    /// The pair is already connected; the first edge is kept.
    DuplicatePair,
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
    vertices: Vec<Vertex>,
    positions: HashMap<i64, usize>,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<(usize, usize)>>,
    pairs: HashSet<(usize, usize)>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, id: i64, fields: Vec<String>) -> Result<usize> {
        if self.positions.contains_key(&id) {
            return Err(Error::DuplicateVertex(id));
        }
        let position = self.vertices.len();
        self.positions.insert(id, position);
        self.vertices.push(Vertex {
            id,
            fields,
            centrality: 0,
        });
        self.adjacency.push(Vec::new());
        Ok(position)
    }

    /// Adds an undirected edge between the vertices with ids `v1` and `v2`.
    ///
    /// Unknown endpoints are an error. Self loops and second edges between an
    /// already connected pair are reported through [`EdgeInsertion`] and leave
    /// the graph unchanged.
    pub fn add_edge(
        &mut self,
        v1: i64,
        v2: i64,
        weight: f64,
        line: impl Into<String>,
    ) -> Result<EdgeInsertion> {
        let source = self.require(v1)?;
        let target = self.require(v2)?;
        if source == target {
            return Ok(EdgeInsertion::SelfLoop);
        }
        if !self.pairs.insert((source.min(target), source.max(target))) {
            return Ok(EdgeInsertion::DuplicatePair);
        }

        let index = self.edges.len();
        self.edges.push(Edge {
            source,
            target,
            weight,
            line: line.into(),
        });
        self.adjacency[source].push((index, target));
        self.adjacency[target].push((index, source));
        Ok(EdgeInsertion::Added(index))
    }

    /// Incident `(edge index, other endpoint)` pairs of the vertex at `position`.
    pub fn neighbors_of(&self, position: usize) -> &[(usize, usize)] {
        &self.adjacency[position]
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn position_of(&self, id: i64) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn vertex(&self, position: usize) -> &Vertex {
        &self.vertices[position]
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edge(&self, index: usize) -> &Edge {
        &self.edges[index]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn add_centrality(&mut self, position: usize, count: u64) {
        self.vertices[position].centrality += count;
    }

    pub fn reset_centrality(&mut self) {
        self.vertices.iter_mut().for_each(|v| v.centrality = 0);
    }

    fn require(&self, id: i64) -> Result<usize> {
        self.position_of(id)
            .ok_or(Error::UnknownVertex { id, line: 0 })
    }
}
