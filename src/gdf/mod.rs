//! Reading and writing GDF graph files.
//!
//! A GDF file starts with a `nodedef>` header followed by one line per
//! vertex (`id,field,...`), then an `edgedef>` header followed by one line per
//! edge (`source,target,weight,...`). Only the id, endpoint and weight fields
//! are interpreted; everything else is carried through untouched.
//!
//! Two outputs are produced from a graph:
//! - partial files (`printed id,count` per vertex) written by each worker;
//! - the annotated graph, which is the input file with one extra node column.
//!   Its edge section is copied from the input byte for byte.

use crate::error::{Error, Result};
use crate::graph::{EdgeInsertion, Graph};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const NODE_TAG: &str = "nodedef>";
pub const EDGE_TAG: &str = "edgedef>";
pub const DEFAULT_COLUMN: &str = "centrality";
const COLUMN_KIND: &str = "DOUBLE";

#[derive(Clone, Copy, Debug)]
struct Line<'a> {
    /// 1-based line number in the whole file.
    number: usize,
    text: &'a str,
    terminator: &'a str,
}

fn lines(source: &str, first_number: usize) -> impl Iterator<Item = Line<'_>> {
    source
        .split_inclusive('\n')
        .enumerate()
        .map(move |(i, raw)| {
            let text = raw
                .strip_suffix("\r\n")
                .or_else(|| raw.strip_suffix('\n'))
                .unwrap_or(raw);
            Line {
                number: first_number + i,
                text,
                terminator: &raw[text.len()..],
            }
        })
}

/// The node and edge sections of a GDF document, borrowed from its text.
#[derive(Debug)]
pub struct GdfSections<'a> {
    name: String,
    header: Line<'a>,
    nodes: Vec<Line<'a>>,
    /// From the start of the `edgedef>` line to the end of the file.
    edges: &'a str,
    edges_first_line: usize,
}

impl<'a> GdfSections<'a> {
    /// Splits `source` into header, node lines and the raw edge section.
    ///
    /// `name` is only used in error messages.
    pub fn split(name: &str, source: &'a str) -> Result<Self> {
        let mut offset = 0;
        let mut iter = lines(source, 1);

        let header = match iter.next() {
            Some(line) if line.text.starts_with(NODE_TAG) => line,
            Some(line) => {
                return Err(Error::malformed(
                    name,
                    1,
                    format!("expected {NODE_TAG} header"),
                    line.text,
                ))
            }
            None => return Err(Error::malformed(name, 1, "empty file", "")),
        };
        offset += header.text.len() + header.terminator.len();

        let mut nodes = Vec::new();
        let mut edges_first_line = header.number + 1;
        for line in iter {
            if line.text.starts_with(EDGE_TAG) {
                break;
            }
            offset += line.text.len() + line.terminator.len();
            edges_first_line = line.number + 1;
            nodes.push(line);
        }

        Ok(GdfSections {
            name: name.to_owned(),
            header,
            nodes,
            edges: &source[offset..],
            edges_first_line,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// The raw edge section, `edgedef>` line included. Empty when the file has
    /// no edge section.
    pub fn edge_section(&self) -> &'a str {
        self.edges
    }

    /// Vertex ids of the node section, in file order.
    pub fn node_ids(&self) -> Result<Vec<i64>> {
        self.nodes
            .iter()
            .map(|line| self.parse_node(line).map(|(id, _)| id))
            .collect()
    }

    fn parse_node(&self, line: &Line) -> Result<(i64, Vec<String>)> {
        let fields: Vec<String> = line.text.split(',').map(str::to_owned).collect();
        let id = fields[0].trim().parse::<i64>().map_err(|e| {
            Error::malformed(&self.name, line.number, format!("vertex id: {e}"), line.text)
        })?;
        Ok((id, fields))
    }

    fn parse_edge(&self, line: &Line) -> Result<(i64, i64, f64)> {
        let mut fields = line.text.split(',');
        let (Some(source), Some(target), Some(weight)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(Error::malformed(
                &self.name,
                line.number,
                "expected source, target and weight",
                line.text,
            ));
        };
        let malformed = |what: &str, e: &dyn std::fmt::Display| {
            Error::malformed(&self.name, line.number, format!("{what}: {e}"), line.text)
        };

        let source = source
            .trim()
            .parse::<i64>()
            .map_err(|e| malformed("edge source", &e))?;
        let target = target
            .trim()
            .parse::<i64>()
            .map_err(|e| malformed("edge target", &e))?;
        let weight = weight
            .trim()
            .parse::<f64>()
            .map_err(|e| malformed("edge weight", &e))?;
        Ok((source, target, weight))
    }

    /// Builds the graph described by these sections.
    pub fn to_graph(&self) -> Result<Graph> {
        let mut graph = Graph::new();
        for line in &self.nodes {
            let (id, fields) = self.parse_node(line)?;
            graph.add_vertex(id, fields)?;
        }

        let mut self_loops = 0usize;
        let mut duplicates = 0usize;
        for line in lines(self.edges, self.edges_first_line).skip(1) {
            let (source, target, weight) = self.parse_edge(&line)?;
            let insertion = graph
                .add_edge(source, target, weight, line.text)
                .map_err(|e| match e {
                    Error::UnknownVertex { id, .. } => Error::UnknownVertex {
                        id,
                        line: line.number,
                    },
                    e => e,
                })?;
            match insertion {
                EdgeInsertion::Added(_) => {}
                EdgeInsertion::SelfLoop => {
                    debug!("{}:{}: skipping self loop on {source}", self.name, line.number);
                    self_loops += 1;
                }
                EdgeInsertion::DuplicatePair => {
                    warn!(
                        "{}:{}: skipping second edge between {source} and {target}",
                        self.name, line.number
                    );
                    duplicates += 1;
                }
            }
        }

        info!(
            "Loaded {}: {} vertices, {} edges ({self_loops} self loops and {duplicates} duplicate edges skipped)",
            self.name,
            graph.num_vertices(),
            graph.num_edges()
        );
        Ok(graph)
    }

    /// Writes the document with one extra node column holding `scores`.
    ///
    /// `scores[i]` is appended to the i-th node line. The edge section is
    /// written exactly as it was read.
    pub fn write_annotated<W: Write>(
        &self,
        scores: &[f64],
        column: &str,
        mut out: W,
    ) -> Result<()> {
        if scores.len() != self.nodes.len() {
            return Err(Error::ScoreCountMismatch {
                scores: scores.len(),
                nodes: self.nodes.len(),
            });
        }

        write!(
            out,
            "{},{column} {COLUMN_KIND}{}",
            self.header.text, self.header.terminator
        )?;
        for (line, score) in self.nodes.iter().zip(scores) {
            write!(out, "{},{score}{}", line.text, line.terminator)?;
        }
        out.write_all(self.edges.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// Reads and parses a GDF file.
pub fn load_graph(path: impl AsRef<Path>) -> Result<Graph> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(Error::io(path))?;
    GdfSections::split(&path.display().to_string(), &source)?.to_graph()
}

/// Writes one `printed id,count` line per vertex, in graph order.
pub fn write_partial<W: Write>(graph: &Graph, mut out: W) -> std::io::Result<()> {
    for vertex in graph.vertices() {
        writeln!(out, "{},{}", vertex.printed_id(), vertex.centrality)?;
    }
    out.flush()
}

pub fn save_partial(graph: &Graph, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(Error::io(path))?;
    write_partial(graph, BufWriter::new(file)).map_err(Error::io(path))
}

/// Parses one partial-file line into `(id, count)`.
pub fn parse_partial_record(name: &str, number: usize, text: &str) -> Result<(i64, u64)> {
    let mut fields = text.split(',');
    let (Some(id), Some(count)) = (fields.next(), fields.next()) else {
        return Err(Error::malformed(name, number, "expected id and count", text));
    };
    let id = id
        .trim()
        .parse::<i64>()
        .map_err(|e| Error::malformed(name, number, format!("vertex id: {e}"), text))?;
    let count = count
        .trim()
        .parse::<u64>()
        .map_err(|e| Error::malformed(name, number, format!("count: {e}"), text))?;
    Ok((id, count))
}

/// The first id that repeats an earlier one.
pub(crate) fn first_duplicate(ids: &[i64]) -> Option<i64> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().find(|id| !seen.insert(*id))
}
