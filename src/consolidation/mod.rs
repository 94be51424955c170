//! Merging of the partial files written by the workers.
//!
//! Every worker writes the raw counts of the sources it owns. The final score
//! of a vertex is the sum of its counts over all partial files divided by
//! `2 n (n - 1)`, where `n` is the number of vertices in the original file.

use crate::error::{Error, Result};
use crate::gdf::{first_duplicate, parse_partial_record, GdfSections};
use log::info;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Extension of the partial files written by workers.
pub const PARTIAL_EXTENSION: &str = "cen";

/// `0.cen`, `1.cen`, ... for `count` workers.
pub fn default_partial_paths(count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| PathBuf::from(format!("{i}.{PARTIAL_EXTENSION}")))
        .collect()
}

pub fn normalization_factor(num_vertices: usize) -> Result<f64> {
    if num_vertices <= 1 {
        return Err(Error::TooFewVertices(num_vertices));
    }
    let n = num_vertices as f64;
    Ok(2. * n * (n - 1.))
}

/// Summed counts of every vertex of the node section, in file order.
#[derive(Debug)]
pub struct CentralityTotals {
    positions: HashMap<i64, usize>,
    totals: Vec<u64>,
    records: usize,
}

impl CentralityTotals {
    pub fn new(ids: &[i64]) -> Result<Self> {
        if let Some(id) = first_duplicate(ids) {
            return Err(Error::DuplicateVertex(id));
        }
        Ok(CentralityTotals {
            positions: ids.iter().enumerate().map(|(i, &id)| (id, i)).collect(),
            totals: vec![0; ids.len()],
            records: 0,
        })
    }

    /// Adds every `id,count` record of one partial file.
    ///
    /// Blank lines are ignored. A record for an id outside the node section
    /// aborts the merge.
    pub fn add_partial(&mut self, name: &str, source: &str) -> Result<usize> {
        let mut added = 0;
        for (i, line) in source.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let number = i + 1;
            let (id, count) = parse_partial_record(name, number, line)?;
            let &position = self
                .positions
                .get(&id)
                .ok_or_else(|| Error::UnknownVertexId {
                    id,
                    source_name: name.to_owned(),
                    line: number,
                })?;
            self.totals[position] = self.totals[position]
                .checked_add(count)
                .ok_or(Error::CountOverflow(id))?;
            added += 1;
        }
        self.records += added;
        Ok(added)
    }

    pub fn totals(&self) -> &[u64] {
        &self.totals
    }

    /// Number of records merged so far.
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn normalized(&self) -> Result<Vec<f64>> {
        let factor = normalization_factor(self.totals.len())?;
        Ok(self.totals.iter().map(|&t| t as f64 / factor).collect())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub vertices: usize,
    pub partials: usize,
    pub records: usize,
}

/// Merges `partials` over the vertices of `original` and writes the annotated
/// graph to `output`, adding the normalized score as column `column`.
pub fn consolidate(
    original: impl AsRef<Path>,
    partials: &[PathBuf],
    output: impl AsRef<Path>,
    column: &str,
) -> Result<Summary> {
    let original = original.as_ref();
    let output = output.as_ref();

    let source = std::fs::read_to_string(original).map_err(Error::io(original))?;
    let sections = GdfSections::split(&original.display().to_string(), &source)?;
    let mut totals = CentralityTotals::new(&sections.node_ids()?)?;
    info!(
        "Merging {} partial files over {} vertices",
        partials.len(),
        sections.num_nodes()
    );

    for path in partials {
        let partial = std::fs::read_to_string(path).map_err(Error::io(path))?;
        let added = totals.add_partial(&path.display().to_string(), &partial)?;
        info!("{}: {added} records", path.display());
    }
    let scores = totals.normalized()?;

    let file = File::create(output).map_err(Error::io(output))?;
    sections
        .write_annotated(&scores, column, BufWriter::new(file))
        .map_err(|e| match e {
            Error::Stream(source) => Error::Io {
                path: output.to_owned(),
                source,
            },
            e => e,
        })?;

    Ok(Summary {
        vertices: sections.num_nodes(),
        partials: partials.len(),
        records: totals.records(),
    })
}
