//! Approximate betweenness centrality of GDF graphs, split across independent
//! worker processes.
//!
//! Each worker loads the whole graph, runs one shortest-path pass from every
//! source assigned to it by a [`betweenness::Partition`] and writes the raw
//! counts to a partial file. [`consolidation::consolidate`] later sums the
//! partial files, normalizes the totals and writes the input graph back with
//! one extra node column.

pub mod betweenness;
pub mod consolidation;
pub mod error;
pub mod gdf;
pub mod graph;
#[cfg(test)]
mod utils;

pub use error::{Error, Result};
