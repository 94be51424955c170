//! Error types for graph import, centrality computation and consolidation.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for every fallible operation of the crate.
#[derive(Error, Debug)]
pub enum Error {
    /// A line is too short or one of its numeric fields does not parse.
    #[error("{source_name}:{line}: malformed record ({reason}): {content:?}")]
    MalformedRecord {
        source_name: String,
        line: usize,
        reason: String,
        content: String,
    },

    /// The same vertex id is declared twice in the node section.
    #[error("duplicate vertex id {0}")]
    DuplicateVertex(i64),

    /// An edge references an id that is not declared in the node section.
    #[error("line {line}: edge references unknown vertex {id}")]
    UnknownVertex { id: i64, line: usize },

    /// A partial record references an id that is not declared in the node section.
    #[error("{source_name}:{line}: partial record references unknown vertex {id}")]
    UnknownVertexId {
        id: i64,
        source_name: String,
        line: usize,
    },

    /// The worker ordinal does not fit in the worker total.
    #[error("invalid partition: ordinal {ordinal} with {total} workers")]
    InvalidPartition { ordinal: usize, total: usize },

    /// Normalization needs at least two vertices.
    #[error("cannot normalize centrality over {0} vertices (need at least 2)")]
    TooFewVertices(usize),

    /// The number of scores does not match the number of node lines.
    #[error("{scores} scores for {nodes} node lines")]
    ScoreCountMismatch { scores: usize, nodes: usize },

    /// Summing partial counts overflowed.
    #[error("centrality count of vertex {0} overflows")]
    CountOverflow(i64),

    /// IO error on a named file.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error on an unnamed stream.
    #[error("IO error: {0}")]
    Stream(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(
        source_name: &str,
        line: usize,
        reason: impl Into<String>,
        content: &str,
    ) -> Self {
        Error::MalformedRecord {
            source_name: source_name.to_owned(),
            line,
            reason: reason.into(),
            content: content.to_owned(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Error::Io { path, source }
    }
}

/// Result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;
