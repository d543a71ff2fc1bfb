//! Error taxonomy.
//!
//! Fatal conditions abort the whole batch: a distance or Gram matrix is never returned partially filled.
//! A degenerate projected distribution (one node, zero variance) is not an error, its sketch is constant.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwwlError {
    /// empty graph, malformed adjacency, non finite attributes
    #[error("invalid graph {graph} : {reason}")]
    InvalidGraph { graph: String, reason: String },

    /// dimensions that must agree do not. Signals a configuration bug.
    #[error("dimension mismatch in {context} : expected {expected}, got {got}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        got: usize,
    },

    /// Gram matrix has an eigenvalue below -tolerance.
    /// Usually a bandwidth or precision problem, the caller may re-estimate the bandwidth.
    #[error("gram matrix not positive semi-definite, min eigenvalue {min_eigenvalue:.3e} (tolerance {tolerance:.1e})")]
    NonPsdResult { min_eigenvalue: f64, tolerance: f64 },

    #[error("invalid parameter : {0}")]
    InvalidParameter(String),

    /// a row is missing when merging distance rows computed separately
    #[error("incomplete distance matrix, row {row} missing")]
    IncompleteMatrix { row: usize },

    #[error("could not build thread pool : {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("lapack failure : {0}")]
    Linalg(String),
} // end of enum SwwlError


impl SwwlError {
    pub(crate) fn invalid_graph(graph: &str, reason: impl Into<String>) -> Self {
        SwwlError::InvalidGraph {
            graph: graph.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn dimension(context: impl Into<String>, expected: usize, got: usize) -> Self {
        SwwlError::DimensionMismatch {
            context: context.into(),
            expected,
            got,
        }
    }

    /// attaches a graph identifier to errors raised while processing a graph
    pub(crate) fn with_graph(self, graph: &str) -> Self {
        match self {
            SwwlError::InvalidGraph { reason, .. } => SwwlError::invalid_graph(graph, reason),
            SwwlError::DimensionMismatch { context, expected, got } => {
                SwwlError::dimension(format!("{} for graph {}", context, graph), expected, got)
            },
            e => e,
        }
    }

    /// true for errors that only signal a numerical quality problem of a result.
    pub fn is_warning(&self) -> bool {
        matches!(self, SwwlError::NonPsdResult { .. })
    }
} // end of impl SwwlError


pub type Result<T> = std::result::Result<T, SwwlError>;


// end of mod tests
