use std::path::PathBuf;

use thiserror::Error;

use crate::graph::EdgeId;

/// Convenient result alias for the roadroute library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when an edge weight is negative, NaN or infinite.
    #[error("invalid weight {weight} for edge {from} -> {to}; weights must be finite and non-negative")]
    InvalidWeight {
        from: String,
        to: String,
        weight: f64,
    },

    /// Raised when an edge record has no symmetric counterpart on its neighbour.
    #[error("adjacency invariant violated: edge {edge} on {node} has no counterpart on {neighbour}")]
    AsymmetricEdge {
        node: String,
        neighbour: String,
        edge: EdgeId,
    },

    /// Raised when a predecessor entry refers to an edge that is no longer in the graph.
    #[error("adjacency invariant violated: no edge from {from} to {to} for recorded hop")]
    MissingEdge { from: String, to: String },

    /// Raised when a search exhausts its expansion or time budget.
    #[error("{algorithm} search exceeded its budget after expanding {expanded} nodes")]
    SearchLimitExceeded {
        algorithm: &'static str,
        expanded: usize,
    },

    /// Raised when a node identifier could not be found in the graph.
    #[error("unknown node: {id}")]
    UnknownNode { id: String },

    /// Raised when no route could be found between two nodes.
    #[error("no route found between {start} and {goal}")]
    RouteNotFound { start: String, goal: String },

    /// Raised when a road network file does not exist.
    #[error("road network not found at {path}")]
    NetworkNotFound { path: PathBuf },

    /// Raised when the input document is valid JSON but not a usable GeoJSON network.
    #[error("invalid GeoJSON: {message}")]
    InvalidGeoJson { message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
