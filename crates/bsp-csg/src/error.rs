//! Errors raised when caller-supplied geometry fails validation.
//!
//! Only malformed input is reported through [`CsgError`]. Broken internal
//! invariants (for example asking a split polygon-tree node for its polygon)
//! are programming errors and panic instead.

use thiserror::Error;

/// Errors produced while validating polygons or decoding interchange data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CsgError {
    /// A polygon needs at least three vertices.
    #[error("polygon has {count} vertices, at least 3 are required")]
    TooFewVertices {
        /// Number of vertices that were supplied.
        count: usize,
    },

    /// A polygon's vertex loop turns the wrong way somewhere.
    #[error("polygon is not convex at vertex {index}")]
    NonConvex {
        /// Index of the first vertex with a reflex corner.
        index: usize,
    },

    /// The compact binary representation is inconsistent.
    #[error("malformed compact binary: {0}")]
    MalformedBinary(String),
}

/// Result alias for fallible kernel operations.
pub type CsgResult<T> = Result<T, CsgError>;
