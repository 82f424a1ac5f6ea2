//! Error types for route path construction.

use std::fmt;

/// Result type for path operations.
pub type Result<T> = std::result::Result<T, PathError>;

/// Errors that can occur while building a route path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A route or curve needs at least two points.
    TooFewPoints {
        /// Number of points that were supplied.
        actual: usize,
    },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewPoints { actual } => {
                write!(f, "route needs at least 2 points, got {actual}")
            }
        }
    }
}

impl std::error::Error for PathError {}
