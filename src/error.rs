//! Error types for the lattice solver and its request surface.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// The obstacle map does not match the declared grid.
    #[error("obstacles must be {expected}x{expected}, got {rows}x{cols}")]
    ShapeMismatch {
        expected: usize,
        rows: usize,
        /// Widest row seen; ragged maps report their widest row.
        cols: usize,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Density left the positive finite range while extracting macroscopic fields.
    #[error(
        "numerical degeneracy at iteration {iteration}: density {density} at row {row}, column {col}"
    )]
    NumericalDegeneracy {
        iteration: usize,
        row: usize,
        col: usize,
        density: f64,
    },
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

pub type Result<T> = std::result::Result<T, SolverError>;
