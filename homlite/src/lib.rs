//! Exact linear algebra over Euclidean rings, and the homology of chain complexes built on it.
//!
//! The computational kernel is a sparse elimination engine: a matrix is loaded into a
//! [`RowStore`](store::RowStore), reduced by an [`Eliminator`](elimination::Eliminator) into
//! echelon, Hermite or Smith (diagonal) form, and every elementary operation is recorded so that
//! the transforms `L`, `R` (and their inverses) can be rebuilt on demand by an
//! [`EliminationResult`](elimination::EliminationResult).
//!
//! The [`homology`] module feeds differentials of a [`ChainComplex`](homology::ChainComplex)
//! through this engine to obtain the module structure of each homology group.
//!
//! ```
//! use homlite::matrices::Matrix;
//!
//! let a = Matrix::<i64>::from_data((2, 2), [1, 2, 2, 3]);
//! let e = a.eliminate();
//! assert_eq!(e.rank(), 2);
//! assert_eq!(e.inverse(), Some(Matrix::from_data((2, 2), [-3, 2, 2, -1])));
//! ```

use std::fmt::Display;

pub mod elimination;
pub mod homology;
pub mod matrices;
pub mod rings;
pub mod store;

mod proptests;

pub use elimination::{EliminationForm, EliminationResult, Eliminator};
pub use homology::{ChainComplex, ModuleStructure};
pub use matrices::Matrix;
pub use rings::{EuclideanRing, Ring};

/// Errors raised when building matrices from external data.
///
/// Violated preconditions inside the engine (mismatched dimensions in arithmetic, determinants
/// of non-square matrices, ...) are programmer errors and panic instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomliteError {
    /// An entry was placed outside of the matrix.
    IndexOutOfBounds {
        index: (usize, usize),
        size: (usize, usize),
    },
    /// The amount of supplied data does not fit the requested shape.
    DimensionMismatch { expected: usize, found: usize },
}

impl Display for HomliteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HomliteError::IndexOutOfBounds { index, size } => write!(
                f,
                "index ({}, {}) is out of bounds for a {}x{} matrix",
                index.0, index.1, size.0, size.1
            ),
            HomliteError::DimensionMismatch { expected, found } => {
                write!(f, "expected {expected} entries, found {found}")
            }
        }
    }
}

impl std::error::Error for HomliteError {}
