//! Homology of chain complexes over a Euclidean ring.
//!
//! A [`ChainComplex`] pairs a [`ModuleGrid`] with a [`Differential`] and computes the homology
//! at each degree from diagonal eliminations of the adjacent differentials. Degrees where this
//! cannot be decided (indeterminable modules, or torsion that does not split in a supported way)
//! yield `None` rather than an error.

pub mod complex;
pub mod grid;
pub mod module;
mod split;


pub use complex::{ChainComplex, Differential, FnDifferential, MatrixDifferential};
pub use grid::{Bidegree, DefaultModule, Degree, ModuleGrid};
pub use module::{ModuleStructure, Summand};
