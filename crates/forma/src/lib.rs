//! # Forma
//!
//! Exact linear algebra over commutative rings.
//!
//! Forma computes canonical matrix forms — echelon, Hermite, diagonal,
//! Smith — and the facts derived from them: rank, determinant, kernel and
//! image bases, transformation matrices, and exact solutions to linear
//! systems. Everything is computed exactly over integers, rationals,
//! finite fields, or any ring implementing the `forma-rings` traits;
//! nothing is approximated.
//!
//! ## Features
//!
//! - **Sparse elimination engine**: per-row entry lists mutated in place
//!   by logged, invertible elementary operations
//! - **Parallel pivot search**: a maximal acyclic pivot set found with
//!   optimistic concurrency over a rayon pool
//! - **Canonical forms**: one state-machine family covering the whole
//!   echelon-to-Smith spectrum
//! - **Exact derivations**: transformation matrices replayed from the
//!   operation log, cached on first access
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use forma::prelude::*;
//!
//! let a = SparseMatrix::from_triplets(2, 2, vec![
//!     (0, 0, Z::new(6)), (1, 1, Z::new(4)),
//! ]);
//! let smith = eliminate(a, NormalForm::Smith);
//! assert_eq!(smith.matrix().get(0, 0), Some(&Z::new(2)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use forma_linalg as linalg;
pub use forma_rings as rings;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use forma_linalg::{
        eliminate, find_pivots, lu_decompose, EliminationResult, NormalForm, SparseMatrix,
    };
    pub use forma_rings::{EuclideanDomain, Field, Fp, Ring, Q, Z};
}
