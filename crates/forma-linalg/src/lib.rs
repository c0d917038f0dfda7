//! # forma-linalg
//!
//! Exact sparse linear algebra over commutative rings.
//!
//! This crate provides:
//! - Sparse matrices as per-row sorted entry lists, mutated in place by
//!   invertible elementary operations
//! - A parallel pivot search selecting a maximal acyclic set of
//!   invertible pivots (rayon + optimistic commits)
//! - Elimination state machines for row/column echelon, Hermite,
//!   diagonal, and Smith normal forms
//! - Result objects that lazily derive transformation matrices and their
//!   inverses, rank, kernel/image bases, determinants, and exact
//!   solutions
//! - A permuted LU factorization with a Schur-complement remainder
//!
//! Everything is exact: coefficients come from `forma-rings` and no
//! floating point is involved anywhere.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use forma_linalg::{eliminate, NormalForm, SparseMatrix};
//! use forma_rings::Z;
//!
//! let a = SparseMatrix::from_triplets(2, 2, vec![
//!     (0, 0, Z::new(2)), (0, 1, Z::new(4)),
//!     (1, 0, Z::new(6)), (1, 1, Z::new(8)),
//! ]);
//! let smith = eliminate(a, NormalForm::Smith);
//! assert_eq!(smith.rank(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dense_matrix;
pub mod elementary_op;
pub mod elimination;
pub mod elimination_result;
pub mod lu;
pub mod permutation;
pub mod pivot_finder;
pub mod sparse_matrix;

pub use dense_matrix::DenseMatrix;
pub use elementary_op::{ElementaryOp, OperationLog};
pub use elimination::{eliminate, NormalForm};
pub use elimination_result::EliminationResult;
pub use lu::{lu_decompose, LuDecomposition};
pub use permutation::Permutation;
pub use pivot_finder::{find_pivots, PivotSelection};
pub use sparse_matrix::SparseMatrix;


mod proptests;
