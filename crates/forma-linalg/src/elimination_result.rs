//! The outcome of an elimination run and its derived quantities.
//!
//! A result owns the final form snapshot and the immutable operation log.
//! Everything else — transformation matrices and their inverses, rank,
//! kernel/image bases, determinant, solutions — is derived lazily from
//! that immutable state on first access and cached for the result's
//! lifetime; a pure cache needing no invalidation.

use std::sync::OnceLock;

use forma_rings::{EuclideanDomain, Ring};

use crate::elementary_op::{ElementaryOp, OperationLog};
use crate::elimination::NormalForm;
use crate::sparse_matrix::SparseMatrix;

/// A finished elimination: `left() * A * right() == matrix()`.
#[derive(Debug)]
pub struct EliminationResult<R> {
    form: NormalForm,
    matrix: SparseMatrix<R>,
    log: OperationLog<R>,
    left: OnceLock<SparseMatrix<R>>,
    left_inverse: OnceLock<SparseMatrix<R>>,
    right: OnceLock<SparseMatrix<R>>,
    right_inverse: OnceLock<SparseMatrix<R>>,
    kernel_basis: OnceLock<SparseMatrix<R>>,
    kernel_transition: OnceLock<SparseMatrix<R>>,
    image_basis: OnceLock<SparseMatrix<R>>,
    image_transition: OnceLock<SparseMatrix<R>>,
    rank: OnceLock<usize>,
    determinant: OnceLock<R>,
}

impl<R: Ring> EliminationResult<R> {
    pub(crate) fn new(form: NormalForm, matrix: SparseMatrix<R>, log: OperationLog<R>) -> Self {
        Self {
            form,
            matrix,
            log,
            left: OnceLock::new(),
            left_inverse: OnceLock::new(),
            right: OnceLock::new(),
            right_inverse: OnceLock::new(),
            kernel_basis: OnceLock::new(),
            kernel_transition: OnceLock::new(),
            image_basis: OnceLock::new(),
            image_transition: OnceLock::new(),
            rank: OnceLock::new(),
            determinant: OnceLock::new(),
        }
    }

    /// The form this run produced.
    #[must_use]
    pub fn form(&self) -> NormalForm {
        self.form
    }

    /// The final form snapshot.
    #[must_use]
    pub fn matrix(&self) -> &SparseMatrix<R> {
        &self.matrix
    }

    /// The operation log accumulated during the run.
    #[must_use]
    pub fn log(&self) -> &OperationLog<R> {
        &self.log
    }

    /// Left transformation matrix P: replaying the row ops against the
    /// identity.
    pub fn left(&self) -> &SparseMatrix<R> {
        self.left.get_or_init(|| {
            let mut p = SparseMatrix::identity(self.matrix.num_rows());
            for op in self.log.row_ops() {
                p.apply(op);
            }
            p
        })
    }

    /// The inverse of `left()`, built by reverse-replaying the inverted
    /// row ops.
    pub fn left_inverse(&self) -> &SparseMatrix<R> {
        self.left_inverse.get_or_init(|| {
            let mut p = SparseMatrix::identity(self.matrix.num_rows());
            for op in self.log.row_ops().iter().rev() {
                p.apply(&op.inverse());
            }
            p
        })
    }

    /// Right transformation matrix Q: replaying the column ops against the
    /// identity.
    pub fn right(&self) -> &SparseMatrix<R> {
        self.right.get_or_init(|| {
            let mut q = SparseMatrix::identity(self.matrix.num_cols());
            for op in self.log.col_ops() {
                q.apply(op);
            }
            q
        })
    }

    /// The inverse of `right()`, built by reverse-replaying the inverted
    /// column ops.
    pub fn right_inverse(&self) -> &SparseMatrix<R> {
        self.right_inverse.get_or_init(|| {
            let mut q = SparseMatrix::identity(self.matrix.num_cols());
            for op in self.log.col_ops().iter().rev() {
                q.apply(&op.inverse());
            }
            q
        })
    }

    /// The rank of the final form: the nonzero-diagonal count for diagonal
    /// forms, the nonzero row (respectively column) count for the echelon
    /// family.
    pub fn rank(&self) -> usize {
        *self.rank.get_or_init(|| match self.form {
            NormalForm::Diagonal | NormalForm::Smith => {
                let limit = self.matrix.num_rows().min(self.matrix.num_cols());
                (0..limit).filter(|&i| self.matrix.get(i, i).is_some()).count()
            }
            NormalForm::RowEchelon | NormalForm::Hermite => (0..self.matrix.num_rows())
                .filter(|&r| self.matrix.leading(r).is_some())
                .count(),
            NormalForm::ColEchelon => {
                let mut seen = vec![false; self.matrix.num_cols()];
                for r in 0..self.matrix.num_rows() {
                    for (c, _) in self.matrix.row_iter(r) {
                        seen[c] = true;
                    }
                }
                seen.into_iter().filter(|&s| s).count()
            }
        })
    }

    /// The determinant of the original matrix: the diagonal product of the
    /// (triangular or diagonal) form, corrected by each logged operation's
    /// determinant contribution. Zero for rank-deficient input.
    ///
    /// # Panics
    ///
    /// Panics if the eliminated matrix is not square.
    pub fn determinant(&self) -> &R {
        self.determinant.get_or_init(|| {
            let n = self.matrix.num_rows();
            assert_eq!(
                n,
                self.matrix.num_cols(),
                "determinant requires a square matrix"
            );
            if self.rank() < n {
                return R::zero();
            }
            let mut diagonal = R::one();
            for i in 0..n {
                diagonal = diagonal
                    * self
                        .matrix
                        .get(i, i)
                        .cloned()
                        .expect("full-rank form has a nonzero diagonal");
            }
            // P·A·Q = D, so det(A) = det(D) / (det(P)·det(Q)); every
            // logged operation contributes a unit.
            let mut correction = R::one();
            for op in self.log.row_ops().iter().chain(self.log.col_ops()) {
                correction = correction * op.det_contribution();
            }
            let inv = correction
                .inverse()
                .expect("elementary operations have unit determinant");
            diagonal * inv
        })
    }

    /// A basis of the kernel of the original matrix: the columns of
    /// `right()` past the rank, per the `P·A·Q = D` argument.
    ///
    /// # Panics
    ///
    /// Panics unless the run produced a diagonal form.
    pub fn kernel_basis(&self) -> &SparseMatrix<R> {
        self.kernel_basis.get_or_init(|| {
            self.require_diagonal_form("kernel_basis");
            let rank = self.rank();
            self.right().column_block(rank..self.matrix.num_cols())
        })
    }

    /// The transition mapping kernel vectors back to their coordinates:
    /// `kernel_transition() * kernel_basis()` is the identity.
    ///
    /// # Panics
    ///
    /// Panics unless the run produced a diagonal form.
    pub fn kernel_transition(&self) -> &SparseMatrix<R> {
        self.kernel_transition.get_or_init(|| {
            self.require_diagonal_form("kernel_transition");
            let rank = self.rank();
            self.right_inverse().row_block(rank..self.matrix.num_cols())
        })
    }

    /// A basis of the image of the original matrix: the in-rank columns of
    /// `left_inverse()`, each scaled by its diagonal entry, so every
    /// column is `A * (a column of right())`.
    ///
    /// # Panics
    ///
    /// Panics unless the run produced a diagonal form.
    pub fn image_basis(&self) -> &SparseMatrix<R> {
        self.image_basis.get_or_init(|| {
            self.require_diagonal_form("image_basis");
            let rank = self.rank();
            let mut basis = self.left_inverse().column_block(0..rank);
            for j in 0..rank {
                let d = self
                    .matrix
                    .get(j, j)
                    .cloned()
                    .expect("nonzero diagonal within the rank");
                basis.scale_col(j, &d);
            }
            basis
        })
    }

    /// The in-rank rows of `left()`: composing with `image_basis()` yields
    /// the diagonal block of the final form.
    ///
    /// # Panics
    ///
    /// Panics unless the run produced a diagonal form.
    pub fn image_transition(&self) -> &SparseMatrix<R> {
        self.image_transition.get_or_init(|| {
            self.require_diagonal_form("image_transition");
            let rank = self.rank();
            self.left().row_block(0..rank)
        })
    }

    fn require_diagonal_form(&self, what: &str) {
        assert!(
            matches!(self.form, NormalForm::Diagonal | NormalForm::Smith),
            "{what} requires a diagonal or Smith form run"
        );
    }
}

impl<R: EuclideanDomain> EliminationResult<R> {
    /// Solves `A * x = b` exactly through the factorization: transform
    /// `b`, divide by the diagonal, and map back through the column ops.
    ///
    /// Returns `None` when the transformed right-hand side is not exactly
    /// divisible by the diagonal or has nonzero mass outside the rank.
    ///
    /// # Panics
    ///
    /// Panics if `b`'s length does not match the row count, or the run did
    /// not produce a diagonal form.
    pub fn solve(&self, b: &[R]) -> Option<Vec<R>> {
        self.require_diagonal_form("solve");
        assert_eq!(b.len(), self.matrix.num_rows(), "right-hand side size mismatch");

        // y = P·b
        let mut y = b.to_vec();
        for op in self.log.row_ops() {
            apply_row_op_to_vector(op, &mut y);
        }

        let rank = self.rank();
        if y[rank..].iter().any(|v| !v.is_zero()) {
            return None;
        }

        // z = D⁺·y, requiring exact divisibility
        let mut z = vec![R::zero(); self.matrix.num_cols()];
        for (i, zi) in z.iter_mut().enumerate().take(rank) {
            let d = self
                .matrix
                .get(i, i)
                .expect("nonzero diagonal within the rank");
            let (quotient, remainder) = y[i].div_rem(d);
            if !remainder.is_zero() {
                return None;
            }
            *zi = quotient;
        }

        // x = Q·z: the column ops act on a column vector in reverse order.
        for op in self.log.col_ops().iter().rev() {
            apply_col_op_to_vector(op, &mut z);
        }
        Some(z)
    }
}

/// Applies a row operation to a column vector from the left.
fn apply_row_op_to_vector<R: Ring>(op: &ElementaryOp<R>, v: &mut [R]) {
    match op {
        ElementaryOp::AddRow { src, dst, mult } => {
            v[*dst] = v[*dst].clone() + mult.clone() * v[*src].clone();
        }
        ElementaryOp::ScaleRow { row, factor } => {
            v[*row] = v[*row].clone() * factor.clone();
        }
        ElementaryOp::SwapRows { a, b } => v.swap(*a, *b),
        _ => unreachable!("column operation in the row partition"),
    }
}

/// Applies a column operation's matrix to a column vector: for
/// `F = I + mult·e_src·e_dstᵀ` this adds `mult·v[dst]` into `v[src]`.
fn apply_col_op_to_vector<R: Ring>(op: &ElementaryOp<R>, v: &mut [R]) {
    match op {
        ElementaryOp::AddCol { src, dst, mult } => {
            v[*src] = v[*src].clone() + mult.clone() * v[*dst].clone();
        }
        ElementaryOp::ScaleCol { col, factor } => {
            v[*col] = v[*col].clone() * factor.clone();
        }
        ElementaryOp::SwapCols { a, b } => v.swap(*a, *b),
        _ => unreachable!("row operation in the column partition"),
    }
}
