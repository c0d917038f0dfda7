//! Permuted LU factorization with a Schur-complement remainder.
//!
//! Combines the pivot finder with sparse forward substitution: the
//! permuted pivot rows form the upper factor `[U, B]` with `U` upper
//! triangular and invertible on its diagonal, every remaining row is
//! expressed as a combination `x·U` of pivot rows, and what cannot be
//! expressed is left in the Schur complement. The decomposition satisfies
//!
//! ```text
//! P·A·Q = [I; L] · [U, B] + [0, 0; 0, S]
//! ```
//!
//! and works for rank-deficient input, where `S` is the part elimination
//! could not reach with invertible pivots.

use forma_rings::{EuclideanDomain, Ring};

use crate::permutation::Permutation;
use crate::pivot_finder::find_pivots;
use crate::sparse_matrix::{merge_scaled, RowEntries, SparseMatrix};

/// A permuted LU decomposition `P·A·Q = [I;L]·[U,B] + [0,0;0,S]`.
#[derive(Clone, Debug)]
pub struct LuDecomposition<R> {
    /// The permuted pivot rows `[U, B]`: r×n, upper triangular with an
    /// invertible diagonal on its first r columns.
    pub upper: SparseMatrix<R>,
    /// The multipliers expressing each non-pivot row in terms of the pivot
    /// rows: (m−r)×r.
    pub lower: SparseMatrix<R>,
    /// The Schur complement: (m−r)×(n−r), the residue of the non-pivot
    /// rows outside the pivot columns.
    pub schur: SparseMatrix<R>,
    /// Row permutation: original row index → permuted position.
    pub row_perm: Permutation,
    /// Column permutation: original column index → permuted position.
    pub col_perm: Permutation,
    /// The number of pivots, i.e. the row count of `upper`.
    pub rank: usize,
}

/// Factorizes `matrix` through a pivot search and forward substitution.
///
/// The input is only read; the permutations in the result relate it to the
/// returned factors.
#[must_use]
pub fn lu_decompose<R>(matrix: &SparseMatrix<R>) -> LuDecomposition<R>
where
    R: EuclideanDomain + Send + Sync,
{
    let selection = find_pivots(matrix);
    let rank = selection.len();
    let permuted = matrix.permuted(&selection.row_perm, &selection.col_perm);
    let num_rows = permuted.num_rows();
    let num_cols = permuted.num_cols();

    let upper = permuted.row_block(0..rank);

    let mut lower_triplets: Vec<(usize, usize, R)> = Vec::new();
    let mut schur_triplets: Vec<(usize, usize, R)> = Vec::new();

    for i in rank..num_rows {
        // Forward substitution solving x·U = c over the pivot columns:
        // U is upper triangular, so consuming the residual's leading
        // entries left to right terminates with the Schur row.
        let mut residual: RowEntries<R> = permuted.row(i).iter().cloned().collect();
        while let Some(&(col, _)) = residual.first() {
            if col >= rank {
                break;
            }
            let value = residual[0].1.clone();
            let diagonal = upper
                .get(col, col)
                .cloned()
                .expect("pivot diagonal entry present");
            let coefficient = value
                * diagonal
                    .inverse()
                    .expect("pivot values are invertible at selection time");
            residual = merge_scaled(&residual, upper.row(col), &-coefficient.clone());
            lower_triplets.push((i - rank, col, coefficient));
        }
        for (col, value) in residual {
            schur_triplets.push((i - rank, col - rank, value));
        }
    }

    LuDecomposition {
        upper,
        lower: SparseMatrix::from_triplets(num_rows - rank, rank, lower_triplets),
        schur: SparseMatrix::from_triplets(num_rows - rank, num_cols - rank, schur_triplets),
        row_perm: selection.row_perm,
        col_perm: selection.col_perm,
        rank,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forma_rings::Fp;

    type F7 = Fp<7>;

    fn reconstruct<R: Ring>(lu: &LuDecomposition<R>, num_rows: usize, num_cols: usize) -> SparseMatrix<R> {
        // [I;L]·[U,B] + [0,0;0,S], assembled row by row.
        let mut triplets: Vec<(usize, usize, R)> = Vec::new();
        for r in 0..lu.rank {
            for (c, v) in lu.upper.row_iter(r) {
                triplets.push((r, c, v.clone()));
            }
        }
        let bottom = lu.lower.mm(&lu.upper);
        for r in 0..num_rows - lu.rank {
            for (c, v) in bottom.row_iter(r) {
                triplets.push((lu.rank + r, c, v.clone()));
            }
            for (c, v) in lu.schur.row_iter(r) {
                triplets.push((lu.rank + r, lu.rank + c, v.clone()));
            }
        }
        SparseMatrix::from_triplets(num_rows, num_cols, triplets)
    }

    fn check_decomposition(matrix: &SparseMatrix<F7>) {
        let lu = lu_decompose(matrix);
        let permuted = matrix.permuted(&lu.row_perm, &lu.col_perm);
        let rebuilt = reconstruct(&lu, matrix.num_rows(), matrix.num_cols());
        assert_eq!(rebuilt, permuted, "LU reconstruction mismatch");

        // U is upper triangular with invertible diagonal.
        for i in 0..lu.rank {
            assert!(lu.upper.get(i, i).unwrap().inverse().is_some());
            for j in 0..i {
                assert_eq!(lu.upper.get(i, j), None);
            }
        }
    }

    #[test]
    fn test_full_rank() {
        let m = SparseMatrix::from_dense(&[
            vec![F7::new(2), F7::new(1), F7::new(0)],
            vec![F7::new(0), F7::new(3), F7::new(4)],
            vec![F7::new(0), F7::new(0), F7::new(6)],
        ]);
        let lu = lu_decompose(&m);
        assert_eq!(lu.rank, 3);
        assert!(lu.lower.is_empty());
        check_decomposition(&m);
    }

    #[test]
    fn test_rank_deficient_leaves_schur() {
        // Row 2 = row 0 + row 1; the cycle gate leaves it to the Schur
        // complement.
        let m = SparseMatrix::from_dense(&[
            vec![F7::new(1), F7::new(2), F7::new(3)],
            vec![F7::new(0), F7::new(1), F7::new(1)],
            vec![F7::new(1), F7::new(3), F7::new(4)],
        ]);
        check_decomposition(&m);
    }

    #[test]
    fn test_wide_and_tall() {
        let wide = SparseMatrix::from_triplets(
            2,
            5,
            vec![(0, 1, F7::new(2)), (0, 4, F7::new(3)), (1, 0, F7::new(1))],
        );
        check_decomposition(&wide);

        let tall = SparseMatrix::from_triplets(
            5,
            2,
            vec![
                (0, 0, F7::new(1)),
                (2, 1, F7::new(4)),
                (3, 0, F7::new(2)),
                (3, 1, F7::new(5)),
                (4, 0, F7::new(6)),
            ],
        );
        check_decomposition(&tall);
    }

    #[test]
    fn test_zero_matrix() {
        let m: SparseMatrix<F7> = SparseMatrix::zero(2, 3);
        let lu = lu_decompose(&m);
        assert_eq!(lu.rank, 0);
        assert!(lu.schur.is_zero());
        check_decomposition(&m);
    }
}
