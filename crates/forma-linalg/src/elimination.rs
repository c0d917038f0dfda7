//! Elimination state machines producing canonical forms.
//!
//! One machine skeleton drives every form: `prepare` enables tracking,
//! `iteration` commits one pivot, `finalize` runs the form-specific
//! post-pass. Every mutation routes through `apply`, which updates the row
//! store and the operation log in lockstep, so a finished run can replay
//! its log to reconstruct the transformation matrices exactly.
//!
//! The machines are strictly sequential: each elementary operation depends
//! on the previous one's result.

use forma_rings::{EuclideanDomain, Ring};

use crate::elementary_op::{ElementaryOp, OperationLog};
use crate::elimination_result::EliminationResult;
use crate::sparse_matrix::SparseMatrix;

/// The target canonical form of an elimination run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NormalForm {
    /// Row echelon form: leading entries in strictly increasing columns.
    RowEchelon,
    /// Column echelon form: row echelon of the transpose, roles swapped back.
    ColEchelon,
    /// Echelon with entries above each pivot reduced modulo the pivot.
    Hermite,
    /// Diagonal form where each pivot divides the remaining submatrix.
    Diagonal,
    /// Smith normal form: diagonal with each entry dividing the next.
    Smith,
}

/// Runs an elimination to the requested form, consuming the matrix.
///
/// The row store is destructively mutated through the run and never
/// resurrected; the returned result owns the final snapshot and the
/// operation log.
#[must_use]
pub fn eliminate<R: EuclideanDomain>(matrix: SparseMatrix<R>, form: NormalForm) -> EliminationResult<R> {
    if form == NormalForm::ColEchelon {
        // Reuse, not a second algorithm: eliminate the transpose to row
        // echelon, then swap the row/column roles of the outcome.
        let machine = Eliminator::new(matrix.transpose(), NormalForm::RowEchelon);
        let (reduced, log) = machine.run();
        return EliminationResult::new(NormalForm::ColEchelon, reduced.transpose(), log.transposed());
    }
    let machine = Eliminator::new(matrix, form);
    let (reduced, log) = machine.run();
    EliminationResult::new(form, reduced, log)
}

struct Eliminator<R> {
    matrix: SparseMatrix<R>,
    log: OperationLog<R>,
    form: NormalForm,
    /// The next pivot position; rows and columns before it are settled.
    step: usize,
    done: bool,
}

impl<R: EuclideanDomain> Eliminator<R> {
    fn new(matrix: SparseMatrix<R>, form: NormalForm) -> Self {
        Self {
            matrix,
            log: OperationLog::new(),
            form,
            step: 0,
            done: false,
        }
    }

    fn run(mut self) -> (SparseMatrix<R>, OperationLog<R>) {
        self.prepare();
        while !self.is_done() {
            self.iteration();
        }
        self.finalize();
        (self.matrix, self.log)
    }

    /// Applies one elementary operation to the row store and logs it.
    fn apply(&mut self, op: ElementaryOp<R>) {
        self.matrix.apply(&op);
        self.log.push(op);
    }

    fn prepare(&mut self) {
        self.matrix.enable_tracking();
    }

    fn is_done(&self) -> bool {
        self.done || self.step >= self.matrix.num_rows().min(self.matrix.num_cols())
    }

    fn iteration(&mut self) {
        match self.form {
            NormalForm::RowEchelon | NormalForm::Hermite => self.echelon_iteration(),
            NormalForm::Diagonal | NormalForm::Smith => self.diagonal_iteration(),
            NormalForm::ColEchelon => unreachable!("column echelon runs on the transpose"),
        }
    }

    fn finalize(&mut self) {
        match self.form {
            NormalForm::Hermite => self.reduce_above_pivots(),
            NormalForm::Smith => self.smith_fixup(),
            _ => {}
        }
    }

    /// One row-echelon pivot step: the first unprocessed row holding the
    /// lowest available column is swapped into place, scaled to 1 when its
    /// pivot is invertible, and everything below it is cleared.
    fn echelon_iteration(&mut self) {
        let step = self.step;
        let candidate = (step..self.matrix.num_rows())
            .filter_map(|r| self.matrix.leading(r).map(|(c, _)| (c, r)))
            .min();
        let Some((col, row)) = candidate else {
            self.done = true;
            return;
        };

        if row != step {
            self.apply(ElementaryOp::SwapRows { a: step, b: row });
        }
        self.normalize_pivot(step, col);
        self.clear_column_below(step, col);
        // A gcd swap during clearing may have promoted a different value
        // into the pivot slot.
        self.normalize_pivot(step, col);
        self.step += 1;
    }

    /// Scales the pivot to 1 when it is invertible.
    fn normalize_pivot(&mut self, row: usize, col: usize) {
        let pivot = self
            .matrix
            .get(row, col)
            .cloned()
            .expect("pivot position holds an entry");
        if !pivot.is_one() {
            if let Some(inv) = pivot.inverse() {
                self.apply(ElementaryOp::ScaleRow { row, factor: inv });
            }
        }
    }

    /// Clears every entry below the pivot by Euclidean reduction: quotient
    /// row-adds leave remainders, and a nonzero remainder is swapped into
    /// the pivot slot to continue the gcd descent.
    fn clear_column_below(&mut self, pivot_row: usize, col: usize) {
        loop {
            // Rows past the pivot carry nothing left of this column, so an
            // entry in it is always their leading entry.
            let below = self
                .matrix
                .rows_with_lead(col)
                .filter(|&r| r > pivot_row)
                .min();
            let Some(row) = below else {
                return;
            };
            let entry = self
                .matrix
                .get(row, col)
                .cloned()
                .expect("lead index points at an entry");
            let pivot = self
                .matrix
                .get(pivot_row, col)
                .cloned()
                .expect("pivot position holds an entry");
            let (quotient, remainder) = entry.div_rem(&pivot);
            if !quotient.is_zero() {
                self.apply(ElementaryOp::AddRow {
                    src: pivot_row,
                    dst: row,
                    mult: -quotient,
                });
            }
            if !remainder.is_zero() {
                self.apply(ElementaryOp::SwapRows { a: pivot_row, b: row });
            }
        }
    }

    /// Second Hermite pass: reduces every entry above a pivot modulo that
    /// pivot, clearing it exactly when divisible.
    fn reduce_above_pivots(&mut self) {
        for k in 0..self.step {
            let Some((col, _)) = self.matrix.leading(k) else {
                continue;
            };
            for i in 0..k {
                let Some(entry) = self.matrix.get(i, col).cloned() else {
                    continue;
                };
                let pivot = self
                    .matrix
                    .get(k, col)
                    .cloned()
                    .expect("pivot position holds an entry");
                let (quotient, _) = entry.div_rem(&pivot);
                if !quotient.is_zero() {
                    self.apply(ElementaryOp::AddRow {
                        src: k,
                        dst: i,
                        mult: -quotient,
                    });
                }
            }
        }
    }

    /// One diagonalization step: the smallest-degree entry of the trailing
    /// submatrix becomes the pivot, its row and column are cleared by
    /// Euclidean division, and a combining step re-runs the clearing until
    /// the pivot exactly divides everything that remains.
    fn diagonal_iteration(&mut self) {
        let k = self.step;
        let Some((pi, pj)) = self.find_submatrix_pivot(k) else {
            self.done = true;
            return;
        };
        if pi != k {
            self.apply(ElementaryOp::SwapRows { a: k, b: pi });
        }
        if pj != k {
            self.apply(ElementaryOp::SwapCols { a: k, b: pj });
        }

        loop {
            if self.reduce_column(k) {
                continue;
            }
            if self.reduce_row(k) {
                continue;
            }
            if let Some(row) = self.find_nondivisible_row(k) {
                // Fold the offending row into the pivot row; re-clearing
                // will drive the pivot down to a common divisor.
                self.apply(ElementaryOp::AddRow {
                    src: row,
                    dst: k,
                    mult: R::one(),
                });
                continue;
            }
            break;
        }
        self.step += 1;
    }

    /// The smallest entry of the trailing submatrix by (degree, row
    /// weight), ties resolved in row-major order so an already-normalized
    /// matrix selects its existing diagonal.
    fn find_submatrix_pivot(&self, k: usize) -> Option<(usize, usize)> {
        let mut best: Option<((usize, usize, usize, usize), (usize, usize))> = None;
        for r in k..self.matrix.num_rows() {
            let weight = self.matrix.row_weight(r);
            for (c, v) in self.matrix.row_iter(r) {
                if c < k {
                    continue;
                }
                let key = (v.euclidean_degree(), weight, r, c);
                if best.as_ref().is_none_or(|(cur, _)| key < *cur) {
                    best = Some((key, (r, c)));
                }
            }
        }
        best.map(|(_, pos)| pos)
    }

    /// Euclidean clearing of the pivot column below `k`. Returns true if
    /// anything changed.
    fn reduce_column(&mut self, k: usize) -> bool {
        let mut changed = false;
        loop {
            let below = self.matrix.rows_with_lead(k).filter(|&r| r > k).min();
            let Some(row) = below else {
                return changed;
            };
            changed = true;
            let entry = self
                .matrix
                .get(row, k)
                .cloned()
                .expect("lead index points at an entry");
            let pivot = self
                .matrix
                .get(k, k)
                .cloned()
                .expect("pivot position holds an entry");
            let (quotient, remainder) = entry.div_rem(&pivot);
            if !quotient.is_zero() {
                self.apply(ElementaryOp::AddRow {
                    src: k,
                    dst: row,
                    mult: -quotient,
                });
            }
            if !remainder.is_zero() {
                self.apply(ElementaryOp::SwapRows { a: k, b: row });
            }
        }
    }

    /// Euclidean clearing of the pivot row right of `k`, via column
    /// operations. Returns true if anything changed.
    fn reduce_row(&mut self, k: usize) -> bool {
        let mut changed = false;
        loop {
            let right = self
                .matrix
                .row_iter(k)
                .map(|(c, _)| c)
                .find(|&c| c > k);
            let Some(col) = right else {
                return changed;
            };
            changed = true;
            let entry = self
                .matrix
                .get(k, col)
                .cloned()
                .expect("iterated entry is present");
            let pivot = self
                .matrix
                .get(k, k)
                .cloned()
                .expect("pivot position holds an entry");
            let (quotient, remainder) = entry.div_rem(&pivot);
            if !quotient.is_zero() {
                self.apply(ElementaryOp::AddCol {
                    src: k,
                    dst: col,
                    mult: -quotient,
                });
            }
            if !remainder.is_zero() {
                self.apply(ElementaryOp::SwapCols { a: k, b: col });
            }
        }
    }

    /// Finds a trailing-submatrix row holding an entry the pivot does not
    /// divide exactly.
    fn find_nondivisible_row(&self, k: usize) -> Option<usize> {
        let pivot = self.matrix.get(k, k)?.clone();
        for r in k + 1..self.matrix.num_rows() {
            for (c, v) in self.matrix.row_iter(r) {
                if c > k && !v.is_divisible_by(&pivot) {
                    return Some(r);
                }
            }
        }
        None
    }

    /// Smith post-pass: folds every adjacent diagonal pair violating
    /// divisibility into (gcd, lcm) with logged operations, repeating
    /// until the whole chain divides.
    fn smith_fixup(&mut self) {
        let rank = self.step;
        if rank < 2 {
            return;
        }
        loop {
            let mut fixed = false;
            for i in 0..rank - 1 {
                let d_i = self
                    .matrix
                    .get(i, i)
                    .cloned()
                    .expect("diagonal entry within the rank");
                let d_next = self
                    .matrix
                    .get(i + 1, i + 1)
                    .cloned()
                    .expect("diagonal entry within the rank");
                if d_next.is_divisible_by(&d_i) {
                    continue;
                }
                // Bring the next diagonal entry into the pivot row, then
                // re-clear: the pair becomes (gcd, lcm) up to units. Each
                // fix strictly decreases the earlier entry's degree, so
                // the pass terminates.
                self.apply(ElementaryOp::AddRow {
                    src: i + 1,
                    dst: i,
                    mult: R::one(),
                });
                loop {
                    if self.reduce_column(i) {
                        continue;
                    }
                    if self.reduce_row(i) {
                        continue;
                    }
                    break;
                }
                fixed = true;
            }
            if !fixed {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forma_rings::{Fp, Z};

    type F7 = Fp<7>;

    fn z_matrix(rows: &[&[i64]]) -> SparseMatrix<Z> {
        SparseMatrix::from_dense(
            &rows
                .iter()
                .map(|r| r.iter().map(|&v| Z::new(v)).collect())
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_row_echelon_shape() {
        let result = eliminate(
            z_matrix(&[&[0, 2, 1], &[1, 1, 0], &[2, 2, 1]]),
            NormalForm::RowEchelon,
        );
        let m = result.matrix();
        // Leading columns strictly increase over nonzero rows.
        let mut last = None;
        for r in 0..m.num_rows() {
            if let Some((c, _)) = m.leading(r) {
                assert!(last.is_none_or(|prev| prev < c), "not in echelon form");
                last = Some(c);
            }
        }
    }

    #[test]
    fn test_field_echelon_has_unit_pivots() {
        let matrix = SparseMatrix::from_dense(&[
            vec![F7::new(3), F7::new(1)],
            vec![F7::new(5), F7::new(2)],
        ]);
        let result = eliminate(matrix, NormalForm::RowEchelon);
        for r in 0..2 {
            let (_, v) = result.matrix().leading(r).expect("full rank");
            assert!(Ring::is_one(v), "field pivots are scaled to 1");
        }
    }

    #[test]
    fn test_diagonal_form_is_diagonal() {
        let result = eliminate(
            z_matrix(&[&[2, 4, 4], &[-6, 6, 12], &[10, 4, 16]]),
            NormalForm::Diagonal,
        );
        let m = result.matrix();
        for r in 0..m.num_rows() {
            for (c, _) in m.row_iter(r) {
                assert_eq!(c, r, "off-diagonal entry after diagonalization");
            }
        }
    }

    #[test]
    fn test_diagonal_pivot_divides_successor() {
        let result = eliminate(
            z_matrix(&[&[2, 4, 4], &[-6, 6, 12], &[10, 4, 16]]),
            NormalForm::Smith,
        );
        let m = result.matrix();
        let rank = result.rank();
        assert_eq!(rank, 3);
        for i in 0..rank - 1 {
            let d_i = m.get(i, i).unwrap();
            let d_next = m.get(i + 1, i + 1).unwrap();
            assert!(
                d_next.is_divisible_by(d_i),
                "smith chain broken at {i}: {d_i:?} does not divide {d_next:?}"
            );
        }
    }

    #[test]
    fn test_hermite_reduces_above() {
        let result = eliminate(z_matrix(&[&[4, 7], &[2, 5]]), NormalForm::Hermite);
        let m = result.matrix();
        // Each entry above a pivot is a remainder modulo that pivot.
        for k in 0..m.num_rows() {
            if let Some((c, pivot)) = m.leading(k) {
                for i in 0..k {
                    if let Some(v) = m.get(i, c) {
                        assert!(
                            v.euclidean_degree() < pivot.euclidean_degree()
                                || v.clone().div_rem(pivot).0.is_zero(),
                            "entry above pivot not reduced"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_col_echelon_is_transposed_row_echelon() {
        let a = z_matrix(&[&[1, 2, 0], &[0, 3, 1]]);
        let col = eliminate(a.clone(), NormalForm::ColEchelon);
        let row_of_t = eliminate(a.transpose(), NormalForm::RowEchelon);
        assert_eq!(col.matrix(), &row_of_t.matrix().transpose());
    }

    #[test]
    fn test_zero_matrix() {
        let result = eliminate(SparseMatrix::<Z>::zero(3, 4), NormalForm::Smith);
        assert!(result.matrix().is_zero());
        assert_eq!(result.rank(), 0);
        assert!(result.log().is_empty());
    }
}
