//! Selection of a maximal, dependency-acyclic set of invertible pivots.
//!
//! The search runs in three phases over a read-only matrix (after
//! Bouillaguet–Delaplace–Voge, "Parallel Sparse PLUQ"):
//!
//! 1. *Direct pivots*: rows whose leading value is invertible claim their
//!    leading column; per-column ties go to the smaller leading degree,
//!    then the smaller row weight.
//! 2. *Column-sweep pivots*: still-pivotless rows claim, in row order, the
//!    first unreserved column holding an invertible value whose acceptance
//!    closes no dependency cycle.
//! 3. *Cycle-free pivots*: the remaining rows are searched concurrently.
//!    Workers snapshot the shared pivot map, search off-lock, then
//!    re-acquire the lock and commit only if the pivot count is unchanged;
//!    a stale count discards the candidate and retries.
//!
//! A final topological pass orders the committed pivots so the permuted
//! pivot block is upper triangular, which downstream triangular solves
//! rely on.

use parking_lot::Mutex;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use forma_rings::{EuclideanDomain, Ring};

use crate::permutation::Permutation;
use crate::sparse_matrix::SparseMatrix;

/// The outcome of a pivot search: pivots in dependency order, plus the
/// permutations placing them on the diagonal.
#[derive(Clone, Debug)]
pub struct PivotSelection {
    /// Committed (row, col) pivots, topologically ordered: permuting rows
    /// and columns by the permutations below puts pivot k at (k, k) and
    /// makes the pivot block upper triangular.
    pub pivots: Vec<(usize, usize)>,
    /// Row permutation: original row index → permuted position.
    pub row_perm: Permutation,
    /// Column permutation: original column index → permuted position.
    pub col_perm: Permutation,
}

impl PivotSelection {
    /// The number of pivots found (the structural rank lower bound).
    #[must_use]
    pub fn len(&self) -> usize {
        self.pivots.len()
    }

    /// Returns true if no pivot was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pivots.is_empty()
    }
}

/// Searches `matrix` for a maximal acyclic set of invertible pivots.
///
/// The matrix must not be mutated concurrently with this run; the search
/// itself only reads it, so the parallel phase needs no synchronization
/// beyond the pivot-map lock.
#[must_use]
pub fn find_pivots<R>(matrix: &SparseMatrix<R>) -> PivotSelection
where
    R: EuclideanDomain + Send + Sync,
{
    let num_rows = matrix.num_rows();
    let num_cols = matrix.num_cols();

    // Row weights for the phase-1 tie-break, computed once up front.
    let weights: Vec<usize> = (0..num_rows)
        .map(|r| matrix.row_iter(r).map(|(_, v)| v.euclidean_degree()).sum())
        .collect();

    let mut by_col: FxHashMap<usize, usize> = FxHashMap::default();
    let mut has_pivot = vec![false; num_rows];

    // Phase 1: direct pivots from invertible leading entries.
    let mut best: FxHashMap<usize, (usize, usize, usize)> = FxHashMap::default();
    for r in 0..num_rows {
        if let Some((c, v)) = matrix.leading(r) {
            if v.inverse().is_some() {
                let key = (v.euclidean_degree(), weights[r], r);
                best.entry(c)
                    .and_modify(|cur| {
                        if key < *cur {
                            *cur = key;
                        }
                    })
                    .or_insert(key);
            }
        }
    }
    for (&c, &(_, _, r)) in &best {
        by_col.insert(c, r);
        has_pivot[r] = true;
    }

    // Phase 2: column sweep over still-pivotless rows, gated on acyclicity.
    for r in 0..num_rows {
        if has_pivot[r] {
            continue;
        }
        for (c, v) in matrix.row_iter(r) {
            if by_col.contains_key(&c) || v.inverse().is_none() {
                continue;
            }
            if closes_cycle(matrix, &by_col, r, c) {
                continue;
            }
            by_col.insert(c, r);
            has_pivot[r] = true;
            break;
        }
    }

    // Phase 3: parallel cycle-free search with optimistic commits.
    let remaining: Vec<usize> = (0..num_rows).filter(|&r| !has_pivot[r]).collect();
    let shared = Mutex::new(by_col);
    remaining.par_iter().for_each(|&r| {
        loop {
            let snapshot = shared.lock().clone();
            let observed = snapshot.len();

            // Off-lock, side-effect-free search. The first acyclic
            // candidate column is accepted rather than the lightest one;
            // keeping the search cheap beats optimizing the choice here.
            let candidate = matrix.row_iter(r).find_map(|(c, v)| {
                if snapshot.contains_key(&c) || v.inverse().is_none() {
                    return None;
                }
                if closes_cycle(matrix, &snapshot, r, c) {
                    return None;
                }
                Some(c)
            });

            let mut guard = shared.lock();
            if guard.len() != observed {
                // Another worker committed since our read: the candidate
                // may be stale, so discard it and search again.
                continue;
            }
            if let Some(c) = candidate {
                guard.insert(c, r);
            }
            break;
        }
    });
    let by_col = shared.into_inner();

    // Topological ordering: emit each pivot before every pivot its row
    // depends on refers forward to, so the permuted block is upper
    // triangular.
    let mut col_of_row: Vec<Option<usize>> = vec![None; num_rows];
    for (&c, &r) in &by_col {
        col_of_row[r] = Some(c);
    }
    let pivot_rows: Vec<usize> = (0..num_rows).filter(|&r| col_of_row[r].is_some()).collect();

    let mut state = vec![0u8; num_rows]; // 0 unvisited, 1 in progress, 2 done
    let mut postorder: Vec<usize> = Vec::with_capacity(pivot_rows.len());
    for &start in pivot_rows.iter().rev() {
        if state[start] != 0 {
            continue;
        }
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        state[start] = 1;
        while let Some(&(u, i)) = stack.last() {
            let row = matrix.row(u);
            if i < row.len() {
                stack.last_mut().expect("stack is nonempty").1 += 1;
                if let Some(&v) = by_col.get(&row[i].0) {
                    if v != u && state[v] == 0 {
                        state[v] = 1;
                        stack.push((v, 0));
                    }
                }
            } else {
                postorder.push(u);
                state[u] = 2;
                stack.pop();
            }
        }
    }
    postorder.reverse();

    let pivots: Vec<(usize, usize)> = postorder
        .iter()
        .map(|&r| (r, col_of_row[r].expect("ordered row carries a pivot")))
        .collect();
    let pivot_row_list: Vec<usize> = pivots.iter().map(|&(r, _)| r).collect();
    let pivot_col_list: Vec<usize> = pivots.iter().map(|&(_, c)| c).collect();

    PivotSelection {
        row_perm: Permutation::putting_first(&pivot_row_list, num_rows),
        col_perm: Permutation::putting_first(&pivot_col_list, num_cols),
        pivots,
    }
}

/// Checks whether committing (`row`, `col`) would close a dependency cycle
/// through the already-committed pivots.
///
/// Edges run from a row to the pivot rows of the columns it touches; a
/// cycle appears exactly when some row reachable from `row` itself holds a
/// nonzero in `col`.
fn closes_cycle<R: EuclideanDomain>(
    matrix: &SparseMatrix<R>,
    by_col: &FxHashMap<usize, usize>,
    row: usize,
    col: usize,
) -> bool {
    let mut seen = FxHashSet::default();
    let mut stack: Vec<usize> = Vec::new();
    for (c, _) in matrix.row_iter(row) {
        if c == col {
            continue;
        }
        if let Some(&v) = by_col.get(&c) {
            if seen.insert(v) {
                stack.push(v);
            }
        }
    }
    while let Some(u) = stack.pop() {
        if matrix.get(u, col).is_some() {
            return true;
        }
        for (c, _) in matrix.row_iter(u) {
            if let Some(&v) = by_col.get(&c) {
                if v != u && seen.insert(v) {
                    stack.push(v);
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use forma_rings::{Fp, Ring, Z};

    type F7 = Fp<7>;

    fn check_selection<R: forma_rings::EuclideanDomain>(
        matrix: &SparseMatrix<R>,
        selection: &PivotSelection,
    ) {
        // Pivot values are invertible; rows and columns duplicate-free.
        let mut rows = FxHashSet::default();
        let mut cols = FxHashSet::default();
        for &(r, c) in &selection.pivots {
            assert!(rows.insert(r), "duplicate pivot row {r}");
            assert!(cols.insert(c), "duplicate pivot col {c}");
            let v = matrix.get(r, c).expect("pivot position holds an entry");
            assert!(v.inverse().is_some(), "pivot value must be invertible");
        }

        // The permuted pivot block is upper triangular with invertible
        // diagonal entries.
        let permuted = matrix.permuted(&selection.row_perm, &selection.col_perm);
        let rank = selection.len();
        for i in 0..rank {
            assert!(permuted.get(i, i).is_some());
            for j in 0..i {
                assert_eq!(permuted.get(i, j), None, "pivot block not triangular");
            }
        }
    }

    #[test]
    fn test_identity_pivots() {
        let m: SparseMatrix<F7> = SparseMatrix::identity(4);
        let sel = find_pivots(&m);
        assert_eq!(sel.len(), 4);
        assert!(sel.row_perm.is_identity());
        assert!(sel.col_perm.is_identity());
        check_selection(&m, &sel);
    }

    #[test]
    fn test_full_rank_field_matrix() {
        let m = SparseMatrix::from_dense(&[
            vec![F7::new(2), F7::new(1), F7::new(0)],
            vec![F7::new(0), F7::new(3), F7::new(4)],
            vec![F7::new(0), F7::new(0), F7::new(5)],
        ]);
        let sel = find_pivots(&m);
        assert_eq!(sel.len(), 3);
        check_selection(&m, &sel);
    }

    #[test]
    fn test_integer_units_only() {
        // Over Z only ±1 entries are invertible.
        let m = SparseMatrix::from_dense(&[
            vec![Z::new(2), Z::new(1), Z::new(0)],
            vec![Z::new(4), Z::new(0), Z::new(6)],
            vec![Z::new(0), Z::new(0), Z::new(-1)],
        ]);
        let sel = find_pivots(&m);
        for &(r, c) in &sel.pivots {
            assert!(m.get(r, c).unwrap().inverse().is_some());
        }
        // Rows 0 and 2 hold units; row 1 holds none.
        assert_eq!(sel.len(), 2);
        check_selection(&m, &sel);
    }

    #[test]
    fn test_zero_matrix_has_no_pivots() {
        let m: SparseMatrix<F7> = SparseMatrix::zero(3, 3);
        let sel = find_pivots(&m);
        assert!(sel.is_empty());
        assert_eq!(sel.row_perm.len(), 3);
    }

    #[test]
    fn test_rank_deficient() {
        let m = SparseMatrix::from_dense(&[
            vec![F7::new(1), F7::new(2)],
            vec![F7::new(2), F7::new(4)],
            vec![F7::new(0), F7::new(0)],
        ]);
        let sel = find_pivots(&m);
        // Structural search may still pick two pivots from the dependent
        // rows; it guarantees acyclicity and invertibility, not numeric
        // rank.
        assert!(sel.len() <= 2);
        assert!(!sel.is_empty());
        check_selection(&m, &sel);
    }

    #[test]
    fn test_wide_sparse_matrix() {
        let m = SparseMatrix::from_triplets(
            3,
            6,
            vec![
                (0, 4, F7::new(2)),
                (0, 5, F7::new(1)),
                (1, 0, F7::new(3)),
                (2, 0, F7::new(1)),
                (2, 3, F7::new(6)),
            ],
        );
        let sel = find_pivots(&m);
        assert_eq!(sel.len(), 3);
        check_selection(&m, &sel);
    }
}
