//! Sparse matrices stored as per-row sorted entry lists.
//!
//! Each row owns a short sequence of (column, value) pairs, sorted
//! ascending by column and never containing a logical zero. The layout is
//! chosen for in-place elimination: adding a multiple of one row to another
//! is a two-pointer merge in O(len(src) + len(dst)), scaling is O(len), and
//! swapping rows exchanges the storage handles in O(1).
//!
//! An optional tracking mode maintains, incrementally on every mutation,
//! per-row weights (sum of entry euclidean degrees) and a reverse index
//! from each column to the rows whose current leading nonzero sits in it.
//! Pivot search consumes both.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use forma_rings::{EuclideanDomain, Ring};

use crate::dense_matrix::DenseMatrix;
use crate::elementary_op::ElementaryOp;
use crate::permutation::Permutation;

/// The entry list of one sparse row: (column, value) pairs sorted by column.
pub type RowEntries<R> = SmallVec<[(usize, R); 4]>;

/// Merges `dst + mult * src` over two sorted entry lists.
///
/// Positions that cancel exactly to zero are dropped, preserving the sparse
/// invariant.
pub(crate) fn merge_scaled<R: Ring>(
    dst: &[(usize, R)],
    src: &[(usize, R)],
    mult: &R,
) -> RowEntries<R> {
    let mut merged = RowEntries::with_capacity(dst.len() + src.len());
    let mut i = 0;
    let mut j = 0;

    while i < dst.len() && j < src.len() {
        let (dc, dv) = &dst[i];
        let (sc, sv) = &src[j];
        match dc.cmp(sc) {
            std::cmp::Ordering::Less => {
                merged.push((*dc, dv.clone()));
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                let contribution = mult.clone() * sv.clone();
                if !contribution.is_zero() {
                    merged.push((*sc, contribution));
                }
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                let sum = dv.clone() + mult.clone() * sv.clone();
                if !sum.is_zero() {
                    merged.push((*dc, sum));
                }
                i += 1;
                j += 1;
            }
        }
    }
    while i < dst.len() {
        merged.push((dst[i].0, dst[i].1.clone()));
        i += 1;
    }
    while j < src.len() {
        let contribution = mult.clone() * src[j].1.clone();
        if !contribution.is_zero() {
            merged.push((src[j].0, contribution));
        }
        j += 1;
    }
    merged
}

/// Incrementally maintained pivot-search metadata.
#[derive(Clone, Debug)]
struct Tracking<R> {
    degree: fn(&R) -> usize,
    weights: Vec<usize>,
    leads: Vec<Option<usize>>,
    rows_by_lead: Vec<FxHashSet<usize>>,
}

/// A sparse matrix over a ring, mutated in place by elementary operations.
#[derive(Clone, Debug)]
pub struct SparseMatrix<R> {
    rows: Vec<RowEntries<R>>,
    num_cols: usize,
    tracking: Option<Tracking<R>>,
}

impl<R: Ring> SparseMatrix<R> {
    /// Creates a zero matrix.
    #[must_use]
    pub fn zero(num_rows: usize, num_cols: usize) -> Self {
        Self {
            rows: vec![RowEntries::new(); num_rows],
            num_cols,
            tracking: None,
        }
    }

    /// Creates an identity matrix of size n×n.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zero(n, n);
        for (i, row) in m.rows.iter_mut().enumerate() {
            row.push((i, R::one()));
        }
        m
    }

    /// Creates a sparse matrix from (row, col, value) triples.
    ///
    /// Duplicate positions are summed; positions that sum to zero and
    /// explicit zero values are dropped.
    ///
    /// # Panics
    ///
    /// Panics if any triple is out of range.
    #[must_use]
    pub fn from_triplets<I>(num_rows: usize, num_cols: usize, triplets: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize, R)>,
    {
        let mut sorted: Vec<(usize, usize, R)> = triplets.into_iter().collect();
        for (r, c, _) in &sorted {
            assert!(
                *r < num_rows && *c < num_cols,
                "triplet ({r}, {c}) out of range for {num_rows}x{num_cols} matrix"
            );
        }
        sorted.sort_by_key(|(r, c, _)| (*r, *c));

        let mut matrix = Self::zero(num_rows, num_cols);
        for (r, c, v) in sorted {
            let row = &mut matrix.rows[r];
            match row.last_mut() {
                Some(last) if last.0 == c => {
                    last.1 = last.1.clone() + v;
                    if last.1.is_zero() {
                        row.pop();
                    }
                }
                _ => {
                    if !v.is_zero() {
                        row.push((c, v));
                    }
                }
            }
        }
        matrix
    }

    /// Creates a sparse matrix from dense rows, dropping zero entries.
    #[must_use]
    pub fn from_dense(dense: &[Vec<R>]) -> Self {
        let num_rows = dense.len();
        let num_cols = dense.first().map_or(0, Vec::len);
        let mut matrix = Self::zero(num_rows, num_cols);
        for (r, row) in dense.iter().enumerate() {
            assert_eq!(row.len(), num_cols, "ragged dense input");
            for (c, v) in row.iter().enumerate() {
                if !v.is_zero() {
                    matrix.rows[r].push((c, v.clone()));
                }
            }
        }
        matrix
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Returns the number of non-zero entries.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(SmallVec::len).sum()
    }

    /// Returns true if the matrix has no rows or no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.num_cols == 0
    }

    /// Returns true if every entry is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.rows.iter().all(SmallVec::is_empty)
    }

    /// The sorted entry list of a row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    #[must_use]
    pub fn row(&self, row: usize) -> &[(usize, R)] {
        &self.rows[row]
    }

    /// Iterates over the non-zero entries of a row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    pub fn row_iter(&self, row: usize) -> impl Iterator<Item = (usize, &R)> {
        self.rows[row].iter().map(|(c, v)| (*c, v))
    }

    /// The leading (lowest-column) entry of a row, if any.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    #[must_use]
    pub fn leading(&self, row: usize) -> Option<(usize, &R)> {
        self.rows[row].first().map(|(c, v)| (*c, v))
    }

    /// Returns the entry at (row, col), or None if zero.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of range.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&R> {
        assert!(
            row < self.rows.len() && col < self.num_cols,
            "position ({row}, {col}) out of range"
        );
        self.rows[row]
            .binary_search_by_key(&col, |e| e.0)
            .ok()
            .map(|i| &self.rows[row][i].1)
    }

    /// Writes the entry at (row, col); a zero value deletes the position.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of range.
    pub fn set(&mut self, row: usize, col: usize, value: R) {
        assert!(
            row < self.rows.len() && col < self.num_cols,
            "position ({row}, {col}) out of range"
        );
        {
            let entries = &mut self.rows[row];
            match entries.binary_search_by_key(&col, |e| e.0) {
                Ok(i) => {
                    if value.is_zero() {
                        entries.remove(i);
                    } else {
                        entries[i].1 = value;
                    }
                }
                Err(i) => {
                    if !value.is_zero() {
                        entries.insert(i, (col, value));
                    }
                }
            }
        }
        self.refresh_row(row);
    }

    /// Applies an elementary operation in place.
    ///
    /// # Panics
    ///
    /// Panics on out-of-range indices or a zero scale factor.
    pub fn apply(&mut self, op: &ElementaryOp<R>) {
        match op {
            ElementaryOp::AddRow { src, dst, mult } => self.add_row(*src, *dst, mult),
            ElementaryOp::ScaleRow { row, factor } => self.scale_row(*row, factor),
            ElementaryOp::SwapRows { a, b } => self.swap_rows(*a, *b),
            ElementaryOp::AddCol { src, dst, mult } => self.add_col(*src, *dst, mult),
            ElementaryOp::ScaleCol { col, factor } => self.scale_col(*col, factor),
            ElementaryOp::SwapCols { a, b } => self.swap_cols(*a, *b),
        }
    }

    /// `row[dst] += mult * row[src]` via a two-pointer sorted merge.
    ///
    /// An empty source row (or a zero multiplier) is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range or `src == dst`.
    pub fn add_row(&mut self, src: usize, dst: usize, mult: &R) {
        assert!(src < self.rows.len() && dst < self.rows.len(), "row out of range");
        assert_ne!(src, dst, "source and destination row must differ");
        if self.rows[src].is_empty() || mult.is_zero() {
            return;
        }
        self.rows[dst] = merge_scaled(&self.rows[dst], &self.rows[src], mult);
        self.refresh_row(dst);
    }

    /// `row[row] *= factor`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of range or the factor is zero; callers
    /// needing to empty a row must delete its entries explicitly.
    pub fn scale_row(&mut self, row: usize, factor: &R) {
        assert!(row < self.rows.len(), "row out of range");
        assert!(!factor.is_zero(), "cannot scale a row by zero");
        {
            let entries = &mut self.rows[row];
            for entry in entries.iter_mut() {
                entry.1 = entry.1.clone() * factor.clone();
            }
            // Over a ring with zero divisors a non-zero factor can still
            // annihilate entries.
            entries.retain(|e| !e.1.is_zero());
        }
        self.refresh_row(row);
    }

    /// Exchanges two rows' storage handles in O(1).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        assert!(a < self.rows.len() && b < self.rows.len(), "row out of range");
        if a == b {
            return;
        }
        self.rows.swap(a, b);
        if let Some(t) = self.tracking.as_mut() {
            let la = t.leads[a];
            let lb = t.leads[b];
            if la != lb {
                if let Some(c) = la {
                    t.rows_by_lead[c].remove(&a);
                    t.rows_by_lead[c].insert(b);
                }
                if let Some(c) = lb {
                    t.rows_by_lead[c].remove(&b);
                    t.rows_by_lead[c].insert(a);
                }
            }
            t.leads.swap(a, b);
            t.weights.swap(a, b);
        }
    }

    /// `col[dst] += mult * col[src]`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range or `src == dst`.
    pub fn add_col(&mut self, src: usize, dst: usize, mult: &R) {
        assert!(src < self.num_cols && dst < self.num_cols, "column out of range");
        assert_ne!(src, dst, "source and destination column must differ");
        if mult.is_zero() {
            return;
        }
        for r in 0..self.rows.len() {
            let changed = {
                let entries = &mut self.rows[r];
                let Ok(si) = entries.binary_search_by_key(&src, |e| e.0) else {
                    continue;
                };
                let contribution = mult.clone() * entries[si].1.clone();
                if contribution.is_zero() {
                    continue;
                }
                match entries.binary_search_by_key(&dst, |e| e.0) {
                    Ok(di) => {
                        let sum = entries[di].1.clone() + contribution;
                        if sum.is_zero() {
                            entries.remove(di);
                        } else {
                            entries[di].1 = sum;
                        }
                    }
                    Err(di) => entries.insert(di, (dst, contribution)),
                }
                true
            };
            if changed {
                self.refresh_row(r);
            }
        }
    }

    /// `col[col] *= factor`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of range or the factor is zero.
    pub fn scale_col(&mut self, col: usize, factor: &R) {
        assert!(col < self.num_cols, "column out of range");
        assert!(!factor.is_zero(), "cannot scale a column by zero");
        for r in 0..self.rows.len() {
            let changed = {
                let entries = &mut self.rows[r];
                let Ok(i) = entries.binary_search_by_key(&col, |e| e.0) else {
                    continue;
                };
                entries[i].1 = entries[i].1.clone() * factor.clone();
                if entries[i].1.is_zero() {
                    entries.remove(i);
                }
                true
            };
            if changed {
                self.refresh_row(r);
            }
        }
    }

    /// Exchanges two columns.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn swap_cols(&mut self, a: usize, b: usize) {
        assert!(a < self.num_cols && b < self.num_cols, "column out of range");
        if a == b {
            return;
        }
        for r in 0..self.rows.len() {
            let changed = {
                let entries = &mut self.rows[r];
                let va = entries
                    .binary_search_by_key(&a, |e| e.0)
                    .ok()
                    .map(|i| entries.remove(i).1);
                let vb = entries
                    .binary_search_by_key(&b, |e| e.0)
                    .ok()
                    .map(|i| entries.remove(i).1);
                if va.is_none() && vb.is_none() {
                    continue;
                }
                if let Some(v) = vb {
                    let i = entries
                        .binary_search_by_key(&a, |e| e.0)
                        .expect_err("entry at swapped column already removed");
                    entries.insert(i, (a, v));
                }
                if let Some(v) = va {
                    let i = entries
                        .binary_search_by_key(&b, |e| e.0)
                        .expect_err("entry at swapped column already removed");
                    entries.insert(i, (b, v));
                }
                true
            };
            if changed {
                self.refresh_row(r);
            }
        }
    }

    /// Rebuilds the transpose in O(nnz).
    #[must_use]
    pub fn transpose(&self) -> Self {
        let mut trans = Self::zero(self.num_cols, self.rows.len());
        for (r, entries) in self.rows.iter().enumerate() {
            for (c, v) in entries {
                // Rows visited in ascending order keep each transposed row sorted.
                trans.rows[*c].push((r, v.clone()));
            }
        }
        trans
    }

    /// Applies row and column permutations, returning the permuted matrix.
    ///
    /// Entry (r, c) lands at (`row_perm.apply(r)`, `col_perm.apply(c)`).
    ///
    /// # Panics
    ///
    /// Panics if the permutation sizes do not match the matrix shape.
    #[must_use]
    pub fn permuted(&self, row_perm: &Permutation, col_perm: &Permutation) -> Self {
        assert_eq!(row_perm.len(), self.rows.len(), "row permutation size mismatch");
        assert_eq!(col_perm.len(), self.num_cols, "column permutation size mismatch");
        let mut out = Self::zero(self.rows.len(), self.num_cols);
        for (r, entries) in self.rows.iter().enumerate() {
            let mut mapped: RowEntries<R> = entries
                .iter()
                .map(|(c, v)| (col_perm.apply(*c), v.clone()))
                .collect();
            mapped.sort_by_key(|e| e.0);
            out.rows[row_perm.apply(r)] = mapped;
        }
        out
    }

    /// The submatrix of the given column range, columns reindexed from 0.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the column count.
    #[must_use]
    pub fn column_block(&self, range: std::ops::Range<usize>) -> Self {
        assert!(range.end <= self.num_cols, "column range out of bounds");
        let mut out = Self::zero(self.rows.len(), range.len());
        for (r, entries) in self.rows.iter().enumerate() {
            out.rows[r] = entries
                .iter()
                .filter(|(c, _)| range.contains(c))
                .map(|(c, v)| (c - range.start, v.clone()))
                .collect();
        }
        out
    }

    /// The submatrix of the given row range.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the row count.
    #[must_use]
    pub fn row_block(&self, range: std::ops::Range<usize>) -> Self {
        assert!(range.end <= self.rows.len(), "row range out of bounds");
        Self {
            rows: self.rows[range].to_vec(),
            num_cols: self.num_cols,
            tracking: None,
        }
    }

    /// Matrix-vector multiply: y = A * x.
    ///
    /// # Panics
    ///
    /// Panics on a dimension mismatch.
    #[must_use]
    pub fn mv(&self, x: &[R]) -> Vec<R> {
        assert_eq!(x.len(), self.num_cols, "vector dimension mismatch");
        self.rows
            .iter()
            .map(|entries| {
                entries.iter().fold(R::zero(), |acc, (c, v)| {
                    acc + v.clone() * x[*c].clone()
                })
            })
            .collect()
    }

    /// Matrix-matrix multiply: C = A * B.
    ///
    /// Each result row is accumulated by merging scaled rows of `other`,
    /// so the cost is proportional to the fill of the operands.
    ///
    /// # Panics
    ///
    /// Panics on a dimension mismatch.
    #[must_use]
    pub fn mm(&self, other: &Self) -> Self {
        assert_eq!(self.num_cols, other.rows.len(), "dimension mismatch");
        let mut out = Self::zero(self.rows.len(), other.num_cols);
        for (r, entries) in self.rows.iter().enumerate() {
            let mut acc = RowEntries::new();
            for (k, v) in entries {
                acc = merge_scaled(&acc, &other.rows[*k], v);
            }
            out.rows[r] = acc;
        }
        out
    }

    /// Converts to a dense matrix; for small results and debugging only,
    /// never on the elimination hot path.
    #[must_use]
    pub fn to_dense(&self) -> DenseMatrix<R> {
        let mut dense = DenseMatrix::zeros(self.rows.len(), self.num_cols);
        for (r, entries) in self.rows.iter().enumerate() {
            for (c, v) in entries {
                dense[(r, *c)] = v.clone();
            }
        }
        dense
    }

    /// Returns true if tracking mode is enabled.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.tracking.is_some()
    }

    /// The tracked weight of a row: the sum of its entries' euclidean
    /// degrees, a pivot tie-break heuristic.
    ///
    /// # Panics
    ///
    /// Panics if tracking is not enabled or the index is out of range.
    #[must_use]
    pub fn row_weight(&self, row: usize) -> usize {
        self.tracking
            .as_ref()
            .expect("tracking mode not enabled")
            .weights[row]
    }

    /// The rows whose current leading nonzero sits in `col`.
    ///
    /// Iteration order is unspecified.
    ///
    /// # Panics
    ///
    /// Panics if tracking is not enabled or the index is out of range.
    pub fn rows_with_lead(&self, col: usize) -> impl Iterator<Item = usize> + '_ {
        self.tracking
            .as_ref()
            .expect("tracking mode not enabled")
            .rows_by_lead[col]
            .iter()
            .copied()
    }

    /// Updates the tracked weight and leading-column index of one row.
    fn refresh_row(&mut self, row: usize) {
        let Some(t) = self.tracking.as_mut() else {
            return;
        };
        let entries = &self.rows[row];
        let new_lead = entries.first().map(|e| e.0);
        let old_lead = t.leads[row];
        if old_lead != new_lead {
            if let Some(c) = old_lead {
                t.rows_by_lead[c].remove(&row);
            }
            if let Some(c) = new_lead {
                t.rows_by_lead[c].insert(row);
            }
            t.leads[row] = new_lead;
        }
        t.weights[row] = entries.iter().map(|(_, v)| (t.degree)(v)).sum();
    }
}

impl<R: EuclideanDomain> SparseMatrix<R> {
    /// Enables tracking mode, building the per-row weights and the
    /// leading-column reverse index once; both are maintained
    /// incrementally by every subsequent mutation.
    pub fn enable_tracking(&mut self) {
        fn degree_of<R: EuclideanDomain>(v: &R) -> usize {
            v.euclidean_degree()
        }

        let mut tracking = Tracking {
            degree: degree_of::<R>,
            weights: vec![0; self.rows.len()],
            leads: vec![None; self.rows.len()],
            rows_by_lead: vec![FxHashSet::default(); self.num_cols],
        };
        for (r, entries) in self.rows.iter().enumerate() {
            tracking.weights[r] = entries.iter().map(|(_, v)| v.euclidean_degree()).sum();
            if let Some(&(c, _)) = entries.first() {
                tracking.leads[r] = Some(c);
                tracking.rows_by_lead[c].insert(r);
            }
        }
        self.tracking = Some(tracking);
    }
}

impl<R: Ring> PartialEq for SparseMatrix<R> {
    fn eq(&self, other: &Self) -> bool {
        // Tracking metadata is derived state and does not affect equality.
        self.num_cols == other.num_cols && self.rows == other.rows
    }
}

impl<R: Ring> Eq for SparseMatrix<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use forma_rings::{EuclideanDomain, Z};

    fn z(v: i64) -> Z {
        Z::new(v)
    }

    fn fixture() -> SparseMatrix<Z> {
        SparseMatrix::from_triplets(
            3,
            4,
            vec![
                (0, 0, z(1)),
                (0, 2, z(2)),
                (1, 1, z(3)),
                (2, 0, z(4)),
                (2, 3, z(5)),
            ],
        )
    }

    #[test]
    fn test_from_triplets() {
        let m = fixture();
        assert_eq!(m.num_rows(), 3);
        assert_eq!(m.num_cols(), 4);
        assert_eq!(m.nnz(), 5);
        assert_eq!(m.get(0, 2), Some(&z(2)));
        assert_eq!(m.get(0, 1), None);
    }

    #[test]
    fn test_duplicate_triplets_summed() {
        let m = SparseMatrix::from_triplets(1, 2, vec![(0, 0, z(2)), (0, 0, z(-2)), (0, 1, z(7))]);
        assert_eq!(m.nnz(), 1);
        assert_eq!(m.get(0, 0), None);
        assert_eq!(m.get(0, 1), Some(&z(7)));
    }

    #[test]
    fn test_add_row_merge_and_cancel() {
        let mut m = SparseMatrix::from_dense(&[
            vec![z(1), z(2), z(0)],
            vec![z(-2), z(0), z(5)],
        ]);
        m.add_row(0, 1, &z(2));
        // row1 = (-2, 0, 5) + 2*(1, 2, 0) = (0, 4, 5); the cancelled
        // position must be deleted, not stored as zero.
        assert_eq!(m.get(1, 0), None);
        assert_eq!(m.get(1, 1), Some(&z(4)));
        assert_eq!(m.get(1, 2), Some(&z(5)));
        assert_eq!(m.row(1).len(), 2);
    }

    #[test]
    fn test_add_row_empty_source_is_noop() {
        let mut m = SparseMatrix::from_dense(&[vec![z(0), z(0)], vec![z(1), z(2)]]);
        let before = m.clone();
        m.add_row(0, 1, &z(9));
        assert_eq!(m, before);
    }

    #[test]
    #[should_panic(expected = "scale a row by zero")]
    fn test_zero_scale_rejected() {
        let mut m = fixture();
        m.scale_row(0, &z(0));
    }

    #[test]
    fn test_swap_rows() {
        let mut m = fixture();
        m.swap_rows(0, 2);
        assert_eq!(m.get(0, 3), Some(&z(5)));
        assert_eq!(m.get(2, 2), Some(&z(2)));
    }

    #[test]
    fn test_col_ops() {
        let mut m = SparseMatrix::from_dense(&[vec![z(1), z(2)], vec![z(0), z(3)]]);
        m.add_col(0, 1, &z(-2));
        assert_eq!(m.get(0, 1), None);
        assert_eq!(m.get(1, 1), Some(&z(3)));

        m.swap_cols(0, 1);
        assert_eq!(m.get(0, 1), Some(&z(1)));
        assert_eq!(m.get(1, 0), Some(&z(3)));

        m.scale_col(0, &z(-1));
        assert_eq!(m.get(1, 0), Some(&z(-3)));
    }

    #[test]
    fn test_transpose() {
        let m = fixture();
        let t = m.transpose();
        assert_eq!(t.num_rows(), 4);
        assert_eq!(t.num_cols(), 3);
        for r in 0..3 {
            for (c, v) in m.row_iter(r) {
                assert_eq!(t.get(c, r), Some(v));
            }
        }
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn test_tracking_maintained() {
        let mut m = fixture();
        m.enable_tracking();

        // Leading entries: row0 -> col0, row1 -> col1, row2 -> col0.
        let mut lead0: Vec<usize> = m.rows_with_lead(0).collect();
        lead0.sort_unstable();
        assert_eq!(lead0, vec![0, 2]);

        // Clearing row2's leading entry moves its lead to col 3.
        m.add_row(0, 2, &z(-4));
        let lead0: Vec<usize> = m.rows_with_lead(0).collect();
        assert_eq!(lead0, vec![0]);
        let lead2: Vec<usize> = m.rows_with_lead(2).collect();
        assert_eq!(lead2, vec![2]);
        assert_eq!(m.get(2, 0), None);

        // Weight reflects the new entries (degrees of -8 and 5).
        assert_eq!(
            m.row_weight(2),
            z(-8).euclidean_degree() + z(5).euclidean_degree()
        );
    }

    #[test]
    fn test_mv_and_mm() {
        let m = SparseMatrix::from_dense(&[vec![z(1), z(2)], vec![z(3), z(4)]]);
        assert_eq!(m.mv(&[z(1), z(1)]), vec![z(3), z(7)]);

        let id = SparseMatrix::identity(2);
        assert_eq!(m.mm(&id), m);
        let product = m.mm(&m);
        assert_eq!(product.get(0, 0), Some(&z(7)));
        assert_eq!(product.get(1, 1), Some(&z(22)));
    }

    #[test]
    fn test_permuted() {
        let m = fixture();
        let rp = Permutation::putting_first(&[2], 3);
        let cp = Permutation::putting_first(&[3, 0], 4);
        let p = m.permuted(&rp, &cp);
        // Entry (2, 3) = 5 lands at (0, 0).
        assert_eq!(p.get(0, 0), Some(&z(5)));
        // Entry (0, 0) = 1 lands at (1, 1).
        assert_eq!(p.get(1, 1), Some(&z(1)));
    }

    #[test]
    fn test_blocks() {
        let m = fixture();
        let cols = m.column_block(2..4);
        assert_eq!(cols.num_cols(), 2);
        assert_eq!(cols.get(0, 0), Some(&z(2)));
        assert_eq!(cols.get(2, 1), Some(&z(5)));

        let rows = m.row_block(1..3);
        assert_eq!(rows.num_rows(), 2);
        assert_eq!(rows.get(0, 1), Some(&z(3)));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_get() {
        let m = fixture();
        let _ = m.get(0, 9);
    }
}
