//! Invertible elementary row and column operations and their logs.
//!
//! Every mutation an elimination run performs on a matrix is one of the six
//! variants below. Each is invertible, convertible between row and column
//! orientation, and contributes a unit factor to the determinant, which is
//! what lets a result object replay logs to reconstruct transformation
//! matrices exactly.

use forma_rings::Ring;

/// An elementary row or column operation.
///
/// Row variants act from the left (`E * A`), column variants from the right
/// (`A * E`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementaryOp<R> {
    /// `row[dst] += mult * row[src]`.
    AddRow {
        /// Source row, left unchanged.
        src: usize,
        /// Destination row, modified in place.
        dst: usize,
        /// Multiplier applied to the source row.
        mult: R,
    },
    /// `row[row] *= factor`; the factor must be a unit when logged.
    ScaleRow {
        /// The scaled row.
        row: usize,
        /// The (invertible) scale factor.
        factor: R,
    },
    /// Exchanges two rows.
    SwapRows {
        /// First row.
        a: usize,
        /// Second row.
        b: usize,
    },
    /// `col[dst] += mult * col[src]`.
    AddCol {
        /// Source column, left unchanged.
        src: usize,
        /// Destination column, modified in place.
        dst: usize,
        /// Multiplier applied to the source column.
        mult: R,
    },
    /// `col[col] *= factor`; the factor must be a unit when logged.
    ScaleCol {
        /// The scaled column.
        col: usize,
        /// The (invertible) scale factor.
        factor: R,
    },
    /// Exchanges two columns.
    SwapCols {
        /// First column.
        a: usize,
        /// Second column.
        b: usize,
    },
}

impl<R: Ring> ElementaryOp<R> {
    /// Returns true for the row-oriented variants.
    #[must_use]
    pub fn is_row_op(&self) -> bool {
        matches!(
            self,
            Self::AddRow { .. } | Self::ScaleRow { .. } | Self::SwapRows { .. }
        )
    }

    /// Converts between row and column orientation.
    ///
    /// A row operation on a matrix is the same as its column counterpart on
    /// the transpose, and vice versa.
    #[must_use]
    pub fn transposed(self) -> Self {
        match self {
            Self::AddRow { src, dst, mult } => Self::AddCol { src, dst, mult },
            Self::ScaleRow { row, factor } => Self::ScaleCol { col: row, factor },
            Self::SwapRows { a, b } => Self::SwapCols { a, b },
            Self::AddCol { src, dst, mult } => Self::AddRow { src, dst, mult },
            Self::ScaleCol { col, factor } => Self::ScaleRow { row: col, factor },
            Self::SwapCols { a, b } => Self::SwapRows { a, b },
        }
    }

    /// The inverse operation: add with the negated multiplier, scale by the
    /// ring inverse of the factor, swaps are self-inverse.
    ///
    /// # Panics
    ///
    /// Panics if a scale factor is not a unit; logged operations always
    /// carry unit factors.
    #[must_use]
    pub fn inverse(&self) -> Self {
        match self {
            Self::AddRow { src, dst, mult } => Self::AddRow {
                src: *src,
                dst: *dst,
                mult: -mult.clone(),
            },
            Self::ScaleRow { row, factor } => Self::ScaleRow {
                row: *row,
                factor: factor.inverse().expect("scale factor must be a unit"),
            },
            Self::AddCol { src, dst, mult } => Self::AddCol {
                src: *src,
                dst: *dst,
                mult: -mult.clone(),
            },
            Self::ScaleCol { col, factor } => Self::ScaleCol {
                col: *col,
                factor: factor.inverse().expect("scale factor must be a unit"),
            },
            swap @ (Self::SwapRows { .. } | Self::SwapCols { .. }) => swap.clone(),
        }
    }

    /// The factor this operation contributes to the determinant of its
    /// transformation matrix: −1 for a swap, the factor for a scale, 1 for
    /// an add.
    #[must_use]
    pub fn det_contribution(&self) -> R {
        match self {
            Self::AddRow { .. } | Self::AddCol { .. } => R::one(),
            Self::ScaleRow { factor, .. } | Self::ScaleCol { factor, .. } => factor.clone(),
            Self::SwapRows { .. } | Self::SwapCols { .. } => -R::one(),
        }
    }
}

/// An append-only log of elementary operations, partitioned by orientation.
///
/// Replaying the row partition from the left against the identity yields P,
/// the column partition against the identity yields Q, with
/// `P * A * Q = Result`. The log grows monotonically during an elimination
/// run and is immutable afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationLog<R> {
    row_ops: Vec<ElementaryOp<R>>,
    col_ops: Vec<ElementaryOp<R>>,
}

impl<R: Ring> OperationLog<R> {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            row_ops: Vec::new(),
            col_ops: Vec::new(),
        }
    }

    /// Appends an operation, routing it into the row or column partition.
    pub fn push(&mut self, op: ElementaryOp<R>) {
        if op.is_row_op() {
            self.row_ops.push(op);
        } else {
            self.col_ops.push(op);
        }
    }

    /// The row-oriented operations, in application order.
    #[must_use]
    pub fn row_ops(&self) -> &[ElementaryOp<R>] {
        &self.row_ops
    }

    /// The column-oriented operations, in application order.
    #[must_use]
    pub fn col_ops(&self) -> &[ElementaryOp<R>] {
        &self.col_ops
    }

    /// Total number of logged operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.row_ops.len() + self.col_ops.len()
    }

    /// Returns true if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_ops.is_empty() && self.col_ops.is_empty()
    }

    /// Swaps the row/column roles of the whole log.
    ///
    /// Used when an elimination ran on the transpose: the transposed
    /// column ops become the row ops of the original matrix (in the same
    /// order) and vice versa.
    #[must_use]
    pub fn transposed(self) -> Self {
        Self {
            row_ops: self
                .col_ops
                .into_iter()
                .map(ElementaryOp::transposed)
                .collect(),
            col_ops: self
                .row_ops
                .into_iter()
                .map(ElementaryOp::transposed)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forma_rings::{Ring, Z};

    #[test]
    fn test_inverse_round_trip() {
        let add = ElementaryOp::AddRow {
            src: 0,
            dst: 2,
            mult: Z::new(5),
        };
        assert_eq!(add.inverse().inverse(), add);

        let swap = ElementaryOp::<Z>::SwapRows { a: 1, b: 3 };
        assert_eq!(swap.inverse(), swap);

        let scale = ElementaryOp::ScaleRow {
            row: 1,
            factor: Z::new(-1),
        };
        assert_eq!(scale.inverse(), scale);
    }

    #[test]
    #[should_panic(expected = "unit")]
    fn test_non_unit_scale_inverse_panics() {
        let scale = ElementaryOp::ScaleRow {
            row: 0,
            factor: Z::new(2),
        };
        let _ = scale.inverse();
    }

    #[test]
    fn test_det_contribution() {
        let swap = ElementaryOp::<Z>::SwapCols { a: 0, b: 1 };
        assert_eq!(swap.det_contribution(), Z::new(-1));

        let add = ElementaryOp::AddCol {
            src: 0,
            dst: 1,
            mult: Z::new(7),
        };
        assert_eq!(add.det_contribution(), Z::new(1));

        let scale = ElementaryOp::ScaleRow {
            row: 0,
            factor: Z::new(-1),
        };
        assert_eq!(scale.det_contribution(), Z::new(-1));
    }

    #[test]
    fn test_log_partition() {
        let mut log = OperationLog::new();
        log.push(ElementaryOp::SwapRows { a: 0, b: 1 });
        log.push(ElementaryOp::AddCol {
            src: 0,
            dst: 1,
            mult: Z::new(2),
        });
        log.push(ElementaryOp::ScaleRow {
            row: 0,
            factor: Z::new(-1),
        });

        assert_eq!(log.row_ops().len(), 2);
        assert_eq!(log.col_ops().len(), 1);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_log_transposed_swaps_partitions() {
        let mut log = OperationLog::new();
        log.push(ElementaryOp::AddRow {
            src: 1,
            dst: 0,
            mult: Z::new(3),
        });
        log.push(ElementaryOp::<Z>::SwapCols { a: 2, b: 0 });

        let t = log.transposed();
        assert_eq!(t.row_ops(), &[ElementaryOp::SwapRows { a: 2, b: 0 }]);
        assert_eq!(
            t.col_ops(),
            &[ElementaryOp::AddCol {
                src: 1,
                dst: 0,
                mult: Z::new(3),
            }]
        );
    }
}
