// ======== Elementary operations ==============================

use std::fmt::Display;

use crate::matrices::Matrix;
use crate::rings::Ring;
use crate::store::RowStore;

/// An elementary row operation. Every operation stored in an [`OperationLog`] is invertible.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation<R> {
    /// `row[to] += by * row[from]`
    Add { from: usize, to: usize, by: R },
    /// `row[at] *= by`, with `by` a unit
    Multiply { at: usize, by: R },
    Swap(usize, usize),
}

impl<R: Ring> Operation<R> {
    /// # Panics
    /// If this is a multiplication by a non-unit.
    pub fn inverse(&self) -> Self {
        match self {
            Operation::Add { from, to, by } => Operation::Add {
                from: *from,
                to: *to,
                by: -by.clone(),
            },
            Operation::Multiply { at, by } => Operation::Multiply {
                at: *at,
                by: by
                    .inverse()
                    .unwrap_or_else(|| panic!("Row multiplier {by} is not a unit")),
            },
            Operation::Swap(i, j) => Operation::Swap(*i, *j),
        }
    }

    /// Determinant of the corresponding elementary matrix.
    pub fn determinant(&self) -> R {
        match self {
            Operation::Add { .. } => R::one(),
            Operation::Multiply { by, .. } => by.clone(),
            Operation::Swap(i, j) if i == j => R::one(),
            Operation::Swap(..) => -R::one(),
        }
    }
}

impl<R: Display> Display for Operation<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Add { from, to, by } => write!(f, "add({from} -> {to}, {by})"),
            Operation::Multiply { at, by } => write!(f, "mul({at}, {by})"),
            Operation::Swap(i, j) => write!(f, "swap({i}, {j})"),
        }
    }
}

/// An [`Operation`] acting on rows, or on columns.
///
/// Column operations are performed as row operations on the transposed matrix, and are stored
/// in that form: `Col(op)` acts on `A` as `op` acts on the rows of `Aᵀ`.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementaryOperation<R> {
    Row(Operation<R>),
    Col(Operation<R>),
}

impl<R: Display> Display for ElementaryOperation<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementaryOperation::Row(op) => write!(f, "row {op}"),
            ElementaryOperation::Col(op) => write!(f, "col {op}"),
        }
    }
}

// ======== Operation log ======================================

/// The operations applied during an elimination, in order.
///
/// If the row operations are `E_1, ..., E_k` and the column operations `F_1, ..., F_l` then the
/// eliminated matrix is `L * A * R` with `L = E_k ... E_1` and `R = F_1 ... F_l`.
#[derive(Debug, Clone)]
pub struct OperationLog<R> {
    operations: Vec<ElementaryOperation<R>>,
}

impl<R> Default for OperationLog<R> {
    fn default() -> Self {
        Self { operations: vec![] }
    }
}

impl<R: Ring> OperationLog<R> {
    pub fn push(&mut self, op: ElementaryOperation<R>) {
        self.operations.push(op);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ElementaryOperation<R>> + '_ {
        self.operations.iter()
    }

    fn row_operations(&self) -> impl DoubleEndedIterator<Item = &Operation<R>> + '_ {
        self.operations.iter().filter_map(|op| match op {
            ElementaryOperation::Row(op) => Some(op),
            ElementaryOperation::Col(_) => None,
        })
    }

    fn col_operations(&self) -> impl DoubleEndedIterator<Item = &Operation<R>> + '_ {
        self.operations.iter().filter_map(|op| match op {
            ElementaryOperation::Col(op) => Some(op),
            ElementaryOperation::Row(_) => None,
        })
    }

    // Replays `ops` on the `n x n` identity.
    fn replay(n: usize, ops: impl Iterator<Item = Operation<R>>) -> Matrix<R> {
        let mut store = RowStore::identity(n);
        for op in ops {
            store.apply(&op);
        }
        store.into_matrix()
    }

    /// `L = E_k ... E_1`, size `n x n`.
    pub fn left(&self, n: usize) -> Matrix<R> {
        Self::replay(n, self.row_operations().cloned())
    }

    /// `L⁻¹ = E_1⁻¹ ... E_k⁻¹`
    pub fn left_inverse(&self, n: usize) -> Matrix<R> {
        Self::replay(n, self.row_operations().rev().map(Operation::inverse))
    }

    /// `R = F_1 ... F_l`, size `m x m`.
    pub fn right(&self, m: usize) -> Matrix<R> {
        Self::replay(m, self.col_operations().cloned()).transpose()
    }

    /// `R⁻¹ = F_l⁻¹ ... F_1⁻¹`
    pub fn right_inverse(&self, m: usize) -> Matrix<R> {
        Self::replay(m, self.col_operations().rev().map(Operation::inverse)).transpose()
    }

    /// `det(L)⁻¹ * det(R)⁻¹`, so that `det(A) = det(L * A * R) * determinant_factor()`.
    pub fn determinant_factor(&self) -> R {
        self.operations
            .iter()
            .map(|op| match op {
                ElementaryOperation::Row(op) | ElementaryOperation::Col(op) => op.inverse().determinant(),
            })
            .fold(R::one(), |acc, d| acc.mul_ref(&d))
    }
}

#[cfg(test)]
mod tests {
    use super::{ElementaryOperation, Operation, OperationLog};
    use crate::matrices::Matrix;

    fn log() -> OperationLog<i64> {
        let mut log = OperationLog::default();
        log.push(ElementaryOperation::Row(Operation::Add {
            from: 0,
            to: 1,
            by: -2,
        }));
        log.push(ElementaryOperation::Col(Operation::Swap(0, 2)));
        log.push(ElementaryOperation::Row(Operation::Multiply { at: 1, by: -1 }));
        log.push(ElementaryOperation::Col(Operation::Add {
            from: 1,
            to: 0,
            by: 3,
        }));
        log
    }

    #[test]
    fn test_inverse_operations() {
        let add = Operation::Add {
            from: 0,
            to: 1,
            by: 5i64,
        };
        assert_eq!(
            add.inverse(),
            Operation::Add {
                from: 0,
                to: 1,
                by: -5
            }
        );
        assert_eq!(Operation::Multiply { at: 0, by: -1i64 }.inverse().determinant(), -1);
        assert_eq!(Operation::<i64>::Swap(0, 1).determinant(), -1);
    }

    #[test]
    #[should_panic]
    fn test_inverse_of_non_unit_multiplication_panics() {
        let _ = Operation::Multiply { at: 0, by: 2i64 }.inverse();
    }

    #[test]
    fn test_left_and_right_transforms() {
        let log = log();
        // E_2 E_1 with E_1: row1 -= 2 row0 and E_2: row1 *= -1
        assert_eq!(log.left(2), Matrix::from_data((2, 2), [1, 0, 2, -1]));
        assert_eq!(&log.left(2) * &log.left_inverse(2), Matrix::identity(2));
        // F_1 swaps columns 0 and 2, F_2 adds 3 * col1 to col0
        let right = Matrix::from_data((3, 3), [0, 0, 1, 3, 1, 0, 1, 0, 0]);
        assert_eq!(log.right(3), right);
        assert_eq!(&log.right(3) * &log.right_inverse(3), Matrix::identity(3));
    }

    #[test]
    fn test_transforms_reproduce_operations() {
        let a = Matrix::<i64>::from_data((2, 3), [1, 2, 3, 4, 5, 6]);
        let log = log();
        // Apply the same operations directly: columns via the transpose.
        let mut rows = crate::store::RowStore::from_matrix(&a);
        for op in log.iter() {
            match op {
                ElementaryOperation::Row(op) => rows.apply(op),
                ElementaryOperation::Col(op) => {
                    rows.transpose();
                    rows.apply(op);
                    rows.transpose();
                }
            }
        }
        let direct = rows.into_matrix();
        assert_eq!(&(&log.left(2) * &a) * &log.right(3), direct);
        assert_eq!(
            &(&log.left_inverse(2) * &direct) * &log.right_inverse(3),
            a
        );
    }

    #[test]
    fn test_determinant_factor() {
        // Swap and Multiply(-1) both contribute -1
        assert_eq!(log().determinant_factor(), 1);
        let mut log = OperationLog::<i64>::default();
        log.push(ElementaryOperation::Col(Operation::Swap(0, 1)));
        assert_eq!(log.determinant_factor(), -1);
    }
}
