// ======== Row echelon ========================================

use super::operations::Operation;
use super::{Eliminator, Step, Strategy};
use crate::rings::EuclideanRing;

/// Brings the matrix into row echelon form, column by column.
///
/// For the current column all rows (at or below the current row) with their head there are
/// candidates. The pivot is the first invertible candidate, or else the first one of minimal
/// degree. Once it has been normalized, every other candidate is reduced by it. If some
/// remainder is non-zero the column is processed again, otherwise the pivot row is moved up to
/// the current row and both cursors advance.
#[derive(Debug, Default)]
pub(crate) struct RowEchelonStrategy {
    row: usize,
    col: usize,
}

fn find_pivot<R: EuclideanRing>(candidates: &[(usize, R)]) -> Option<usize> {
    candidates
        .iter()
        .position(|(_, a)| a.is_invertible())
        .or_else(|| {
            candidates
                .iter()
                .enumerate()
                .min_by_key(|(_, (_, a))| a.degree())
                .map(|(k, _)| k)
        })
}

impl<R: EuclideanRing> Strategy<R> for RowEchelonStrategy {
    fn step(&mut self, eliminator: &mut Eliminator<R>) -> Step {
        let (rows, cols) = eliminator.store().size();
        if self.row >= rows || self.col >= cols {
            return Step::Done;
        }

        let store = eliminator.store();
        let candidates: Vec<(usize, R)> = store
            .heads_in_col(self.col)
            .filter(|i| *i >= self.row)
            .filter_map(|i| store.head(i).map(|(_, a)| (i, a.clone())))
            .collect();

        let Some(k) = find_pivot(&candidates) else {
            self.col += 1;
            return Step::Continue;
        };
        let (i0, mut a0) = candidates[k].clone();

        let unit = a0.normalizing_unit();
        if !unit.is_one() {
            a0 = unit.mul_ref(&a0);
            eliminator.apply(Operation::Multiply { at: i0, by: unit });
        }

        let mut again = false;
        let mut targets = vec![];
        for (i, a) in candidates.into_iter().filter(|(i, _)| *i != i0) {
            let (q, r) = a.euc_div(&a0);
            if !r.is_zero() {
                again = true;
            }
            if !q.is_zero() {
                targets.push((i, -q));
            }
        }
        eliminator.apply_batch(i0, targets);

        if again {
            return Step::Continue;
        }

        if i0 != self.row {
            eliminator.apply(Operation::Swap(i0, self.row));
        }
        self.row += 1;
        self.col += 1;
        Step::Continue
    }
}

#[cfg(test)]
mod tests {
    use crate::elimination::EliminationForm;
    use crate::matrices::Matrix;

    fn is_row_echelon(m: &Matrix<i64>) -> bool {
        let heads: Vec<Option<usize>> = (0..m.rows())
            .map(|i| m.row(i).first().map(|(j, _)| *j))
            .collect();
        // Heads strictly increase, and empty rows come last
        heads.windows(2).all(|w| match (w[0], w[1]) {
            (Some(a), Some(b)) => a < b,
            (Some(_), None) | (None, None) => true,
            (None, Some(_)) => false,
        })
    }

    #[test]
    fn test_row_echelon_form() {
        let a = Matrix::<i64>::from_data((3, 4), [0, 2, 4, 1, 0, 3, 1, 0, 2, 0, 0, 5]);
        let e = a.elimination(EliminationForm::RowEchelon);
        assert!(is_row_echelon(e.result()));
        assert_eq!(e.rank(), 3);
        assert_eq!(&(&e.left() * &a) * &e.right(), *e.result());
        assert!(e.right().is_identity());
    }

    #[test]
    fn test_row_echelon_prefers_units() {
        let a = Matrix::<i64>::from_data((3, 2), [4, 1, -1, 2, 6, 3]);
        let e = a.elimination(EliminationForm::RowEchelon);
        // The unit -1 is normalized and moved to the top
        assert_eq!(e.result().row(0).first(), Some(&(0, 1)));
        assert!(is_row_echelon(e.result()));
    }

    #[test]
    fn test_row_echelon_with_non_trivial_remainders() {
        let a = Matrix::<i64>::from_data((2, 2), [4, 1, 6, 1]);
        let e = a.elimination(EliminationForm::RowEchelon);
        // gcd(4, 6) ends up as the pivot
        assert_eq!(e.result().entry(0, 0), 2);
        assert_eq!(e.result().entry(1, 0), 0);
        assert_eq!(&e.left() * &a, *e.result());
    }

    #[test]
    fn test_col_echelon_form() {
        let a = Matrix::<i64>::from_data((3, 4), [0, 2, 4, 1, 0, 3, 1, 0, 2, 0, 0, 5]);
        let e = a.elimination(EliminationForm::ColEchelon);
        assert!(is_row_echelon(&e.result().transpose()));
        assert_eq!(e.rank(), 3);
        assert_eq!(&a * &e.right(), *e.result());
    }

    #[test]
    fn test_zero_and_empty_matrices() {
        let z = Matrix::<i64>::zero(3, 2);
        let e = z.elimination(EliminationForm::RowEchelon);
        assert_eq!(e.rank(), 0);
        assert!(e.operations().is_empty());
        let empty = Matrix::<i64>::zero(0, 3);
        assert_eq!(empty.elimination(EliminationForm::RowEchelon).rank(), 0);
    }
}
