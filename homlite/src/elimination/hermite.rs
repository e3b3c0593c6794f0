// ======== Row Hermite ========================================

use super::echelon::RowEchelonStrategy;
use super::{Eliminator, Step, Strategy};
use crate::rings::EuclideanRing;

/// Row echelon form, followed by reducing the entries above every pivot by that pivot.
#[derive(Debug, Default)]
pub(crate) struct RowHermiteStrategy {
    row: usize,
    rank: usize,
}

impl<R: EuclideanRing> Strategy<R> for RowHermiteStrategy {
    fn prepare(&mut self, eliminator: &mut Eliminator<R>) {
        eliminator.drive(RowEchelonStrategy::default());
        self.rank = eliminator.store().nonzero_rows();
    }

    fn step(&mut self, eliminator: &mut Eliminator<R>) -> Step {
        if self.row >= self.rank {
            return Step::Done;
        }
        let store = eliminator.store();
        let Some((j0, a0)) = store.head(self.row).cloned() else {
            return Step::Done;
        };
        let targets: Vec<(usize, R)> = store
            .entries_in_col_above(j0, self.row)
            .into_iter()
            .filter_map(|(i, a)| {
                let (q, _) = a.euc_div(&a0);
                (!q.is_zero()).then(|| (i, -q))
            })
            .collect();
        eliminator.apply_batch(self.row, targets);

        self.row += 1;
        Step::Continue
    }
}

#[cfg(test)]
mod tests {
    use crate::elimination::EliminationForm;
    use crate::matrices::Matrix;
    use crate::rings::EuclideanRing;

    #[test]
    fn test_row_hermite_reduces_above_pivots() {
        let a = Matrix::<i64>::from_data((3, 3), [2, 3, 5, 0, 4, 7, 0, 0, 3]);
        let e = a.elimination(EliminationForm::RowHermite);
        let r = e.result();
        // Pivots stay where they are; entries above are reduced modulo them
        for i in 0..3 {
            let (j, pivot) = r.row(i)[0];
            assert_eq!(j, i);
            for k in 0..i {
                let above = r.entry(k, j);
                assert!(above.degree() < pivot.degree(), "{above} not reduced by {pivot}");
            }
        }
        assert_eq!(&e.left() * &a, *r);
        assert_eq!(e.rank(), 3);
    }

    #[test]
    fn test_row_hermite_over_rationals() {
        use num::rational::Rational64;
        let a = Matrix::from_data(
            (2, 3),
            [1, 2, 3, 4, 5, 6].map(Rational64::from_integer),
        );
        let e = a.elimination(EliminationForm::RowHermite);
        // Reduced row echelon form
        let expected = Matrix::from_data(
            (2, 3),
            [
                Rational64::from_integer(1),
                Rational64::from_integer(0),
                Rational64::from_integer(-1),
                Rational64::from_integer(0),
                Rational64::from_integer(1),
                Rational64::from_integer(2),
            ],
        );
        assert_eq!(*e.result(), expected);
    }

    #[test]
    fn test_col_hermite() {
        let a = Matrix::<i64>::from_data((3, 3), [2, 3, 5, 0, 4, 7, 0, 0, 3]).transpose();
        let e = a.elimination(EliminationForm::ColHermite);
        let t = e.result().transpose();
        for i in 0..3 {
            assert_eq!(t.row(i)[0].0, i);
        }
        assert_eq!(&a * &e.right(), *e.result());
        assert_eq!(e.rank(), 3);
    }
}
