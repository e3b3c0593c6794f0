// ======== Diagonal (Smith) ===================================

use log::trace;

use super::hermite::RowHermiteStrategy;
use super::operations::Operation;
use super::{Eliminator, Step, Strategy};
use crate::rings::EuclideanRing;

/// Alternates row and column Hermite reduction until the matrix is diagonal and normalized.
///
/// The alternation alone does not guarantee `d_i | d_{i+1}`. When this fails we add column
/// `i + 1` to column `i` and carry on; the next echelon pass then replaces `d_i` by
/// `gcd(d_i, d_{i+1})`, so the degree of the leading entries keeps dropping until the
/// chain holds.
#[derive(Debug, Default)]
pub(crate) struct DiagonalStrategy;

impl<R: EuclideanRing> Strategy<R> for DiagonalStrategy {
    fn step(&mut self, eliminator: &mut Eliminator<R>) -> Step {
        if !eliminator.store().is_diagonal_normalized() {
            eliminator.drive(RowHermiteStrategy::default());
            if !eliminator.store().is_diagonal_normalized() {
                eliminator.run_transposed(|e| e.drive(RowHermiteStrategy::default()));
            }
            return Step::Continue;
        }

        match eliminator.store().first_divisibility_violation() {
            Some(i) => {
                trace!("Diagonal entry {i} does not divide the next one");
                eliminator.run_transposed(|e| {
                    e.apply(Operation::Add {
                        from: i + 1,
                        to: i,
                        by: R::one(),
                    })
                });
                Step::Continue
            }
            None => Step::Done,
        }
    }
}

#[cfg(test)]
mod tests {
    use num::rational::Rational64;
    use num::BigInt;

    use crate::matrices::Matrix;
    use crate::rings::{EuclideanRing, F2};

    #[test]
    fn test_regular_matrix_is_identity() {
        let a = Matrix::<i64>::from_data(
            (5, 5),
            [
                2, -1, -2, -2, -3, 1, 2, -1, 1, -1, 2, -2, -4, -3, -6, 1, 7, 1, 5, 3, 1, -12, -6,
                -10, -11,
            ],
        );
        let e = a.eliminate();
        assert_eq!(*e.result(), Matrix::identity(5));
        assert_eq!(e.rank(), 5);
        assert_round_trip(&a, &e);
    }

    fn assert_round_trip(a: &Matrix<i64>, e: &crate::EliminationResult<i64>) {
        assert_eq!(&(&e.left() * a) * &e.right(), *e.result());
        assert_eq!(&(&e.left_inverse() * e.result()) * &e.right_inverse(), *a);
    }

    #[test]
    fn test_normalize_sign() {
        let e = Matrix::<i64>::from_data((1, 1), [-2]).eliminate();
        assert_eq!(*e.result(), Matrix::from_data((1, 1), [2]));
    }

    #[test]
    fn test_rank_4() {
        let a = Matrix::<i64>::from_data(
            (5, 5),
            [
                3, -5, -22, 20, 8, 6, -11, -50, 45, 18, -1, 2, 10, -9, -3, 3, -6, -30, 27, 10, -1,
                2, 7, -6, -3,
            ],
        );
        let e = a.eliminate();
        assert_eq!(*e.result(), Matrix::diagonal((5, 5), [1, 1, 1, 1]));
        assert_eq!(e.rank(), 4);
        assert_round_trip(&a, &e);
    }

    #[test]
    fn test_full_rank_with_factors() {
        let a = Matrix::<i64>::from_data(
            (5, 5),
            [
                -20, -7, -27, 2, 29, 17, 8, 14, -4, -10, 13, 8, 10, -4, -6, -9, -2, -14, 0, 16, 5,
                0, 5, -1, -4,
            ],
        );
        let e = a.eliminate();
        assert_eq!(e.diagonal(), vec![1, 1, 1, 2, 60]);
        assert_round_trip(&a, &e);
    }

    #[test]
    fn test_rank_3_with_factors() {
        let a = Matrix::<i64>::from_data(
            (5, 5),
            [
                4, 6, -18, -15, -46, -1, 0, 6, 4, 13, -13, -12, 36, 30, 97, -7, -6, 18, 15, 49, -6,
                -6, 18, 15, 48,
            ],
        );
        let e = a.eliminate();
        assert_eq!(*e.result(), Matrix::diagonal((5, 5), [1, 1, 6]));
        assert_eq!(e.rank(), 3);
        assert_round_trip(&a, &e);
    }

    #[test]
    fn test_non_square() {
        let a = Matrix::<i64>::from_data(
            (4, 6),
            [
                8, -6, 14, -10, -14, 6, 12, -8, 18, -18, -20, 8, -16, 7, -23, 22, 23, -7, 32, -17,
                44, -49, -49, 17,
            ],
        );
        let e = a.eliminate();
        assert_eq!(*e.result(), Matrix::diagonal((4, 6), [1, 1, 2, 12]));
        assert_round_trip(&a, &e);
    }

    #[test]
    fn test_zero_matrix() {
        let a = Matrix::<i64>::zero(4, 6);
        let e = a.eliminate();
        assert_eq!(*e.result(), a);
        assert_eq!(e.rank(), 0);
    }

    #[test]
    fn test_divisibility_chain_is_enforced() {
        let a = Matrix::<i64>::diagonal((2, 2), [2, 3]);
        let e = a.eliminate();
        assert_eq!(e.diagonal(), vec![1, 6]);
        assert_round_trip(&a, &e);
    }

    #[test]
    fn test_zero_before_pivot() {
        let a = Matrix::<i64>::from_data((2, 2), [0, 0, 0, 1]);
        let e = a.eliminate();
        assert_eq!(*e.result(), Matrix::diagonal((2, 2), [1]));
        assert_eq!(e.rank(), 1);
        assert_eq!(e.kernel_matrix().size(), (2, 1));
        assert!((&a * &e.kernel_matrix()).is_zero());
        assert_round_trip(&a, &e);
    }

    #[test]
    fn test_zero_in_the_middle_of_the_diagonal() {
        let a = Matrix::<i64>::diagonal((3, 3), [2, 0, 3]);
        let e = a.eliminate();
        assert_eq!(e.diagonal(), vec![1, 6]);
        assert_eq!(*e.result(), Matrix::diagonal((3, 3), [1, 6]));
        assert_eq!(e.nullity(), 1);
        assert!((&a * &e.kernel_matrix()).is_zero());
        assert_round_trip(&a, &e);
    }

    #[test]
    #[should_panic(expected = "use BigInt")]
    fn test_overflowing_divisor_panics() {
        // The second divisor is 2 * i64::MAX
        let a = Matrix::<i64>::diagonal((2, 2), [i64::MAX, 2]);
        let _ = a.eliminate();
    }

    #[test]
    #[rustfmt::skip]
    fn test_rationals() {
        let q = |n: i64, d: i64| Rational64::new(n, d);
        let a = Matrix::from_data(
            (5, 5),
            [
                q(-3, 1), q(0, 1), q(0, 1), q(-9, 2), q(0, 1),
                q(10, 3), q(2, 1), q(0, 1), q(-15, 2), q(6, 1),
                q(-10, 3), q(-2, 1), q(0, 1), q(15, 2), q(-10, 1),
                q(0, 1), q(0, 1), q(3, 4), q(-5, 1), q(0, 1),
                q(0, 1), q(0, 1), q(1, 1), q(0, 1), q(0, 1),
            ],
        );
        let e = a.eliminate();
        assert_eq!(*e.result(), Matrix::identity(5));
        assert_eq!(&(&e.left() * &a) * &e.right(), Matrix::identity(5));
    }

    #[test]
    #[rustfmt::skip]
    fn test_rationals_rank_3() {
        let q = |n: i64, d: i64| Rational64::new(n, d);
        let a = Matrix::from_data(
            (5, 5),
            [
                q(1, 1), q(1, 1), q(0, 1), q(8, 3), q(10, 3),
                q(-3, 1), q(0, 1), q(0, 1), q(-3, 1), q(-5, 1),
                q(2, 1), q(0, 1), q(10, 3), q(2, 1), q(16, 3),
                q(79, 8), q(0, 1), q(395, 24), q(79, 8), q(79, 3),
                q(7, 2), q(0, 1), q(35, 6), q(7, 2), q(28, 3),
            ],
        );
        let e = a.eliminate();
        assert_eq!(e.rank(), 3);
        assert_eq!(*e.result(), Matrix::diagonal((5, 5), [q(1, 1), q(1, 1), q(1, 1)]));
        assert_eq!(&(&e.left_inverse() * e.result()) * &e.right_inverse(), a);
    }

    #[test]
    fn test_mod_2() {
        let a = Matrix::from_data((3, 3), [1, 1, 0, 0, 1, 1, 1, 0, 1].map(F2::new));
        let e = a.eliminate();
        assert_eq!(e.rank(), 2);
        assert_eq!(*e.result(), Matrix::diagonal((3, 3), [F2::new(1), F2::new(1)]));
    }

    #[test]
    fn test_big_integers() {
        let a = Matrix::from_data((2, 2), [4, 6, 6, 4].map(BigInt::from));
        let e = a.eliminate();
        let d = e.diagonal();
        assert_eq!(d, vec![BigInt::from(2), BigInt::from(10)]);
        assert!(d[0].divides(&d[1]));
    }
}
