//! Property-based tests for the elimination engine.

#[cfg(test)]
mod tests {
    use num::{BigInt, One, Zero};
    use proptest::prelude::*;

    use crate::elimination::EliminationForm;
    use crate::matrices::{Alignment, Matrix};
    use crate::rings::{EuclideanRing, F5};

    const FORMS: [EliminationForm; 5] = [
        EliminationForm::RowEchelon,
        EliminationForm::ColEchelon,
        EliminationForm::RowHermite,
        EliminationForm::ColHermite,
        EliminationForm::Diagonal,
    ];

    // Small entries, with plenty of zeros so that the sparse paths get exercised
    fn small_entry() -> impl Strategy<Value = i64> {
        prop_oneof![Just(0i64), -9i64..=9i64]
    }

    fn int_matrix(max_rows: usize, max_cols: usize) -> impl Strategy<Value = Matrix<BigInt>> {
        (1..=max_rows, 1..=max_cols).prop_flat_map(|(r, c)| {
            prop::collection::vec(small_entry(), r * c)
                .prop_map(move |data| Matrix::from_data((r, c), data.into_iter().map(BigInt::from)))
        })
    }

    fn square_matrix(max: usize) -> impl Strategy<Value = Matrix<BigInt>> {
        (1..=max).prop_flat_map(|n| {
            prop::collection::vec(small_entry(), n * n)
                .prop_map(move |data| Matrix::from_data((n, n), data.into_iter().map(BigInt::from)))
        })
    }

    fn square_pair(max: usize) -> impl Strategy<Value = (Matrix<BigInt>, Matrix<BigInt>)> {
        (1..=max).prop_flat_map(|n| {
            let entries = || prop::collection::vec(small_entry(), n * n);
            (entries(), entries()).prop_map(move |(a, b)| {
                (
                    Matrix::from_data((n, n), a.into_iter().map(BigInt::from)),
                    Matrix::from_data((n, n), b.into_iter().map(BigInt::from)),
                )
            })
        })
    }

    proptest! {
        #[test]
        fn transforms_reproduce_result(a in int_matrix(5, 5)) {
            for form in FORMS {
                let e = a.elimination(form);
                prop_assert_eq!(&(&e.left() * &a) * &e.right(), e.result().clone());
                prop_assert_eq!(&e.left() * &e.left_inverse(), Matrix::identity(a.rows()));
                prop_assert_eq!(&e.right() * &e.right_inverse(), Matrix::identity(a.cols()));
            }
        }

        #[test]
        fn smith_form_reconstructs_matrix(a in int_matrix(5, 5)) {
            let e = a.eliminate();
            prop_assert_eq!(&(&e.left_inverse() * e.result()) * &e.right_inverse(), a);
        }

        #[test]
        fn smith_form_is_a_divisor_chain(a in int_matrix(5, 5)) {
            let e = a.eliminate();
            prop_assert!(e.result().is_diagonal());
            let d = e.diagonal();
            prop_assert_eq!(d.len(), e.rank());
            prop_assert!(d.iter().all(|x| !x.is_zero() && x.is_normalized()));
            for pair in d.windows(2) {
                prop_assert!(pair[0].divides(&pair[1]), "{} does not divide {}", pair[0], pair[1]);
            }
        }

        #[test]
        fn rank_is_independent_of_form(a in int_matrix(5, 5)) {
            let rank = a.eliminate().rank();
            for form in FORMS {
                let e = a.elimination(form);
                prop_assert_eq!(e.rank(), rank);
                prop_assert_eq!(e.rank() + e.nullity(), a.cols());
            }
        }

        #[test]
        fn kernel_is_annihilated(a in int_matrix(5, 5)) {
            let e = a.eliminate();
            let k = e.kernel_matrix();
            prop_assert_eq!(k.size(), (a.cols(), e.nullity()));
            prop_assert!((&a * &k).is_zero());
            prop_assert_eq!(&e.kernel_transition_matrix() * &k, Matrix::identity(e.nullity()));
        }

        #[test]
        fn image_transition_recovers_divisors(a in int_matrix(5, 5)) {
            let e = a.eliminate();
            let r = e.rank();
            prop_assert_eq!(
                &e.image_transition_matrix() * &e.image_matrix(),
                Matrix::diagonal((r, r), e.diagonal())
            );
        }

        #[test]
        fn determinant_is_multiplicative((a, b) in square_pair(4)) {
            let ab = &a * &b;
            prop_assert_eq!(
                ab.eliminate().determinant(),
                a.eliminate().determinant() * b.eliminate().determinant()
            );
        }

        #[test]
        fn determinant_agrees_across_forms(a in square_matrix(4)) {
            let det = a.eliminate().determinant();
            for form in FORMS {
                prop_assert_eq!(a.elimination(form).determinant(), det.clone());
            }
        }

        #[test]
        fn inverse_is_two_sided(a in square_matrix(4)) {
            let e = a.eliminate();
            match e.inverse() {
                Some(inv) => {
                    prop_assert!(e.determinant().is_one() || (-e.determinant()).is_one());
                    prop_assert_eq!(&a * &inv, Matrix::identity(a.rows()));
                    prop_assert_eq!(&inv * &a, Matrix::identity(a.rows()));
                }
                None => prop_assert!(!e.determinant().is_one() && !(-e.determinant()).is_one()),
            }
        }

        #[test]
        fn switching_alignment_keeps_entries(a in int_matrix(6, 6)) {
            let dense = a.to_dense();
            let vertical = a.clone().aligned(Alignment::Vertical);
            prop_assert_eq!(vertical.alignment(), Alignment::Vertical);
            prop_assert_eq!(vertical.to_dense(), dense.clone());
            prop_assert_eq!(vertical.aligned(Alignment::Horizontal).to_dense(), dense);
            prop_assert_eq!(a.transpose().transpose(), a);
        }

        #[test]
        fn rank_nullity_over_f5(data in prop::collection::vec(-4i64..=4, 12)) {
            let a = Matrix::from_data((3, 4), data.into_iter().map(F5::new));
            let e = a.eliminate();
            prop_assert!(e.rank() <= 3);
            prop_assert_eq!(e.rank() + e.nullity(), 4);
            prop_assert!(e.diagonal().iter().all(|d| d.value() == 1));
        }
    }
}
