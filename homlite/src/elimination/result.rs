// ======== Elimination result =================================

use std::cell::OnceCell;

use super::operations::OperationLog;
use super::EliminationForm;
use crate::matrices::Matrix;
use crate::rings::EuclideanRing;

/// A finished elimination `L * A * R = result`.
///
/// Only the result and the operation log are stored. The transforms and everything derived
/// from them are built on first use and then cached, so a result should be kept around rather
/// than re-queried from a fresh elimination.
///
/// For echelon and Hermite forms the kernel, image, determinant and inverse are obtained by
/// diagonalizing `result` once more and composing with the recorded transforms.
pub struct EliminationResult<R: EuclideanRing> {
    form: EliminationForm,
    size: (usize, usize),
    result: Matrix<R>,
    log: OperationLog<R>,
    rank: usize,

    left: OnceCell<Matrix<R>>,
    left_inverse: OnceCell<Matrix<R>>,
    right: OnceCell<Matrix<R>>,
    right_inverse: OnceCell<Matrix<R>>,
    kernel: OnceCell<Matrix<R>>,
    kernel_transition: OnceCell<Matrix<R>>,
    image: OnceCell<Matrix<R>>,
    image_transition: OnceCell<Matrix<R>>,
    determinant: OnceCell<R>,
    inverse: OnceCell<Option<Matrix<R>>>,
    diagonalized: OnceCell<Box<EliminationResult<R>>>,
}

fn count_nonempty<R: EuclideanRing>(lines: &[Vec<(usize, R)>]) -> usize {
    lines.iter().filter(|line| !line.is_empty()).count()
}

impl<R: EuclideanRing> EliminationResult<R> {
    pub(crate) fn new(form: EliminationForm, result: Matrix<R>, log: OperationLog<R>) -> Self {
        let rank = if form.is_col_form() {
            count_nonempty(&result.vertical_table())
        } else {
            count_nonempty(&result.horizontal_table())
        };
        Self {
            form,
            size: result.size(),
            result,
            log,
            rank,
            left: OnceCell::new(),
            left_inverse: OnceCell::new(),
            right: OnceCell::new(),
            right_inverse: OnceCell::new(),
            kernel: OnceCell::new(),
            kernel_transition: OnceCell::new(),
            image: OnceCell::new(),
            image_transition: OnceCell::new(),
            determinant: OnceCell::new(),
            inverse: OnceCell::new(),
            diagonalized: OnceCell::new(),
        }
    }

    // ====== Stored data ======================

    pub fn form(&self) -> EliminationForm {
        self.form
    }

    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    pub fn result(&self) -> &Matrix<R> {
        &self.result
    }

    pub fn operations(&self) -> &OperationLog<R> {
        &self.log
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn nullity(&self) -> usize {
        self.size.1 - self.rank
    }

    // ====== Transforms =======================

    pub fn left(&self) -> Matrix<R> {
        self.left.get_or_init(|| self.log.left(self.size.0)).clone()
    }

    pub fn left_inverse(&self) -> Matrix<R> {
        self.left_inverse
            .get_or_init(|| self.log.left_inverse(self.size.0))
            .clone()
    }

    pub fn right(&self) -> Matrix<R> {
        self.right.get_or_init(|| self.log.right(self.size.1)).clone()
    }

    pub fn right_inverse(&self) -> Matrix<R> {
        self.right_inverse
            .get_or_init(|| self.log.right_inverse(self.size.1))
            .clone()
    }

    // The Smith form of `result`, for forms that are not diagonal already.
    fn diagonalized(&self) -> &EliminationResult<R> {
        debug_assert_ne!(self.form, EliminationForm::Diagonal);
        self.diagonalized
            .get_or_init(|| Box::new(self.result.eliminate()))
    }

    /// The non-zero diagonal entries of the Smith form, i.e. the elementary divisors.
    pub fn diagonal(&self) -> Vec<R> {
        if self.form != EliminationForm::Diagonal {
            return self.diagonalized().diagonal();
        }
        (0..self.rank).map(|i| self.result.entry(i, i)).collect()
    }

    // ====== Kernel and image =================

    /// Columns form a basis of the kernel of `A`, size `cols x nullity`.
    pub fn kernel_matrix(&self) -> Matrix<R> {
        self.kernel
            .get_or_init(|| {
                if self.form == EliminationForm::Diagonal {
                    let m = self.size.1;
                    self.right().submatrix(0..m, self.rank..m)
                } else {
                    &self.right() * &self.diagonalized().kernel_matrix()
                }
            })
            .clone()
    }

    /// Maps a kernel vector to its coordinates in the basis of [`Self::kernel_matrix`],
    /// size `nullity x cols`.
    pub fn kernel_transition_matrix(&self) -> Matrix<R> {
        self.kernel_transition
            .get_or_init(|| {
                if self.form == EliminationForm::Diagonal {
                    let m = self.size.1;
                    self.right_inverse().submatrix(self.rank..m, 0..m)
                } else {
                    &self.diagonalized().kernel_transition_matrix() * &self.right_inverse()
                }
            })
            .clone()
    }

    /// Columns generate the image of `A`, size `rows x rank`.
    pub fn image_matrix(&self) -> Matrix<R> {
        self.image
            .get_or_init(|| {
                if self.form == EliminationForm::Diagonal {
                    let n = self.size.0;
                    let divisors = Matrix::diagonal((self.rank, self.rank), self.diagonal());
                    &self.left_inverse().submatrix(0..n, 0..self.rank) * &divisors
                } else {
                    &self.left_inverse() * &self.diagonalized().image_matrix()
                }
            })
            .clone()
    }

    /// Size `rank x rows`. Multiplied with [`Self::image_matrix`] it gives the diagonal matrix
    /// of elementary divisors.
    pub fn image_transition_matrix(&self) -> Matrix<R> {
        self.image_transition
            .get_or_init(|| {
                if self.form == EliminationForm::Diagonal {
                    let n = self.size.0;
                    self.left().submatrix(0..self.rank, 0..n)
                } else {
                    &self.diagonalized().image_transition_matrix() * &self.left()
                }
            })
            .clone()
    }

    pub fn is_injective(&self) -> bool {
        self.nullity() == 0
    }

    pub fn is_surjective(&self) -> bool {
        self.rank == self.size.0 && self.diagonal().iter().all(|d| d.is_invertible())
    }

    pub fn is_bijective(&self) -> bool {
        self.is_injective() && self.is_surjective()
    }

    // ====== Square matrices ==================

    /// # Panics
    /// If the matrix is not square.
    pub fn determinant(&self) -> R {
        assert_eq!(
            self.size.0, self.size.1,
            "Determinant of a non-square {:?} matrix",
            self.size
        );
        self.determinant
            .get_or_init(|| {
                if self.rank < self.size.0 {
                    return R::zero();
                }
                let det_result = if self.form == EliminationForm::Diagonal {
                    self.diagonal()
                        .into_iter()
                        .fold(R::one(), |acc, d| acc.mul_ref(&d))
                } else {
                    self.diagonalized().determinant()
                };
                det_result.mul_ref(&self.log.determinant_factor())
            })
            .clone()
    }

    /// `None` unless the determinant is a unit.
    ///
    /// # Panics
    /// If the matrix is not square.
    pub fn inverse(&self) -> Option<Matrix<R>> {
        if !self.determinant().is_invertible() {
            return None;
        }
        self.inverse
            .get_or_init(|| {
                let result_inverse = if self.form == EliminationForm::Diagonal {
                    let inverses = self
                        .diagonal()
                        .into_iter()
                        .map(|d| d.inverse())
                        .collect::<Option<Vec<_>>>()?;
                    Matrix::diagonal(self.size, inverses)
                } else {
                    self.diagonalized().inverse()?
                };
                Some(&(&self.right() * &result_inverse) * &self.left())
            })
            .clone()
    }
}

impl<R: EuclideanRing> std::fmt::Debug for EliminationResult<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EliminationResult")
            .field("form", &self.form)
            .field("size", &self.size)
            .field("rank", &self.rank)
            .field("result", &self.result)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::elimination::EliminationForm;
    use crate::matrices::Matrix;

    #[test]
    fn test_kernel() {
        let a = Matrix::<i64>::from_data((2, 2), [1, 2, 1, 2]);
        let e = a.eliminate();
        let k = e.kernel_matrix();
        assert_eq!(k.size(), (2, 1));
        assert!((&a * &k).is_zero());
        let t = e.kernel_transition_matrix();
        assert_eq!(&t * &k, Matrix::identity(1));
        assert_eq!(e.nullity(), 1);
        assert!(!e.is_injective());
    }

    #[test]
    fn test_image() {
        let a = Matrix::<i64>::from_data((2, 2), [2, 4, 2, 4]);
        let e = a.eliminate();
        let i = e.image_matrix();
        assert_eq!(i, Matrix::from_data((2, 1), [2, 2]));
        assert_eq!(
            &e.image_transition_matrix() * &i,
            Matrix::from_data((1, 1), [2])
        );
        assert!(!e.is_surjective());
    }

    #[test]
    fn test_inverse() {
        let a = Matrix::<i64>::from_data((2, 2), [1, 2, 2, 3]);
        let e = a.eliminate();
        let inv = e.inverse().unwrap();
        assert_eq!(inv, Matrix::from_data((2, 2), [-3, 2, 2, -1]));
        assert_eq!(&a * &inv, Matrix::identity(2));
        assert!(e.is_bijective());
    }

    #[test]
    fn test_no_inverse_over_integers() {
        let a = Matrix::<i64>::from_data((2, 2), [2, 0, 0, 1]);
        let e = a.eliminate();
        assert_eq!(e.determinant(), 2);
        assert_eq!(e.inverse(), None);
        assert!(e.is_injective());
        assert!(!e.is_surjective());
    }

    #[test]
    fn test_determinant() {
        let a = Matrix::<i64>::from_data(
            (4, 4),
            [3, -1, 2, 4, 2, 1, 1, 3, -2, 0, 3, -1, 0, -2, 1, 3],
        );
        assert_eq!(a.eliminate().determinant(), 66);
        for form in [
            EliminationForm::RowEchelon,
            EliminationForm::ColEchelon,
            EliminationForm::RowHermite,
            EliminationForm::ColHermite,
        ] {
            assert_eq!(a.elimination(form).determinant(), 66, "{form:?}");
        }
    }

    #[test]
    fn test_determinant_sign_of_permutation() {
        let a = Matrix::<i64>::from_data((3, 3), [0, 1, 0, 0, 0, 1, 1, 0, 0]);
        assert_eq!(a.eliminate().determinant(), 1);
        let b = Matrix::<i64>::from_data((2, 2), [0, 1, 1, 0]);
        assert_eq!(b.eliminate().determinant(), -1);
        let singular = Matrix::<i64>::from_data((2, 2), [1, 2, 2, 4]);
        assert_eq!(singular.eliminate().determinant(), 0);
    }

    #[test]
    #[should_panic]
    fn test_determinant_of_non_square_panics() {
        Matrix::<i64>::zero(2, 3).eliminate().determinant();
    }

    #[test]
    fn test_kernel_and_image_from_other_forms() {
        let a = Matrix::<i64>::from_data((3, 4), [1, 2, 3, 4, 2, 4, 6, 8, 0, 1, 1, 0]);
        let smith = a.eliminate();
        for form in [
            EliminationForm::RowEchelon,
            EliminationForm::ColHermite,
            EliminationForm::Diagonal,
        ] {
            let e = a.elimination(form);
            assert_eq!(e.rank(), 2, "{form:?}");
            let k = e.kernel_matrix();
            assert_eq!(k.size(), (4, 2));
            assert!((&a * &k).is_zero());
            assert_eq!(&e.kernel_transition_matrix() * &k, Matrix::identity(2));
            let i = e.image_matrix();
            assert_eq!(
                &e.image_transition_matrix() * &i,
                Matrix::diagonal((2, 2), smith.diagonal())
            );
        }
    }

    #[test]
    fn test_inverse_from_hermite() {
        let a = Matrix::<i64>::from_data((3, 3), [2, 1, 1, 1, 1, 0, 3, 1, 1]);
        let e = a.elimination(EliminationForm::RowHermite);
        let inv = e.inverse().unwrap();
        assert_eq!(&a * &inv, Matrix::identity(3));
        assert_eq!(&inv * &a, Matrix::identity(3));
    }
}
