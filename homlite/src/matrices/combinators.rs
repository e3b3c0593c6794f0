// ======== Combinators ========================================

use std::ops::{Add, Mul, Neg, Sub};

use super::{Alignment, Entry, Matrix};
use crate::rings::Ring;

/// Two-pointer merge of sorted lines, computing `a + scale * b` entrywise and dropping zeros.
pub(crate) fn merge_lines<R: Ring>(a: &[Entry<R>], b: &[Entry<R>], scale: &R) -> Vec<Entry<R>> {
    let mut output = Vec::with_capacity(a.len() + b.len());
    let (mut x, mut y) = (a.iter().peekable(), b.iter().peekable());
    loop {
        match (x.peek(), y.peek()) {
            (Some((i, u)), Some((j, v))) => {
                if i < j {
                    output.push((*i, u.clone()));
                    x.next();
                } else if j < i {
                    let w = scale.mul_ref(v);
                    if !w.is_zero() {
                        output.push((*j, w));
                    }
                    y.next();
                } else {
                    let w = u.add_ref(&scale.mul_ref(v));
                    if !w.is_zero() {
                        output.push((*i, w));
                    }
                    x.next();
                    y.next();
                }
            }
            (Some((i, u)), None) => {
                output.push((*i, u.clone()));
                x.next();
            }
            (None, Some((j, v))) => {
                let w = scale.mul_ref(v);
                if !w.is_zero() {
                    output.push((*j, w));
                }
                y.next();
            }
            (None, None) => break,
        }
    }
    output
}

// ====== Sum ==================================

fn combine<R: Ring>(left: &Matrix<R>, right: &Matrix<R>, scale: R) -> Matrix<R> {
    assert_eq!(
        left.size(),
        right.size(),
        "Cannot add a {:?} matrix to a {:?} matrix",
        right.size(),
        left.size()
    );
    // Work in whichever grouping `left` already has
    let alignment = left.alignment();
    let other = match alignment {
        Alignment::Horizontal => right.horizontal_table(),
        Alignment::Vertical => right.vertical_table(),
    };
    let table = left
        .table
        .iter()
        .zip(other.iter())
        .map(|(a, b)| merge_lines(a, b, &scale))
        .collect();
    Matrix::from_table(left.size(), alignment, table)
}

impl<R: Ring> Add for &Matrix<R> {
    type Output = Matrix<R>;

    fn add(self, rhs: Self) -> Self::Output {
        combine(self, rhs, R::one())
    }
}

impl<R: Ring> Sub for &Matrix<R> {
    type Output = Matrix<R>;

    fn sub(self, rhs: Self) -> Self::Output {
        combine(self, rhs, -R::one())
    }
}

impl<R: Ring> Neg for &Matrix<R> {
    type Output = Matrix<R>;

    fn neg(self) -> Self::Output {
        self.map(|a| -a.clone())
    }
}

// ====== Product ==============================

impl<R: Ring> Mul for &Matrix<R> {
    type Output = Matrix<R>;

    /// Row `i` of the product is the combination of the rows of `rhs` given by row `i` of `self`.
    fn mul(self, rhs: Self) -> Self::Output {
        assert_eq!(
            self.cols(),
            rhs.rows(),
            "Cannot multiply a {:?} matrix by a {:?} matrix",
            self.size(),
            rhs.size()
        );
        let left = self.horizontal_table();
        let right = rhs.horizontal_table();
        let table = left
            .iter()
            .map(|row| {
                row.iter().fold(vec![], |acc, (k, a)| merge_lines(&acc, &right[*k], a))
            })
            .collect();
        Matrix::from_table((self.rows(), rhs.cols()), Alignment::Horizontal, table)
    }
}

impl<R: Ring> Matrix<R> {
    /// Multiplies every entry by `scalar` on the left.
    pub fn scaled(&self, scalar: &R) -> Self {
        self.map(|a| scalar.mul_ref(a))
    }
}

// Owned variants forward to the borrowed ones.
macro_rules! forward_owned_binop {
    ($trait:ident, $method:ident) => {
        impl<R: Ring> $trait for Matrix<R> {
            type Output = Matrix<R>;

            fn $method(self, rhs: Self) -> Self::Output {
                (&self).$method(&rhs)
            }
        }

        impl<R: Ring> $trait<&Matrix<R>> for Matrix<R> {
            type Output = Matrix<R>;

            fn $method(self, rhs: &Matrix<R>) -> Self::Output {
                (&self).$method(rhs)
            }
        }

        impl<R: Ring> $trait<Matrix<R>> for &Matrix<R> {
            type Output = Matrix<R>;

            fn $method(self, rhs: Matrix<R>) -> Self::Output {
                self.$method(&rhs)
            }
        }
    };
}

forward_owned_binop!(Add, add);
forward_owned_binop!(Sub, sub);
forward_owned_binop!(Mul, mul);

impl<R: Ring> Neg for Matrix<R> {
    type Output = Matrix<R>;

    fn neg(self) -> Self::Output {
        -&self
    }
}
