// ======== Module structures ==================================

use std::fmt::Display;

use itertools::Itertools;

use crate::matrices::Matrix;
use crate::rings::{EuclideanRing, Ring};

/// A cyclic summand `R/(divisor)`. A zero divisor means the summand is free.
#[derive(Debug, Clone, PartialEq)]
pub struct Summand<R> {
    divisor: R,
}

impl<R: Ring> Summand<R> {
    pub fn free() -> Self {
        Self { divisor: R::zero() }
    }

    pub fn torsion(divisor: R) -> Self {
        Self { divisor }
    }

    pub fn divisor(&self) -> &R {
        &self.divisor
    }

    pub fn is_free(&self) -> bool {
        self.divisor.is_zero()
    }
}

impl<R: Ring> Display for Summand<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_free() {
            write!(f, "{}", R::symbol())
        } else {
            write!(f, "{}/{}", R::symbol(), self.divisor)
        }
    }
}

/// A finitely generated module `(R/d_0 ⊕ ... ⊕ R/d_k) ⊕ R^r`, presented inside a free ambient module.
///
/// Torsion summands come first, in the order of the divisor chain, followed by the free ones.
/// Column `i` of `generators` is the generator of summand `i` in ambient coordinates and
/// `transition` maps ambient vectors (that lie in the module) back to summand coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleStructure<R: EuclideanRing> {
    summands: Vec<Summand<R>>,
    generators: Matrix<R>,
    transition: Matrix<R>,
}

impl<R: EuclideanRing> ModuleStructure<R> {
    /// # Panics
    /// If the matrices do not have one column (resp. row) per summand and a common ambient dimension.
    pub fn new(summands: Vec<Summand<R>>, generators: Matrix<R>, transition: Matrix<R>) -> Self {
        assert_eq!(generators.cols(), summands.len(), "One generator per summand");
        assert_eq!(transition.rows(), summands.len(), "One transition row per summand");
        assert_eq!(generators.rows(), transition.cols(), "Ambient dimensions differ");
        Self {
            summands,
            generators,
            transition,
        }
    }

    pub fn zero() -> Self {
        Self::new(vec![], Matrix::zero(0, 0), Matrix::zero(0, 0))
    }

    /// `R^rank` with the standard basis.
    pub fn free(rank: usize) -> Self {
        Self::new(
            vec![Summand::free(); rank],
            Matrix::identity(rank),
            Matrix::identity(rank),
        )
    }

    /// `R/d_0 ⊕ ... ⊕ R/d_k ⊕ R^rank`, with one ambient coordinate per summand.
    pub fn from_divisors(divisors: impl IntoIterator<Item = R>, rank: usize) -> Self {
        let summands: Vec<Summand<R>> = divisors
            .into_iter()
            .map(Summand::torsion)
            .chain(std::iter::repeat(Summand::free()).take(rank))
            .collect();
        let n = summands.len();
        Self::new(summands, Matrix::identity(n), Matrix::identity(n))
    }

    /// The quotient of the submodule spanned by the columns of `generators` by `relations`.
    ///
    /// `generators` is `ambient x k`, `transition` its left inverse on the span (`k x ambient`)
    /// and the columns of `relations` (`k x r`) are expressed in generator coordinates.
    /// The relations are brought into Smith form `L * relations * R = D`; the new generators are
    /// the columns of `generators * L⁻¹`, the summands with unit divisors are dropped.
    pub fn from_relations(generators: &Matrix<R>, transition: &Matrix<R>, relations: &Matrix<R>) -> Self {
        let k = generators.cols();
        assert_eq!(relations.rows(), k, "Relations must be in generator coordinates");
        let e = relations.eliminate();
        let rank = e.rank();
        let divisors = e.diagonal();

        let keep = (0..k)
            .filter(|i| *i >= rank || !divisors[*i].is_invertible())
            .collect_vec();
        let summands = keep
            .iter()
            .map(|i| match divisors.get(*i) {
                Some(d) => Summand::torsion(d.clone()),
                None => Summand::free(),
            })
            .collect();
        let generators = (generators * &e.left_inverse()).select_columns(keep.iter().copied());
        let transition = (&e.left() * transition).select_rows(keep);
        Self::new(summands, generators, transition)
    }

    // ====== Queries ==========================

    pub fn summands(&self) -> &[Summand<R>] {
        &self.summands
    }

    pub fn generators(&self) -> &Matrix<R> {
        &self.generators
    }

    pub fn transition(&self) -> &Matrix<R> {
        &self.transition
    }

    /// Generator of summand `i`, as an `ambient x 1` matrix.
    pub fn generator(&self, i: usize) -> Matrix<R> {
        self.generators.select_columns([i])
    }

    /// Number of summands.
    pub fn dim(&self) -> usize {
        self.summands.len()
    }

    pub fn ambient_dim(&self) -> usize {
        self.generators.rows()
    }

    pub fn rank(&self) -> usize {
        self.summands.iter().filter(|s| s.is_free()).count()
    }

    pub fn torsion(&self) -> Vec<R> {
        self.summands
            .iter()
            .filter(|s| !s.is_free())
            .map(|s| s.divisor.clone())
            .collect()
    }

    pub fn is_zero(&self) -> bool {
        self.summands.is_empty()
    }

    pub fn is_free(&self) -> bool {
        self.summands.iter().all(Summand::is_free)
    }

    /// Indices of the free summands.
    pub fn free_indices(&self) -> Vec<usize> {
        self.indices_where(Summand::is_free)
    }

    pub(crate) fn indices_where(&self, pred: impl Fn(&Summand<R>) -> bool) -> Vec<usize> {
        self.summands
            .iter()
            .enumerate()
            .filter(|(_, s)| pred(*s))
            .map(|(i, _)| i)
            .collect()
    }

    /// The summands selected by `indices`, with the same ambient module.
    pub fn restricted(&self, indices: &[usize]) -> Self {
        Self::new(
            indices.iter().map(|i| self.summands[*i].clone()).collect(),
            self.generators.select_columns(indices.iter().copied()),
            self.transition.select_rows(indices.iter().copied()),
        )
    }

    pub fn free_part(&self) -> Self {
        self.restricted(&self.free_indices())
    }

    /// Direct sum of two submodules of the same ambient module. Torsion summands are moved in front.
    /// A zero module is a neutral element regardless of its ambient dimension.
    pub fn direct_sum(&self, other: &Self) -> Self {
        if other.is_zero() {
            return self.clone();
        }
        if self.is_zero() {
            return other.clone();
        }
        let summands = self.summands.iter().chain(other.summands.iter()).cloned().collect_vec();
        let generators = self.generators.concat(&other.generators);
        let transition = self.transition.stack(&other.transition);
        let order = (0..summands.len())
            .sorted_by_key(|i| summands[*i].is_free())
            .collect_vec();
        Self::new(
            order.iter().map(|i| summands[*i].clone()).collect(),
            generators.select_columns(order.iter().copied()),
            transition.select_rows(order.iter().copied()),
        )
    }
}

impl<R: EuclideanRing> Display for ModuleStructure<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut parts = vec![];
        match self.rank() {
            0 => {}
            1 => parts.push(R::symbol()),
            r => parts.push(format!("{}^{r}", R::symbol())),
        }
        parts.extend(
            self.summands
                .iter()
                .filter(|s| !s.is_free())
                .map(|s| s.to_string()),
        );
        write!(f, "{}", parts.join(" ⊕ "))
    }
}
