// ======== Chain complexes ====================================

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use itertools::Itertools;
use log::debug;
use rustc_hash::FxHashMap;

use super::grid::{Degree, DefaultModule, ModuleGrid};
use super::module::ModuleStructure;
use super::split;
use crate::elimination::EliminationResult;
use crate::matrices::Matrix;
use crate::rings::EuclideanRing;

/// A map of fixed degree between the graded pieces of a [`ModuleGrid`].
pub trait Differential<I: Degree, R: EuclideanRing> {
    fn degree(&self) -> I;

    /// The matrix of the map `source -> target` at `index`, in summand coordinates.
    /// Must have size `target.dim() x source.dim()`.
    fn matrix(&self, index: I, source: &ModuleStructure<R>, target: &ModuleStructure<R>)
        -> Matrix<R>;
}

/// A differential given by a table of matrices. Degrees without a matrix map to zero.
#[derive(Debug, Clone)]
pub struct MatrixDifferential<I: Degree, R: EuclideanRing> {
    degree: I,
    matrices: FxHashMap<I, Matrix<R>>,
}

impl<I: Degree, R: EuclideanRing> MatrixDifferential<I, R> {
    pub fn new(degree: I, matrices: impl IntoIterator<Item = (I, Matrix<R>)>) -> Self {
        Self {
            degree,
            matrices: matrices.into_iter().collect(),
        }
    }
}

impl<I: Degree, R: EuclideanRing> Differential<I, R> for MatrixDifferential<I, R> {
    fn degree(&self) -> I {
        self.degree
    }

    fn matrix(
        &self,
        index: I,
        source: &ModuleStructure<R>,
        target: &ModuleStructure<R>,
    ) -> Matrix<R> {
        match self.matrices.get(&index) {
            Some(m) => m.clone(),
            None => Matrix::zero(target.dim(), source.dim()),
        }
    }
}

/// A differential whose matrices are produced on demand by a closure.
pub struct FnDifferential<I, F> {
    degree: I,
    f: F,
}

impl<I, F> FnDifferential<I, F> {
    pub fn new(degree: I, f: F) -> Self {
        Self { degree, f }
    }
}

impl<I, R, F> Differential<I, R> for FnDifferential<I, F>
where
    I: Degree,
    R: EuclideanRing,
    F: Fn(I, &ModuleStructure<R>, &ModuleStructure<R>) -> Matrix<R>,
{
    fn degree(&self) -> I {
        self.degree
    }

    fn matrix(
        &self,
        index: I,
        source: &ModuleStructure<R>,
        target: &ModuleStructure<R>,
    ) -> Matrix<R> {
        (self.f)(index, source, target)
    }
}

// Restricts another differential to the summands picked out by `select`.
// The inner differential is evaluated on the modules of `base`.
struct RestrictedDifferential<I: Degree, R: EuclideanRing> {
    inner: Rc<dyn Differential<I, R>>,
    base: ModuleGrid<I, R>,
    select: fn(&ModuleStructure<R>) -> Vec<usize>,
}

impl<I: Degree, R: EuclideanRing> Differential<I, R> for RestrictedDifferential<I, R> {
    fn degree(&self) -> I {
        self.inner.degree()
    }

    fn matrix(
        &self,
        index: I,
        source: &ModuleStructure<R>,
        target: &ModuleStructure<R>,
    ) -> Matrix<R> {
        let full_source = self.base.get(index);
        let full_target = self.base.get(index + self.inner.degree());
        match (full_source, full_target) {
            (Some(s), Some(t)) => self
                .inner
                .matrix(index, s, t)
                .select_rows((self.select)(t))
                .select_columns((self.select)(s)),
            _ => Matrix::zero(target.dim(), source.dim()),
        }
    }
}

// ======== ChainComplex =======================================

/// A graded family of modules together with a differential.
///
/// Differential matrices and their diagonal eliminations are computed lazily and cached per
/// degree, so repeated homology queries are cheap.
pub struct ChainComplex<I: Degree, R: EuclideanRing> {
    base: ModuleGrid<I, R>,
    differential: Rc<dyn Differential<I, R>>,
    d_matrices: RefCell<FxHashMap<I, Option<Matrix<R>>>>,
    eliminations: RefCell<FxHashMap<I, Rc<EliminationResult<R>>>>,
}

impl<I: Degree, R: EuclideanRing> ChainComplex<I, R> {
    pub fn new(base: ModuleGrid<I, R>, differential: impl Differential<I, R> + 'static) -> Self {
        Self::from_rc(base, Rc::new(differential))
    }

    pub(crate) fn from_rc(base: ModuleGrid<I, R>, differential: Rc<dyn Differential<I, R>>) -> Self {
        Self {
            base,
            differential,
            d_matrices: RefCell::new(FxHashMap::default()),
            eliminations: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn base(&self) -> &ModuleGrid<I, R> {
        &self.base
    }

    pub(crate) fn differential(&self) -> Rc<dyn Differential<I, R>> {
        Rc::clone(&self.differential)
    }

    pub fn module(&self, index: I) -> Option<&ModuleStructure<R>> {
        self.base.get(index)
    }

    pub fn differential_degree(&self) -> I {
        self.differential.degree()
    }

    /// The matrix of `d: C_I -> C_{I+d}`, or `None` if either end is indeterminable.
    ///
    /// # Panics
    /// If the differential produces a matrix of the wrong size.
    pub fn d_matrix(&self, index: I) -> Option<Matrix<R>> {
        if let Some(cached) = self.d_matrices.borrow().get(&index) {
            return cached.clone();
        }
        let matrix = match (self.module(index), self.module(index + self.differential_degree())) {
            (Some(source), Some(target)) if source.is_zero() || target.is_zero() => {
                Some(Matrix::zero(target.dim(), source.dim()))
            }
            (Some(source), Some(target)) => {
                let m = self.differential.matrix(index, source, target);
                assert_eq!(
                    m.size(),
                    (target.dim(), source.dim()),
                    "Differential at {index} has the wrong size"
                );
                Some(m)
            }
            _ => None,
        };
        self.d_matrices.borrow_mut().insert(index, matrix.clone());
        matrix
    }

    // Diagonal elimination of `d_I`, only available between free modules.
    fn elimination(&self, index: I) -> Option<Rc<EliminationResult<R>>> {
        let source = self.module(index)?;
        let target = self.module(index + self.differential_degree())?;
        if !source.is_free() || !target.is_free() {
            return None;
        }
        if let Some(e) = self.eliminations.borrow().get(&index) {
            return Some(Rc::clone(e));
        }
        let e = Rc::new(self.d_matrix(index)?.eliminate());
        self.eliminations.borrow_mut().insert(index, Rc::clone(&e));
        Some(e)
    }

    #[cfg(test)]
    pub(crate) fn cached_eliminations(&self) -> usize {
        self.eliminations.borrow().len()
    }

    pub fn kernel(&self, index: I) -> Option<Matrix<R>> {
        Some(self.elimination(index)?.kernel_matrix())
    }

    pub fn kernel_transition(&self, index: I) -> Option<Matrix<R>> {
        Some(self.elimination(index)?.kernel_transition_matrix())
    }

    pub fn image(&self, index: I) -> Option<Matrix<R>> {
        Some(self.elimination(index)?.image_matrix())
    }

    // ====== Homology =========================

    /// `ker d_I / im d_{I-d}`, or `None` when it cannot be determined.
    pub fn homology(&self, index: I) -> Option<ModuleStructure<R>> {
        let module = self.module(index)?;
        let prev = index - self.differential_degree();

        let d_in = self.d_matrix(prev);
        let d_out = self.d_matrix(index);
        if d_in.is_some_and(|m| m.is_zero()) && d_out.is_some_and(|m| m.is_zero()) {
            return Some(module.clone());
        }

        if self.kernel(index).is_some_and(|z| z.is_zero()) {
            return Some(ModuleStructure::zero());
        }

        if let (Some(z), Some(t), Some(b)) = (
            self.kernel(index),
            self.kernel_transition(index),
            self.image(prev),
        ) {
            let h = ModuleStructure::from_relations(
                &(module.generators() * &z),
                &(&t * module.transition()),
                &(&t * &b),
            );
            debug!("H[{index}] = {h}");
            return Some(h);
        }

        if self.d_splits(index) && self.d_splits(prev) {
            return split::split_homology(self, index);
        }
        debug!("H[{index}] is indeterminable");
        None
    }

    /// Homology at every listed degree. If unlisted degrees default to zero, zero groups are
    /// left out as well.
    pub fn homology_grid(&self) -> ModuleGrid<I, R> {
        let default = self.base.default_module();
        let mut grid = ModuleGrid::new(default);
        for index in self.base.degrees() {
            let h = self.homology(index);
            if default == DefaultModule::Zero && h.as_ref().is_some_and(ModuleStructure::is_zero) {
                continue;
            }
            grid.insert(index, h);
        }
        grid
    }

    pub fn is_exact(&self) -> bool {
        self.homology_grid().is_zero()
    }

    /// Checks `d ∘ d = 0` at every listed degree where all three modules are determinable.
    /// Entries of the composite only need to vanish modulo the divisors of the target.
    pub fn is_chain_complex(&self) -> bool {
        let deg = self.differential_degree();
        self.base.degrees().all(|i0| {
            let i1 = i0 + deg;
            let Some(target) = self.module(i1 + deg) else {
                debug!("{i0}: indeterminable");
                return true;
            };
            let (Some(d0), Some(d1)) = (self.d_matrix(i0), self.d_matrix(i1)) else {
                debug!("{i0}: indeterminable");
                return true;
            };
            let composite = &d1 * &d0;
            let vanishes = composite
                .nonzero_entries()
                .all(|(i, _, a)| target.summands()[i].divisor().divides(a));
            if !vanishes {
                debug!("d ∘ d does not vanish at {i0}");
            }
            vanishes
        })
    }

    /// The subcomplex of free summands, with the differential restricted to them.
    pub fn free_part(&self) -> Self {
        let restricted = RestrictedDifferential {
            inner: self.differential(),
            base: self.base.clone(),
            select: ModuleStructure::free_indices,
        };
        Self::new(self.base.map(ModuleStructure::free_part), restricted)
    }

    /// Whether `d_I` is block diagonal with respect to the grouping of equal divisors
    /// at both ends, i.e. only maps `R/(d)` summands into `R/(d)` summands.
    pub fn d_splits(&self, index: I) -> bool {
        let (Some(source), Some(target), Some(d)) = (
            self.module(index),
            self.module(index + self.differential_degree()),
            self.d_matrix(index),
        ) else {
            return false;
        };
        let groups = |m: &ModuleStructure<R>| {
            m.summands()
                .iter()
                .dedup_with_count()
                .map(|(count, s)| (s.divisor().clone(), count))
                .collect_vec()
        };
        let cols = groups(source);
        let rows = groups(target);
        let blocks = d.blocks(
            &rows.iter().map(|(_, n)| *n).collect_vec(),
            &cols.iter().map(|(_, n)| *n).collect_vec(),
        );
        blocks.iter().enumerate().all(|(k, line)| {
            line.iter()
                .enumerate()
                .all(|(l, block)| rows[k].0 == cols[l].0 || block.is_zero())
        })
    }

    /// Logs the map `C_I -> C_{I+d}` and its matrix at debug level.
    pub fn describe_map(&self, index: I) {
        let show = |m: Option<&ModuleStructure<R>>| match m {
            Some(m) => m.to_string(),
            None => "?".to_string(),
        };
        debug!(
            "{index}: {} -> {}",
            show(self.module(index)),
            show(self.module(index + self.differential_degree()))
        );
        if let Some(d) = self.d_matrix(index) {
            debug!("{d}");
        }
    }
}

impl<I: Degree, R: EuclideanRing> Display for ChainComplex<I, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base)
    }
}
