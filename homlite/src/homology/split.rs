// ======== Split differentials ================================

//! Homology of integer complexes whose differentials split into a free part and a part
//! supported on `Z/2` summands. The `Z/2` part is computed over `F2` and lifted back.

use std::any::Any;

use log::warn;

use super::complex::{ChainComplex, FnDifferential};
use super::grid::{Degree, ModuleGrid};
use super::module::{ModuleStructure, Summand};
use crate::matrices::Matrix;
use crate::rings::{EuclideanRing, F2};

pub(crate) fn split_homology<I: Degree, R: EuclideanRing>(
    complex: &ChainComplex<I, R>,
    index: I,
) -> Option<ModuleStructure<R>> {
    let integral = (complex as &dyn Any).downcast_ref::<ChainComplex<I, i64>>();
    let h = match integral {
        Some(c) if is_order_2(c.module(index)?) => order_2_split(c, index)?,
        _ => {
            warn!("H[{index}]: differential splits, but only order-2 torsion over Z is handled");
            complex.describe_map(index);
            return None;
        }
    };
    let boxed: Box<dyn Any> = Box::new(h);
    boxed.downcast::<ModuleStructure<R>>().ok().map(|h| *h)
}

fn is_order_2(module: &ModuleStructure<i64>) -> bool {
    module.torsion().iter().all(|d| *d == 2)
}

fn order_2_indices(module: &ModuleStructure<i64>) -> Vec<usize> {
    module.indices_where(|s| *s.divisor() == 2)
}

fn order_2_split<I: Degree>(
    complex: &ChainComplex<I, i64>,
    index: I,
) -> Option<ModuleStructure<i64>> {
    let module = complex.module(index)?;
    let free = complex.free_part().homology(index)?;
    let torsion = order_2_part(complex).homology(index)?;
    if torsion.is_zero() {
        return Some(free);
    }

    let tor_idx = order_2_indices(module);
    let lift = |m: &Matrix<F2>| m.map(|x| i64::from(x.value()));
    let lifted = ModuleStructure::new(
        vec![Summand::torsion(2); torsion.dim()],
        &module.generators().select_columns(tor_idx.iter().copied()) * &lift(torsion.generators()),
        &lift(torsion.transition()) * &module.transition().select_rows(tor_idx),
    );
    Some(lifted.direct_sum(&free))
}

// The `Z/2` summands of every module as free `F2` modules, with the differential reduced mod 2.
fn order_2_part<I: Degree>(complex: &ChainComplex<I, i64>) -> ChainComplex<I, F2> {
    let base = complex.base().clone();
    let mut grid = ModuleGrid::new(base.default_module());
    for (i, m) in base.iter() {
        grid.insert(i, m.map(|m| ModuleStructure::free(order_2_indices(m).len())));
    }

    let inner = complex.differential();
    let degree = complex.differential_degree();
    let differential = FnDifferential::new(
        degree,
        move |i: I, source: &ModuleStructure<F2>, target: &ModuleStructure<F2>| {
            match (base.get(i), base.get(i + degree)) {
                (Some(s), Some(t)) => inner
                    .matrix(i, s, t)
                    .select_rows(order_2_indices(t))
                    .select_columns(order_2_indices(s))
                    .map(|a| F2::new(*a)),
                _ => Matrix::zero(target.dim(), source.dim()),
            }
        },
    );
    ChainComplex::new(grid, differential)
}
