// ======== Graded families of modules =========================

use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::ops::{Add, Neg, Sub};

use super::module::ModuleStructure;
use crate::rings::EuclideanRing;

/// Index of a graded piece: `isize` for ordinary complexes, [`Bidegree`] for bigraded ones.
pub trait Degree:
    Copy
    + Ord
    + Hash
    + Debug
    + Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
}

impl Degree for isize {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Bidegree(pub isize, pub isize);

impl Add for Bidegree {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Bidegree(self.0 + rhs.0, self.1 + rhs.1)
    }
}

impl Sub for Bidegree {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Bidegree(self.0 - rhs.0, self.1 - rhs.1)
    }
}

impl Neg for Bidegree {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Bidegree(-self.0, -self.1)
    }
}

impl Display for Bidegree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

impl Degree for Bidegree {}

// ======== ModuleGrid =========================================

/// What a [`ModuleGrid`] answers for degrees that were never listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultModule {
    Zero,
    Indeterminable,
}

/// A module (or `None` if it cannot be determined) for each listed degree.
#[derive(Debug, Clone)]
pub struct ModuleGrid<I: Degree, R: EuclideanRing> {
    entries: BTreeMap<I, Option<ModuleStructure<R>>>,
    default: DefaultModule,
    zero: ModuleStructure<R>,
}

impl<I: Degree, R: EuclideanRing> ModuleGrid<I, R> {
    pub fn new(default: DefaultModule) -> Self {
        Self {
            entries: BTreeMap::new(),
            default,
            zero: ModuleStructure::zero(),
        }
    }

    /// A grid of free modules `R^rank`, zero outside of the listed degrees.
    pub fn free(ranks: impl IntoIterator<Item = (I, usize)>) -> Self {
        ranks
            .into_iter()
            .map(|(i, rank)| (i, Some(ModuleStructure::free(rank))))
            .collect()
    }

    pub fn insert(&mut self, index: I, module: Option<ModuleStructure<R>>) {
        self.entries.insert(index, module);
    }

    pub fn default_module(&self) -> DefaultModule {
        self.default
    }

    pub fn get(&self, index: I) -> Option<&ModuleStructure<R>> {
        match self.entries.get(&index) {
            Some(entry) => entry.as_ref(),
            None => match self.default {
                DefaultModule::Zero => Some(&self.zero),
                DefaultModule::Indeterminable => None,
            },
        }
    }

    /// The listed degrees, in increasing order.
    pub fn degrees(&self) -> impl Iterator<Item = I> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, Option<&ModuleStructure<R>>)> + '_ {
        self.entries.iter().map(|(i, m)| (*i, m.as_ref()))
    }

    pub fn map(&self, mut f: impl FnMut(&ModuleStructure<R>) -> ModuleStructure<R>) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(i, m)| (*i, m.as_ref().map(&mut f)))
                .collect(),
            default: self.default,
            zero: self.zero.clone(),
        }
    }

    /// Every listed module is determined and zero.
    pub fn is_zero(&self) -> bool {
        self.entries
            .values()
            .all(|m| m.as_ref().is_some_and(ModuleStructure::is_zero))
    }
}

impl<I: Degree, R: EuclideanRing> FromIterator<(I, Option<ModuleStructure<R>>)> for ModuleGrid<I, R> {
    /// Collects into a grid that is zero outside of the listed degrees.
    fn from_iter<T: IntoIterator<Item = (I, Option<ModuleStructure<R>>)>>(iter: T) -> Self {
        let mut grid = Self::new(DefaultModule::Zero);
        for (i, m) in iter {
            grid.insert(i, m);
        }
        grid
    }
}

impl<I: Degree, R: EuclideanRing> Display for ModuleGrid<I, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (k, (i, m)) in self.iter().enumerate() {
            if k > 0 {
                writeln!(f)?;
            }
            match m {
                Some(m) => write!(f, "{i}: {m}")?,
                None => write!(f, "{i}: ?")?,
            }
        }
        Ok(())
    }
}
