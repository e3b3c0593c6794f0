//! Sparse matrices over a [`Ring`], stored as one sorted list of non-zero entries per row or per column.
//!
//! [`Matrix`] has value semantics: clones share storage through an [`Rc`] and the storage is only
//! copied when a shared matrix is mutated (see [`Rc::make_mut`]).

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use itertools::Itertools;

use crate::rings::Ring;
use crate::HomliteError;

pub mod adaptors;
pub mod combinators;

/// A single non-zero entry within a row (or column): the orthogonal index and the value.
pub type Entry<R> = (usize, R);

/// How the non-zero entries of a [`Matrix`] are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// One list per row, sorted by column index.
    Horizontal,
    /// One list per column, sorted by row index.
    Vertical,
}

impl Alignment {
    pub fn opposite(self) -> Self {
        match self {
            Alignment::Horizontal => Alignment::Vertical,
            Alignment::Vertical => Alignment::Horizontal,
        }
    }
}

// ======== Matrix =============================================

#[derive(Clone)]
pub struct Matrix<R: Ring> {
    rows: usize,
    cols: usize,
    alignment: Alignment,
    // Horizontal: table[i] is row i. Vertical: table[j] is column j.
    // Each list is strictly increasing in index and holds no zeros.
    table: Rc<Vec<Vec<Entry<R>>>>,
}

impl<R: Ring> Matrix<R> {
    /// Builds a matrix from lists that already satisfy the storage invariant.
    pub(crate) fn from_table(
        size: (usize, usize),
        alignment: Alignment,
        table: Vec<Vec<Entry<R>>>,
    ) -> Self {
        debug_assert_eq!(
            table.len(),
            match alignment {
                Alignment::Horizontal => size.0,
                Alignment::Vertical => size.1,
            }
        );
        debug_assert!(table.iter().all(|line| is_valid_line(line)));
        Self {
            rows: size.0,
            cols: size.1,
            alignment,
            table: Rc::new(table),
        }
    }

    pub fn zero(rows: usize, cols: usize) -> Self {
        Self::from_table((rows, cols), Alignment::Horizontal, vec![vec![]; rows])
    }

    pub fn identity(n: usize) -> Self {
        Self::diagonal((n, n), std::iter::repeat(R::one()).take(n))
    }

    /// Places the given values on the diagonal, starting from `(0, 0)`.
    ///
    /// # Panics
    /// If more values are supplied than fit on the diagonal.
    pub fn diagonal(size: (usize, usize), values: impl IntoIterator<Item = R>) -> Self {
        let mut table = vec![vec![]; size.0];
        for (i, value) in values.into_iter().enumerate() {
            assert!(
                i < size.0.min(size.1),
                "Too many diagonal entries for a {}x{} matrix",
                size.0,
                size.1
            );
            if !value.is_zero() {
                table[i].push((i, value));
            }
        }
        Self::from_table(size, Alignment::Horizontal, table)
    }

    /// Builds a matrix from dense row-major data.
    ///
    /// # Panics
    /// If the number of values is not `rows * cols`.
    pub fn from_data(size: (usize, usize), data: impl IntoIterator<Item = R>) -> Self {
        Self::try_from_data(size, data).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_from_data(
        size: (usize, usize),
        data: impl IntoIterator<Item = R>,
    ) -> Result<Self, HomliteError> {
        let (rows, cols) = size;
        let data: Vec<R> = data.into_iter().collect();
        if data.len() != rows * cols {
            return Err(HomliteError::DimensionMismatch {
                expected: rows * cols,
                found: data.len(),
            });
        }
        let mut table = vec![vec![]; rows];
        for (k, value) in data.into_iter().enumerate() {
            if !value.is_zero() {
                table[k / cols].push((k % cols, value));
            }
        }
        Ok(Self::from_table(size, Alignment::Horizontal, table))
    }

    /// Builds a matrix from `(row, col, value)` triples, in any order.
    /// Repeated positions are summed and zeros are dropped.
    pub fn try_from_entries(
        size: (usize, usize),
        entries: impl IntoIterator<Item = (usize, usize, R)>,
    ) -> Result<Self, HomliteError> {
        let mut grouped: Vec<BTreeMap<usize, R>> = vec![BTreeMap::new(); size.0];
        for (i, j, value) in entries {
            if i >= size.0 || j >= size.1 {
                return Err(HomliteError::IndexOutOfBounds {
                    index: (i, j),
                    size,
                });
            }
            let slot = grouped[i].entry(j).or_insert_with(R::zero);
            *slot = slot.add_ref(&value);
        }
        let table = grouped
            .into_iter()
            .map(|line| line.into_iter().filter(|(_, a)| !a.is_zero()).collect())
            .collect();
        Ok(Self::from_table(size, Alignment::Horizontal, table))
    }

    /// Infallible counterpart of [`Matrix::try_from_entries`].
    ///
    /// # Panics
    /// If an entry lies outside of the matrix.
    pub fn from_entries(
        size: (usize, usize),
        entries: impl IntoIterator<Item = (usize, usize, R)>,
    ) -> Self {
        Self::try_from_entries(size, entries).unwrap_or_else(|e| panic!("{e}"))
    }

    // ====== Queries ==========================

    pub fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn nnz(&self) -> usize {
        self.table.iter().map(Vec::len).sum()
    }

    pub fn is_zero(&self) -> bool {
        self.table.iter().all(Vec::is_empty)
    }

    pub fn is_diagonal(&self) -> bool {
        self.table
            .iter()
            .enumerate()
            .all(|(i, line)| line.iter().all(|(j, _)| *j == i))
    }

    pub fn is_identity(&self) -> bool {
        self.is_square()
            && self
                .table
                .iter()
                .enumerate()
                .all(|(i, line)| line.len() == 1 && line[0].0 == i && line[0].1.is_one())
    }

    pub fn entry(&self, i: usize, j: usize) -> R {
        assert!(i < self.rows && j < self.cols, "Index ({i}, {j}) out of range");
        let (line, index) = match self.alignment {
            Alignment::Horizontal => (&self.table[i], j),
            Alignment::Vertical => (&self.table[j], i),
        };
        line.binary_search_by_key(&index, |(k, _)| *k)
            .map(|pos| line[pos].1.clone())
            .unwrap_or_else(|_| R::zero())
    }

    /// The non-zero entries as `(row, col, value)`, grouped by the current alignment.
    pub fn nonzero_entries(&self) -> impl Iterator<Item = (usize, usize, &R)> + '_ {
        let alignment = self.alignment;
        self.table.iter().enumerate().flat_map(move |(k, line)| {
            line.iter().map(move |(l, a)| match alignment {
                Alignment::Horizontal => (k, *l, a),
                Alignment::Vertical => (*l, k, a),
            })
        })
    }

    /// The non-zero entries of row `i`, sorted by column.
    pub fn row(&self, i: usize) -> Cow<'_, [Entry<R>]> {
        assert!(i < self.rows, "Row {i} out of range");
        match self.alignment {
            Alignment::Horizontal => Cow::Borrowed(self.table[i].as_slice()),
            Alignment::Vertical => Cow::Owned(
                self.table
                    .iter()
                    .enumerate()
                    .filter_map(|(j, col)| {
                        col.binary_search_by_key(&i, |(k, _)| *k)
                            .ok()
                            .map(|pos| (j, col[pos].1.clone()))
                    })
                    .collect(),
            ),
        }
    }

    /// The non-zero entries of column `j`, sorted by row.
    pub fn column(&self, j: usize) -> Cow<'_, [Entry<R>]> {
        assert!(j < self.cols, "Column {j} out of range");
        self.transpose_ref().row(j).into_owned().into()
    }

    /// The rows of this matrix (regrouping if vertically aligned).
    pub(crate) fn horizontal_table(&self) -> Cow<'_, Vec<Vec<Entry<R>>>> {
        match self.alignment {
            Alignment::Horizontal => Cow::Borrowed(self.table.as_ref()),
            Alignment::Vertical => Cow::Owned(regroup(self.rows, &self.table)),
        }
    }

    /// The columns of this matrix (regrouping if horizontally aligned).
    pub(crate) fn vertical_table(&self) -> Cow<'_, Vec<Vec<Entry<R>>>> {
        match self.alignment {
            Alignment::Vertical => Cow::Borrowed(self.table.as_ref()),
            Alignment::Horizontal => Cow::Owned(regroup(self.cols, &self.table)),
        }
    }

    // ====== Alignment and transposition ======

    /// Regroups the entries by the given alignment. The matrix itself does not change.
    pub fn switch_alignment(&mut self, alignment: Alignment) {
        if self.alignment == alignment {
            return;
        }
        let other_len = match alignment {
            Alignment::Horizontal => self.rows,
            Alignment::Vertical => self.cols,
        };
        self.table = Rc::new(regroup(other_len, &self.table));
        self.alignment = alignment;
    }

    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.switch_alignment(alignment);
        self
    }

    /// The rows of `self` are the columns of the transpose, so this only relabels the storage.
    pub fn transpose(&self) -> Self {
        self.transpose_ref()
    }

    fn transpose_ref(&self) -> Self {
        Self {
            rows: self.cols,
            cols: self.rows,
            alignment: self.alignment.opposite(),
            table: Rc::clone(&self.table),
        }
    }

    // ====== Mutation =========================

    pub fn set_entry(&mut self, i: usize, j: usize, value: R) {
        assert!(i < self.rows && j < self.cols, "Index ({i}, {j}) out of range");
        let (k, index) = match self.alignment {
            Alignment::Horizontal => (i, j),
            Alignment::Vertical => (j, i),
        };
        let line = &mut Rc::make_mut(&mut self.table)[k];
        match line.binary_search_by_key(&index, |(l, _)| *l) {
            Ok(pos) if value.is_zero() => {
                line.remove(pos);
            }
            Ok(pos) => line[pos].1 = value,
            Err(_) if value.is_zero() => {}
            Err(pos) => line.insert(pos, (index, value)),
        }
    }

    /// Applies `f` to every non-zero entry, producing a matrix over another ring.
    /// Entries mapped to zero are dropped.
    pub fn map<S: Ring>(&self, f: impl Fn(&R) -> S) -> Matrix<S> {
        let table = self
            .table
            .iter()
            .map(|line| {
                line.iter()
                    .map(|(k, a)| (*k, f(a)))
                    .filter(|(_, b)| !b.is_zero())
                    .collect()
            })
            .collect();
        Matrix::from_table(self.size(), self.alignment, table)
    }

    /// Dense row-major copy, mostly for display and tests.
    pub fn to_dense(&self) -> Vec<Vec<R>> {
        let mut grid = vec![vec![R::zero(); self.cols]; self.rows];
        for (i, j, a) in self.nonzero_entries() {
            grid[i][j] = a.clone();
        }
        grid
    }
}

fn is_valid_line<R: Ring>(line: &[Entry<R>]) -> bool {
    line.iter().all(|(_, a)| !a.is_zero()) && line.iter().tuple_windows().all(|(x, y)| x.0 < y.0)
}

/// Regroups lists keyed by one index into `len` lists keyed by the other.
/// Iterating in order keeps every output list sorted.
pub(crate) fn regroup<R: Clone>(len: usize, table: &[Vec<Entry<R>>]) -> Vec<Vec<Entry<R>>> {
    let mut output = vec![vec![]; len];
    for (k, line) in table.iter().enumerate() {
        for (l, a) in line {
            output[*l].push((k, a.clone()));
        }
    }
    output
}

impl<R: Ring> PartialEq for Matrix<R> {
    fn eq(&self, other: &Self) -> bool {
        if self.size() != other.size() {
            return false;
        }
        if self.alignment == other.alignment {
            return self.table == other.table;
        }
        *self.horizontal_table() == *other.horizontal_table()
    }
}

impl<R: Ring> Display for Matrix<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let grid: Vec<Vec<String>> = self
            .to_dense()
            .into_iter()
            .map(|row| row.into_iter().map(|a| a.to_string()).collect())
            .collect();
        let width = grid.iter().flatten().map(String::len).max().unwrap_or(1);
        let lines = grid.iter().map(|row| {
            row.iter()
                .map(|s| format!("{s:>width$}"))
                .join(", ")
        });
        write!(f, "[{}]", lines.format(";\n "))
    }
}

impl<R: Ring> Debug for Matrix<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Matrix {}x{}", self.rows, self.cols)?;
        Display::fmt(self, f)
    }
}
