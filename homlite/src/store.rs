//! The mutable working representation used during elimination.
//!
//! A [`RowStore`] keeps one sorted [`SparseRow`] per row together with a reverse index from each
//! column to the rows whose *head* (first non-zero entry) lies in that column.
//! Pivot search therefore never scans the whole matrix.

use std::collections::BTreeSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::elimination::operations::Operation;
use crate::matrices::combinators::merge_lines;
use crate::matrices::{Alignment, Entry, Matrix};
use crate::rings::{EuclideanRing, Ring};

// ======== SparseRow ==========================================

/// Non-zero entries of a row, strictly increasing in column index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseRow<R> {
    entries: Vec<Entry<R>>,
}

impl<R: Ring> SparseRow<R> {
    pub(crate) fn from_sorted(entries: Vec<Entry<R>>) -> Self {
        Self { entries }
    }

    pub fn head(&self) -> Option<&Entry<R>> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[Entry<R>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, col: usize) -> Option<&R> {
        self.entries
            .binary_search_by_key(&col, |(j, _)| *j)
            .ok()
            .map(|pos| &self.entries[pos].1)
    }

    /// `self + scale * other`, by a single merge pass over both rows.
    pub fn added(&self, other: &Self, scale: &R) -> Self {
        Self::from_sorted(merge_lines(&self.entries, &other.entries, scale))
    }

    fn scale(&mut self, scalar: &R) {
        for (_, a) in self.entries.iter_mut() {
            *a = scalar.mul_ref(a);
        }
        // Only zero divisors can produce zeros here
        self.entries.retain(|(_, a)| !a.is_zero());
    }
}

// ======== RowStore ===========================================

#[derive(Debug, Clone)]
pub struct RowStore<R: Ring> {
    size: (usize, usize),
    rows: Vec<SparseRow<R>>,
    // heads[j] = rows whose first entry is in column j
    heads: Vec<BTreeSet<usize>>,
}

impl<R: Ring> RowStore<R> {
    fn from_rows(size: (usize, usize), rows: Vec<SparseRow<R>>) -> Self {
        let mut heads = vec![BTreeSet::new(); size.1];
        for (i, row) in rows.iter().enumerate() {
            if let Some((j, _)) = row.head() {
                heads[*j].insert(i);
            }
        }
        Self { size, rows, heads }
    }

    pub fn from_matrix(matrix: &Matrix<R>) -> Self {
        let rows = matrix
            .horizontal_table()
            .iter()
            .map(|line| SparseRow::from_sorted(line.clone()))
            .collect();
        Self::from_rows(matrix.size(), rows)
    }

    pub fn identity(n: usize) -> Self {
        let rows = (0..n)
            .map(|i| SparseRow::from_sorted(vec![(i, R::one())]))
            .collect();
        Self::from_rows((n, n), rows)
    }

    pub fn to_matrix(&self) -> Matrix<R> {
        let table = self.rows.iter().map(|row| row.entries.clone()).collect();
        Matrix::from_table(self.size, Alignment::Horizontal, table)
    }

    pub fn into_matrix(self) -> Matrix<R> {
        let table = self.rows.into_iter().map(|row| row.entries).collect();
        Matrix::from_table(self.size, Alignment::Horizontal, table)
    }

    // ====== Queries ==========================

    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    pub fn row(&self, i: usize) -> &SparseRow<R> {
        &self.rows[i]
    }

    pub fn head(&self, i: usize) -> Option<&Entry<R>> {
        self.rows[i].head()
    }

    /// Rows whose head lies in column `j`, in increasing order.
    pub fn heads_in_col(&self, j: usize) -> impl Iterator<Item = usize> + '_ {
        self.heads[j].iter().copied()
    }

    /// Non-zero entries of column `j` strictly above row `i0`.
    pub fn entries_in_col_above(&self, j: usize, i0: usize) -> Vec<(usize, R)> {
        self.rows[..i0]
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.get(j).map(|a| (i, a.clone())))
            .collect()
    }

    /// Number of non-empty rows.
    pub fn nonzero_rows(&self) -> usize {
        self.rows.iter().filter(|row| !row.is_empty()).count()
    }

    // ====== Head tracking ====================

    fn untrack(&mut self, i: usize) {
        if let Some((j, _)) = self.rows[i].head() {
            self.heads[*j].remove(&i);
        }
    }

    fn track(&mut self, i: usize) {
        if let Some((j, _)) = self.rows[i].head() {
            self.heads[*j].insert(i);
        }
    }

    // ====== Elementary operations ============

    /// `row[to] += by * row[from]`
    ///
    /// # Panics
    /// If `from` is empty or equal to `to`.
    pub fn add_row(&mut self, from: usize, to: usize, by: &R) {
        assert_ne!(from, to, "Cannot add row {from} to itself");
        assert!(!self.rows[from].is_empty(), "Attempt to add from empty row {from}");
        if by.is_zero() {
            return;
        }
        self.untrack(to);
        self.rows[to] = self.rows[to].added(&self.rows[from], by);
        self.track(to);
    }

    /// `row[at] *= by`
    ///
    /// # Panics
    /// If `by` is zero.
    pub fn multiply_row(&mut self, at: usize, by: &R) {
        assert!(!by.is_zero(), "Attempt to multiply row {at} by zero");
        self.untrack(at);
        self.rows[at].scale(by);
        self.track(at);
    }

    pub fn swap_rows(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.untrack(i);
        self.untrack(j);
        self.rows.swap(i, j);
        self.track(i);
        self.track(j);
    }

    /// Adds `by * row[from]` to every `(to, by)` in `targets`.
    ///
    /// The targets only read the pivot row, so with the `parallel` feature large batches are
    /// merged on the rayon pool and written back afterwards.
    pub fn batch_add_row(&mut self, from: usize, targets: &[(usize, R)], parallel_threshold: usize) {
        assert!(!self.rows[from].is_empty(), "Attempt to add from empty row {from}");
        debug_assert!(targets.iter().all(|(to, _)| *to != from));

        #[cfg(feature = "parallel")]
        if targets.len() >= parallel_threshold {
            let pivot = &self.rows[from];
            let rows = &self.rows;
            let updated: Vec<(usize, SparseRow<R>)> = targets
                .par_iter()
                .map(|(to, by)| (*to, rows[*to].added(pivot, by)))
                .collect();
            for (to, row) in updated {
                self.untrack(to);
                self.rows[to] = row;
                self.track(to);
            }
            return;
        }
        #[cfg(not(feature = "parallel"))]
        let _ = parallel_threshold;

        for (to, by) in targets {
            self.add_row(from, *to, by);
        }
    }

    pub fn apply(&mut self, op: &Operation<R>) {
        match op {
            Operation::Add { from, to, by } => self.add_row(*from, *to, by),
            Operation::Multiply { at, by } => self.multiply_row(*at, by),
            Operation::Swap(i, j) => self.swap_rows(*i, *j),
        }
    }

    /// Regroups all entries by column, so that row operations act on the original columns.
    pub fn transpose(&mut self) {
        let (rows, cols) = self.size;
        let table: Vec<Vec<Entry<R>>> = std::mem::take(&mut self.rows)
            .into_iter()
            .map(|row| row.entries)
            .collect();
        let transposed = crate::matrices::regroup(cols, &table)
            .into_iter()
            .map(SparseRow::from_sorted)
            .collect();
        *self = Self::from_rows((cols, rows), transposed);
    }
}

impl<R: EuclideanRing> RowStore<R> {
    /// The non-empty rows form a prefix, and each such row `i` consists of a single normalized
    /// entry at `(i, i)`.
    pub fn is_diagonal_normalized(&self) -> bool {
        let rank = self.rows.iter().take_while(|row| !row.is_empty()).count();
        self.rows[rank..].iter().all(SparseRow::is_empty)
            && self.rows[..rank]
                .iter()
                .enumerate()
                .all(|(i, row)| matches!(row.entries(), [(j, a)] if *j == i && a.is_normalized()))
    }

    /// The diagonal entries `(i, i)`, up to the first missing one.
    pub fn diagonal(&self) -> Vec<R> {
        self.rows
            .iter()
            .enumerate()
            .map_while(|(i, row)| row.get(i).cloned())
            .collect()
    }

    /// First `i` such that the diagonal entry `d_i` does not divide `d_{i+1}`.
    /// Only meaningful once [`RowStore::is_diagonal_normalized`] holds.
    pub fn first_divisibility_violation(&self) -> Option<usize> {
        let diagonal = self.diagonal();
        diagonal
            .windows(2)
            .position(|pair| !pair[0].divides(&pair[1]))
    }
}
