// ======== Slicing and block adaptors =========================

use std::ops::Range;

use itertools::Itertools;

use super::{Alignment, Entry, Matrix};
use crate::rings::Ring;

// Keeps the entries of a sorted line whose index lies in `range`, shifted to start at zero.
fn restrict_line<R: Ring>(line: &[Entry<R>], range: &Range<usize>) -> Vec<Entry<R>> {
    let start = line.partition_point(|(k, _)| *k < range.start);
    let end = line.partition_point(|(k, _)| *k < range.end);
    line[start..end]
        .iter()
        .map(|(k, a)| (k - range.start, a.clone()))
        .collect()
}

fn shift_line<R: Ring>(line: &[Entry<R>], offset: usize) -> impl Iterator<Item = Entry<R>> + '_ {
    line.iter().map(move |(k, a)| (k + offset, a.clone()))
}

impl<R: Ring> Matrix<R> {
    // ====== Slicing ==============================

    pub fn submatrix(&self, rows: Range<usize>, cols: Range<usize>) -> Self {
        assert!(
            rows.end <= self.rows() && cols.end <= self.cols(),
            "Submatrix {rows:?} x {cols:?} out of range for {:?}",
            self.size()
        );
        let size = (rows.len(), cols.len());
        let (outer, inner) = match self.alignment() {
            Alignment::Horizontal => (rows, cols),
            Alignment::Vertical => (cols, rows),
        };
        let table = self.table[outer]
            .iter()
            .map(|line| restrict_line(line, &inner))
            .collect();
        Self::from_table(size, self.alignment(), table)
    }

    pub fn select_rows(&self, rows: impl IntoIterator<Item = usize>) -> Self {
        let full = self.horizontal_table();
        let table: Vec<_> = rows.into_iter().map(|i| full[i].clone()).collect();
        Self::from_table((table.len(), self.cols()), Alignment::Horizontal, table)
    }

    pub fn select_columns(&self, cols: impl IntoIterator<Item = usize>) -> Self {
        self.transpose().select_rows(cols).transpose()
    }

    // ====== Concatenation ========================

    /// `[self | other]`
    pub fn concat(&self, other: &Self) -> Self {
        assert_eq!(self.rows(), other.rows(), "Cannot concat matrices with different rows");
        let table = self
            .vertical_table()
            .iter()
            .chain(other.vertical_table().iter())
            .cloned()
            .collect();
        Self::from_table((self.rows(), self.cols() + other.cols()), Alignment::Vertical, table)
    }

    /// `self` on top of `other`.
    pub fn stack(&self, other: &Self) -> Self {
        assert_eq!(self.cols(), other.cols(), "Cannot stack matrices with different cols");
        self.transpose().concat(&other.transpose()).transpose()
    }

    /// Block diagonal matrix `[self, 0; 0, other]`.
    pub fn direct_sum(&self, other: &Self) -> Self {
        let (r, c) = self.size();
        let left = self.horizontal_table();
        let right = other.horizontal_table();
        let table = left
            .iter()
            .cloned()
            .chain(right.iter().map(|line| shift_line(line, c).collect()))
            .collect();
        Self::from_table((r + other.rows(), c + other.cols()), Alignment::Horizontal, table)
    }

    /// Cuts the matrix into a grid of blocks; block `(k, l)` is `blocks[k][l]`.
    ///
    /// # Panics
    /// If the sizes do not add up to the matrix dimensions.
    pub fn blocks(&self, row_sizes: &[usize], col_sizes: &[usize]) -> Vec<Vec<Self>> {
        assert_eq!(row_sizes.iter().sum::<usize>(), self.rows(), "Row sizes must sum to rows");
        assert_eq!(col_sizes.iter().sum::<usize>(), self.cols(), "Col sizes must sum to cols");
        let ranges = |sizes: &[usize]| -> Vec<Range<usize>> {
            sizes
                .iter()
                .scan(0, |start, size| {
                    let range = *start..*start + size;
                    *start += size;
                    Some(range)
                })
                .collect()
        };
        let col_ranges = ranges(col_sizes);
        ranges(row_sizes)
            .into_iter()
            .map(|rows| {
                col_ranges
                    .iter()
                    .map(|cols| self.submatrix(rows.clone(), cols.clone()))
                    .collect_vec()
            })
            .collect()
    }
}
