//! Construction of the dense font × code point support matrix.
//!
//! The matrix stores one byte per cell, so memory grows as
//! `fonts × distinct code points`. A corpus of tens of thousands of fonts
//! over tens of thousands of code points needs on the order of gigabytes;
//! this is the scaling ceiling of the tool.

use crate::codepoints::{CodePointSet, MAX_CODEPOINT};
use crate::error::BuildError;

/// Maps every observed code point to a contiguous column index.
///
/// Columns are assigned in ascending code point order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodePointIndex {
    codepoints: Vec<u32>,
}

impl CodePointIndex {
    /// Builds the index over the union of the given sets.
    pub fn from_sets<'a>(sets: impl IntoIterator<Item = &'a CodePointSet>) -> Self {
        let mut codepoints: Vec<u32> = sets.into_iter().flat_map(|set| set.iter()).collect();
        codepoints.sort_unstable();
        codepoints.dedup();
        Self { codepoints }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.codepoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codepoints.is_empty()
    }

    /// Returns the column for `codepoint`, if it was observed.
    pub fn column(&self, codepoint: u32) -> Option<usize> {
        self.codepoints.binary_search(&codepoint).ok()
    }

    /// Returns the code point assigned to `column`.
    pub fn codepoint(&self, column: usize) -> Option<u32> {
        self.codepoints.get(column).copied()
    }

    /// All code points in column order.
    pub fn codepoints(&self) -> &[u32] {
        &self.codepoints
    }
}

/// A dense boolean grid of `fonts × code points`.
///
/// `get(row, col)` is true iff the font of `row` supports the code point of
/// `col`. Once built the cells are never mutated; reductions produce new
/// [`ReducedMatrix`](crate::ReducedMatrix) values instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SupportMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl SupportMatrix {
    /// Creates a matrix from explicit rows.
    ///
    /// Returns `None` if the rows are not all the same length.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Option<Self> {
        let cols = rows.first().map(|row| row.as_ref().len()).unwrap_or(0);
        let mut cells = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != cols {
                return None;
            }
            cells.extend_from_slice(row);
        }
        Some(Self {
            rows: rows.len(),
            cols,
            cells,
        })
    }

    fn with_shape(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[row * self.cols + col]
    }

    /// The cells of a single row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is not less than [`row_count`](Self::row_count).
    pub fn row(&self, row: usize) -> &[bool] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// Number of supported code points for each font.
    pub fn row_densities(&self) -> Vec<usize> {
        (0..self.rows)
            .map(|row| self.row(row).iter().filter(|cell| **cell).count())
            .collect()
    }

    /// Number of fonts supporting each code point.
    pub fn column_densities(&self) -> Vec<usize> {
        let mut densities = vec![0; self.cols];
        for row in 0..self.rows {
            for (density, cell) in densities.iter_mut().zip(self.row(row)) {
                *density += *cell as usize;
            }
        }
        densities
    }
}

/// Builds the support matrix for an ordered sequence of fonts.
///
/// Row `i` of the result corresponds to `sets[i]`; columns follow the
/// returned [`CodePointIndex`]. Empty sets produce all-false rows.
pub fn build(sets: &[CodePointSet]) -> Result<(SupportMatrix, CodePointIndex), BuildError> {
    for (font, set) in sets.iter().enumerate() {
        if let Some(codepoint) = set.max().filter(|cp| *cp > MAX_CODEPOINT) {
            return Err(BuildError::InvalidInput { font, codepoint });
        }
    }
    let index = CodePointIndex::from_sets(sets);
    let mut matrix = SupportMatrix::with_shape(sets.len(), index.len());
    for (row, set) in sets.iter().enumerate() {
        let start = row * matrix.cols;
        for codepoint in set {
            // every code point of every set is in the union
            if let Some(col) = index.column(codepoint) {
                matrix.cells[start + col] = true;
            }
        }
    }
    log::debug!(
        "built coverage matrix of {} fonts x {} code points",
        matrix.rows,
        matrix.cols
    );
    Ok((matrix, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sets(raw: &[&[u32]]) -> Vec<CodePointSet> {
        raw.iter().map(|set| set.iter().copied().collect()).collect()
    }

    #[test]
    fn three_font_corpus() {
        let (matrix, index) = build(&sets(&[&[65, 66], &[65], &[]])).unwrap();
        assert_eq!(index.codepoints(), &[65, 66]);
        let expected =
            SupportMatrix::from_rows(&[[true, true], [true, false], [false, false]]).unwrap();
        assert_eq!(matrix, expected);
    }

    #[test]
    fn columns_are_unique_union() {
        let input = sets(&[&[0x61, 0x20, 0x4E00], &[0x20, 0x1F600], &[0x61]]);
        let (matrix, index) = build(&input).unwrap();
        assert_eq!(index.codepoints(), &[0x20, 0x61, 0x4E00, 0x1F600]);
        assert_eq!(matrix.column_count(), index.len());
        for (row, set) in input.iter().enumerate() {
            for col in 0..index.len() {
                let cp = index.codepoint(col).unwrap();
                assert_eq!(matrix.get(row, col), set.contains(cp));
            }
        }
    }

    #[test]
    fn densities() {
        let (matrix, _) = build(&sets(&[&[1, 2, 3], &[2], &[2, 3]])).unwrap();
        assert_eq!(matrix.row_densities(), vec![3, 1, 2]);
        assert_eq!(matrix.column_densities(), vec![1, 3, 2]);
    }

    #[test]
    fn empty_corpus() {
        let (matrix, index) = build(&[]).unwrap();
        assert!(index.is_empty());
        assert_eq!(matrix.row_count(), 0);
        assert_eq!(matrix.column_count(), 0);
    }

    #[test]
    fn only_empty_fonts() {
        let (matrix, index) = build(&sets(&[&[], &[]])).unwrap();
        assert!(index.is_empty());
        assert_eq!(matrix.row_count(), 2);
        assert_eq!(matrix.column_count(), 0);
        assert_eq!(matrix.row_densities(), vec![0, 0]);
    }

    #[test]
    fn out_of_range_codepoint() {
        let err = build(&sets(&[&[0x41], &[0x41, 0x110000]])).unwrap_err();
        assert_eq!(
            err,
            BuildError::InvalidInput {
                font: 1,
                codepoint: 0x110000
            }
        );
    }

    #[test]
    #[should_panic]
    fn row_out_of_range() {
        let (matrix, _) = build(&sets(&[&[1, 2], &[2]])).unwrap();
        assert!(!matrix.get(2, 0));
        matrix.row(2);
    }

    #[test]
    fn ragged_rows_rejected() {
        assert!(SupportMatrix::from_rows(&[vec![true], vec![true, false]]).is_none());
    }
}
