//! Density based reduction of a support matrix for display.
//!
//! Every reduction sorts fonts and code points by how many `true` cells they
//! have, most first, so that the rendered matrix reads from the densest
//! corner outwards. Each axis is sorted on its own; this is not a joint
//! (biclustering) ordering.

use std::cmp::Reverse;
use std::fmt;

use crate::matrix::{CodePointIndex, SupportMatrix};

/// Returns the permutation of `0..densities.len()` that sorts `densities`
/// in descending order.
///
/// The sort is stable: equal densities keep their relative order.
pub fn density_order(densities: &[usize]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..densities.len()).collect();
    order.sort_by_key(|ix| Reverse(densities[*ix]));
    order
}

/// How a support matrix is reduced before rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReductionPolicy {
    /// Drop unsupported rows and columns, sort both axes, crop to the
    /// largest top-left square and sort the square again.
    SquareCrop,
    /// Keep only code points numerically at or below `max_codepoint`, then
    /// sort both axes.
    CodePointThreshold { max_codepoint: u32 },
    /// Keep the `max_columns` most supported code points, sort the fonts over
    /// them and sort the kept code points again over the kept fonts.
    RankThreshold { max_columns: usize },
    /// Keep the `k` most supported code points and sort the fonts over them.
    TopKColumns { k: usize },
}

impl fmt::Display for ReductionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReductionPolicy::SquareCrop => write!(f, "square"),
            ReductionPolicy::CodePointThreshold { max_codepoint } => {
                write!(f, "codepoint-threshold-{max_codepoint:04X}")
            }
            ReductionPolicy::RankThreshold { max_columns } => {
                write!(f, "rank-threshold-{max_columns}")
            }
            ReductionPolicy::TopKColumns { k } => write!(f, "top-{k}"),
        }
    }
}

/// A reduced and reordered support matrix, in final display order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReducedMatrix {
    font_rows: Vec<usize>,
    codepoints: Vec<u32>,
    cells: Vec<bool>,
}

impl ReducedMatrix {
    pub fn row_count(&self) -> usize {
        self.font_rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.codepoints.len()
    }

    /// True when there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.font_rows.is_empty() || self.codepoints.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.row_count()
            && col < self.column_count()
            && self.cells[row * self.column_count() + col]
    }

    /// For each output row, the row of the source matrix (the font's
    /// position in the original input).
    pub fn font_rows(&self) -> &[usize] {
        &self.font_rows
    }

    /// For each output column, its code point.
    pub fn codepoints(&self) -> &[u32] {
        &self.codepoints
    }

    /// The cells of a single output row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is not less than [`row_count`](Self::row_count).
    pub fn row(&self, row: usize) -> &[bool] {
        let cols = self.column_count();
        &self.cells[row * cols..(row + 1) * cols]
    }

    pub fn row_densities(&self) -> Vec<usize> {
        (0..self.row_count())
            .map(|row| self.row(row).iter().filter(|cell| **cell).count())
            .collect()
    }

    pub fn column_densities(&self) -> Vec<usize> {
        let mut densities = vec![0; self.column_count()];
        for row in 0..self.row_count() {
            for (density, cell) in densities.iter_mut().zip(self.row(row)) {
                *density += *cell as usize;
            }
        }
        densities
    }

    /// The `(column, row)` position of every supported cell, row by row.
    pub fn points(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.column_count();
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell)
            .map(move |(ix, _)| (ix % cols, ix / cols))
    }
}

/// A row/column selection of a support matrix.
struct View<'a> {
    matrix: &'a SupportMatrix,
    rows: Vec<usize>,
    cols: Vec<usize>,
}

impl<'a> View<'a> {
    fn new(matrix: &'a SupportMatrix) -> Self {
        Self {
            matrix,
            rows: (0..matrix.row_count()).collect(),
            cols: (0..matrix.column_count()).collect(),
        }
    }

    fn row_densities(&self) -> Vec<usize> {
        self.rows
            .iter()
            .map(|row| {
                self.cols
                    .iter()
                    .filter(|col| self.matrix.get(*row, **col))
                    .count()
            })
            .collect()
    }

    fn column_densities(&self) -> Vec<usize> {
        self.cols
            .iter()
            .map(|col| {
                self.rows
                    .iter()
                    .filter(|row| self.matrix.get(**row, *col))
                    .count()
            })
            .collect()
    }

    fn drop_empty_rows(&mut self) {
        let densities = self.row_densities();
        self.rows = retain_dense(&self.rows, &densities);
    }

    fn drop_empty_columns(&mut self) {
        let densities = self.column_densities();
        self.cols = retain_dense(&self.cols, &densities);
    }

    fn sort_rows(&mut self) {
        let order = density_order(&self.row_densities());
        self.rows = order.into_iter().map(|ix| self.rows[ix]).collect();
    }

    fn sort_columns(&mut self) {
        let order = density_order(&self.column_densities());
        self.cols = order.into_iter().map(|ix| self.cols[ix]).collect();
    }

    fn into_reduced(self, index: &CodePointIndex) -> ReducedMatrix {
        if self.rows.is_empty() || self.cols.is_empty() {
            return ReducedMatrix::default();
        }
        let mut cells = Vec::with_capacity(self.rows.len() * self.cols.len());
        for row in &self.rows {
            cells.extend(self.cols.iter().map(|col| self.matrix.get(*row, *col)));
        }
        let codepoints = self
            .cols
            .iter()
            .map(|col| index.codepoints()[*col])
            .collect();
        ReducedMatrix {
            font_rows: self.rows,
            codepoints,
            cells,
        }
    }
}

fn retain_dense(items: &[usize], densities: &[usize]) -> Vec<usize> {
    items
        .iter()
        .zip(densities)
        .filter(|(_, density)| **density > 0)
        .map(|(item, _)| *item)
        .collect()
}

/// Reduces `matrix` according to `policy`.
///
/// `index` must be the index the matrix was built with; it supplies the
/// code point of each column. Degenerate input (no rows, no columns, or no
/// supported cells) yields an empty [`ReducedMatrix`].
///
/// # Panics
///
/// Panics if `index` does not have one code point per column of `matrix`.
pub fn reduce(
    matrix: &SupportMatrix,
    index: &CodePointIndex,
    policy: ReductionPolicy,
) -> ReducedMatrix {
    assert_eq!(
        index.len(),
        matrix.column_count(),
        "index does not match the matrix columns"
    );
    let mut view = View::new(matrix);
    match policy {
        ReductionPolicy::SquareCrop => {
            view.drop_empty_rows();
            view.drop_empty_columns();
            view.sort_rows();
            view.sort_columns();
            let side = view.rows.len().min(view.cols.len());
            view.rows.truncate(side);
            view.cols.truncate(side);
            // cropping changes the densities, so order the square again
            view.sort_rows();
            view.sort_columns();
        }
        ReductionPolicy::CodePointThreshold { max_codepoint } => {
            view.cols
                .retain(|col| index.codepoints()[*col] <= max_codepoint);
            let max_columns = view.cols.len();
            view.drop_empty_rows();
            view.drop_empty_columns();
            view.sort_columns();
            view.cols.truncate(max_columns);
            view.sort_rows();
        }
        ReductionPolicy::RankThreshold { max_columns } => {
            view.drop_empty_rows();
            view.drop_empty_columns();
            view.sort_columns();
            view.cols.truncate(max_columns);
            view.drop_empty_rows();
            view.sort_rows();
            view.sort_columns();
        }
        ReductionPolicy::TopKColumns { k } => {
            view.drop_empty_columns();
            view.sort_columns();
            view.cols.truncate(k);
            view.drop_empty_rows();
            view.sort_rows();
        }
    }
    let reduced = view.into_reduced(index);
    log::debug!(
        "{policy} reduction kept {} fonts x {} code points",
        reduced.row_count(),
        reduced.column_count()
    );
    reduced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codepoints::CodePointSet;
    use crate::matrix::build;
    use pretty_assertions::assert_eq;

    fn corpus(raw: &[&[u32]]) -> (SupportMatrix, CodePointIndex) {
        let sets: Vec<CodePointSet> = raw.iter().map(|s| s.iter().copied().collect()).collect();
        build(&sets).unwrap()
    }

    fn three_fonts() -> (SupportMatrix, CodePointIndex) {
        corpus(&[&[65, 66], &[65], &[]])
    }

    fn rows(reduced: &ReducedMatrix) -> Vec<Vec<bool>> {
        (0..reduced.row_count())
            .map(|row| reduced.row(row).to_vec())
            .collect()
    }

    fn assert_monotonic(reduced: &ReducedMatrix) {
        for densities in [reduced.row_densities(), reduced.column_densities()] {
            assert!(
                densities.windows(2).all(|pair| pair[0] >= pair[1]),
                "{densities:?}"
            );
        }
    }

    #[test]
    fn stable_density_order() {
        assert_eq!(density_order(&[1, 3, 1, 3, 0, 2]), vec![1, 3, 5, 0, 2, 4]);
        assert!(density_order(&[]).is_empty());
    }

    #[test]
    fn square_crop_three_fonts() {
        let (matrix, index) = three_fonts();
        let reduced = reduce(&matrix, &index, ReductionPolicy::SquareCrop);
        assert_eq!(reduced.font_rows(), &[0, 1]);
        assert_eq!(reduced.codepoints(), &[65, 66]);
        assert_eq!(rows(&reduced), vec![vec![true, true], vec![true, false]]);
    }

    #[test]
    fn codepoint_threshold_three_fonts() {
        let (matrix, index) = three_fonts();
        let policy = ReductionPolicy::CodePointThreshold { max_codepoint: 65 };
        let reduced = reduce(&matrix, &index, policy);
        assert_eq!(reduced.font_rows(), &[0, 1]);
        assert_eq!(reduced.codepoints(), &[65]);
        assert_eq!(rows(&reduced), vec![vec![true], vec![true]]);
    }

    #[test]
    fn top_k_three_fonts() {
        let (matrix, index) = three_fonts();
        let reduced = reduce(&matrix, &index, ReductionPolicy::TopKColumns { k: 1 });
        assert_eq!(reduced.font_rows(), &[0, 1]);
        assert_eq!(reduced.codepoints(), &[65]);
        assert_eq!(rows(&reduced), vec![vec![true], vec![true]]);
    }

    #[test]
    fn threshold_by_value_differs_from_rank() {
        // 0x30 is the least supported and the lowest code point
        let (matrix, index) = corpus(&[&[0x30, 0x41, 0x42], &[0x41, 0x42], &[0x42]]);
        let by_value = reduce(
            &matrix,
            &index,
            ReductionPolicy::CodePointThreshold { max_codepoint: 0x41 },
        );
        let by_rank = reduce(
            &matrix,
            &index,
            ReductionPolicy::RankThreshold { max_columns: 2 },
        );
        assert_eq!(by_value.codepoints(), &[0x41, 0x30]);
        assert_eq!(by_value.font_rows(), &[0, 1]);
        assert_eq!(by_rank.codepoints(), &[0x42, 0x41]);
        assert_eq!(by_rank.font_rows(), &[0, 1, 2]);
        assert_monotonic(&by_value);
        assert_monotonic(&by_rank);
    }

    #[test]
    fn square_crop_keeps_densest_square() {
        let matrix = SupportMatrix::from_rows(&[
            [true, true, false, false],
            [false, false, true, true],
            [true, true, true, false],
        ])
        .unwrap();
        let index = CodePointIndex::from_sets(&[CodePointSet::from([1, 2, 3, 4])]);
        let reduced = reduce(&matrix, &index, ReductionPolicy::SquareCrop);
        // first pass: rows [2, 0, 1], cols [1, 2, 3, 4] (all density 2 except 4)
        // crop 3x3 over cols [1, 2, 3]: densities rows 3, 2, 1
        assert_eq!(reduced.font_rows(), &[2, 0, 1]);
        assert_eq!(reduced.codepoints(), &[1, 2, 3]);
        assert_monotonic(&reduced);
    }

    #[test]
    fn square_crop_second_pass_reorders() {
        let matrix = SupportMatrix::from_rows(&[
            [false, false, true, true, true],
            [true, true, true, false, false],
            [true, true, false, false, false],
        ])
        .unwrap();
        let index = CodePointIndex::from_sets(&[CodePointSet::from([1, 2, 3, 4, 5])]);
        let reduced = reduce(&matrix, &index, ReductionPolicy::SquareCrop);
        // columns by density: [1, 2, 3] (2 each), then [4, 5]; cropping to
        // three columns leaves font 0 with a single code point, so it sinks
        assert_eq!(reduced.codepoints(), &[1, 2, 3]);
        assert_eq!(reduced.font_rows(), &[1, 2, 0]);
        assert_eq!(
            rows(&reduced),
            vec![
                vec![true, true, true],
                vec![true, true, false],
                vec![false, false, true],
            ]
        );
    }

    #[test]
    fn square_crop_is_identity_on_sorted_square() {
        let raw = [
            [true, true, true],
            [true, true, false],
            [true, false, false],
        ];
        let matrix = SupportMatrix::from_rows(&raw).unwrap();
        let index = CodePointIndex::from_sets(&[CodePointSet::from([7, 8, 9])]);
        let reduced = reduce(&matrix, &index, ReductionPolicy::SquareCrop);
        assert_eq!(reduced.font_rows(), &[0, 1, 2]);
        assert_eq!(reduced.codepoints(), &[7, 8, 9]);
        assert_eq!(
            rows(&reduced),
            raw.iter().map(|row| row.to_vec()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn top_k_clamps() {
        let (matrix, index) = corpus(&[&[1, 2, 3], &[3], &[2, 3]]);
        let reduced = reduce(&matrix, &index, ReductionPolicy::TopKColumns { k: 100 });
        assert_eq!(reduced.column_count(), 3);
        assert_eq!(reduced.codepoints(), &[3, 2, 1]);
        assert_eq!(reduced.font_rows(), &[0, 2, 1]);
        assert_monotonic(&reduced);
    }

    #[test]
    fn thresholds_clamp() {
        let (matrix, index) = corpus(&[&[1, 2, 3], &[3]]);
        let by_value = reduce(
            &matrix,
            &index,
            ReductionPolicy::CodePointThreshold {
                max_codepoint: u32::MAX,
            },
        );
        let by_rank = reduce(
            &matrix,
            &index,
            ReductionPolicy::RankThreshold {
                max_columns: usize::MAX,
            },
        );
        assert_eq!(by_value.column_count(), 3);
        assert_eq!(by_rank.column_count(), 3);
    }

    #[test]
    fn degenerate_inputs_are_empty() {
        let policies = [
            ReductionPolicy::SquareCrop,
            ReductionPolicy::CodePointThreshold { max_codepoint: 0 },
            ReductionPolicy::RankThreshold { max_columns: 0 },
            ReductionPolicy::TopKColumns { k: 0 },
        ];
        let (empty, empty_index) = corpus(&[]);
        let (blank, blank_index) = corpus(&[&[], &[]]);
        let zeros = SupportMatrix::from_rows(&[[false, false], [false, false]]).unwrap();
        let zeros_index = CodePointIndex::from_sets(&[CodePointSet::from([1, 2])]);
        for policy in policies {
            assert!(reduce(&empty, &empty_index, policy).is_empty());
            assert!(reduce(&blank, &blank_index, policy).is_empty());
            let reduced = reduce(&zeros, &zeros_index, policy);
            assert!(reduced.is_empty());
            assert_eq!(reduced.points().count(), 0);
        }
        let (matrix, index) = three_fonts();
        let below = reduce(
            &matrix,
            &index,
            ReductionPolicy::CodePointThreshold { max_codepoint: 10 },
        );
        assert_eq!(below.row_count(), 0);
        assert_eq!(below.column_count(), 0);
    }

    #[test]
    fn points_in_display_order() {
        let (matrix, index) = three_fonts();
        let reduced = reduce(&matrix, &index, ReductionPolicy::SquareCrop);
        let points: Vec<_> = reduced.points().collect();
        assert_eq!(points, vec![(0, 0), (1, 0), (0, 1)]);
    }

    #[test]
    fn deterministic() {
        let raw: &[&[u32]] = &[&[5, 6, 7], &[6, 7, 8], &[5, 8], &[9], &[5, 6, 7, 8]];
        let (matrix, index) = corpus(raw);
        for policy in [
            ReductionPolicy::SquareCrop,
            ReductionPolicy::CodePointThreshold { max_codepoint: 7 },
            ReductionPolicy::RankThreshold { max_columns: 3 },
            ReductionPolicy::TopKColumns { k: 2 },
        ] {
            let first = reduce(&matrix, &index, policy);
            let second = reduce(&matrix, &index, policy);
            assert_eq!(first, second);
            assert_monotonic(&first);
        }
    }

    #[test]
    #[should_panic(expected = "index does not match the matrix columns")]
    fn index_must_match_matrix() {
        let (matrix, _) = three_fonts();
        let other = CodePointIndex::from_sets(&[CodePointSet::from([65, 66, 67])]);
        reduce(&matrix, &other, ReductionPolicy::SquareCrop);
    }

    #[test]
    #[should_panic]
    fn reduced_row_out_of_range() {
        let (matrix, index) = three_fonts();
        let reduced = reduce(&matrix, &index, ReductionPolicy::SquareCrop);
        reduced.row(reduced.row_count());
    }

    #[test]
    fn policy_names() {
        assert_eq!(ReductionPolicy::SquareCrop.to_string(), "square");
        assert_eq!(
            ReductionPolicy::CodePointThreshold {
                max_codepoint: 0xFFFF
            }
            .to_string(),
            "codepoint-threshold-FFFF"
        );
        assert_eq!(
            ReductionPolicy::RankThreshold { max_columns: 512 }.to_string(),
            "rank-threshold-512"
        );
        assert_eq!(ReductionPolicy::TopKColumns { k: 3 }.to_string(), "top-3");
    }
}
