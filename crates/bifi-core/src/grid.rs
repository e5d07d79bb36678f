//! Row-major tables of per-position readings.
//!
//! Rows are timestamps and columns are sensor positions for scan data; the
//! transposed form (positions × timestamps) is what mismatch estimation consumes.

use serde::{Deserialize, Serialize};

use crate::error::{BifiError, BifiResult};

/// Dense two-dimensional table stored row by row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

/// Irradiance in W/m², `NaN` marking a missing or excluded reading.
pub type IrradianceGrid = Grid<f64>;

/// Surface label hit by the ray at each sensor position.
pub type MaterialGrid = Grid<String>;

impl<T> Grid<T> {
    /// Wrap an existing row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, cells: Vec<T>) -> BifiResult<Self> {
        if cells.len() != rows * cols {
            return Err(BifiError::shape("grid cell count", rows * cols, cells.len()));
        }
        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Slice of one row. Panics if `row` is out of range.
    pub fn row(&self, row: usize) -> &[T] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        &mut self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.rows).map(move |r| self.row(r))
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = &T> + '_ {
        (0..self.rows).map(move |r| &self.cells[r * self.cols + col])
    }

    /// Apply `f` to every cell, keeping the shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(f).collect(),
        }
    }

    /// Fail with [`BifiError::ShapeMismatch`] unless both grids have the same shape.
    pub fn ensure_same_shape<U>(&self, other: &Grid<U>, context: &str) -> BifiResult<()> {
        if self.rows != other.rows {
            return Err(BifiError::shape(format!("{context} (rows)"), self.rows, other.rows));
        }
        if self.cols != other.cols {
            return Err(BifiError::shape(format!("{context} (columns)"), self.cols, other.cols));
        }
        Ok(())
    }
}

impl<T: Clone> Grid<T> {
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            cells: vec![value; rows * cols],
        }
    }

    /// Build from possibly ragged rows, right-padding short rows with `fill`.
    pub fn from_rows(rows: Vec<Vec<T>>, fill: T) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        let n_rows = rows.len();
        let mut cells = Vec::with_capacity(n_rows * cols);
        for mut row in rows {
            row.resize(cols, fill.clone());
            cells.extend(row);
        }
        Self {
            rows: n_rows,
            cols,
            cells,
        }
    }

    pub fn transpose(&self) -> Self {
        let mut cells = Vec::with_capacity(self.cells.len());
        for c in 0..self.cols {
            for r in 0..self.rows {
                cells.push(self.cells[r * self.cols + c].clone());
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }
}

impl Grid<f64> {
    /// Per-row mean ignoring missing cells.
    pub fn row_means(&self) -> Vec<f64> {
        self.iter_rows().map(|row| nan_mean(row.iter().copied())).collect()
    }
}

/// Mean of the non-`NaN` values; `NaN` when none remain.
///
/// Accumulates deviations from the first valid value, so a run of identical
/// values averages to exactly that value.
pub fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut valid = values.into_iter().filter(|v| !v.is_nan());
    let Some(pivot) = valid.next() else {
        return f64::NAN;
    };
    let (offset, count) = valid.fold((0.0, 1usize), |(sum, count), v| (sum + (v - pivot), count + 1));
    pivot + offset / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_pads_ragged_rows() {
        let grid = Grid::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0]], f64::NAN);
        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(grid.get(1, 0), Some(&4.0));
        assert!(grid.get(1, 2).unwrap().is_nan());
        assert_eq!(grid.get(2, 0), None);
    }

    #[test]
    fn transpose_swaps_axes() {
        let grid = Grid::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let t = grid.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.row(0), &[1, 4]);
        assert_eq!(t.row(2), &[3, 6]);
        assert_eq!(t.column(1).copied().collect::<Vec<_>>(), vec![4, 5, 6]);
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = Grid::from_vec(2, 2, vec![1.0; 3]).unwrap_err();
        assert!(matches!(err, BifiError::ShapeMismatch { expected: 4, found: 3, .. }));
    }

    #[test]
    fn row_means_skip_missing() {
        let grid = Grid::from_rows(
            vec![vec![800.0, f64::NAN, 820.0], vec![f64::NAN, f64::NAN, f64::NAN]],
            f64::NAN,
        );
        let means = grid.row_means();
        assert!((means[0] - 810.0).abs() < 1e-12);
        assert!(means[1].is_nan());
    }

    #[test]
    fn nan_mean_of_identical_values_is_exact() {
        assert_eq!(nan_mean([0.1, 0.1, 0.1]), 0.1);
        assert_eq!(nan_mean([880.0, 887.0]), 883.5);
        assert!(nan_mean([f64::NAN]).is_nan());
        assert!(nan_mean(Vec::new()).is_nan());
    }

    #[test]
    fn ensure_same_shape_reports_columns() {
        let a = Grid::filled(2, 3, 0.0);
        let b = Grid::filled(2, 2, String::new());
        let err = a.ensure_same_shape(&b, "front tags").unwrap_err();
        assert!(err.to_string().contains("front tags (columns)"));
    }

    #[test]
    fn empty_grid_has_no_rows() {
        let grid: Grid<f64> = Grid::from_rows(Vec::new(), f64::NAN);
        assert!(grid.is_empty());
        assert_eq!(grid.iter_rows().count(), 0);
        assert!(grid.row_means().is_empty());
    }
}
