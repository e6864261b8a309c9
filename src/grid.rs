//! Generic 1-D and 2-D bucketing primitives
//!
//! Binning assigns each raw coordinate to the bucket whose center is the
//! nearest integer multiple of the bin width, then averages the dependent
//! values that land together:
//! - `grid1d` returns a sparse mapping (populated buckets only, ascending)
//! - `grid2d` returns a dense matrix spanning the full observed index range,
//!   with unpopulated cells marked `None` so heatmap consumers can tell
//!   "no data" from "value 0"
//!
//! Rounding convention: half-away-from-zero (`f64::round`), symmetric around
//! zero. `5.0` with width `10.0` lands in bucket 1, `-5.0` in bucket -1.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Running (sum, count) accumulator for incremental averaging.
///
/// Buckets accumulate into one of these instead of retaining per-bucket
/// value lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanAcc {
    sum: f64,
    count: u64,
}

impl MeanAcc {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Arithmetic mean, or `None` for an empty accumulator
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / self.count as f64)
    }
}

/// Bucket index for a raw coordinate: `round(value / width)`
pub fn bucket_index(value: f64, width: f64) -> i64 {
    (value / width).round() as i64
}

/// Bin parallel `(x, y)` sequences into buckets of width `grid_x` and average
/// the y values per bucket.
///
/// Returns `(bucket_center, mean)` pairs sorted ascending by center; only
/// populated buckets appear, and no bucket appears twice. Empty input yields
/// an empty vec.
pub fn grid1d(x: &[f64], y: &[f64], grid_x: f64) -> Vec<(f64, f64)> {
    let mut buckets: BTreeMap<i64, MeanAcc> = BTreeMap::new();
    for (&xx, &yy) in x.iter().zip(y.iter()) {
        buckets.entry(bucket_index(xx, grid_x)).or_default().push(yy);
    }
    buckets
        .into_iter()
        .filter_map(|(index, acc)| acc.mean().map(|m| (index as f64 * grid_x, m)))
        .collect()
}

/// Dense rectangular grid of per-cell means.
///
/// `x` and `y` are contiguous bucket centers spanning exactly the observed
/// `[min_index, max_index]` on each axis; `z[row][col]` follows `y` ascending
/// by row and `x` ascending by column. Cells not backed by at least one
/// sample are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DenseGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<Vec<Option<f64>>>,
}

impl DenseGrid {
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty()
    }
}

/// Bin parallel `(x, y, z)` sequences into a dense 2-D grid of mean z values.
///
/// Cell offsets are computed relative to the minimum bucket index on both
/// axes. Empty input yields an empty grid.
pub fn grid2d(x: &[f64], y: &[f64], z: &[f64], grid_x: f64, grid_y: f64) -> DenseGrid {
    let mut buckets: BTreeMap<(i64, i64), MeanAcc> = BTreeMap::new();
    let mut x_range: Option<(i64, i64)> = None;
    let mut y_range: Option<(i64, i64)> = None;

    for ((&xx, &yy), &zz) in x.iter().zip(y.iter()).zip(z.iter()) {
        let x_int = bucket_index(xx, grid_x);
        let y_int = bucket_index(yy, grid_y);
        x_range = Some(match x_range {
            Some((lo, hi)) => (lo.min(x_int), hi.max(x_int)),
            None => (x_int, x_int),
        });
        y_range = Some(match y_range {
            Some((lo, hi)) => (lo.min(y_int), hi.max(y_int)),
            None => (y_int, y_int),
        });
        buckets.entry((x_int, y_int)).or_default().push(zz);
    }

    let (Some((x_min, x_max)), Some((y_min, y_max))) = (x_range, y_range) else {
        return DenseGrid::default();
    };

    let new_x: Vec<f64> = (x_min..=x_max).map(|i| i as f64 * grid_x).collect();
    let new_y: Vec<f64> = (y_min..=y_max).map(|i| i as f64 * grid_y).collect();
    let mut new_z = vec![vec![None; new_x.len()]; new_y.len()];

    for ((x_int, y_int), acc) in buckets {
        let col = (x_int - x_min) as usize;
        let row = (y_int - y_min) as usize;
        new_z[row][col] = acc.mean();
    }

    DenseGrid {
        x: new_x,
        y: new_y,
        z: new_z,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bucket_index_rounds_half_away_from_zero() {
        assert_eq!(bucket_index(4.0, 10.0), 0);
        assert_eq!(bucket_index(5.0, 10.0), 1);
        assert_eq!(bucket_index(6.0, 10.0), 1);
        assert_eq!(bucket_index(14.0, 10.0), 1);
        assert_eq!(bucket_index(15.0, 10.0), 2);
        // Symmetric around zero
        assert_eq!(bucket_index(-5.0, 10.0), -1);
        assert_eq!(bucket_index(-4.0, 10.0), 0);
        assert_eq!(bucket_index(-15.0, 10.0), -2);
    }

    #[test]
    fn test_mean_acc_running_average() {
        let mut acc = MeanAcc::default();
        assert_eq!(acc.mean(), None);
        acc.push(10.0);
        acc.push(20.0);
        assert_eq!(acc.count(), 2);
        assert_eq!(acc.sum(), 30.0);
        assert_eq!(acc.mean(), Some(15.0));
    }

    #[test]
    fn test_grid1d_groups_by_rounded_index() {
        // 4 -> bucket 0; 6 and 14 -> bucket 1; 16 -> bucket 2
        let x = [4.0, 6.0, 14.0, 16.0];
        let y = [1.0, 2.0, 4.0, 8.0];
        let binned = grid1d(&x, &y, 10.0);
        assert_eq!(binned, vec![(0.0, 1.0), (10.0, 3.0), (20.0, 8.0)]);
    }

    #[test]
    fn test_grid1d_no_duplicate_buckets_and_sorted() {
        let x = [21.0, 1.0, 19.0, -1.0, 22.0];
        let y = [5.0, 1.0, 3.0, 2.0, 7.0];
        let binned = grid1d(&x, &y, 10.0);
        let centers: Vec<f64> = binned.iter().map(|(c, _)| *c).collect();
        let mut sorted = centers.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        sorted.dedup();
        assert_eq!(centers, sorted);
        // 19, 21, 22 all round into bucket 2
        assert_eq!(binned, vec![(0.0, 1.5), (20.0, 5.0)]);
    }

    #[test]
    fn test_grid1d_empty_input() {
        assert!(grid1d(&[], &[], 10.0).is_empty());
    }

    #[test]
    fn test_grid2d_axes_are_contiguous() {
        // x buckets 0 and 3, y buckets 1 and 2; intermediate x buckets must
        // still appear even though nothing lands in them
        let x = [1.0, 31.0];
        let y = [5.0, 10.0];
        let z = [70.0, 90.0];
        let grid = grid2d(&x, &y, &z, 10.0, 5.0);
        assert_eq!(grid.x, vec![0.0, 10.0, 20.0, 30.0]);
        assert_eq!(grid.y, vec![5.0, 10.0]);
        assert_eq!(grid.z.len(), 2);
        assert_eq!(grid.z[0].len(), 4);
    }

    #[test]
    fn test_grid2d_unbacked_cells_are_missing() {
        let x = [1.0, 31.0];
        let y = [5.0, 10.0];
        let z = [70.0, 90.0];
        let grid = grid2d(&x, &y, &z, 10.0, 5.0);
        // Populated: (col 0, row 0) and (col 3, row 1)
        assert_eq!(grid.z[0][0], Some(70.0));
        assert_eq!(grid.z[1][3], Some(90.0));
        let populated: usize = grid
            .z
            .iter()
            .flatten()
            .filter(|cell| cell.is_some())
            .count();
        assert_eq!(populated, 2);
    }

    #[test]
    fn test_grid2d_offsets_relative_to_minimum_on_both_axes() {
        // Negative bucket indexes: offsets must still start at the minimum
        let x = [-11.0, 9.0];
        let y = [-4.0, 6.0];
        let z = [1.0, 2.0];
        let grid = grid2d(&x, &y, &z, 10.0, 5.0);
        assert_eq!(grid.x, vec![-10.0, 0.0, 10.0]);
        assert_eq!(grid.y, vec![-5.0, 0.0, 5.0]);
        assert_eq!(grid.z[0][0], Some(1.0));
        assert_eq!(grid.z[2][2], Some(2.0));
    }

    #[test]
    fn test_grid2d_averages_colliding_cells() {
        let x = [1.0, 2.0];
        let y = [5.0, 6.0];
        let z = [70.0, 80.0];
        let grid = grid2d(&x, &y, &z, 10.0, 5.0);
        assert_eq!(grid.x, vec![0.0]);
        assert_eq!(grid.y, vec![5.0]);
        assert_eq!(grid.z, vec![vec![Some(75.0)]]);
    }

    #[test]
    fn test_grid2d_empty_input() {
        let grid = grid2d(&[], &[], &[], 10.0, 5.0);
        assert!(grid.is_empty());
        assert!(grid.z.is_empty());
    }
}
