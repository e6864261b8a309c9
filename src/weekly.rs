//! Weekday × time-of-day folding
//!
//! Folds arbitrary timestamps onto a fixed (weekday × time-of-day-slot) grid
//! and averages the values landing in each cell. The grid is always
//! 7 × ceil(1440 / grid_minutes) regardless of data sparsity; cells with no
//! contributing samples are `None`.

use crate::grid::MeanAcc;
use chrono::{DateTime, Datelike, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Column labels, Monday first
pub const WEEKDAY_LABELS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// Ordered slot-start times spanning one calendar day from midnight at
/// `grid_minutes` spacing.
///
/// `grid_minutes` must be in `1..=1440`; when it does not divide the day
/// evenly the final slot is shorter.
pub fn slot_starts(grid_minutes: u32) -> Vec<NaiveTime> {
    (0..1440)
        .step_by(grid_minutes as usize)
        .map(|m| NaiveTime::from_hms_opt(m / 60, m % 60, 0).unwrap_or(NaiveTime::MIN))
        .collect()
}

/// Slot index for a time of day: the position of the last slot start at or
/// before `t`. A timestamp exactly on a slot boundary belongs to the slot it
/// starts, so midnight always maps to slot 0.
fn slot_index(slots: &[NaiveTime], t: NaiveTime) -> usize {
    // slots[0] is midnight, so the partition point is at least 1
    slots.partition_point(|start| *start <= t).saturating_sub(1)
}

/// A 7-column weekday heatmap grid.
///
/// `cells[slot][weekday]` holds the mean of all values whose timestamp folds
/// into that cell; rows follow `slots` ascending, columns follow
/// [`WEEKDAY_LABELS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekGrid {
    pub slots: Vec<NaiveTime>,
    pub cells: Vec<Vec<Option<f64>>>,
}

/// Fold parallel `(timestamp, value)` sequences onto the weekday grid.
///
/// Returns `None` when fewer than `min_values` samples are available,
/// preventing sparse, misleading heatmaps from rendering.
pub fn fold_week(
    timestamps: &[DateTime<Utc>],
    values: &[f64],
    grid_minutes: u32,
    min_values: usize,
) -> Option<WeekGrid> {
    let count = timestamps.len().min(values.len());
    if count < min_values {
        return None;
    }

    let slots = slot_starts(grid_minutes);
    let mut acc = vec![vec![MeanAcc::default(); 7]; slots.len()];

    for (t, &v) in timestamps.iter().zip(values.iter()) {
        let weekday = t.weekday().num_days_from_monday() as usize;
        let slot = slot_index(&slots, t.time());
        acc[slot][weekday].push(v);
    }

    let cells = acc
        .into_iter()
        .map(|row| row.into_iter().map(|cell| cell.mean()).collect())
        .collect();

    Some(WeekGrid { slots, cells })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_slot_starts_hourly() {
        let slots = slot_starts(60);
        assert_eq!(slots.len(), 24);
        assert_eq!(slots[0], NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(slots[23], NaiveTime::from_hms_opt(23, 0, 0).unwrap());
    }

    #[test]
    fn test_slot_starts_uneven_width_rounds_up() {
        // 1440 / 50 = 28.8 -> 29 slots, the last one shorter
        assert_eq!(slot_starts(50).len(), 29);
        assert_eq!(slot_starts(45).len(), 32);
    }

    #[test]
    fn test_slot_index_boundaries() {
        let slots = slot_starts(60);
        let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        assert_eq!(slot_index(&slots, midnight), 0);
        // Exactly on a slot start belongs to that slot
        let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        assert_eq!(slot_index(&slots, eight), 8);
        let just_before = NaiveTime::from_hms_opt(7, 59, 59).unwrap();
        assert_eq!(slot_index(&slots, just_before), 7);
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        assert_eq!(slot_index(&slots, end_of_day), 23);
    }

    #[test]
    fn test_fold_week_monday_morning_cell() {
        // 2018-10-15 was a Monday
        let timestamps = [ts(2018, 10, 15, 8, 0), ts(2018, 10, 15, 8, 20)];
        let steps = [10.0, 20.0];
        let grid = fold_week(&timestamps, &steps, 60, 0).unwrap();
        assert_eq!(grid.cells.len(), 24);
        assert_eq!(grid.cells[8][0], Some(15.0));

        let populated: usize = grid
            .cells
            .iter()
            .flatten()
            .filter(|cell| cell.is_some())
            .count();
        assert_eq!(populated, 1);

        let pulse = [70.0, 80.0];
        let grid = fold_week(&timestamps, &pulse, 60, 0).unwrap();
        assert_eq!(grid.cells[8][0], Some(75.0));
    }

    #[test]
    fn test_fold_week_midnight_maps_to_slot_zero() {
        // 2018-10-21 was a Sunday
        let timestamps = [ts(2018, 10, 21, 0, 0)];
        let values = [5.0];
        let grid = fold_week(&timestamps, &values, 60, 0).unwrap();
        assert_eq!(grid.cells[0][6], Some(5.0));
    }

    #[test]
    fn test_fold_week_gates_on_sample_count() {
        let timestamps = [ts(2018, 10, 15, 8, 0)];
        let values = [10.0];
        assert!(fold_week(&timestamps, &values, 60, 2).is_none());
        assert!(fold_week(&timestamps, &values, 60, 1).is_some());
    }

    #[test]
    fn test_fold_week_grid_is_fixed_size_when_empty() {
        let grid = fold_week(&[], &[], 60, 0).unwrap();
        assert_eq!(grid.cells.len(), 24);
        assert!(grid.cells.iter().all(|row| row.len() == 7));
        assert!(grid.cells.iter().flatten().all(|cell| cell.is_none()));
    }
}
