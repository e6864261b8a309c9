//! "Now"-anchored daily and monthly histograms
//!
//! Both builders produce fixed-length arrays with a phase-shifted circular
//! index, so the most recent bucket always sits at a predictable offset and
//! missing buckets stay `None` without reshaping the output:
//! - daily: 24 hourly buckets over the rolling day ending "now"
//! - monthly: 31 daily buckets over the rolling month ending "now"
//!
//! The offset functions are deliberately standalone; they are the easiest
//! part of the pipeline to get off-by-one wrong.

use crate::grid::MeanAcc;
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Number of hourly buckets in the daily histogram
pub const DAILY_SLOTS: usize = 24;

/// Number of daily buckets in the monthly histogram
pub const MONTHLY_SLOTS: usize = 31;

/// Per-group aggregation function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    Sum,
    Mean,
}

impl Aggregate {
    /// Reduce one populated accumulator
    pub fn apply(&self, acc: &MeanAcc) -> Option<f64> {
        match self {
            Aggregate::Sum => (acc.count() > 0).then(|| acc.sum()),
            Aggregate::Mean => acc.mean(),
        }
    }
}

/// Circular bucket index for an hour of day, anchored so the hour matching
/// the window's end lands at index 0: `(sample_hour - now_hour) mod 24`
pub fn hour_offset(sample_hour: u32, now_hour: u32) -> usize {
    (sample_hour as i64 - now_hour as i64).rem_euclid(DAILY_SLOTS as i64) as usize
}

/// Circular bucket index for a calendar date, anchored to `now`: the whole
/// days in `sample_date_midnight - now`, mod 31. Today maps to 0, yesterday
/// to 30, and so on backwards around the ring.
pub fn day_offset(sample_date: NaiveDate, now: DateTime<Utc>) -> usize {
    let midnight = sample_date.and_time(NaiveTime::MIN).and_utc();
    (midnight - now).num_days().rem_euclid(MONTHLY_SLOTS as i64) as usize
}

/// One populated hourly bucket: the aggregate plus a representative
/// timestamp (the source hour at minute 30)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourSlot {
    pub value: f64,
    pub stamp: DateTime<Utc>,
}

/// One populated daily bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DaySlot {
    pub value: f64,
    pub date: NaiveDate,
}

/// Group `(timestamp, value)` rows by (calendar date, hour)
pub fn group_by_date_hour(
    samples: &[(DateTime<Utc>, f64)],
) -> std::collections::BTreeMap<(NaiveDate, u32), MeanAcc> {
    let mut groups = std::collections::BTreeMap::new();
    for &(t, v) in samples {
        groups
            .entry((t.date_naive(), t.hour()))
            .or_insert_with(MeanAcc::default)
            .push(v);
    }
    groups
}

/// Group `(timestamp, value)` rows by calendar date
pub fn group_by_date(
    samples: &[(DateTime<Utc>, f64)],
) -> std::collections::BTreeMap<NaiveDate, MeanAcc> {
    let mut groups = std::collections::BTreeMap::new();
    for &(t, v) in samples {
        groups
            .entry(t.date_naive())
            .or_insert_with(MeanAcc::default)
            .push(v);
    }
    groups
}

/// Build the 24-slot hourly histogram for the rolling day ending `now`.
///
/// Samples are grouped by (date, hour), reduced with `agg`, and placed at
/// `hour_offset(hour, now.hour())`. When the window holds fewer than
/// `min_values` samples the whole result is suppressed (all slots `None`).
pub fn daily_histogram(
    samples: &[(DateTime<Utc>, f64)],
    now: DateTime<Utc>,
    agg: Aggregate,
    min_values: usize,
) -> [Option<HourSlot>; DAILY_SLOTS] {
    let mut slots: [Option<HourSlot>; DAILY_SLOTS] = [None; DAILY_SLOTS];
    if samples.len() < min_values {
        return slots;
    }

    let now_hour = now.hour();
    for ((date, hour), acc) in group_by_date_hour(samples) {
        let Some(value) = agg.apply(&acc) else {
            continue;
        };
        let stamp = date
            .and_hms_opt(hour, 30, 0)
            .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
            .and_utc();
        // Ascending iteration: on the 24h wrap collision the later date wins
        slots[hour_offset(hour, now_hour)] = Some(HourSlot { value, stamp });
    }
    slots
}

/// Build the 31-slot daily histogram for the rolling month ending `now`.
///
/// Samples are grouped by calendar date, reduced with `agg`, and placed at
/// `day_offset(date, now)`. Suppressed below `min_values`.
pub fn monthly_histogram(
    samples: &[(DateTime<Utc>, f64)],
    now: DateTime<Utc>,
    agg: Aggregate,
    min_values: usize,
) -> [Option<DaySlot>; MONTHLY_SLOTS] {
    let mut slots: [Option<DaySlot>; MONTHLY_SLOTS] = [None; MONTHLY_SLOTS];
    if samples.len() < min_values {
        return slots;
    }

    for (date, acc) in group_by_date(samples) {
        let Some(value) = agg.apply(&acc) else {
            continue;
        };
        slots[day_offset(date, now)] = Some(DaySlot { value, date });
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn ts(d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 10, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_hour_offset_wraps() {
        assert_eq!(hour_offset(14, 14), 0);
        assert_eq!(hour_offset(15, 14), 1);
        assert_eq!(hour_offset(13, 14), 23);
        assert_eq!(hour_offset(0, 14), 10);
        assert_eq!(hour_offset(23, 0), 23);
    }

    #[test]
    fn test_day_offset_anchored_to_now() {
        let now = ts(20, 14, 0);
        assert_eq!(day_offset(NaiveDate::from_ymd_opt(2018, 10, 20).unwrap(), now), 0);
        assert_eq!(day_offset(NaiveDate::from_ymd_opt(2018, 10, 19).unwrap(), now), 30);
        assert_eq!(day_offset(NaiveDate::from_ymd_opt(2018, 10, 18).unwrap(), now), 29);
        // 30 days back wraps to slot 1
        assert_eq!(day_offset(NaiveDate::from_ymd_opt(2018, 9, 20).unwrap(), now), 1);
    }

    #[test]
    fn test_daily_histogram_sums_per_hour() {
        let now = ts(20, 14, 0);
        let samples = [
            (ts(20, 13, 5), 100.0),
            (ts(20, 13, 45), 50.0),
            (ts(20, 9, 0), 30.0),
        ];
        let slots = daily_histogram(&samples, now, Aggregate::Sum, 0);
        // 13:00 is one hour before "now" -> slot 23
        let slot = slots[23].unwrap();
        assert_eq!(slot.value, 150.0);
        assert_eq!(slot.stamp, ts(20, 13, 30));
        // 09:00 -> (9 - 14) mod 24 = 19
        assert_eq!(slots[19].unwrap().value, 30.0);
        assert_eq!(slots.iter().filter(|s| s.is_some()).count(), 2);
    }

    #[test]
    fn test_daily_histogram_means_per_hour() {
        let now = ts(20, 14, 0);
        let samples = [(ts(20, 13, 5), 70.0), (ts(20, 13, 45), 90.0)];
        let slots = daily_histogram(&samples, now, Aggregate::Mean, 0);
        assert_eq!(slots[23].unwrap().value, 80.0);
    }

    #[test]
    fn test_daily_histogram_suppressed_below_gate() {
        let now = ts(20, 14, 0);
        let samples = [(ts(20, 13, 5), 100.0), (ts(20, 12, 5), 60.0)];
        let slots = daily_histogram(&samples, now, Aggregate::Sum, 3);
        assert!(slots.iter().all(|s| s.is_none()));
    }

    #[test]
    fn test_monthly_histogram_groups_by_date() {
        let now = ts(20, 14, 0);
        let samples = [
            (ts(20, 8, 0), 10.0),
            (ts(20, 18, 0), 20.0),
            (ts(19, 12, 0), 40.0),
        ];
        let slots = monthly_histogram(&samples, now, Aggregate::Sum, 0);
        assert_eq!(slots[0].unwrap().value, 30.0);
        assert_eq!(slots[0].unwrap().date, NaiveDate::from_ymd_opt(2018, 10, 20).unwrap());
        assert_eq!(slots[30].unwrap().value, 40.0);
        assert_eq!(slots.iter().filter(|s| s.is_some()).count(), 2);
    }

    #[test]
    fn test_monthly_histogram_suppressed_below_gate() {
        let now = ts(20, 14, 0);
        let samples = [(ts(20, 8, 0), 10.0)];
        let slots = monthly_histogram(&samples, now, Aggregate::Mean, 2);
        assert!(slots.iter().all(|s| s.is_none()));
    }

    #[test]
    fn test_histograms_are_idempotent() {
        let now = ts(20, 14, 0);
        let samples = [(ts(20, 13, 5), 100.0), (ts(19, 9, 0), 60.0)];
        let first = daily_histogram(&samples, now, Aggregate::Sum, 0);
        let second = daily_histogram(&samples, now, Aggregate::Sum, 0);
        assert_eq!(first, second);
    }
}
