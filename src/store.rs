//! Sample store accessor
//!
//! Read-only query boundary between the analysis core and whatever holds the
//! samples. Backends return rows for one user inside a closed time range,
//! ordered by timestamp ascending; the core never writes and never mutates
//! what it is handed.
//!
//! [`MemoryStore`] is the reference backend used by tests and the CLI.

use crate::error::StoreError;
use crate::types::{ActivitySample, DrinkingSample, TimeRange};

/// Read-only query interface over the two sample streams
pub trait SampleStore {
    /// Activity rows (steps + pulse) for `user_id` within `range`,
    /// ascending by timestamp
    fn activity(&self, user_id: u32, range: TimeRange) -> Result<Vec<ActivitySample>, StoreError>;

    /// Drinking rows (alcohol) for `user_id` within `range`,
    /// ascending by timestamp
    fn drinking(&self, user_id: u32, range: TimeRange) -> Result<Vec<DrinkingSample>, StoreError>;
}

/// In-memory sample store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    activity: Vec<ActivitySample>,
    drinking: Vec<DrinkingSample>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_activity(&mut self, sample: ActivitySample) {
        self.activity.push(sample);
    }

    pub fn push_drinking(&mut self, sample: DrinkingSample) {
        self.drinking.push(sample);
    }

    pub fn extend_activity<I: IntoIterator<Item = ActivitySample>>(&mut self, samples: I) {
        self.activity.extend(samples);
    }

    pub fn extend_drinking<I: IntoIterator<Item = DrinkingSample>>(&mut self, samples: I) {
        self.drinking.extend(samples);
    }

    pub fn len(&self) -> (usize, usize) {
        (self.activity.len(), self.drinking.len())
    }

    pub fn is_empty(&self) -> bool {
        self.activity.is_empty() && self.drinking.is_empty()
    }
}

impl SampleStore for MemoryStore {
    fn activity(&self, user_id: u32, range: TimeRange) -> Result<Vec<ActivitySample>, StoreError> {
        let mut rows: Vec<ActivitySample> = self
            .activity
            .iter()
            .filter(|s| s.user_id == user_id && range.contains(s.timestamp))
            .copied()
            .collect();
        rows.sort_by_key(|s| s.timestamp);
        Ok(rows)
    }

    fn drinking(&self, user_id: u32, range: TimeRange) -> Result<Vec<DrinkingSample>, StoreError> {
        let mut rows: Vec<DrinkingSample> = self
            .drinking
            .iter()
            .filter(|s| s.user_id == user_id && range.contains(s.timestamp))
            .copied()
            .collect();
        rows.sort_by_key(|s| s.timestamp);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn make_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        for (day, hour, steps) in [(12, 9, 30), (10, 8, 10), (11, 20, 20)] {
            store.push_activity(ActivitySample {
                user_id: 1,
                timestamp: Utc.with_ymd_and_hms(2018, 10, day, hour, 0, 0).unwrap(),
                steps,
                pulse: 70.0,
            });
        }
        store.push_activity(ActivitySample {
            user_id: 2,
            timestamp: Utc.with_ymd_and_hms(2018, 10, 11, 12, 0, 0).unwrap(),
            steps: 99,
            pulse: 99.0,
        });
        store.push_drinking(DrinkingSample {
            user_id: 1,
            timestamp: Utc.with_ymd_and_hms(2018, 10, 11, 22, 0, 0).unwrap(),
            alcohol: 0.4,
        });
        store
    }

    #[test]
    fn test_activity_filters_by_user_and_sorts_ascending() {
        let store = make_store();
        let rows = store.activity(1, TimeRange::unbounded()).unwrap();
        let steps: Vec<u32> = rows.iter().map(|s| s.steps).collect();
        assert_eq!(steps, vec![10, 20, 30]);
        assert!(rows.iter().all(|s| s.user_id == 1));
    }

    #[test]
    fn test_range_endpoints_are_inclusive() {
        let store = make_store();
        let range = TimeRange::new(
            Utc.with_ymd_and_hms(2018, 10, 10, 8, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2018, 10, 11, 20, 0, 0).unwrap(),
        );
        let rows = store.activity(1, range).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_unknown_user_yields_empty() {
        let store = make_store();
        assert!(store.activity(7, TimeRange::unbounded()).unwrap().is_empty());
        assert!(store.drinking(7, TimeRange::unbounded()).unwrap().is_empty());
    }
}
