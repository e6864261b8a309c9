//! Report orchestration
//!
//! This module provides the public API for vitalgrid. The [`Analyzer`]
//! composes the binning primitives into the named report views: last-day
//! hourly series, weekly heatmaps, monthly bars, the activity scatter, and
//! the cross-metric correlation views.
//!
//! Every report draws its own query and applies its own gate; a suppressed
//! report is `None` inside the bundle, never an error, so partial results
//! are a first-class outcome.

use crate::correlate;
use crate::error::VizError;
use crate::grid::{grid1d, DenseGrid};
use crate::store::SampleStore;
use crate::types::{
    AnalyzerConfig, AxisValue, Figure, ReportBundle, ReportPayload, ReportProducer, TimeRange,
    Trace,
};
use crate::weekly::{fold_week, WeekGrid, WEEKDAY_LABELS};
use crate::window::{
    daily_histogram, monthly_histogram, Aggregate, DaySlot, HourSlot, DAILY_SLOTS, MONTHLY_SLOTS,
};
use crate::{PRODUCER_NAME, VITALGRID_VERSION};
use chrono::{DateTime, Duration, Utc};
use log::debug;
use uuid::Uuid;

/// Analysis orchestrator for one configuration.
///
/// Stateless between calls; each report run computes from a fresh read-only
/// snapshot of the store.
pub struct Analyzer {
    config: AnalyzerConfig,
    instance_id: String,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    /// Create an analyzer with the default configuration
    pub fn new() -> Self {
        Self {
            config: AnalyzerConfig::default(),
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an analyzer with a custom configuration
    pub fn with_config(config: AnalyzerConfig) -> Result<Self, VizError> {
        config.validate()?;
        Ok(Self {
            config,
            instance_id: Uuid::new_v4().to_string(),
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Compute every report view for one user.
    ///
    /// Reports that fail their gate come back as `None`; a store failure
    /// aborts the whole run.
    pub fn report_all(
        &self,
        store: &dyn SampleStore,
        user_id: u32,
        now: DateTime<Utc>,
    ) -> Result<ReportPayload, VizError> {
        let (analysis_2d, analysis_3d) = self.analysis(store, user_id)?;
        let reports = ReportBundle {
            last_steps: self.last_steps(store, user_id, now)?,
            last_pulse: self.last_pulse(store, user_id, now)?,
            last_alcohol: self.last_alcohol(store, user_id, now)?,
            steps_in_time: self.steps_in_time(store, user_id)?,
            pulse_in_time: self.pulse_in_time(store, user_id)?,
            alcohol_in_time: self.alcohol_in_time(store, user_id)?,
            monthly_steps: self.monthly_steps(store, user_id, now)?,
            monthly_pulse: self.monthly_pulse(store, user_id, now)?,
            monthly_alcohol: self.monthly_alcohol(store, user_id, now)?,
            activity: self.activity(store, user_id)?,
            analysis_2d,
            analysis_3d,
        };

        Ok(ReportPayload {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: VITALGRID_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            user_id,
            computed_at_utc: now.to_rfc3339(),
            reports,
        })
    }

    /// Compute every report view and encode the payload as pretty JSON
    pub fn report_all_json(
        &self,
        store: &dyn SampleStore,
        user_id: u32,
        now: DateTime<Utc>,
    ) -> Result<String, VizError> {
        let payload = self.report_all(store, user_id, now)?;
        serde_json::to_string_pretty(&payload).map_err(VizError::JsonError)
    }

    /// Hourly step totals over the last day
    pub fn last_steps(
        &self,
        store: &dyn SampleStore,
        user_id: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<Figure>, VizError> {
        let rows = store.activity(user_id, TimeRange::last_day(now))?;
        let samples: Vec<(DateTime<Utc>, f64)> = rows
            .iter()
            .map(|s| (s.timestamp, s.steps as f64))
            .collect();
        let slots = daily_histogram(&samples, now, Aggregate::Sum, self.config.min_daily_values);
        Ok(self.daily_figure(&slots, rows.len(), "Steps in last day", "steps"))
    }

    /// Hourly mean pulse over the last day
    pub fn last_pulse(
        &self,
        store: &dyn SampleStore,
        user_id: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<Figure>, VizError> {
        let rows = store.activity(user_id, TimeRange::last_day(now))?;
        let samples: Vec<(DateTime<Utc>, f64)> =
            rows.iter().map(|s| (s.timestamp, s.pulse)).collect();
        let slots = daily_histogram(&samples, now, Aggregate::Mean, self.config.min_daily_values);
        Ok(self.daily_figure(&slots, rows.len(), "Pulse in last day", "pulse"))
    }

    /// Hourly alcohol totals over the last day
    pub fn last_alcohol(
        &self,
        store: &dyn SampleStore,
        user_id: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<Figure>, VizError> {
        let rows = store.drinking(user_id, TimeRange::last_day(now))?;
        let samples: Vec<(DateTime<Utc>, f64)> =
            rows.iter().map(|s| (s.timestamp, s.alcohol)).collect();
        let slots = daily_histogram(&samples, now, Aggregate::Sum, self.config.min_daily_values);
        Ok(self.daily_figure(&slots, rows.len(), "Alcohol in last day", "alcohol"))
    }

    /// Weekday × time-of-day heatmap of mean steps over the full history
    pub fn steps_in_time(
        &self,
        store: &dyn SampleStore,
        user_id: u32,
    ) -> Result<Option<Figure>, VizError> {
        let rows = store.activity(user_id, TimeRange::unbounded())?;
        let timestamps: Vec<DateTime<Utc>> = rows.iter().map(|s| s.timestamp).collect();
        let values: Vec<f64> = rows.iter().map(|s| s.steps as f64).collect();
        Ok(self.week_figure(&timestamps, &values, "steps in time", "steps"))
    }

    /// Weekday × time-of-day heatmap of mean pulse over the full history
    pub fn pulse_in_time(
        &self,
        store: &dyn SampleStore,
        user_id: u32,
    ) -> Result<Option<Figure>, VizError> {
        let rows = store.activity(user_id, TimeRange::unbounded())?;
        let timestamps: Vec<DateTime<Utc>> = rows.iter().map(|s| s.timestamp).collect();
        let values: Vec<f64> = rows.iter().map(|s| s.pulse).collect();
        Ok(self.week_figure(&timestamps, &values, "pulse in time", "pulse"))
    }

    /// Weekday × time-of-day heatmap of mean alcohol over the full history
    pub fn alcohol_in_time(
        &self,
        store: &dyn SampleStore,
        user_id: u32,
    ) -> Result<Option<Figure>, VizError> {
        let rows = store.drinking(user_id, TimeRange::unbounded())?;
        let timestamps: Vec<DateTime<Utc>> = rows.iter().map(|s| s.timestamp).collect();
        let values: Vec<f64> = rows.iter().map(|s| s.alcohol).collect();
        Ok(self.week_figure(&timestamps, &values, "alcohol in time", "alcohol"))
    }

    /// Daily step totals over the last month
    pub fn monthly_steps(
        &self,
        store: &dyn SampleStore,
        user_id: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<Figure>, VizError> {
        let rows = store.activity(user_id, TimeRange::last_month(now))?;
        let samples: Vec<(DateTime<Utc>, f64)> = rows
            .iter()
            .map(|s| (s.timestamp, s.steps as f64))
            .collect();
        let slots =
            monthly_histogram(&samples, now, Aggregate::Sum, self.config.min_monthly_values);
        Ok(self.monthly_figure(&slots, rows.len(), "Steps in last month", "steps"))
    }

    /// Daily mean pulse over the last month
    pub fn monthly_pulse(
        &self,
        store: &dyn SampleStore,
        user_id: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<Figure>, VizError> {
        let rows = store.activity(user_id, TimeRange::last_month(now))?;
        let samples: Vec<(DateTime<Utc>, f64)> =
            rows.iter().map(|s| (s.timestamp, s.pulse)).collect();
        let slots =
            monthly_histogram(&samples, now, Aggregate::Mean, self.config.min_monthly_values);
        Ok(self.monthly_figure(&slots, rows.len(), "Pulse in last month", "pulse"))
    }

    /// Daily alcohol totals over the last month
    pub fn monthly_alcohol(
        &self,
        store: &dyn SampleStore,
        user_id: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<Figure>, VizError> {
        let rows = store.drinking(user_id, TimeRange::last_month(now))?;
        let samples: Vec<(DateTime<Utc>, f64)> =
            rows.iter().map(|s| (s.timestamp, s.alcohol)).collect();
        let slots =
            monthly_histogram(&samples, now, Aggregate::Sum, self.config.min_monthly_values);
        Ok(self.monthly_figure(&slots, rows.len(), "Alcohol in last month", "alcohol"))
    }

    /// Mean pulse over binned step counts, full history
    pub fn activity(
        &self,
        store: &dyn SampleStore,
        user_id: u32,
    ) -> Result<Option<Figure>, VizError> {
        let rows = store.activity(user_id, TimeRange::unbounded())?;
        if rows.len() < self.config.min_2d_values {
            debug!(
                "activity report suppressed: {} samples < {}",
                rows.len(),
                self.config.min_2d_values
            );
            return Ok(None);
        }
        let steps: Vec<f64> = rows.iter().map(|s| s.steps as f64).collect();
        let pulse: Vec<f64> = rows.iter().map(|s| s.pulse).collect();
        let binned = grid1d(&steps, &pulse, self.config.grid_steps);
        Ok(Some(scatter_figure(
            &binned,
            "pulse (steps)",
            "steps",
            "pulse",
        )))
    }

    /// Cross-metric correlation views: steps(alcohol) and
    /// pulse(alcohol, steps)
    pub fn analysis(
        &self,
        store: &dyn SampleStore,
        user_id: u32,
    ) -> Result<(Option<Figure>, Option<Figure>), VizError> {
        let drinks = store.drinking(user_id, TimeRange::unbounded())?;
        let acts = store.activity(user_id, TimeRange::unbounded())?;
        let grids = correlate::correlate(
            &drinks,
            &acts,
            Duration::minutes(self.config.time_delta_minutes),
            self.config.grid_alcohol,
            self.config.grid_steps,
            self.config.min_3d_values,
        );
        if grids.scatter.is_none() {
            debug!(
                "correlation reports suppressed: {} drinking / {} activity samples < {}",
                drinks.len(),
                acts.len(),
                self.config.min_3d_values
            );
        }

        let analysis_2d = grids
            .scatter
            .map(|binned| scatter_figure(&binned, "steps (alcohol)", "alcohol", "steps"));
        let analysis_3d = grids
            .heatmap
            .map(|grid| dense_figure(grid, "pulse (alcohol, steps)", "alcohol", "steps", "pulse"));
        Ok((analysis_2d, analysis_3d))
    }

    fn daily_figure(
        &self,
        slots: &[Option<HourSlot>; DAILY_SLOTS],
        sample_count: usize,
        title: &str,
        y_title: &str,
    ) -> Option<Figure> {
        let mut populated: Vec<&HourSlot> = slots.iter().flatten().collect();
        if populated.is_empty() {
            debug!(
                "{title} suppressed: {sample_count} samples < {}",
                self.config.min_daily_values
            );
            return None;
        }
        populated.sort_by_key(|slot| slot.stamp);
        Some(Figure {
            title: title.to_string(),
            x_title: "time".to_string(),
            y_title: y_title.to_string(),
            trace: Trace::Scatter {
                x: populated
                    .iter()
                    .map(|slot| AxisValue::Time(slot.stamp))
                    .collect(),
                y: populated.iter().map(|slot| slot.value).collect(),
            },
        })
    }

    fn monthly_figure(
        &self,
        slots: &[Option<DaySlot>; MONTHLY_SLOTS],
        sample_count: usize,
        title: &str,
        y_title: &str,
    ) -> Option<Figure> {
        let mut populated: Vec<&DaySlot> = slots.iter().flatten().collect();
        if populated.is_empty() {
            debug!(
                "{title} suppressed: {sample_count} samples < {}",
                self.config.min_monthly_values
            );
            return None;
        }
        populated.sort_by_key(|slot| slot.date);
        Some(Figure {
            title: title.to_string(),
            x_title: "date".to_string(),
            y_title: y_title.to_string(),
            trace: Trace::Bars {
                x: populated
                    .iter()
                    .map(|slot| AxisValue::Label(slot.date.to_string()))
                    .collect(),
                y: populated.iter().map(|slot| slot.value).collect(),
            },
        })
    }

    fn week_figure(
        &self,
        timestamps: &[DateTime<Utc>],
        values: &[f64],
        title: &str,
        z_title: &str,
    ) -> Option<Figure> {
        let Some(grid) = fold_week(
            timestamps,
            values,
            self.config.grid_time_minutes,
            self.config.min_2d_values,
        ) else {
            debug!(
                "{title} suppressed: {} samples < {}",
                timestamps.len(),
                self.config.min_2d_values
            );
            return None;
        };
        Some(week_grid_figure(grid, title, z_title))
    }
}

fn scatter_figure(binned: &[(f64, f64)], title: &str, x_title: &str, y_title: &str) -> Figure {
    Figure {
        title: title.to_string(),
        x_title: x_title.to_string(),
        y_title: y_title.to_string(),
        trace: Trace::Scatter {
            x: binned.iter().map(|&(x, _)| AxisValue::Number(x)).collect(),
            y: binned.iter().map(|&(_, y)| y).collect(),
        },
    }
}

fn dense_figure(
    grid: DenseGrid,
    title: &str,
    x_title: &str,
    y_title: &str,
    z_title: &str,
) -> Figure {
    Figure {
        title: title.to_string(),
        x_title: x_title.to_string(),
        y_title: y_title.to_string(),
        trace: Trace::Heatmap {
            x: grid.x.into_iter().map(AxisValue::Number).collect(),
            y: grid.y.into_iter().map(AxisValue::Number).collect(),
            z: grid.z,
            z_title: z_title.to_string(),
        },
    }
}

fn week_grid_figure(grid: WeekGrid, title: &str, z_title: &str) -> Figure {
    Figure {
        title: title.to_string(),
        x_title: "weekday".to_string(),
        y_title: "hour".to_string(),
        trace: Trace::Heatmap {
            x: WEEKDAY_LABELS
                .iter()
                .map(|label| AxisValue::Label(label.to_string()))
                .collect(),
            y: grid
                .slots
                .iter()
                .map(|slot| AxisValue::Label(slot.format("%H:%M").to_string()))
                .collect(),
            z: grid.cells,
            z_title: z_title.to_string(),
        },
    }
}
