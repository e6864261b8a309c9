//! Core types for the vitalgrid engine
//!
//! This module defines the data structures that flow through the analysis
//! pipeline: raw samples, query ranges, the configuration surface, and the
//! trace descriptions handed to a rendering collaborator.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single activity observation from a wearable band.
///
/// Samples are produced by an ingestion collaborator and are read-only to
/// the analysis core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivitySample {
    /// Owner of the observation
    pub user_id: u32,
    /// Absolute observation time (UTC)
    pub timestamp: DateTime<Utc>,
    /// Step count since the previous reading
    pub steps: u32,
    /// Pulse reading (bpm)
    pub pulse: f64,
}

/// A single alcohol-intake observation.
///
/// A reading of "no measurable event" never becomes a sample; it is dropped
/// at the ingestion boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrinkingSample {
    /// Owner of the observation
    pub user_id: u32,
    /// Absolute observation time (UTC)
    pub timestamp: DateTime<Utc>,
    /// Blood alcohol measurement (promille)
    pub alcohol: f64,
}

/// Closed time interval used to scope sample queries.
///
/// Both endpoints are inclusive, matching the windows the reports are
/// defined over (last day, last 31 days, full history).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The 24-hour window ending at `now`
    pub fn last_day(now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::days(1),
            end: now,
        }
    }

    /// The 31-day window ending at `now`
    pub fn last_month(now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::days(31),
            end: now,
        }
    }

    /// The full representable history
    pub fn unbounded() -> Self {
        Self {
            start: DateTime::<Utc>::MIN_UTC,
            end: DateTime::<Utc>::MAX_UTC,
        }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Configuration surface for the analysis engine.
///
/// All fields have defaults; deployments override the grid widths and gate
/// thresholds to match their data density.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Width of a weekday-heatmap time-of-day slot, in minutes
    pub grid_time_minutes: u32,
    /// Bin width for step-count axes
    pub grid_steps: f64,
    /// Bin width for pulse axes
    pub grid_pulse: f64,
    /// Bin width for alcohol axes
    pub grid_alcohol: f64,
    /// Full width of the correlation join window, in minutes
    pub time_delta_minutes: i64,
    /// Minimum samples in the last-day window before hourly reports render
    pub min_daily_values: usize,
    /// Minimum samples in the 31-day window before monthly reports render
    pub min_monthly_values: usize,
    /// Minimum samples before 2-D scatter/heatmap reports render
    pub min_2d_values: usize,
    /// Minimum samples in each series before correlation reports render
    pub min_3d_values: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            grid_time_minutes: 60,
            grid_steps: 10.0,
            grid_pulse: 5.0,
            grid_alcohol: 0.2,
            time_delta_minutes: 15,
            min_daily_values: 10,
            min_monthly_values: 20,
            min_2d_values: 50,
            min_3d_values: 50,
        }
    }
}

impl AnalyzerConfig {
    /// Validate widths and windows. Gate thresholds of zero are legal and
    /// simply disable the gate.
    pub fn validate(&self) -> Result<(), crate::error::VizError> {
        use crate::error::VizError;

        if self.grid_time_minutes == 0 || self.grid_time_minutes > 1440 {
            return Err(VizError::InvalidConfig(format!(
                "grid_time_minutes must be in 1..=1440, got {}",
                self.grid_time_minutes
            )));
        }
        for (name, width) in [
            ("grid_steps", self.grid_steps),
            ("grid_pulse", self.grid_pulse),
            ("grid_alcohol", self.grid_alcohol),
        ] {
            if !(width > 0.0) || !width.is_finite() {
                return Err(VizError::InvalidConfig(format!(
                    "{name} must be a positive finite width, got {width}"
                )));
            }
        }
        if self.time_delta_minutes <= 0 {
            return Err(VizError::InvalidConfig(format!(
                "time_delta_minutes must be positive, got {}",
                self.time_delta_minutes
            )));
        }
        Ok(())
    }
}

/// A single coordinate on a chart axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Time(DateTime<Utc>),
    Number(f64),
    Label(String),
}

/// Chart-ready series data for the rendering collaborator.
///
/// `null` entries in a heatmap matrix mean "no data", never zero; renderers
/// show them as gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trace {
    Scatter {
        x: Vec<AxisValue>,
        y: Vec<f64>,
    },
    Bars {
        x: Vec<AxisValue>,
        y: Vec<f64>,
    },
    Heatmap {
        x: Vec<AxisValue>,
        y: Vec<AxisValue>,
        z: Vec<Vec<Option<f64>>>,
        z_title: String,
    },
}

/// One named report view: a trace plus its chart and axis titles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub trace: Trace,
}

/// The composite result of one analysis run.
///
/// Every report is independently gated; `None` means "not enough data yet"
/// and is an expected, frequent outcome for new users.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportBundle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_steps: Option<Figure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_pulse: Option<Figure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_alcohol: Option<Figure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps_in_time: Option<Figure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse_in_time: Option<Figure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alcohol_in_time: Option<Figure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_steps: Option<Figure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_pulse: Option<Figure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_alcohol: Option<Figure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<Figure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_2d: Option<Figure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_3d: Option<Figure>,
}

/// Producer metadata embedded in every report payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Complete report payload handed to downstream consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub producer: ReportProducer,
    pub user_id: u32,
    pub computed_at_utc: String,
    pub reports: ReportBundle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_time_minutes, 60);
        assert_eq!(config.time_delta_minutes, 15);
    }

    #[test]
    fn test_config_rejects_zero_slot_width() {
        let config = AnalyzerConfig {
            grid_time_minutes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_nonpositive_bin_width() {
        let config = AnalyzerConfig {
            grid_alcohol: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalyzerConfig {
            grid_pulse: -5.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_time_range_endpoints_inclusive() {
        let end = Utc::now();
        let range = TimeRange::last_day(end);
        assert!(range.contains(range.start));
        assert!(range.contains(range.end));
        assert!(!range.contains(end + Duration::seconds(1)));
        assert!(!range.contains(range.start - Duration::seconds(1)));
    }

    #[test]
    fn test_axis_value_serializes_untagged() {
        let v = serde_json::to_value(AxisValue::Number(2.5)).unwrap();
        assert_eq!(v, serde_json::json!(2.5));
        let v = serde_json::to_value(AxisValue::Label("mon".to_string())).unwrap();
        assert_eq!(v, serde_json::json!("mon"));
    }

    #[test]
    fn test_empty_bundle_serializes_without_reports() {
        let bundle = ReportBundle::default();
        let v = serde_json::to_value(&bundle).unwrap();
        assert_eq!(v, serde_json::json!({}));
    }
}
