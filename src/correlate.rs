//! Cross-metric correlation
//!
//! Joins the alcohol event series against the activity series by temporal
//! proximity: every alcohol event picks up the activity samples within half
//! the configured window on either side, and each event with at least one
//! match contributes one (alcohol, mean steps, mean pulse) triple. The
//! triples feed the grid binner for a 2-D scatter view and a 3-D heatmap
//! view.
//!
//! Both views share a single richness gate over the full input series,
//! independent of how many triples were actually matched.

use crate::grid::{grid1d, grid2d, DenseGrid, MeanAcc};
use crate::types::{ActivitySample, DrinkingSample};
use chrono::Duration;

/// One matched alcohol/activity association
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationPoint {
    pub alcohol: f64,
    pub mean_steps: f64,
    pub mean_pulse: f64,
}

/// Binned correlation views ready for the rendering collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationGrids {
    /// steps(alcohol): sparse (bucket center, mean steps) pairs
    pub scatter: Option<Vec<(f64, f64)>>,
    /// pulse(alcohol, steps): dense heatmap grid
    pub heatmap: Option<DenseGrid>,
}

/// Match each alcohol event against activity samples within
/// `±(time_delta / 2)`, inclusive on both edges.
pub fn match_events(
    drinks: &[DrinkingSample],
    activity: &[ActivitySample],
    time_delta: Duration,
) -> Vec<CorrelationPoint> {
    let half = time_delta / 2;
    let mut points = Vec::new();

    for drink in drinks {
        let lo = drink.timestamp - half;
        let hi = drink.timestamp + half;
        let mut steps = MeanAcc::default();
        let mut pulse = MeanAcc::default();
        for act in activity {
            if lo <= act.timestamp && act.timestamp <= hi {
                steps.push(act.steps as f64);
                pulse.push(act.pulse);
            }
        }
        if let (Some(mean_steps), Some(mean_pulse)) = (steps.mean(), pulse.mean()) {
            points.push(CorrelationPoint {
                alcohol: drink.alcohol,
                mean_steps,
                mean_pulse,
            });
        }
    }
    points
}

/// Build both correlation views.
///
/// Returns `(None, None)` when either input series holds fewer than
/// `min_values` samples, even if valid matches exist.
pub fn correlate(
    drinks: &[DrinkingSample],
    activity: &[ActivitySample],
    time_delta: Duration,
    grid_alcohol: f64,
    grid_steps: f64,
    min_values: usize,
) -> CorrelationGrids {
    if drinks.len() < min_values || activity.len() < min_values {
        return CorrelationGrids {
            scatter: None,
            heatmap: None,
        };
    }

    let points = match_events(drinks, activity, time_delta);
    let alcohol: Vec<f64> = points.iter().map(|p| p.alcohol).collect();
    let steps: Vec<f64> = points.iter().map(|p| p.mean_steps).collect();
    let pulse: Vec<f64> = points.iter().map(|p| p.mean_pulse).collect();

    CorrelationGrids {
        scatter: Some(grid1d(&alcohol, &steps, grid_alcohol)),
        heatmap: Some(grid2d(&alcohol, &steps, &pulse, grid_alcohol, grid_steps)),
    }
}
