//! band.sample.v1 ingestion schema
//!
//! Raw sample records as they arrive from the ingestion collaborator, one
//! JSON object per line (NDJSON). Records are tagged by `record_type`;
//! activity rows carry steps and pulse, drinking rows carry an alcohol
//! reading. A drinking record with a null/absent alcohol value means "no
//! measurable event" and is dropped while splitting a batch into typed
//! sample streams.

use crate::error::VizError;
use crate::types::{ActivitySample, DrinkingSample};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current schema version
pub const SCHEMA_VERSION: &str = "band.sample.v1";

/// Stream a raw record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Activity,
    Drinking,
}

/// One raw ingestion record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSampleRecord {
    pub record_type: RecordType,
    pub user_id: u32,
    pub timestamp: DateTime<Utc>,
    /// Step count (activity records; defaults to 0 when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    /// Pulse reading in bpm (activity records; defaults to 0.0 when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulse: Option<f64>,
    /// Alcohol reading; null means no measurable event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alcohol: Option<f64>,
}

/// Typed sample streams split out of a raw batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBatch {
    pub activity: Vec<ActivitySample>,
    pub drinking: Vec<DrinkingSample>,
}

impl SampleBatch {
    /// Split raw records into typed streams.
    ///
    /// Rejects negative pulse/alcohol readings; drops drinking records with
    /// no measurable alcohol.
    pub fn from_records(records: Vec<RawSampleRecord>) -> Result<Self, VizError> {
        let mut batch = SampleBatch::default();
        for record in records {
            match record.record_type {
                RecordType::Activity => {
                    let pulse = record.pulse.unwrap_or(0.0);
                    if pulse < 0.0 {
                        return Err(VizError::InvalidRecord(format!(
                            "negative pulse {pulse} at {}",
                            record.timestamp
                        )));
                    }
                    batch.activity.push(ActivitySample {
                        user_id: record.user_id,
                        timestamp: record.timestamp,
                        steps: record.steps.unwrap_or(0),
                        pulse,
                    });
                }
                RecordType::Drinking => {
                    let Some(alcohol) = record.alcohol else {
                        continue;
                    };
                    if alcohol < 0.0 {
                        return Err(VizError::InvalidRecord(format!(
                            "negative alcohol {alcohol} at {}",
                            record.timestamp
                        )));
                    }
                    batch.drinking.push(DrinkingSample {
                        user_id: record.user_id,
                        timestamp: record.timestamp,
                        alcohol,
                    });
                }
            }
        }
        Ok(batch)
    }

    /// Parse an NDJSON document (one record per line, blank lines skipped)
    pub fn from_ndjson(input: &str) -> Result<Self, VizError> {
        let mut records = Vec::new();
        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            records.push(serde_json::from_str::<RawSampleRecord>(line)?);
        }
        Self::from_records(records)
    }
}
