use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::stats::MetricStats;

/// The two SWPC solar-wind products each cycle reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    Magnetic,
    Plasma,
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feed::Magnetic => write!(f, "magnetic field"),
            Feed::Plasma => write!(f, "plasma"),
        }
    }
}

/// Latest validated reading of each metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentReadings {
    pub bt: f64,
    pub bz: f64,
    pub speed: f64,
    pub density: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnapshotStats {
    pub bt: MetricStats,
    pub bz: MetricStats,
    pub speed: MetricStats,
    pub density: MetricStats,
    /// Share of bz samples below zero, in percent. Serialized to one decimal.
    #[serde(serialize_with = "one_decimal")]
    pub bz_south_percent: f64,
}

fn one_decimal<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 10.0).round() / 10.0)
}

/// One complete cycle's worth of derived space-weather state.
///
/// Built only when both feeds parse; replaced wholesale by the next cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// `time_tag` of the latest magnetic row, verbatim from the feed
    pub time_tag: String,
    pub fetched_at: DateTime<Utc>,
    pub current: CurrentReadings,
    pub stats: SnapshotStats,
    pub magnetic_samples: usize,
    pub plasma_samples: usize,
}
