use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::cycle_error::CycleError;
use crate::models::{CurrentReadings, Feed, Snapshot, SnapshotStats};
use crate::stats::MetricStats;
use crate::table::{parse_table, FieldSpec, ParsedRow, RawTable};

pub const MAGNETIC_FIELDS: [FieldSpec; 3] = [
    FieldSpec::numeric("bt"),
    FieldSpec::numeric("bz_gsm"),
    FieldSpec::text("time_tag"),
];

// Non-numeric density reads as 0.0; the row is kept
pub const PLASMA_FIELDS: [FieldSpec; 2] = [
    FieldSpec::numeric("speed"),
    FieldSpec::numeric_or_zero("density"),
];

#[derive(Debug, Clone, PartialEq)]
struct MagneticSample {
    time_tag: String,
    bt: f64,
    bz: f64,
}

impl MagneticSample {
    fn from_row(row: &ParsedRow) -> Option<Self> {
        Some(Self {
            time_tag: row.text("time_tag")?.to_string(),
            bt: row.number("bt")?,
            bz: row.number("bz_gsm")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PlasmaSample {
    speed: f64,
    density: f64,
}

impl PlasmaSample {
    fn from_row(row: &ParsedRow) -> Option<Self> {
        Some(Self {
            speed: row.number("speed")?,
            density: row.number("density")?,
        })
    }
}

fn parse_feed<T>(
    feed: Feed,
    raw: &RawTable,
    specs: &[FieldSpec],
    convert: fn(&ParsedRow) -> Option<T>,
) -> Result<Vec<T>, CycleError> {
    let rows = parse_table(raw, specs).map_err(|e| CycleError::from_table(feed, e))?;
    Ok(rows.iter().filter_map(convert).collect())
}

/// Percentage of samples below zero. Zero for an empty slice.
pub fn south_percent(bz: &[f64]) -> f64 {
    if bz.is_empty() {
        return 0.0;
    }
    let southward = bz.iter().filter(|v| **v < 0.0).count();
    southward as f64 / bz.len() as f64 * 100.0
}

/// Combine one magnetic and one plasma table into a snapshot.
///
/// Both tables must parse before anything is built, so a plasma failure after
/// a good magnetic table still yields an error and no snapshot.
#[instrument(
    skip(magnetic, plasma),
    fields(magnetic_rows = magnetic.len(), plasma_rows = plasma.len())
)]
pub fn aggregate(
    magnetic: &RawTable,
    plasma: &RawTable,
    fetched_at: DateTime<Utc>,
) -> Result<Snapshot, CycleError> {
    let mag = parse_feed(Feed::Magnetic, magnetic, &MAGNETIC_FIELDS, MagneticSample::from_row)?;
    let pla = parse_feed(Feed::Plasma, plasma, &PLASMA_FIELDS, PlasmaSample::from_row)?;
    debug!("Validated {} magnetic and {} plasma samples", mag.len(), pla.len());

    // parse_table keeps at least one row, and from_row accepts every row it keeps
    let latest_mag = &mag[mag.len() - 1];
    let latest_pla = &pla[pla.len() - 1];

    let bt: Vec<f64> = mag.iter().map(|s| s.bt).collect();
    let bz: Vec<f64> = mag.iter().map(|s| s.bz).collect();
    let speed: Vec<f64> = pla.iter().map(|s| s.speed).collect();
    let density: Vec<f64> = pla.iter().map(|s| s.density).collect();

    let snapshot = Snapshot {
        time_tag: latest_mag.time_tag.clone(),
        fetched_at,
        current: CurrentReadings {
            bt: latest_mag.bt,
            bz: latest_mag.bz,
            speed: latest_pla.speed,
            density: latest_pla.density,
        },
        stats: SnapshotStats {
            bt: MetricStats::from_samples(&bt),
            bz: MetricStats::from_samples(&bz),
            speed: MetricStats::from_samples(&speed),
            density: MetricStats::from_samples(&density),
            bz_south_percent: south_percent(&bz),
        },
        magnetic_samples: mag.len(),
        plasma_samples: pla.len(),
    };

    info!(
        "Snapshot at {}: bt={:.1} bz={:.1} speed={:.0} density={:.2} south={:.1}%",
        snapshot.time_tag,
        snapshot.current.bt,
        snapshot.current.bz,
        snapshot.current.speed,
        snapshot.current.density,
        snapshot.stats.bz_south_percent
    );

    Ok(snapshot)
}
