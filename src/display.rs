//! Turns a [`Snapshot`] into the strings an operator sees: the dashboard
//! fields, the Bz orientation tag used for coloring, and the two clipboard
//! exports.
//!
//! All numbers go through Rust's fixed-precision formatting, which rounds to
//! nearest on the exact binary value with ties to even. So 0.15 (stored as
//! 0.1499999...) renders as "0.1".

use chrono::Local;
use serde::Serialize;

use crate::models::Snapshot;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("No data available yet")]
    NoData,
}

/// Qualitative orientation of the vertical field component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BzOrientation {
    StrongSouthward,
    ModerateSouthward,
    StrongNorthward,
    Neutral,
}

impl BzOrientation {
    pub fn classify(bz: f64) -> Self {
        if bz <= -5.0 {
            BzOrientation::StrongSouthward
        } else if bz < 0.0 {
            BzOrientation::ModerateSouthward
        } else if bz >= 5.0 {
            BzOrientation::StrongNorthward
        } else {
            BzOrientation::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BzOrientation::StrongSouthward => "strong-southward",
            BzOrientation::ModerateSouthward => "moderate-southward",
            BzOrientation::StrongNorthward => "strong-northward",
            BzOrientation::Neutral => "neutral",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            BzOrientation::StrongSouthward => "red",
            BzOrientation::ModerateSouthward => "orange",
            BzOrientation::StrongNorthward => "green",
            BzOrientation::Neutral => "black",
        }
    }
}

/// Current density only: two decimals below 0.1, one decimal otherwise.
pub fn format_density(density: f64) -> String {
    if density < 0.1 {
        format!("{density:.2}")
    } else {
        format!("{density:.1}")
    }
}

fn nt(value: f64) -> String {
    format!("{value:.1} nT")
}

fn km_s(value: f64) -> String {
    format!("{value:.0} km/s")
}

fn per_cc(value: &str) -> String {
    format!("{value} p/cm³")
}

fn require_data(snapshot: Option<&Snapshot>) -> Result<&Snapshot, FormatError> {
    match snapshot {
        Some(s) if !s.time_tag.trim().is_empty() => Ok(s),
        _ => Err(FormatError::NoData),
    }
}

/// Named fields for the dashboard render sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayFields {
    pub bt_current: String,
    pub bz_current: String,
    pub bz_orientation: BzOrientation,
    pub bz_color: &'static str,
    pub speed_current: String,
    pub density_current: String,
    pub bt_avg: String,
    pub bt_min: String,
    pub bt_max: String,
    pub bt_std: String,
    pub bz_avg: String,
    pub bz_min: String,
    pub bz_max: String,
    pub bz_south_pct: String,
    pub speed_avg: String,
    pub speed_max: String,
    pub density_avg: String,
    pub density_max: String,
    pub last_updated: String,
}

impl DisplayFields {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let current = &snapshot.current;
        let stats = &snapshot.stats;
        let orientation = BzOrientation::classify(current.bz);

        Self {
            bt_current: nt(current.bt),
            bz_current: nt(current.bz),
            bz_orientation: orientation,
            bz_color: orientation.color(),
            speed_current: km_s(current.speed),
            density_current: per_cc(&format_density(current.density)),
            bt_avg: nt(stats.bt.avg),
            bt_min: nt(stats.bt.min),
            bt_max: nt(stats.bt.max),
            bt_std: nt(stats.bt.std),
            bz_avg: nt(stats.bz.avg),
            bz_min: nt(stats.bz.min),
            bz_max: nt(stats.bz.max),
            bz_south_pct: format!("{:.1}%", stats.bz_south_percent),
            speed_avg: km_s(stats.speed.avg),
            speed_max: km_s(stats.speed.max),
            density_avg: per_cc(&format!("{:.1}", stats.density.avg)),
            density_max: per_cc(&format!("{:.1}", stats.density.max)),
            last_updated: last_updated_line(snapshot),
        }
    }
}

/// Wall-clock fetch time (local zone) next to the feed's own timestamp.
pub fn last_updated_line(snapshot: &Snapshot) -> String {
    format!(
        "Last updated: {} (data timestamp: {})",
        snapshot
            .fetched_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S"),
        snapshot.time_tag
    )
}

pub fn summary_text(snapshot: Option<&Snapshot>) -> Result<String, FormatError> {
    let s = require_data(snapshot)?;
    let (current, stats) = (&s.current, &s.stats);

    Ok(format!(
        "Space Weather Summary ({time}):\n\
         - Bt: {bt:.1} nT (6h avg: {bt_avg:.1} nT)\n\
         - Bz: {bz:.1} nT ({south:.1}% southward last 6h)\n\
         - Solar Wind: {speed:.0} km/s (6h avg: {speed_avg:.0} km/s)\n\
         - Proton Density: {density} p/cm³",
        time = s.time_tag,
        bt = current.bt,
        bt_avg = stats.bt.avg,
        bz = current.bz,
        south = stats.bz_south_percent,
        speed = current.speed,
        speed_avg = stats.speed.avg,
        density = format_density(current.density),
    ))
}

pub fn detailed_report(snapshot: Option<&Snapshot>) -> Result<String, FormatError> {
    let s = require_data(snapshot)?;
    let (current, stats) = (&s.current, &s.stats);

    Ok(format!(
        "Detailed Space Weather Statistics ({time}):\n\
         \n\
         MAGNETIC FIELD:\n\
         - Bt (current): {bt:.1} nT\n\
         - Bt 6-hour: avg {bt_avg:.1} nT, range {bt_min:.1}-{bt_max:.1} nT, σ {bt_std:.1} nT\n\
         \n\
         - Bz (current): {bz:.1} nT\n\
         - Bz 6-hour: avg {bz_avg:.1} nT, range {bz_min:.1}-{bz_max:.1} nT\n\
         - Southward orientation: {south:.1}% of last 6 hours\n\
         \n\
         SOLAR WIND:\n\
         - Speed (current): {speed:.0} km/s\n\
         - Speed 6-hour: avg {speed_avg:.0} km/s, max {speed_max:.0} km/s\n\
         \n\
         - Density (current): {density} p/cm³\n\
         - Density 6-hour: avg {density_avg:.1} p/cm³, max {density_max:.1} p/cm³",
        time = s.time_tag,
        bt = current.bt,
        bt_avg = stats.bt.avg,
        bt_min = stats.bt.min,
        bt_max = stats.bt.max,
        bt_std = stats.bt.std,
        bz = current.bz,
        bz_avg = stats.bz.avg,
        bz_min = stats.bz.min,
        bz_max = stats.bz.max,
        south = stats.bz_south_percent,
        speed = current.speed,
        speed_avg = stats.speed.avg,
        speed_max = stats.speed.max,
        density = format_density(current.density),
        density_avg = stats.density.avg,
        density_max = stats.density.max,
    ))
}

/// Which clipboard export to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Summary,
    Detailed,
}

impl ExportFormat {
    pub fn render(&self, snapshot: Option<&Snapshot>) -> Result<String, FormatError> {
        match self {
            ExportFormat::Summary => summary_text(snapshot),
            ExportFormat::Detailed => detailed_report(snapshot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrentReadings, SnapshotStats};
    use crate::stats::MetricStats;
    use chrono::Utc;

    fn stats(avg: f64, min: f64, max: f64, std: f64) -> MetricStats {
        MetricStats { avg, min, max, std }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            time_tag: "2025-10-14 12:34:00.000".to_string(),
            fetched_at: Utc::now(),
            current: CurrentReadings {
                bt: 6.24,
                bz: -3.18,
                speed: 452.6,
                density: 0.07,
            },
            stats: SnapshotStats {
                bt: stats(5.55, 3.2, 8.9, 1.04),
                bz: stats(-0.42, -6.1, 4.3, 2.2),
                speed: stats(430.2, 380.0, 501.4, 30.0),
                density: stats(3.21, 0.0, 7.96, 1.5),
                bz_south_percent: 62.5,
            },
            magnetic_samples: 360,
            plasma_samples: 72,
        }
    }

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(BzOrientation::classify(-5.0), BzOrientation::StrongSouthward);
        assert_eq!(BzOrientation::classify(-12.0), BzOrientation::StrongSouthward);
        assert_eq!(BzOrientation::classify(-4.999), BzOrientation::ModerateSouthward);
        assert_eq!(BzOrientation::classify(-0.001), BzOrientation::ModerateSouthward);
        assert_eq!(BzOrientation::classify(0.0), BzOrientation::Neutral);
        assert_eq!(BzOrientation::classify(4.999), BzOrientation::Neutral);
        assert_eq!(BzOrientation::classify(5.0), BzOrientation::StrongNorthward);
    }

    #[test]
    fn test_classification_tags() {
        assert_eq!(BzOrientation::StrongSouthward.as_str(), "strong-southward");
        assert_eq!(BzOrientation::ModerateSouthward.color(), "orange");
        assert_eq!(
            serde_json::to_string(&BzOrientation::StrongNorthward).unwrap(),
            "\"strong-northward\""
        );
    }

    #[test]
    fn test_density_precision() {
        assert_eq!(format_density(0.07), "0.07");
        assert_eq!(format_density(0.0), "0.00");
        assert_eq!(format_density(0.15), "0.1");
        assert_eq!(format_density(0.1), "0.1");
        assert_eq!(format_density(4.26), "4.3");
    }

    #[test]
    fn test_summary_text() {
        let text = summary_text(Some(&snapshot())).unwrap();
        let expected = "Space Weather Summary (2025-10-14 12:34:00.000):\n\
                        - Bt: 6.2 nT (6h avg: 5.5 nT)\n\
                        - Bz: -3.2 nT (62.5% southward last 6h)\n\
                        - Solar Wind: 453 km/s (6h avg: 430 km/s)\n\
                        - Proton Density: 0.07 p/cm³";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_detailed_report_sections() {
        let text = detailed_report(Some(&snapshot())).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Detailed Space Weather Statistics (2025-10-14 12:34:00.000):");
        assert_eq!(lines[2], "MAGNETIC FIELD:");
        assert_eq!(lines[3], "- Bt (current): 6.2 nT");
        assert_eq!(lines[4], "- Bt 6-hour: avg 5.5 nT, range 3.2-8.9 nT, σ 1.0 nT");
        assert_eq!(lines[6], "- Bz (current): -3.2 nT");
        assert_eq!(lines[7], "- Bz 6-hour: avg -0.4 nT, range -6.1-4.3 nT");
        assert_eq!(lines[8], "- Southward orientation: 62.5% of last 6 hours");
        assert_eq!(lines[10], "SOLAR WIND:");
        assert_eq!(lines[11], "- Speed (current): 453 km/s");
        assert_eq!(lines[12], "- Speed 6-hour: avg 430 km/s, max 501 km/s");
        assert_eq!(lines[14], "- Density (current): 0.07 p/cm³");
        assert_eq!(lines[15], "- Density 6-hour: avg 3.2 p/cm³, max 8.0 p/cm³");
        assert_eq!(lines.len(), 16);
    }

    #[test]
    fn test_exports_refuse_without_snapshot() {
        assert_eq!(summary_text(None), Err(FormatError::NoData));
        assert_eq!(detailed_report(None), Err(FormatError::NoData));
        assert_eq!(ExportFormat::Detailed.render(None), Err(FormatError::NoData));
    }

    #[test]
    fn test_exports_refuse_blank_timestamp() {
        let mut s = snapshot();
        s.time_tag = "  ".to_string();
        assert_eq!(summary_text(Some(&s)), Err(FormatError::NoData));
    }

    #[test]
    fn test_display_fields() {
        let fields = DisplayFields::from_snapshot(&snapshot());

        assert_eq!(fields.bt_current, "6.2 nT");
        assert_eq!(fields.bz_current, "-3.2 nT");
        assert_eq!(fields.bz_orientation, BzOrientation::ModerateSouthward);
        assert_eq!(fields.bz_color, "orange");
        assert_eq!(fields.speed_current, "453 km/s");
        assert_eq!(fields.density_current, "0.07 p/cm³");
        assert_eq!(fields.bt_std, "1.0 nT");
        assert_eq!(fields.bz_south_pct, "62.5%");
        assert_eq!(fields.speed_max, "501 km/s");
        assert_eq!(fields.density_avg, "3.2 p/cm³");
        assert!(fields.last_updated.starts_with("Last updated: "));
        assert!(fields
            .last_updated
            .ends_with("(data timestamp: 2025-10-14 12:34:00.000)"));
    }
}
