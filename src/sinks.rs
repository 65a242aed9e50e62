use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::cycle_error::{CycleError, ErrorCategory};
use crate::display::{DisplayFields, ExportFormat, FormatError};
use crate::models::{Feed, Snapshot};

/// Where a cycle's results are shown to the operator.
pub trait RenderSink: Send + Sync {
    fn show_loading(&self);
    fn show_snapshot(&self, fields: &DisplayFields);
    fn show_error(&self, error: &CycleError);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardStatus {
    Waiting,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardError {
    pub category: ErrorCategory,
    pub feed: Feed,
    pub message: String,
}

/// What the dashboard currently shows.
///
/// On error the four current-reading fields carry the error message while the
/// statistics from the last good cycle stay visible.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub status: DashboardStatus,
    pub status_line: String,
    pub fields: Option<DisplayFields>,
    pub error: Option<DashboardError>,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            status: DashboardStatus::Waiting,
            status_line: "Waiting for first update".to_string(),
            fields: None,
            error: None,
        }
    }
}

/// Render sink backing the HTTP dashboard.
#[derive(Clone)]
pub struct DashboardSink {
    view: Arc<watch::Sender<DashboardView>>,
}

impl Default for DashboardSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardSink {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(DashboardView::default());
        Self { view: Arc::new(tx) }
    }

    pub fn view(&self) -> DashboardView {
        self.view.borrow().clone()
    }
}

impl RenderSink for DashboardSink {
    fn show_loading(&self) {
        self.view.send_modify(|view| {
            view.status = DashboardStatus::Loading;
            view.status_line = "Loading...".to_string();
        });
    }

    fn show_snapshot(&self, fields: &DisplayFields) {
        self.view.send_replace(DashboardView {
            status: DashboardStatus::Ready,
            status_line: fields.last_updated.clone(),
            fields: Some(fields.clone()),
            error: None,
        });
    }

    fn show_error(&self, error: &CycleError) {
        let message = error.user_message();
        self.view.send_modify(|view| {
            view.status = DashboardStatus::Error;
            view.status_line = error.to_string();
            if let Some(fields) = view.fields.as_mut() {
                fields.bt_current = message.clone();
                fields.bz_current = message.clone();
                fields.speed_current = message.clone();
                fields.density_current = message.clone();
            }
            view.error = Some(DashboardError {
                category: error.category(),
                feed: error.feed(),
                message: message.clone(),
            });
        });
    }
}

/// Render sink for one-shot command line runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl RenderSink for StdoutSink {
    fn show_loading(&self) {
        info!("Fetching space weather data");
    }

    fn show_snapshot(&self, f: &DisplayFields) {
        println!(
            "Bt:      {} (avg {}, min {}, max {}, σ {})",
            f.bt_current, f.bt_avg, f.bt_min, f.bt_max, f.bt_std
        );
        println!(
            "Bz:      {} [{}] (avg {}, min {}, max {}, {} southward)",
            f.bz_current,
            f.bz_orientation.as_str(),
            f.bz_avg,
            f.bz_min,
            f.bz_max,
            f.bz_south_pct
        );
        println!("Speed:   {} (avg {}, max {})", f.speed_current, f.speed_avg, f.speed_max);
        println!("Density: {} (avg {}, max {})", f.density_current, f.density_avg, f.density_max);
        println!("{}", f.last_updated);
    }

    fn show_error(&self, error: &CycleError) {
        eprintln!("{}: {}", error.user_message(), error);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Failed to access clipboard: {0}")]
    Access(String),
    #[error("Failed to copy to clipboard: {0}")]
    Write(String),
}

/// Destination for the text exports.
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The desktop clipboard.
///
/// On X11 and Wayland the process that set the text owns it, and the text is
/// gone once that process exits. A [`holding`](Self::holding) clipboard blocks
/// in `write_text` until another application (usually a clipboard manager)
/// has taken the contents over.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard {
    hold_until_taken: bool,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clipboard for short-lived processes such as the `copy` command.
    pub fn holding() -> Self {
        Self {
            hold_until_taken: true,
        }
    }

    pub fn holds_until_taken(&self) -> bool {
        self.hold_until_taken
    }
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Access(e.to_string()))?;
        set_clipboard_text(&mut clipboard, text, self.hold_until_taken)
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

#[cfg(target_os = "linux")]
fn set_clipboard_text(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    hold: bool,
) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;

    if hold {
        tracing::debug!("Holding clipboard until another application takes ownership");
        clipboard.set().wait().text(text)
    } else {
        clipboard.set_text(text)
    }
}

#[cfg(not(target_os = "linux"))]
fn set_clipboard_text(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    _hold: bool,
) -> Result<(), arboard::Error> {
    clipboard.set_text(text)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    NoData,
    Failed(String),
}

impl CopyOutcome {
    /// Feedback line for the operator.
    pub fn message(&self) -> &'static str {
        match self {
            CopyOutcome::Copied => "Copied!",
            CopyOutcome::NoData => "No data available yet",
            CopyOutcome::Failed(_) => {
                "Could not copy to clipboard. Please try again or copy manually."
            }
        }
    }
}

/// Render an export and write it to the clipboard. Never panics on a failed write.
pub fn copy_export(
    clipboard: &mut dyn ClipboardSink,
    format: ExportFormat,
    snapshot: Option<&Snapshot>,
) -> CopyOutcome {
    let text = match format.render(snapshot) {
        Ok(text) => text,
        Err(FormatError::NoData) => {
            warn!("Nothing to copy, no snapshot published yet");
            return CopyOutcome::NoData;
        }
    };

    match clipboard.write_text(&text) {
        Ok(()) => {
            info!("Copied {:?} export ({} bytes)", format, text.len());
            CopyOutcome::Copied
        }
        Err(e) => {
            warn!("{}", e);
            CopyOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch_error::FetchError;
    use crate::models::{CurrentReadings, SnapshotStats};
    use crate::stats::MetricStats;
    use crate::table::TableError;
    use chrono::Utc;

    #[derive(Default)]
    struct RecordingClipboard {
        texts: Vec<String>,
    }

    impl ClipboardSink for RecordingClipboard {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            self.texts.push(text.to_string());
            Ok(())
        }
    }

    struct BrokenClipboard;

    impl ClipboardSink for BrokenClipboard {
        fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::Access("no display".to_string()))
        }
    }

    fn snapshot() -> Snapshot {
        let stats = MetricStats::from_samples(&[1.0, 2.0]);
        Snapshot {
            time_tag: "2025-10-14 13:00:00.000".to_string(),
            fetched_at: Utc::now(),
            current: CurrentReadings {
                bt: 2.0,
                bz: -6.0,
                speed: 400.0,
                density: 1.0,
            },
            stats: SnapshotStats {
                bt: stats,
                bz: stats,
                speed: stats,
                density: stats,
                bz_south_percent: 0.0,
            },
            magnetic_samples: 2,
            plasma_samples: 2,
        }
    }

    #[test]
    fn test_copy_summary() {
        let mut clipboard = RecordingClipboard::default();
        let outcome = copy_export(&mut clipboard, ExportFormat::Summary, Some(&snapshot()));

        assert_eq!(outcome, CopyOutcome::Copied);
        assert_eq!(outcome.message(), "Copied!");
        assert_eq!(clipboard.texts.len(), 1);
        assert!(clipboard.texts[0].starts_with("Space Weather Summary (2025-10-14 13:00:00.000):"));
    }

    #[test]
    fn test_copy_without_snapshot() {
        let mut clipboard = RecordingClipboard::default();
        let outcome = copy_export(&mut clipboard, ExportFormat::Detailed, None);

        assert_eq!(outcome, CopyOutcome::NoData);
        assert!(clipboard.texts.is_empty());
    }

    #[test]
    fn test_copy_failure_is_reported() {
        let outcome = copy_export(&mut BrokenClipboard, ExportFormat::Summary, Some(&snapshot()));

        assert!(matches!(outcome, CopyOutcome::Failed(ref msg) if msg.contains("no display")));
        assert!(outcome.message().starts_with("Could not copy"));
    }

    #[test]
    fn test_cli_clipboard_holds_contents() {
        assert!(SystemClipboard::holding().holds_until_taken());
        assert!(!SystemClipboard::new().holds_until_taken());
        assert!(!SystemClipboard::default().holds_until_taken());
    }

    #[test]
    fn test_dashboard_lifecycle() {
        let sink = DashboardSink::new();
        assert_eq!(sink.view().status, DashboardStatus::Waiting);

        sink.show_loading();
        assert_eq!(sink.view().status, DashboardStatus::Loading);

        let fields = DisplayFields::from_snapshot(&snapshot());
        sink.show_snapshot(&fields);
        let view = sink.view();
        assert_eq!(view.status, DashboardStatus::Ready);
        assert_eq!(view.fields.as_ref().unwrap().bz_color, "red");
        assert!(view.status_line.starts_with("Last updated: "));
    }

    #[test]
    fn test_dashboard_error_keeps_stale_stats() {
        let sink = DashboardSink::new();
        sink.show_snapshot(&DisplayFields::from_snapshot(&snapshot()));

        sink.show_error(&CycleError::Transport {
            feed: Feed::Magnetic,
            source: FetchError::Status {
                url: "http://mag".to_string(),
                status: 500,
            },
        });

        let view = sink.view();
        assert_eq!(view.status, DashboardStatus::Error);
        let fields = view.fields.unwrap();
        assert_eq!(fields.bt_current, "Error loading data");
        assert_eq!(fields.density_current, "Error loading data");
        assert_eq!(fields.bt_avg, "1.5 nT");
        assert_eq!(view.error.unwrap().category, ErrorCategory::Transport);
    }

    #[test]
    fn test_dashboard_error_before_first_snapshot() {
        let sink = DashboardSink::new();
        sink.show_error(&CycleError::from_table(
            Feed::Plasma,
            TableError::MissingField {
                field: "speed".to_string(),
            },
        ));

        let view = sink.view();
        assert!(view.fields.is_none());
        let error = view.error.unwrap();
        assert_eq!(error.category, ErrorCategory::Schema);
        assert_eq!(error.message, "Unexpected plasma data format");
    }
}
