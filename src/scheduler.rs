use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use crate::config::MAX_FETCH_INTERVAL_MINUTES;
use crate::fetcher::FeedSource;
use crate::monitor::{CycleOutcome, SpaceWeatherMonitor};
use crate::sinks::RenderSink;

/// Tick period for `interval_minutes`, clamped to `1..=MAX_FETCH_INTERVAL_MINUTES`.
pub fn cycle_period(interval_minutes: u64) -> Duration {
    let minutes = interval_minutes.clamp(1, MAX_FETCH_INTERVAL_MINUTES);
    Duration::from_secs(minutes * 60)
}

/// Drive the monitor on a fixed interval, plus on demand through `refresh_rx`.
///
/// The first tick fires immediately so the dashboard fills at startup.
#[instrument(skip(monitor, refresh_rx), fields(interval_minutes = %interval_minutes))]
pub async fn start_cycle_scheduler<S, R>(
    monitor: Arc<SpaceWeatherMonitor<S, R>>,
    interval_minutes: u64,
    mut refresh_rx: mpsc::Receiver<()>,
) where
    S: FeedSource + 'static,
    R: RenderSink + 'static,
{
    let mut interval = time::interval(cycle_period(interval_minutes));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Cycle scheduler started with {} minute interval", interval_minutes);

    loop {
        tokio::select! {
            _ = interval.tick() => debug!("Scheduler tick - starting cycle"),
            Some(()) = refresh_rx.recv() => debug!("Manual refresh requested"),
        }

        match monitor.run_cycle().await {
            CycleOutcome::Published(snapshot) => {
                info!(
                    "Cycle complete: {} magnetic / {} plasma samples, data timestamp {}",
                    snapshot.magnetic_samples, snapshot.plasma_samples, snapshot.time_tag
                );
            }
            CycleOutcome::Failed(e) => {
                error!("Cycle failed ({:?}): {}", e.category(), e);
            }
            CycleOutcome::Skipped => {
                warn!("Cycle skipped, previous cycle still running");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_period() {
        assert_eq!(cycle_period(10), Duration::from_secs(600));
        assert_eq!(cycle_period(0), Duration::from_secs(60));
        assert_eq!(cycle_period(MAX_FETCH_INTERVAL_MINUTES), Duration::from_secs(86_400));
    }

    #[test]
    fn test_cycle_period_huge_interval_is_clamped() {
        assert_eq!(cycle_period(u64::MAX), Duration::from_secs(86_400));
        assert_eq!(cycle_period(u64::MAX / 60 + 1), Duration::from_secs(86_400));
    }
}
