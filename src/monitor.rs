use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, instrument, warn};

use crate::aggregator::aggregate;
use crate::cycle_error::CycleError;
use crate::display::DisplayFields;
use crate::fetcher::FeedSource;
use crate::models::{Feed, Snapshot};
use crate::sinks::RenderSink;

/// Result of one call to [`SpaceWeatherMonitor::run_cycle`].
#[derive(Debug)]
pub enum CycleOutcome {
    Published(Arc<Snapshot>),
    Failed(CycleError),
    /// Another cycle was still in flight
    Skipped,
}

/// Runs fetch → aggregate → publish cycles and owns the current snapshot.
///
/// Readers get the snapshot through [`subscribe`](Self::subscribe); it is only
/// ever replaced whole, after both feeds have parsed.
pub struct SpaceWeatherMonitor<S, R> {
    source: S,
    render: R,
    cycle_lock: Mutex<()>,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
}

impl<S: FeedSource, R: RenderSink> SpaceWeatherMonitor<S, R> {
    pub fn new(source: S, render: R) -> Self {
        let (snapshot_tx, _rx) = watch::channel(None);
        Self {
            source,
            render,
            cycle_lock: Mutex::new(()),
            snapshot_tx,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.snapshot_tx.subscribe()
    }

    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.snapshot_tx.borrow().clone()
    }

    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Ok(_guard) = self.cycle_lock.try_lock() else {
            warn!("Previous cycle still running, skipping");
            return CycleOutcome::Skipped;
        };

        self.render.show_loading();

        match self.fetch_and_aggregate().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.snapshot_tx.send_replace(Some(Arc::clone(&snapshot)));
                self.render.show_snapshot(&DisplayFields::from_snapshot(&snapshot));
                info!("Published snapshot for {}", snapshot.time_tag);
                CycleOutcome::Published(snapshot)
            }
            Err(e) => {
                error!("Cycle failed: {}", e);
                self.render.show_error(&e);
                CycleOutcome::Failed(e)
            }
        }
    }

    async fn fetch_and_aggregate(&self) -> Result<Snapshot, CycleError> {
        debug!("Fetching magnetic and plasma feeds");
        let (magnetic, plasma) = tokio::join!(
            self.source.fetch_table(Feed::Magnetic),
            self.source.fetch_table(Feed::Plasma)
        );

        let magnetic = magnetic.map_err(|source| CycleError::Transport {
            feed: Feed::Magnetic,
            source,
        })?;
        let plasma = plasma.map_err(|source| CycleError::Transport {
            feed: Feed::Plasma,
            source,
        })?;
        debug!("Fetched {} magnetic and {} plasma rows", magnetic.len(), plasma.len());

        aggregate(&magnetic, &plasma, Utc::now())
    }
}
