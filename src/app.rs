use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::fetcher::SwpcFetcher;
use crate::monitor::SpaceWeatherMonitor;
use crate::scheduler;
use crate::sinks::DashboardSink;

/// Application with the spawned scheduler and server tasks
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
    pub scheduler_handle: JoinHandle<()>,
}

impl Application {
    /// Build and initialize the application
    ///
    /// Spawns:
    /// - HTTP API server (Axum)
    /// - Cycle scheduler (periodic plus manual refresh)
    pub async fn build(
        config: Config,
        fetcher: SwpcFetcher,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let dashboard = DashboardSink::new();
        let monitor = Arc::new(SpaceWeatherMonitor::new(fetcher, dashboard.clone()));

        // One pending manual refresh is enough; extra requests coalesce
        let (refresh_tx, refresh_rx) = mpsc::channel(1);

        let scheduler_handle = {
            let monitor = Arc::clone(&monitor);
            let interval = config.fetch_interval_minutes;
            tokio::spawn(async move {
                scheduler::start_cycle_scheduler(monitor, interval, refresh_rx).await;
            })
        };

        let app_state = AppState {
            snapshots: monitor.subscribe(),
            dashboard,
            refresh_tx,
        };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let server_handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await
        });

        info!("Application initialized successfully");

        Ok(Self {
            server_handle,
            scheduler_handle,
        })
    }

    /// Run until the server stops
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        self.scheduler_handle.abort();
        Ok(())
    }
}
