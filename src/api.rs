use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

use crate::display::{ExportFormat, FormatError};
use crate::models::Snapshot;
use crate::sinks::{DashboardSink, DashboardView};

#[derive(Clone)]
pub struct AppState {
    pub snapshots: watch::Receiver<Option<Arc<Snapshot>>>,
    pub dashboard: DashboardSink,
    pub refresh_tx: mpsc::Sender<()>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub status: String,
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/dashboard", get(get_dashboard))
        .route("/snapshot", get(get_snapshot))
        .route("/summary", get(get_summary))
        .route("/report", get(get_report))
        .route("/refresh", post(refresh))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[instrument(skip(state))]
async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    let view = state.dashboard.view();
    debug!("Dashboard requested, status {:?}", view.status);
    Json(view)
}

#[instrument(skip(state))]
async fn get_snapshot(State(state): State<AppState>) -> Result<Json<Snapshot>, StatusCode> {
    let snapshot = state.snapshots.borrow().clone().ok_or_else(|| {
        warn!("Snapshot requested before first successful cycle");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    info!("Serving snapshot for {}", snapshot.time_tag);
    Ok(Json(snapshot.as_ref().clone()))
}

fn export(state: &AppState, format: ExportFormat) -> (StatusCode, String) {
    let snapshot = state.snapshots.borrow().clone();
    match format.render(snapshot.as_deref()) {
        Ok(text) => (StatusCode::OK, text),
        Err(e @ FormatError::NoData) => {
            warn!("{:?} export requested before first successful cycle", format);
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    }
}

#[instrument(skip(state))]
async fn get_summary(State(state): State<AppState>) -> impl IntoResponse {
    export(&state, ExportFormat::Summary)
}

#[instrument(skip(state))]
async fn get_report(State(state): State<AppState>) -> impl IntoResponse {
    export(&state, ExportFormat::Detailed)
}

#[instrument(skip(state))]
async fn refresh(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<RefreshResponse>), StatusCode> {
    match state.refresh_tx.try_send(()) {
        Ok(()) => info!("Manual refresh queued"),
        Err(mpsc::error::TrySendError::Full(())) => debug!("Refresh already pending"),
        Err(mpsc::error::TrySendError::Closed(())) => {
            warn!("Refresh requested but scheduler is not running");
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            status: "refresh queued".to_string(),
        }),
    ))
}
