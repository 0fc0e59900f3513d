// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    export_live_session, export_simulation, get_controls, health_check, live_snapshot,
    run_simulation, start_live_session, stop_live_session, upload_dataset,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    // Only downloads are compressed; the live stream must reach the client line by line
    let downloads = Router::new()
        .route("/simulations/export", post(export_simulation))
        .route("/sessions/live/export", get(export_live_session))
        .layer(CompressionLayer::new());

    Router::new()
        .route("/healthz", get(health_check))
        .route("/controls", get(get_controls))
        .route("/simulations", post(run_simulation))
        .route("/sessions/live", post(start_live_session).get(live_snapshot))
        .route("/sessions/live/stop", post(stop_live_session))
        .route("/datasets", post(upload_dataset))
        .merge(downloads)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
