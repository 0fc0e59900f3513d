// HTTP request handlers
use crate::application::live_session_service::SessionSnapshot;
use crate::application::run_request::RunOverrides;
use crate::domain::dataset::DatasetReport;
use crate::domain::simulation::BatchReport;
use crate::infrastructure::config::ControlsConfig;
use crate::infrastructure::csv_codec::export_csv;
use crate::infrastructure::http_response::csv_attachment;
use crate::infrastructure::ndjson_stream::stream_from_receiver;
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

const SIMULATION_FILE_NAME: &str = "glucose_simulation.csv";
const LIVE_FILE_NAME: &str = "glucose_live_session.csv";

#[derive(Deserialize)]
pub struct DatasetQuery {
    pub target_glucose: Option<f64>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Slider ranges and defaults for clients building controls
pub async fn get_controls(State(state): State<Arc<AppState>>) -> Json<ControlsConfig> {
    Json(state.controls.clone())
}

/// Run a fixed-horizon simulation and return every sample at once
pub async fn run_simulation(
    State(state): State<Arc<AppState>>,
    Json(overrides): Json<RunOverrides>,
) -> Result<Json<BatchReport>, ApiError> {
    let request = state.defaults.resolve(&overrides)?;
    Ok(Json(state.batch_service.run(&request)?))
}

/// Same as `run_simulation`, delivered as a CSV download
pub async fn export_simulation(
    State(state): State<Arc<AppState>>,
    Json(overrides): Json<RunOverrides>,
) -> Result<Response, ApiError> {
    let request = state.defaults.resolve(&overrides)?;
    let report = state.batch_service.run(&request)?;
    let csv = export_csv(&report.series)?;

    Ok(csv_attachment(csv, SIMULATION_FILE_NAME).into_response())
}

/// Start (or restart) the live session and stream its samples as they are produced
pub async fn start_live_session(
    State(state): State<Arc<AppState>>,
    Json(overrides): Json<RunOverrides>,
) -> Result<impl IntoResponse, ApiError> {
    let request = state.defaults.resolve(&overrides)?;
    let rx = state.live_sessions.start(request).await?;
    Ok(stream_from_receiver(rx))
}

/// Request a cooperative stop of the live session
pub async fn stop_live_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stopped = state.live_sessions.stop().await;
    (StatusCode::ACCEPTED, Json(json!({ "stopped": stopped })))
}

/// Everything the live session has recorded so far
pub async fn live_snapshot(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    state
        .live_sessions
        .snapshot()
        .await
        .map(Json)
        .ok_or(ApiError::NoSession)
}

/// Download the live session's samples recorded so far
pub async fn export_live_session(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let snapshot = state
        .live_sessions
        .snapshot()
        .await
        .ok_or(ApiError::NoSession)?;
    let csv = export_csv(&snapshot.samples)?;

    Ok(csv_attachment(csv, LIVE_FILE_NAME).into_response())
}

/// Validate an uploaded CSV of glucose readings and return it ready for charting
pub async fn upload_dataset(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DatasetQuery>,
    body: Bytes,
) -> Result<Json<DatasetReport>, ApiError> {
    let report = state.dataset_service.analyze(&body, query.target_glucose)?;
    Ok(Json(report))
}
