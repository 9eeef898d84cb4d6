//! Machine-readable snapshots

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use super::{AppState, ClientInfo};
use crate::error::AppError;
use crate::metrics;

/// Handle `/json`: full snapshot as JSON
pub async fn json_snapshot(State(state): State<AppState>, client: ClientInfo) -> Response {
    state.log_request(&client).await;
    metrics::record_page("/json");

    let snapshot = state.sampler.snapshot(false).await;
    Json(snapshot).into_response()
}

/// Handle `/yaml`: full snapshot as YAML, served as plain text
pub async fn yaml_snapshot(
    State(state): State<AppState>,
    client: ClientInfo,
) -> Result<Response, AppError> {
    let snapshot = state.sampler.snapshot(false).await;
    let body = serde_yaml::to_string(&snapshot)?;

    state.log_request(&client).await;
    metrics::record_page("/yaml");

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response())
}
