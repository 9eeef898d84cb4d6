use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use super::AppState;

/// Handle `/health`; never touches the request log
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = if state.ledger.is_available() {
        "available"
    } else {
        "unavailable"
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "server_id": state.ledger.server_id(),
            "ledger": ledger,
        })),
    )
}
