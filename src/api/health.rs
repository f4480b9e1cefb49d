use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub store: String,
    pub checked_at: String,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (ready, store) = match state.store.ping().await {
        Ok(()) => (true, "store reachable".to_string()),
        Err(e) => (false, format!("store check failed: {e}")),
    };

    let payload = HealthResponse {
        status: if ready { "healthy" } else { "degraded" },
        service: env!("CARGO_PKG_NAME"),
        store,
        checked_at: Utc::now().to_rfc3339(),
    };
    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(payload))
}
