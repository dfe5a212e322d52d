use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health, GET /api/health
/// Returns service status, version, and whether the store answers.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let db_healthy = state.store.ping().await.is_ok();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "folio-api",
        "db_healthy": db_healthy,
        "timestamp": Utc::now().to_rfc3339(),
        "uptime_secs": state.started_at.elapsed().as_secs(),
    }))
}
