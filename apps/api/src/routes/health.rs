use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::config::StoreBackend;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and active backend.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let store = match state.config.store_backend {
        StoreBackend::Postgres => "postgres",
        StoreBackend::Local => "local",
    };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "postpilot-api",
        "credit_store": store
    }))
}
