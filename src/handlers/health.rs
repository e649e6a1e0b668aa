use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::utils::logging::*;
use crate::AppState;

pub async fn health_check() -> Json<Value> {
    log_health_check();

    Json(json!({
        "status": "healthy",
        "service": "hubspot-integration-middleware",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Pronto quando o cache responde; sem ele nenhum endpoint OAuth funciona
pub async fn ready_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    log_health_check();

    let (cache_status, error) = match state.store.ping().await {
        Ok(()) => ("connected", None),
        Err(e) => ("disconnected", Some(e.to_string())),
    };
    let ready = error.is_none();

    let body = json!({
        "ready": ready,
        "service": "hubspot-integration-middleware",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "dependencies": {
            "cache": {
                "backend": state.store.backend_name(),
                "status": cache_status,
                "error": error
            }
        }
    });

    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(body))
}
