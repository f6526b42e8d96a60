//! Liveness and readiness probes for the container platform.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub status: &'static str,
}

/// GET /health
pub async fn health() -> Json<Status> {
    Json(Status { status: "ok" })
}

/// GET /ready
pub async fn ready() -> Json<Status> {
    Json(Status { status: "ready" })
}
