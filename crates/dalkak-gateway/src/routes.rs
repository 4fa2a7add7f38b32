use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use tracing::{info, warn};

use dalkak_core::types::{FlowRequest, RunResult};

use crate::error::ApiError;
use crate::middleware::Authenticated;
use crate::state::AppState;

// GET /api/health (no auth)
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// POST /api/flow/execute
//
// The body is parsed by hand so malformed JSON and missing fields answer 400.
pub async fn execute_flow(
    Authenticated(identity): Authenticated,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<RunResult>, ApiError> {
    let request: FlowRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(caller = %identity, error = %e, "Rejected flow request body");
        ApiError::invalid_json(e.to_string())
    })?;

    info!(
        caller = %identity,
        nodes = request.nodes.len(),
        edges = request.edges.len(),
        "Executing flow"
    );

    let run = state.executor.execute(&request).await.map_err(|e| {
        warn!(caller = %identity, error = %e, "Flow rejected");
        ApiError::from(e)
    })?;

    Ok(Json(run))
}
