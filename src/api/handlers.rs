//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};

use super::AppState;
use super::types::{DirectiveQuery, HealthResponse};
use crate::service::Operation;
use crate::wire::{CurveRecord, DirectivePayload};

/// Runs the requested operation.
///
/// `GET /directive?func=current_hour` → 200 + `{"red","green","move_profile"}`
/// `GET /directive?func=bogus` → 200 + `{"function","msg"}`
///
/// Failures are reported in the body, never as an HTTP error status.
pub async fn get_directive(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DirectiveQuery>,
) -> Json<DirectivePayload> {
    let name = query.func.unwrap_or_default();
    let result = match name.parse::<Operation>() {
        Ok(operation) => state.service.handle(operation).await,
        Err(e) => {
            tracing::warn!(func = %name, "unknown operation requested");
            Err(e)
        }
    };
    Json(DirectivePayload::from_result(&name, result))
}

/// Returns the colors every wind-speed bucket maps to.
///
/// `GET /curve` → 200 + `Vec<CurveRecord>` JSON
pub async fn get_curve(State(state): State<Arc<AppState>>) -> Json<Vec<CurveRecord>> {
    let rows = state.service.mapper().response_table();
    Json(rows.iter().map(CurveRecord::from).collect())
}

/// `GET /health` → 200 + `{"status":"ok"}`
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
