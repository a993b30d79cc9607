//! # Route Handlers
//!
//! `POST /query` runs one request through the pipeline and presents the report;
//! `POST /embeddings/backfill` runs the offline embedding job on demand.

use super::{
    errors::AppError,
    state::AppState,
    types::{ApiResponse, BackfillRequest, DebugParams, QueryView},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;
use vecsql::{ingest::backfill_embeddings, ingest::BackfillSummary, QueryRequest};

// --- Helper Functions ---

fn wrap_response<T>(
    result: T,
    debug_params: Query<DebugParams>,
    debug_info: Option<Value>,
) -> Json<ApiResponse<T>> {
    let debug = if debug_params.debug.unwrap_or(false) {
        debug_info
    } else {
        None
    };
    Json(ApiResponse { debug, result })
}

// --- Route Handlers ---

pub async fn root() -> &'static str {
    "vecsql server is running."
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// Runs a natural-language query. Every pipeline outcome, including failures,
/// is returned as a `QueryView`; the status code reflects the failing stage.
pub async fn query_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<QueryRequest>,
) -> (StatusCode, Json<ApiResponse<QueryView>>) {
    info!("Received query request: '{}'", payload.query);

    let report = app_state.pipeline.run(payload).await;
    let status = QueryView::status_code(&report);
    let debug_info = json!({
        "intent": report.intent,
        "state": report.state(),
        "top_k": report.top_k,
    });

    (
        status,
        wrap_response(QueryView::from(&report), debug_params, Some(debug_info)),
    )
}

/// Embeds the rows of one table and writes the vectors back.
pub async fn backfill_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<BackfillRequest>,
) -> Result<Json<ApiResponse<BackfillSummary>>, AppError> {
    info!(
        table = %payload.table,
        only_missing = payload.only_missing,
        "Received embedding backfill request."
    );

    let summary = backfill_embeddings(
        app_state.sqlite_provider.as_ref(),
        &app_state.document_embedder,
        &payload.table,
        payload.only_missing,
    )
    .await?;

    let debug_info = json!({ "dimension": app_state.document_embedder.dimension() });
    Ok(wrap_response(summary, debug_params, Some(debug_info)))
}
