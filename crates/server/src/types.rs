//! # API Payloads
//!
//! Request and response bodies for the HTTP API, plus the conversion from a
//! pipeline `QueryReport` into the view returned to clients.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vecsql::{ColumnValue, QueryError, QueryReport, Stage};

#[derive(Debug, Deserialize, Default)]
pub struct DebugParams {
    pub debug: Option<bool>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
    pub result: T,
}

/// How a request ended, from the client's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    Ok,
    Empty,
    Rejected,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorView {
    pub stage: Stage,
    pub message: String,
}

/// The presented outcome of one query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryView {
    pub status: QueryStatus,
    pub generated_query: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<ColumnValue>>,
    pub error: Option<ErrorView>,
}

impl QueryView {
    /// Rejections are the client's problem (422); collaborator failures are an
    /// upstream problem (502); store failures are ours (500).
    pub fn status_code(report: &QueryReport) -> StatusCode {
        match report.error() {
            None => StatusCode::OK,
            Some(QueryError::InvalidQuery { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            Some(QueryError::Embedding(_)) | Some(QueryError::Synthesis(_)) => {
                StatusCode::BAD_GATEWAY
            }
            Some(QueryError::Execution(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<&QueryReport> for QueryView {
    fn from(report: &QueryReport) -> Self {
        match &report.outcome {
            Ok(rows) => QueryView {
                status: if rows.is_empty() {
                    QueryStatus::Empty
                } else {
                    QueryStatus::Ok
                },
                generated_query: report.generated_query.clone(),
                columns: rows.columns.clone(),
                rows: rows.rows.clone(),
                error: None,
            },
            Err(err) => QueryView {
                status: match err {
                    QueryError::InvalidQuery { .. } => QueryStatus::Rejected,
                    _ => QueryStatus::Failed,
                },
                generated_query: report.generated_query.clone(),
                columns: Vec::new(),
                rows: Vec::new(),
                error: Some(ErrorView {
                    stage: err.stage(),
                    message: err.cause(),
                }),
            },
        }
    }
}

/// The request body for `POST /embeddings/backfill`.
#[derive(Debug, Deserialize)]
pub struct BackfillRequest {
    #[serde(default = "default_backfill_table")]
    pub table: String,
    #[serde(default)]
    pub only_missing: bool,
}

fn default_backfill_table() -> String {
    "products".to_string()
}
