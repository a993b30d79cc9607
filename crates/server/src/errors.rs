use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;
use vecsql::PromptError;

/// A custom error type for the server application.
///
/// Query failures are not errors at this level: they are presented as a
/// `QueryView`. This covers everything else a handler can hit.
pub enum AppError {
    /// Errors originating from `vecsql` outside the query pipeline.
    Prompt(PromptError),
}

impl From<PromptError> for AppError {
    fn from(err: PromptError) -> Self {
        AppError::Prompt(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Prompt(err) => {
                error!("PromptError: {:?}", err);
                match err {
                    PromptError::MissingAiProvider(_)
                    | PromptError::MissingEmbeddingProvider
                    | PromptError::MissingStorageProvider => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server is not configured correctly.".to_string(),
                    ),
                    PromptError::AiRequest(_)
                    | PromptError::AiDeserialization(_)
                    | PromptError::AiApi(_)
                    | PromptError::EmptyAiResponse
                    | PromptError::EmbeddingDimensionMismatch { .. } => {
                        (StatusCode::BAD_GATEWAY, err.to_string())
                    }
                    PromptError::EmptyInput
                    | PromptError::InvalidBinding(_)
                    | PromptError::UnsupportedTable(_) => {
                        (StatusCode::BAD_REQUEST, err.to_string())
                    }
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
                }
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
