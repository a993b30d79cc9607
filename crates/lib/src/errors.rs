use thiserror::Error;

/// Low-level failures raised by the collaborators (AI, embeddings) and the store.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("AI provider returned an empty response")]
    EmptyAiResponse,
    #[error("AI provider is not configured: {0}")]
    MissingAiProvider(String),
    #[error("Embedding provider is not configured")]
    MissingEmbeddingProvider,
    #[error("Storage provider is not configured")]
    MissingStorageProvider,
    #[error("Cannot embed empty text")]
    EmptyInput,
    #[error("Embedding has {actual} dimensions, expected {expected}")]
    EmbeddingDimensionMismatch { expected: usize, actual: usize },
    #[error("Storage provider connection error: {0}")]
    StorageConnection(String),
    #[error("Storage operation failed: {0}")]
    StorageOperationFailed(String),
    #[error("Table '{0}' has no embedding column")]
    UnsupportedTable(String),
    #[error("Invalid parameter binding: {0}")]
    InvalidBinding(String),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<turso::Error> for PromptError {
    fn from(err: turso::Error) -> Self {
        PromptError::StorageOperationFailed(err.to_string())
    }
}

/// The pipeline stage at which a request stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Embedding,
    Synthesis,
    Validation,
    Execution,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Embedding => "Embedding",
            Stage::Synthesis => "Query synthesis",
            Stage::Validation => "Query validation",
            Stage::Execution => "Query execution",
        };
        f.write_str(name)
    }
}

/// A typed failure for one request, tagged with the stage that produced it.
///
/// Every component converts its collaborator errors into one of these at its own
/// boundary, so nothing past the executor ever sees a raw `PromptError`.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Embedding generation failed: {0}")]
    Embedding(#[source] PromptError),
    #[error("Query synthesis failed: {0}")]
    Synthesis(#[source] PromptError),
    #[error("Generated query was rejected: {reason}")]
    InvalidQuery { query: String, reason: String },
    #[error("Query execution failed: {0}")]
    Execution(#[source] PromptError),
}

impl QueryError {
    pub fn stage(&self) -> Stage {
        match self {
            QueryError::Embedding(_) => Stage::Embedding,
            QueryError::Synthesis(_) => Stage::Synthesis,
            QueryError::InvalidQuery { .. } => Stage::Validation,
            QueryError::Execution(_) => Stage::Execution,
        }
    }

    /// The underlying cause, without the stage prefix.
    pub fn cause(&self) -> String {
        match self {
            QueryError::Embedding(e) | QueryError::Synthesis(e) | QueryError::Execution(e) => {
                e.to_string()
            }
            QueryError::InvalidQuery { reason, .. } => reason.clone(),
        }
    }
}
