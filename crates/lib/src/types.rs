use crate::classifier::SIMILARITY_KEYWORDS;
use serde::{Serialize, Serializer};
use std::fmt;

/// The default number of rows a similarity search returns.
pub const DEFAULT_TOP_K: u32 = 5;

/// The dimension of every embedding column in the schema.
pub const EMBEDDING_DIMENSION: usize = 768;

/// Whether a user query asks for semantic ranking or for a structured filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    StructuredQuery,
    SimilarityQuery,
}

/// A fixed-length vector produced by the embedding collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for EmbeddingVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// A typed substitution point in a query template, in positional order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSlot {
    /// The query embedding, encoded in the store's vector literal syntax.
    Embedding,
    /// The maximum number of rows to return.
    Limit,
}

/// Where a template's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateOrigin {
    /// The canned vector-search template.
    Similarity,
    /// Text returned by the NL-to-SQL collaborator that passed the read-only gate.
    Generated,
}

/// A query string plus the typed slots its positional placeholders stand for.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTemplate {
    pub sql: String,
    pub slots: Vec<ParamSlot>,
    pub origin: TemplateOrigin,
}

impl QueryTemplate {
    /// A template with no placeholders, executed verbatim.
    pub fn generated(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            slots: Vec::new(),
            origin: TemplateOrigin::Generated,
        }
    }

    pub fn has_embedding_slot(&self) -> bool {
        self.slots.contains(&ParamSlot::Embedding)
    }
}

/// A template together with the values it will be bound to.
#[derive(Debug, Clone)]
pub struct SynthesizedQuery {
    pub template: QueryTemplate,
    pub vector: Option<EmbeddingVector>,
    pub top_k: u32,
}

/// A value handed to the store driver for a positional parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Vector(EmbeddingVector),
    Integer(i64),
}

/// A statement ready for the store: SQL text plus bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl BoundStatement {
    pub fn verbatim(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }
}

/// A single column value returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Serialize for ColumnValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ColumnValue::Null => serializer.serialize_none(),
            ColumnValue::Integer(i) => serializer.serialize_i64(*i),
            ColumnValue::Real(f) => serializer.serialize_f64(*f),
            ColumnValue::Text(s) => serializer.serialize_str(s),
            ColumnValue::Blob(b) => serializer.serialize_str(&format!("<blob: {} bytes>", b.len())),
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Null => f.write_str("NULL"),
            ColumnValue::Integer(i) => write!(f, "{i}"),
            ColumnValue::Real(r) => write!(f, "{r}"),
            ColumnValue::Text(s) => f.write_str(s),
            ColumnValue::Blob(b) => write!(f, "<blob: {} bytes>", b.len()),
        }
    }
}

/// An ordered result set. An empty `rows` is a successful result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<ColumnValue>>,
}

impl QueryRows {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// One incoming request.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<u32>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: None,
        }
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

/// Settings for the embedding collaborator.
#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub api_url: String,
    pub model_name: String,
    pub dimension: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            api_url: "https://generativelanguage.googleapis.com/v1beta/models/embedding-001:embedContent"
                .to_string(),
            model_name: "embedding-001".to_string(),
            dimension: EMBEDDING_DIMENSION,
        }
    }
}

/// Settings for the NL-to-SQL collaborator.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// "gemini" or "local" (any OpenAI-compatible chat completions endpoint).
    pub provider: String,
    /// Derived from `model_name` for Gemini when unset.
    pub api_url: Option<String>,
    pub model_name: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            api_url: None,
            model_name: "gemini-1.5-flash".to_string(),
        }
    }
}

/// Explicit configuration handed to the pipeline at startup.
#[derive(Clone)]
pub struct PipelineConfig {
    pub embedding_api_key: Option<String>,
    pub llm_api_key: Option<String>,
    pub db_host: Option<String>,
    /// For the embedded engine this is the database path, or `:memory:`.
    pub db_name: String,
    pub db_user: Option<String>,
    pub db_credential: Option<String>,
    pub default_top_k: u32,
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    pub similarity_keywords: Vec<String>,
    pub system_prompt: Option<String>,
    pub user_prompt: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            embedding_api_key: None,
            llm_api_key: None,
            db_host: None,
            db_name: "db/vecsql.db".to_string(),
            db_user: None,
            db_credential: None,
            default_top_k: DEFAULT_TOP_K,
            embedding: EmbeddingSettings::default(),
            llm: LlmSettings::default(),
            similarity_keywords: SIMILARITY_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            system_prompt: None,
            user_prompt: None,
        }
    }
}

fn redact(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "<redacted>")
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("embedding_api_key", &redact(&self.embedding_api_key))
            .field("llm_api_key", &redact(&self.llm_api_key))
            .field("db_host", &self.db_host)
            .field("db_name", &self.db_name)
            .field("db_user", &self.db_user)
            .field("db_credential", &redact(&self.db_credential))
            .field("default_top_k", &self.default_top_k)
            .field("embedding", &self.embedding)
            .field("llm", &self.llm)
            .field("similarity_keywords", &self.similarity_keywords)
            .finish_non_exhaustive()
    }
}
