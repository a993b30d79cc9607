//! # Application Configuration
//!
//! This module defines the configuration structure for `vecsql-server` and the
//! logic for loading it from a `config.yml` file and environment variables.
//! The same loader is used by the CLI.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use vecsql::{
    classifier::SIMILARITY_KEYWORDS,
    types::{EmbeddingSettings, LlmSettings, PipelineConfig, DEFAULT_TOP_K, EMBEDDING_DIMENSION},
};

/// A custom error type for configuration issues.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    #[error("Configuration error: {0}")]
    General(String),
    /// Indicates a required configuration file was not found.
    #[error("{0}")]
    NotFound(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Rows returned by a similarity query when the request has no `top_k`.
    #[serde(default = "default_top_k")]
    pub default_top_k: u32,

    /// Accepted for compatibility with networked engines; unused by Turso.
    #[serde(default)]
    pub db_host: Option<String>,
    /// The database file path, or `:memory:`. Loaded from `DB_NAME` env var.
    #[serde(default = "default_db_name")]
    pub db_name: String,
    #[serde(default)]
    pub db_user: Option<String>,
    #[serde(default)]
    pub db_credential: Option<String>,

    #[serde(default)]
    pub embedding_api_key: Option<String>,
    #[serde(default)]
    pub llm_api_key: Option<String>,

    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,

    /// Substrings that route a query to vector search.
    #[serde(default = "default_similarity_keywords")]
    pub similarity_keywords: Vec<String>,

    /// Optional overrides for the query generation prompts.
    #[serde(default)]
    pub prompts: PromptsConfig,
}

fn default_port() -> u16 {
    9090
}

fn default_top_k() -> u32 {
    DEFAULT_TOP_K
}

fn default_db_name() -> String {
    "db/vecsql.db".to_string()
}

fn default_similarity_keywords() -> Vec<String> {
    SIMILARITY_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

/// Configuration for the embedding model provider.
#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_api_url")]
    pub api_url: String,
    #[serde(default = "default_embedding_model")]
    pub model_name: String,
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
}

fn default_embedding_api_url() -> String {
    EmbeddingSettings::default().api_url
}

fn default_embedding_model() -> String {
    EmbeddingSettings::default().model_name
}

fn default_embedding_dimension() -> usize {
    EMBEDDING_DIMENSION
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_url: default_embedding_api_url(),
            model_name: default_embedding_model(),
            dimension: default_embedding_dimension(),
        }
    }
}

/// Configuration for the NL-to-SQL provider.
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// The type of provider ("gemini" or "local").
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_llm_model")]
    pub model_name: String,
}

fn default_llm_provider() -> String {
    LlmSettings::default().provider
}

fn default_llm_model() -> String {
    LlmSettings::default().model_name
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_url: None,
            model_name: default_llm_model(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PromptsConfig {
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub user_prompt: Option<String>,
}

/// `${VAR}` substitution leaves empty strings behind for unset variables.
fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

impl AppConfig {
    /// The explicit configuration handed to the query pipeline.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            embedding_api_key: non_empty(&self.embedding_api_key),
            llm_api_key: non_empty(&self.llm_api_key),
            db_host: non_empty(&self.db_host),
            db_name: self.db_name.clone(),
            db_user: non_empty(&self.db_user),
            db_credential: non_empty(&self.db_credential),
            default_top_k: self.default_top_k,
            embedding: EmbeddingSettings {
                api_url: self.embedding.api_url.clone(),
                model_name: self.embedding.model_name.clone(),
                dimension: self.embedding.dimension,
            },
            llm: LlmSettings {
                provider: self.llm.provider.clone(),
                api_url: non_empty(&self.llm.api_url),
                model_name: self.llm.model_name.clone(),
            },
            similarity_keywords: self.similarity_keywords.clone(),
            system_prompt: non_empty(&self.prompts.system_prompt),
            user_prompt: non_empty(&self.prompts.user_prompt),
        }
    }
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// - An explicit `config_path_override` must exist.
/// - Otherwise `config.yml` next to the crate manifest is used if present, and
///   built-in defaults apply if it is not.
/// - Top-level keys like `port` and `db_name` are overridden by `PORT` and `DB_NAME`.
/// - Nested keys are overridden by `VECSQL_...` variables (e.g., `VECSQL_LLM__PROVIDER`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    match config_path_override {
        Some(path) => {
            let content = read_and_substitute(path)?.ok_or_else(|| {
                ConfigError::NotFound(format!("Config file not found at '{path}'."))
            })?;
            info!("Loading configuration from '{path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None => {
            let default_path = format!("{}/config.yml", env!("CARGO_MANIFEST_DIR"));
            if let Some(content) = read_and_substitute(&default_path)? {
                info!("Loading configuration from '{default_path}'.");
                builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
            } else {
                info!("'{default_path}' not found. Using built-in defaults.");
            }
        }
    }

    let settings = builder
        // Environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("VECSQL")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
