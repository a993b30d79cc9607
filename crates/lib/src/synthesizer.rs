//! # Query Synthesizer
//!
//! Produces the query template for a request. Similarity queries get the canned
//! vector-search template with typed slots for the embedding and the row limit.
//! Structured queries are delegated to the NL-to-SQL collaborator; its answer is
//! unwrapped from any code fence and must pass the read-only gate before it can
//! become a template.

use crate::{
    errors::{PromptError, QueryError},
    prompts,
    providers::{ai::AiProvider, db::sqlite::sql::PRODUCT_SIMILARITY_SQL},
    sql_guard::check_read_only,
    types::{
        EmbeddingVector, ParamSlot, QueryTemplate, SynthesizedQuery, TemplateOrigin, DEFAULT_TOP_K,
    },
};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

/// The canned similarity template: `?1` is the embedding, `?2` the row limit.
pub fn similarity_template() -> QueryTemplate {
    QueryTemplate {
        sql: PRODUCT_SIMILARITY_SQL.to_string(),
        slots: vec![ParamSlot::Embedding, ParamSlot::Limit],
        origin: TemplateOrigin::Similarity,
    }
}

/// A fenced block, and any stray fence marker left after unwrapping one.
static FENCE_PATTERNS: LazyLock<Result<(Regex, Regex), regex::Error>> = LazyLock::new(|| {
    Ok((
        Regex::new(r"(?i)```(?:sql|query)?[ \t]*\n?([\s\S]*?)```")?,
        Regex::new(r"(?i)```(?:sql|query)?")?,
    ))
});

/// Extracts the query from a collaborator response, dropping markdown fences.
pub fn strip_code_fences(raw: &str) -> Result<String, PromptError> {
    let (block, stray) = FENCE_PATTERNS.as_ref().map_err(|e| e.clone())?;

    let inner = block
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw);
    Ok(stray.replace_all(inner, "").trim().to_string())
}

#[derive(Debug, Clone)]
pub struct QuerySynthesizer {
    ai_provider: Arc<dyn AiProvider>,
    schema: String,
    language: String,
    db_name: String,
    system_prompt: String,
    user_prompt: String,
    default_top_k: u32,
}

impl QuerySynthesizer {
    pub fn new(ai_provider: Arc<dyn AiProvider>, schema: impl Into<String>) -> Self {
        Self {
            ai_provider,
            schema: schema.into(),
            language: "SQLite".to_string(),
            db_name: "Turso".to_string(),
            system_prompt: prompts::QUERY_GENERATION_SYSTEM_PROMPT.to_string(),
            user_prompt: prompts::QUERY_GENERATION_USER_PROMPT.to_string(),
            default_top_k: DEFAULT_TOP_K,
        }
    }

    /// Sets the dialect and engine names used in the prompts.
    pub fn with_dialect(mut self, language: &str, db_name: &str) -> Self {
        self.language = language.to_string();
        self.db_name = db_name.to_string();
        self
    }

    pub fn with_prompts(mut self, system_prompt: Option<String>, user_prompt: Option<String>) -> Self {
        if let Some(system_prompt) = system_prompt {
            self.system_prompt = system_prompt;
        }
        if let Some(user_prompt) = user_prompt {
            self.user_prompt = user_prompt;
        }
        self
    }

    pub fn with_default_top_k(mut self, top_k: u32) -> Self {
        self.default_top_k = top_k;
        self
    }

    pub fn default_top_k(&self) -> u32 {
        self.default_top_k
    }

    /// `top_k` of `None` or 0 means the configured default.
    pub fn resolve_top_k(&self, top_k: Option<u32>) -> u32 {
        top_k.filter(|k| *k > 0).unwrap_or(self.default_top_k)
    }

    /// Binds `vector` and the row limit to the similarity template.
    pub fn synthesize_similarity(
        &self,
        vector: EmbeddingVector,
        top_k: Option<u32>,
    ) -> SynthesizedQuery {
        SynthesizedQuery {
            template: similarity_template(),
            vector: Some(vector),
            top_k: self.resolve_top_k(top_k),
        }
    }

    /// Asks the collaborator for a query answering `text` and gates the result.
    pub async fn synthesize_structured(&self, text: &str) -> Result<QueryTemplate, QueryError> {
        let system_prompt = prompts::render(
            &self.system_prompt,
            &self.language,
            &self.db_name,
            &self.schema,
            text,
        );
        let user_prompt = prompts::render(
            &self.user_prompt,
            &self.language,
            &self.db_name,
            &self.schema,
            text,
        );

        debug!(system_prompt = %system_prompt, user_prompt = %user_prompt, "--> Sending prompts to AI Provider");
        let raw_response = self
            .ai_provider
            .generate(&system_prompt, &user_prompt)
            .await
            .map_err(QueryError::Synthesis)?;
        debug!("<-- Query from AI: {}", &raw_response);

        let query = strip_code_fences(&raw_response).map_err(QueryError::Synthesis)?;
        if query.is_empty() {
            return Err(QueryError::Synthesis(PromptError::EmptyAiResponse));
        }

        if let Err(reason) = check_read_only(&query) {
            warn!(query = %query, "Rejected generated query: {reason}");
            return Err(QueryError::InvalidQuery { query, reason });
        }

        info!("Synthesized structured query.");
        Ok(QueryTemplate::generated(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_sql_fence() {
        let raw = "```sql\nSELECT * FROM products;\n```";
        assert_eq!(strip_code_fences(raw).unwrap(), "SELECT * FROM products;");
    }

    #[test]
    fn strips_fence_surrounded_by_prose() {
        let raw = "Here you go:\n```SQL\nSELECT name FROM employees\n```\nEnjoy.";
        assert_eq!(strip_code_fences(raw).unwrap(), "SELECT name FROM employees");
    }

    #[test]
    fn strips_unterminated_fence() {
        let raw = "```sql\nSELECT 1";
        assert_eq!(strip_code_fences(raw).unwrap(), "SELECT 1");
    }

    #[test]
    fn plain_text_is_only_trimmed() {
        assert_eq!(strip_code_fences("  SELECT 1  \n").unwrap(), "SELECT 1");
    }

    #[test]
    fn similarity_template_has_embedding_then_limit() {
        let template = similarity_template();
        assert_eq!(template.slots, vec![ParamSlot::Embedding, ParamSlot::Limit]);
        assert!(template.sql.contains("vector32(?1)"));
        assert!(template.sql.contains("LIMIT ?2"));
    }
}
