//! # Query Synthesizer Tests
//!
//! Exercises structured synthesis against a mock NL-to-SQL provider: prompt
//! construction, fence stripping, and the read-only gate.

use std::sync::Arc;
use vecsql::{
    errors::PromptError,
    schema::SCHEMA_DESCRIPTION,
    types::{ParamSlot, TemplateOrigin},
    EmbeddingVector, QueryError, QuerySynthesizer,
};
use vecsql_test_utils::MockAiProvider;

fn synthesizer(ai: &MockAiProvider) -> QuerySynthesizer {
    QuerySynthesizer::new(Arc::new(ai.clone()), SCHEMA_DESCRIPTION)
}

#[tokio::test]
async fn fenced_select_becomes_a_generated_template() {
    let ai = MockAiProvider::new("```sql\nSELECT name FROM employees WHERE department_id = 1;\n```");
    let template = synthesizer(&ai)
        .synthesize_structured("list all employees in sales")
        .await
        .expect("a SELECT should pass the gate");

    assert_eq!(
        template.sql,
        "SELECT name FROM employees WHERE department_id = 1;"
    );
    assert_eq!(template.origin, TemplateOrigin::Generated);
    assert!(template.slots.is_empty());
}

#[tokio::test]
async fn prompt_carries_schema_and_user_text() {
    let ai = MockAiProvider::new("SELECT 1");
    synthesizer(&ai)
        .synthesize_structured("how many departments are there")
        .await
        .unwrap();

    let calls = ai.get_calls();
    assert_eq!(calls.len(), 1);
    let (system_prompt, user_prompt) = &calls[0];
    assert!(system_prompt.contains("SQLite"));
    assert!(user_prompt.contains("how many departments are there"));
    assert!(user_prompt.contains("\"employees\""));
    assert!(!user_prompt.contains("{schema}"));
}

#[tokio::test]
async fn drop_statement_is_rejected_with_its_text() {
    let ai = MockAiProvider::new("DROP TABLE products;");
    let err = synthesizer(&ai)
        .synthesize_structured("DROP TABLE products")
        .await
        .unwrap_err();

    match err {
        QueryError::InvalidQuery { query, reason } => {
            assert_eq!(query, "DROP TABLE products;");
            assert!(reason.contains("DROP"));
        }
        other => panic!("expected InvalidQuery, got {other:?}"),
    }
}

#[tokio::test]
async fn replace_behind_a_cte_is_rejected() {
    let sql = "WITH c AS (SELECT 1) REPLACE INTO products (id, name, price) SELECT 1, 'x', 0";
    let ai = MockAiProvider::new(&format!("```sql\n{sql}\n```"));
    let err = synthesizer(&ai)
        .synthesize_structured("overwrite product one")
        .await
        .unwrap_err();

    match err {
        QueryError::InvalidQuery { query, reason } => {
            assert_eq!(query, sql);
            assert!(reason.contains("REPLACE"));
        }
        other => panic!("expected InvalidQuery, got {other:?}"),
    }
}

#[tokio::test]
async fn provider_failure_is_a_synthesis_failure() {
    let ai = MockAiProvider::failing("quota exceeded");
    let err = synthesizer(&ai)
        .synthesize_structured("list products")
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::Synthesis(PromptError::AiApi(_))));
    assert!(err.to_string().contains("quota exceeded"));
}

#[tokio::test]
async fn empty_answer_is_a_synthesis_failure() {
    let ai = MockAiProvider::new("```sql\n```");
    let err = synthesizer(&ai)
        .synthesize_structured("list products")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        QueryError::Synthesis(PromptError::EmptyAiResponse)
    ));
}

#[tokio::test]
async fn prompt_overrides_replace_the_defaults() {
    let ai = MockAiProvider::new("SELECT 1");
    synthesizer(&ai)
        .with_prompts(
            Some("custom system for {db_name}".to_string()),
            Some("Q: {prompt}".to_string()),
        )
        .synthesize_structured("count orders")
        .await
        .unwrap();

    let (system_prompt, user_prompt) = ai.get_calls().remove(0);
    assert_eq!(system_prompt, "custom system for Turso");
    assert_eq!(user_prompt, "Q: count orders");
}

#[test]
fn similarity_synthesis_uses_default_or_requested_top_k() {
    let ai = MockAiProvider::new("unused");
    let synth = synthesizer(&ai);
    let vector = EmbeddingVector::new(vec![0.1; 768]);

    let default = synth.synthesize_similarity(vector.clone(), None);
    assert_eq!(default.top_k, 5);
    assert_eq!(
        default.template.slots,
        vec![ParamSlot::Embedding, ParamSlot::Limit]
    );
    assert_eq!(default.vector.as_ref().map(|v| v.dimension()), Some(768));

    assert_eq!(synth.synthesize_similarity(vector.clone(), Some(12)).top_k, 12);
    assert_eq!(synth.synthesize_similarity(vector, Some(0)).top_k, 5);
    assert!(ai.get_calls().is_empty());
}
