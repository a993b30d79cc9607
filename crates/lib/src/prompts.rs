//! # Default Task Prompts
//!
//! The default prompt templates for structured query generation. Both can be
//! overridden through configuration. Placeholders: `{language}`, `{db_name}`,
//! `{schema}`, `{prompt}`.

pub const QUERY_GENERATION_SYSTEM_PROMPT: &str = r#"You are a {language} expert for {db_name}. Write a single, read-only {language} query that answers the user's question. Your response must contain ONLY the query: no explanations and no placeholders for values."#;

pub const QUERY_GENERATION_USER_PROMPT: &str = r#"Convert this natural language query into a {language} query using the schema provided.

# Schema
{schema}

# Query Construction Rules
1. Only SELECT statements (optionally with a WITH clause) are allowed.
2. For questions about "who", "what", or "list", use DISTINCT to avoid duplicate results.
3. For searches involving a person's name, use a `LIKE` clause for partial matching (e.g., `name LIKE 'John%'`).
4. Do not format data in the query. Return raw numbers and dates.
5. Do not use placeholders for table or column names.

# User question
{prompt}"#;

/// Fills the placeholders of a query generation template.
pub fn render(template: &str, language: &str, db_name: &str, schema: &str, prompt: &str) -> String {
    template
        .replace("{language}", language)
        .replace("{db_name}", db_name)
        .replace("{schema}", schema)
        .replace("{prompt}", prompt)
}
