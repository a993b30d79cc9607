//! # Query Executor
//!
//! Resolves a template's typed slots into bind values and runs the resulting
//! statement against the store. With a vector, every slot is bound; without
//! one, the template must have no slots and runs verbatim. Store failures come
//! back as `QueryError::Execution`; an empty result set is a success.

use crate::{
    errors::{PromptError, QueryError},
    providers::db::storage::Storage,
    types::{BindValue, BoundStatement, EmbeddingVector, ParamSlot, QueryRows, QueryTemplate},
};
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the statement the store will receive.
pub fn bind(
    template: &QueryTemplate,
    vector: Option<&EmbeddingVector>,
    top_k: u32,
) -> Result<BoundStatement, PromptError> {
    let Some(vector) = vector else {
        if !template.slots.is_empty() {
            return Err(PromptError::InvalidBinding(format!(
                "template expects {} bound values but no embedding was supplied",
                template.slots.len()
            )));
        }
        return Ok(BoundStatement::verbatim(template.sql.clone()));
    };

    if !template.has_embedding_slot() {
        return Err(PromptError::InvalidBinding(
            "an embedding was supplied but the template has no embedding placeholder".to_string(),
        ));
    }
    if top_k == 0 {
        return Err(PromptError::InvalidBinding(
            "row limit must be at least 1".to_string(),
        ));
    }

    let params = template
        .slots
        .iter()
        .map(|slot| match slot {
            ParamSlot::Embedding => BindValue::Vector(vector.clone()),
            ParamSlot::Limit => BindValue::Integer(i64::from(top_k)),
        })
        .collect();

    Ok(BoundStatement {
        sql: template.sql.clone(),
        params,
    })
}

#[derive(Debug, Clone)]
pub struct QueryExecutor {
    storage: Arc<dyn Storage>,
}

impl QueryExecutor {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub async fn execute(
        &self,
        template: &QueryTemplate,
        vector: Option<&EmbeddingVector>,
        top_k: u32,
    ) -> Result<QueryRows, QueryError> {
        let statement = bind(template, vector, top_k).map_err(QueryError::Execution)?;

        info!(
            storage = self.storage.name(),
            bound = statement.params.len(),
            "Executing query."
        );
        self.storage.execute(&statement).await.map_err(|e| {
            warn!("Query execution error: {e}");
            QueryError::Execution(e)
        })
    }
}
