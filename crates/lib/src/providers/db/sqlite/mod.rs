use crate::{
    errors::PromptError,
    providers::db::storage::{EmbeddingStore, Storage},
    types::{BindValue, BoundStatement, ColumnValue, EmbeddingVector, QueryRows},
};
use async_trait::async_trait;
use std::fmt::{self, Debug};
use tracing::{debug, info};
use turso::{Connection, Database, Value as TursoValue};

pub mod sql;

/// A provider for the embedded Turso engine (SQLite dialect with vector functions).
///
/// This provider holds a `Database` instance. When cloned, it shares the same
/// underlying database, so an in-memory database can be shared by cloning one
/// provider rather than opening `:memory:` twice.
#[derive(Clone)]
pub struct SqliteProvider {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
}

impl SqliteProvider {
    /// Creates a new `SqliteProvider` from a file path or in-memory.
    ///
    /// # Arguments
    ///
    /// * `db_path`: The path to the database file. Use ":memory:" for a unique,
    ///   isolated in-memory database.
    pub async fn new(db_path: &str) -> Result<Self, PromptError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;
        // PRAGMA returns a row, so it goes through `query` rather than `execute`.
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        Ok(Self { db })
    }

    fn connect(&self) -> Result<Connection, PromptError> {
        self.db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))
    }

    /// A helper for tests and demos to pre-populate data by executing multiple SQL statements.
    pub async fn initialize_with_data(&self, init_sql: &str) -> Result<(), PromptError> {
        let conn = self.connect()?;

        for statement in init_sql.split(';').filter(|s| !s.trim().is_empty()) {
            conn.execute(statement, ())
                .await
                .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;
        }
        Ok(())
    }

    /// Ensures that all demo tables exist. Safe to call on every startup.
    pub async fn initialize_schema(&self) -> Result<(), PromptError> {
        let conn = self.connect()?;

        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ())
                .await
                .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;
        }
        Ok(())
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

/// Encodes an embedding in the textual form `vector32()` accepts: `[v0, v1, ...]`.
pub fn vector_literal(vector: &EmbeddingVector) -> Result<String, PromptError> {
    if vector.dimension() == 0 {
        return Err(PromptError::InvalidBinding(
            "cannot bind an empty vector".to_string(),
        ));
    }
    if let Some(pos) = vector.as_slice().iter().position(|v| !v.is_finite()) {
        return Err(PromptError::InvalidBinding(format!(
            "vector component {pos} is not a finite number"
        )));
    }
    let components = vector
        .as_slice()
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("[{components}]"))
}

fn to_turso_params(params: &[BindValue]) -> Result<Vec<TursoValue>, PromptError> {
    params
        .iter()
        .map(|p| match p {
            BindValue::Vector(v) => vector_literal(v).map(TursoValue::Text),
            BindValue::Integer(i) => Ok(TursoValue::Integer(*i)),
        })
        .collect()
}

fn to_column_value(v: TursoValue) -> ColumnValue {
    match v {
        TursoValue::Null => ColumnValue::Null,
        TursoValue::Integer(i) => ColumnValue::Integer(i),
        TursoValue::Real(f) => ColumnValue::Real(f),
        TursoValue::Text(s) => ColumnValue::Text(s),
        TursoValue::Blob(b) => ColumnValue::Blob(b),
    }
}

#[async_trait]
impl Storage for SqliteProvider {
    fn name(&self) -> &str {
        "Turso"
    }

    fn language(&self) -> &str {
        "SQLite"
    }

    async fn execute(&self, statement: &BoundStatement) -> Result<QueryRows, PromptError> {
        let params = to_turso_params(&statement.params)?;
        debug!(sql = %statement.sql, params = statement.params.len(), "Executing statement");

        // The connection, statement, and row cursor are all dropped when this returns.
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(&statement.sql)
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;

        let columns: Vec<String> = stmt
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let mut rows = if params.is_empty() {
            stmt.query(()).await
        } else {
            stmt.query(params).await
        }
        .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;

        let mut result = QueryRows {
            columns,
            rows: Vec::new(),
        };
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?
        {
            let mut values = Vec::with_capacity(result.columns.len());
            for i in 0..result.columns.len() {
                let value = row
                    .get_value(i)
                    .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;
                values.push(to_column_value(value));
            }
            result.rows.push(values);
        }

        info!("Statement returned {} rows.", result.rows.len());
        Ok(result)
    }
}

fn checked_source_column(table: &str) -> Result<&'static str, PromptError> {
    sql::embedding_source_column(table)
        .ok_or_else(|| PromptError::UnsupportedTable(table.to_string()))
}

#[async_trait]
impl EmbeddingStore for SqliteProvider {
    async fn embedding_sources(
        &self,
        table: &str,
        only_missing: bool,
    ) -> Result<Vec<(i64, String)>, PromptError> {
        let column = checked_source_column(table)?;
        let conn = self.connect()?;
        let mut rows = conn
            .query(
                &sql::select_embedding_sources(table, column, only_missing),
                (),
            )
            .await?;

        let mut sources = Vec::new();
        while let Some(row) = rows.next().await? {
            let id = match row.get_value(0)? {
                TursoValue::Integer(i) => i,
                other => {
                    return Err(PromptError::StorageOperationFailed(format!(
                        "Unexpected id value in '{table}': {other:?}"
                    )))
                }
            };
            let text = match row.get_value(1)? {
                TursoValue::Text(s) => s,
                _ => String::new(),
            };
            sources.push((id, text));
        }
        Ok(sources)
    }

    async fn write_embedding(
        &self,
        table: &str,
        id: i64,
        vector: &EmbeddingVector,
    ) -> Result<(), PromptError> {
        checked_source_column(table)?;
        let literal = vector_literal(vector)?;
        let conn = self.connect()?;
        conn.execute(
            &sql::update_embedding(table),
            vec![TursoValue::Text(literal), TursoValue::Integer(id)],
        )
        .await?;
        Ok(())
    }
}
