//! # SQLite Specific SQL Queries
//!
//! This module centralizes SQL query strings for the Turso provider.
//! This makes the core logic cleaner and isolates database-specific syntax.

/// The demo schema. Every statement is idempotent.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS departments (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    );",
    "CREATE TABLE IF NOT EXISTS employees (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        department_id INTEGER REFERENCES departments(id),
        email TEXT UNIQUE NOT NULL,
        salary REAL NOT NULL
    );",
    "CREATE TABLE IF NOT EXISTS orders (
        id INTEGER PRIMARY KEY,
        customer_name TEXT NOT NULL,
        employee_id INTEGER REFERENCES employees(id),
        order_total REAL NOT NULL,
        order_date TEXT NOT NULL,
        embedding BLOB
    );",
    "CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        price REAL NOT NULL,
        embedding BLOB
    );",
];

/// Tables that carry an embedding column, with the text column each row is embedded from.
pub const EMBEDDABLE_TABLES: &[(&str, &str)] = &[("products", "name"), ("orders", "customer_name")];

/// Ranks products by cosine distance to `?1` (a vector literal) and keeps the first `?2`.
pub const PRODUCT_SIMILARITY_SQL: &str = "SELECT id, name, price, vector_distance_cos(embedding, vector32(?1)) AS distance
FROM products
WHERE embedding IS NOT NULL
ORDER BY distance ASC
LIMIT ?2";

/// Returns the source column for `table` if it is one of the embeddable tables.
pub fn embedding_source_column(table: &str) -> Option<&'static str> {
    EMBEDDABLE_TABLES
        .iter()
        .find(|(name, _)| *name == table)
        .map(|(_, column)| *column)
}

/// Selects `(id, text)` pairs to embed. `table` and `column` must come from `EMBEDDABLE_TABLES`.
pub fn select_embedding_sources(table: &str, column: &str, only_missing: bool) -> String {
    let filter = if only_missing {
        " WHERE embedding IS NULL"
    } else {
        ""
    };
    format!("SELECT id, {column} FROM {table}{filter} ORDER BY id ASC;")
}

/// Writes one embedding keyed by primary key: `?1` is the vector literal, `?2` the id.
pub fn update_embedding(table: &str) -> String {
    format!("UPDATE {table} SET embedding = vector32(?1) WHERE id = ?2;")
}
