//! # Terminal Rendering
//!
//! Turns a `QueryReport` into plain text: the generated query (when there is
//! one), then a row table, "No rows returned.", or "<Stage> failed: <cause>".

use vecsql::{QueryReport, QueryRows};

pub fn render_report(report: &QueryReport) -> String {
    let mut out = String::new();
    if let Some(query) = &report.generated_query {
        out.push_str("Generated query:\n");
        for line in query.lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }

    match &report.outcome {
        Ok(rows) if rows.is_empty() => out.push_str("No rows returned.\n"),
        Ok(rows) => out.push_str(&render_table(rows)),
        Err(e) => out.push_str(&format!("{} failed: {}\n", e.stage(), e.cause())),
    }
    out
}

/// A left-aligned table with a header rule and a row count.
pub fn render_table(rows: &QueryRows) -> String {
    let cells: Vec<Vec<String>> = rows
        .rows
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect();

    let mut widths: Vec<usize> = rows.columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let format_row = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&format_row(&rows.columns));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in &cells {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    let noun = if rows.len() == 1 { "row" } else { "rows" };
    out.push_str(&format!("({} {noun})\n", rows.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vecsql::{errors::PromptError, ColumnValue, QueryError, QueryIntent};

    fn report(generated: Option<&str>, outcome: Result<QueryRows, QueryError>) -> QueryReport {
        QueryReport {
            query: "q".to_string(),
            intent: QueryIntent::StructuredQuery,
            generated_query: generated.map(String::from),
            top_k: None,
            outcome,
        }
    }

    #[test]
    fn renders_table_with_aligned_columns() {
        let rows = QueryRows {
            columns: vec!["name".to_string(), "price".to_string()],
            rows: vec![
                vec![
                    ColumnValue::Text("Office Chair".to_string()),
                    ColumnValue::Real(149.5),
                ],
                vec![ColumnValue::Text("Lamp".to_string()), ColumnValue::Null],
            ],
        };
        let text = render_report(&report(Some("SELECT name, price FROM products"), Ok(rows)));
        assert_eq!(
            text,
            "Generated query:\n  SELECT name, price FROM products\n\n\
             name         | price\n\
             -------------+------\n\
             Office Chair | 149.5\n\
             Lamp         | NULL\n\
             (2 rows)\n"
        );
    }

    #[test]
    fn empty_result_says_so() {
        let text = render_report(&report(Some("SELECT 1 WHERE 0"), Ok(QueryRows::default())));
        assert!(text.ends_with("No rows returned.\n"));
    }

    #[test]
    fn failure_names_the_stage() {
        let err = QueryError::Embedding(PromptError::AiApi("timeout".to_string()));
        let text = render_report(&report(None, Err(err)));
        assert_eq!(
            text,
            "Embedding failed: AI provider returned an error: timeout\n"
        );
    }

    #[test]
    fn rejection_shows_the_refused_query() {
        let err = QueryError::InvalidQuery {
            query: "DROP TABLE products".to_string(),
            reason: "query must start with a read-only keyword".to_string(),
        };
        let text = render_report(&report(Some("DROP TABLE products"), Err(err)));
        assert!(text.starts_with("Generated query:\n  DROP TABLE products\n"));
        assert!(text.contains("Query validation failed: query must start"));
    }
}
