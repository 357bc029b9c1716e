//! Materialized query results.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::{SessionError, SessionResult};

/// A fully materialized tabular result: ordered columns plus rows of JSON
/// values, in SELECT order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<JsonValue>>,
}

impl Table {
    /// Create a table from column names and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<JsonValue>>) -> Self {
        Self { columns, rows }
    }

    /// Column names, in SELECT order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows.
    pub fn rows(&self) -> &[Vec<JsonValue>] {
        &self.rows
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at (row, column name), if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&JsonValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Deserialize every row into `T`, pairing values with column names.
    pub fn rows_as<T: DeserializeOwned>(&self) -> SessionResult<Vec<T>> {
        self.rows
            .iter()
            .map(|row| {
                let obj: serde_json::Map<String, JsonValue> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect();
                serde_json::from_value(JsonValue::Object(obj)).map_err(|e| {
                    SessionError::deserialization(format!("failed to deserialize row: {}", e))
                })
            })
            .collect()
    }
}

impl fmt::Display for Table {
    /// Renders an aligned text grid, the feedback format the demo drivers
    /// print.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return writeln!(f, "(no columns)");
        }

        let render = |v: &JsonValue| match v {
            JsonValue::String(s) => s.clone(),
            JsonValue::Null => "NULL".to_string(),
            other => other.to_string(),
        };

        let mut widths: Vec<usize> = self.columns.iter().map(String::len).collect();
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, v)| {
                        let cell = render(v);
                        if let Some(w) = widths.get_mut(i) {
                            *w = (*w).max(cell.len());
                        }
                        cell
                    })
                    .collect()
            })
            .collect();

        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
            .collect();
        writeln!(f, "{}", header.join(" | "))?;
        writeln!(
            f,
            "{}",
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-")
        )?;

        for row in &rendered {
            let line: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
                .collect();
            writeln!(f, "{}", line.join(" | "))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn sample() -> Table {
        Table::new(
            vec!["id".to_string(), "name".to_string()],
            vec![
                vec![json!(1), json!("Alice")],
                vec![json!(2), json!("Bob")],
            ],
        )
    }

    #[test]
    fn test_accessors() {
        let table = sample();
        assert_eq!(table.row_count(), 2);
        assert!(!table.is_empty());
        assert_eq!(table.column_index("name"), Some(1));
        assert_eq!(table.get(0, "name"), Some(&json!("Alice")));
        assert_eq!(table.get(5, "name"), None);
        assert_eq!(table.get(0, "missing"), None);
    }

    #[test]
    fn test_rows_as() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            id: i64,
            name: String,
        }

        let users: Vec<User> = sample().rows_as().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, 1);
        assert_eq!(users[1].name, "Bob");
    }

    #[test]
    fn test_rows_as_type_mismatch() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Wrong {
            id: String,
        }

        let result: SessionResult<Vec<Wrong>> = sample().rows_as();
        assert!(result.is_err());
    }

    #[test]
    fn test_display_alignment() {
        let text = sample().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("id | name"));
        assert!(lines[2].contains("Alice"));
        assert!(lines[3].contains("Bob"));
    }
}
