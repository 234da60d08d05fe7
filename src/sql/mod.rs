//! SQL adapter
//!
//! This module runs SELECT statements over the extents written by the
//! object adapter, so one record type is visible both as objects and as rows.

pub mod ast;
pub mod parser;
pub mod executor;

use serde::Serialize;

use crate::core::errors::DriverResult;
use crate::model::SchemaRegistry;
use crate::storage::Namespace;

/// Rows returned by a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        ResultSet { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a cell by row index and case-insensitive column name
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|c| c.eq_ignore_ascii_case(column))?;
        self.rows.get(row)?.get(index)?.as_deref()
    }

    /// Rows as JSON objects keyed by column
    pub fn to_json(&self) -> serde_json::Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let object = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, value)| (column.clone(), serde_json::json!(value)))
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}

/// Parse and run a SQL string
pub fn execute_query(namespace: &Namespace, registry: &SchemaRegistry, sql: &str) -> DriverResult<ResultSet> {
    let select = parser::parse_select(sql)?;
    executor::execute_select(namespace, registry, &select)
}
