//! Abstract Syntax Tree for SQL
//!
//! This module defines the structures that represent a parsed SELECT.

/// A complete SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    /// Columns to return
    pub projection: Projection,
    /// Table (schema) name as written
    pub table: String,
    /// Equality conditions, all of which must hold
    pub filters: Vec<Condition>,
    /// Optional ordering
    pub order: Option<OrderBy>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `*`
    All,
    /// An explicit column list
    Columns(Vec<String>),
}

/// `column = literal`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}
