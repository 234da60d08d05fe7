//! Schemas describing persistent record types
//!
//! A schema lists the columns of a record type. Columns are either plain
//! values or embedded (serial) objects described by another schema.

use std::collections::BTreeMap;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Kinds of columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// A plain value
    Scalar,
    /// An object described by the named embeddable schema
    Embedded(String),
}

/// A column of a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn scalar<S: Into<String>>(name: S) -> Self {
        Column { name: name.into(), kind: ColumnKind::Scalar }
    }

    pub fn embedded<S: Into<String>, T: Into<String>>(name: S, schema: T) -> Self {
        Column { name: name.into(), kind: ColumnKind::Embedded(schema.into()) }
    }
}

/// Description of a record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Qualified name, e.g. `Demo.Airport`
    pub name: String,
    /// Embeddable schemas have no extent of their own
    pub embeddable: bool,
    pub columns: Vec<Column>,
}

impl Schema {
    /// A schema with its own extent
    pub fn persistent<S: Into<String>>(name: S, columns: Vec<Column>) -> Self {
        Schema { name: name.into(), embeddable: false, columns }
    }

    /// A schema only stored inside other records
    pub fn serial<S: Into<String>>(name: S, columns: Vec<Column>) -> Self {
        Schema { name: name.into(), embeddable: true, columns }
    }

    /// Find a column by case-insensitive name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Names of the schemas embedded by this one
    pub fn embedded_schemas(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter_map(|c| match &c.kind {
                ColumnKind::Embedded(schema) => Some(schema.as_str()),
                ColumnKind::Scalar => None,
            })
            .collect()
    }
}

/// A record type that can be stored through the object adapter
pub trait Persistent: Serialize + DeserializeOwned {
    /// Describe the record's columns
    fn schema() -> Schema;
}

/// The schemas a driver knows how to import
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        SchemaRegistry { schemas: BTreeMap::new() }
    }

    /// Register the schema of a persistent type
    pub fn register<T: Persistent>(&mut self) -> &mut Self {
        self.register_schema(T::schema())
    }

    pub fn register_schema(&mut self, schema: Schema) -> &mut Self {
        self.schemas.insert(schema.name.to_ascii_lowercase(), schema);
        self
    }

    /// Find a schema by case-insensitive name
    pub fn find(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup_is_case_insensitive() {
        let mut registry = SchemaRegistry::new();
        registry.register_schema(Schema::persistent(
            "Demo.Gate",
            vec![Column::scalar("number"), Column::embedded("where", "Demo.Spot")],
        ));

        let schema = registry.find("demo.gate").unwrap();
        assert_eq!(schema.name, "Demo.Gate");
        assert_eq!(schema.column("NUMBER").unwrap().kind, ColumnKind::Scalar);
        assert_eq!(schema.embedded_schemas(), vec!["Demo.Spot"]);
        assert!(registry.find("Demo.Spot").is_none());
    }
}
