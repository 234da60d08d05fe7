pub mod schema;
pub mod airport;

pub use schema::{Column, ColumnKind, Persistent, Schema, SchemaRegistry};
pub use airport::{Airport, Location};

/// A registry holding the quickstart schemas
pub fn quickstart_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register::<Airport>().register::<Location>();
    registry
}
