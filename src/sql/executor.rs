//! SELECT execution over object extents
//!
//! Rows are the records of the object adapter. Embedded objects are
//! reachable as `<column>_<field>`, and the record id as `ID`.

use std::cmp::Ordering;

use log::debug;

use crate::core::entity::Entity;
use crate::core::errors::{DriverError, DriverResult};
use crate::core::path::Subscript;
use crate::driver::objects;
use crate::model::{ColumnKind, Schema, SchemaRegistry};
use crate::sql::ast::{Projection, Select};
use crate::sql::ResultSet;
use crate::storage::Namespace;

/// A resolved column reference
#[derive(Debug, Clone, PartialEq)]
enum ColumnRef {
    Id,
    Field(String),
    Nested(String, String),
    Embedded(String),
}

impl ColumnRef {
    fn header(&self) -> String {
        match self {
            ColumnRef::Id => "ID".to_string(),
            ColumnRef::Field(name) | ColumnRef::Embedded(name) => name.clone(),
            ColumnRef::Nested(column, field) => format!("{}_{}", column, field),
        }
    }

    fn evaluate(&self, id: u64, record: &Entity) -> Option<String> {
        match self {
            ColumnRef::Id => Some(id.to_string()),
            ColumnRef::Field(name) => record.field(name).and_then(Entity::as_value).map(str::to_string),
            ColumnRef::Nested(column, field) => record
                .field(column)
                .and_then(|embedded| embedded.field(field))
                .and_then(Entity::as_value)
                .map(str::to_string),
            ColumnRef::Embedded(name) => record
                .field(name)
                .filter(|embedded| embedded.is_object())
                .map(|embedded| embedded.to_json().to_string()),
        }
    }
}

/// Run a parsed SELECT against the namespace
pub fn execute_select(
    namespace: &Namespace,
    registry: &SchemaRegistry,
    select: &Select,
) -> DriverResult<ResultSet> {
    let schema = objects::imported_schema(namespace, registry, &select.table)?
        .filter(|schema| !schema.embeddable)
        .ok_or_else(|| DriverError::Query(format!("Table not found: {}", select.table)))?;

    let columns = match &select.projection {
        Projection::All => all_columns(schema, registry),
        Projection::Columns(names) => names
            .iter()
            .map(|name| resolve(name, schema, registry))
            .collect::<DriverResult<Vec<_>>>()?,
    };
    let filters = select
        .filters
        .iter()
        .map(|condition| Ok((resolve(&condition.column, schema, registry)?, condition.value.as_str())))
        .collect::<DriverResult<Vec<_>>>()?;
    let order = match &select.order {
        Some(order) => Some((resolve(&order.column, schema, registry)?, order.descending)),
        None => None,
    };

    let mut records: Vec<(u64, Entity)> = objects::fetch_objects(namespace, registry, &schema.name)?
        .into_iter()
        .filter(|(id, record)| {
            filters
                .iter()
                .all(|(column, expected)| column.evaluate(*id, record).as_deref() == Some(*expected))
        })
        .collect();

    if let Some((column, descending)) = &order {
        records.sort_by(|(a_id, a), (b_id, b)| {
            let ordering = collate(column.evaluate(*a_id, a), column.evaluate(*b_id, b));
            if *descending { ordering.reverse() } else { ordering }
        });
    }

    let rows = records
        .iter()
        .map(|(id, record)| columns.iter().map(|column| column.evaluate(*id, record)).collect())
        .collect();

    debug!("SELECT from {} returned {} rows", schema.name, records.len());
    Ok(ResultSet::new(columns.iter().map(ColumnRef::header).collect(), rows))
}

/// `*` is the id followed by every column, embedded fields flattened
fn all_columns(schema: &Schema, registry: &SchemaRegistry) -> Vec<ColumnRef> {
    let mut columns = vec![ColumnRef::Id];
    for column in &schema.columns {
        match &column.kind {
            ColumnKind::Scalar => columns.push(ColumnRef::Field(column.name.clone())),
            ColumnKind::Embedded(embedded) => match registry.find(embedded) {
                Some(embedded_schema) => columns.extend(
                    embedded_schema
                        .columns
                        .iter()
                        .map(|field| ColumnRef::Nested(column.name.clone(), field.name.clone())),
                ),
                None => columns.push(ColumnRef::Embedded(column.name.clone())),
            },
        }
    }
    columns
}

fn resolve(name: &str, schema: &Schema, registry: &SchemaRegistry) -> DriverResult<ColumnRef> {
    if name.eq_ignore_ascii_case("ID") || name.eq_ignore_ascii_case("%ID") {
        return Ok(ColumnRef::Id);
    }

    if let Some(column) = schema.column(name) {
        return Ok(match &column.kind {
            ColumnKind::Scalar => ColumnRef::Field(column.name.clone()),
            ColumnKind::Embedded(_) => ColumnRef::Embedded(column.name.clone()),
        });
    }

    let lowered = name.to_ascii_lowercase();
    for column in &schema.columns {
        let ColumnKind::Embedded(embedded) = &column.kind else {
            continue;
        };
        let prefix = format!("{}_", column.name.to_ascii_lowercase());
        let Some(field_name) = lowered.strip_prefix(&prefix) else {
            continue;
        };
        if let Some(field) = registry.find(embedded).and_then(|s| s.column(field_name)) {
            return Ok(ColumnRef::Nested(column.name.clone(), field.name.clone()));
        }
    }

    Err(DriverError::Query(format!("Unknown column {} in {}", name, schema.name)))
}

/// Missing values first, then subscript collation (numbers numerically)
fn collate(a: Option<String>, b: Option<String>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => Subscript::new(a).cmp(&Subscript::new(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::objects::{import_schema, store_objects};
    use crate::model::{quickstart_registry, Airport};
    use crate::sql::parser::parse_select;

    fn loaded() -> (Namespace, SchemaRegistry) {
        let registry = quickstart_registry();
        let mut namespace = Namespace::in_memory("User");
        import_schema(&mut namespace, &registry, "Demo.Airport").unwrap();
        import_schema(&mut namespace, &registry, "Demo.Location").unwrap();
        let airports: Vec<Entity> = Airport::sample_set()
            .iter()
            .map(|a| Entity::from_record(a).unwrap())
            .collect();
        store_objects(&mut namespace, &registry, "Demo.Airport", &airports).unwrap();
        (namespace, registry)
    }

    fn run(namespace: &Namespace, registry: &SchemaRegistry, sql: &str) -> DriverResult<ResultSet> {
        execute_select(namespace, registry, &parse_select(sql)?)
    }

    #[test]
    fn test_select_columns() {
        let (namespace, registry) = loaded();
        let result = run(&namespace, &registry, "SELECT name,code,location FROM demo.airport").unwrap();

        assert_eq!(result.columns(), &["name", "code", "location"]);
        assert_eq!(result.len(), 5);
        assert_eq!(result.value(0, "name"), Some("Boston Logan International"));
        assert_eq!(result.value(2, "CODE"), Some("AUS"));
        assert_eq!(result.value(0, "location"), Some(r#"{"city":"Boston","state":"MA"}"#));
    }

    #[test]
    fn test_select_star_flattens_embedded() {
        let (namespace, registry) = loaded();
        let result = run(&namespace, &registry, "SELECT * FROM Demo.Airport").unwrap();

        assert_eq!(result.columns(), &["ID", "name", "code", "location_city", "location_state"]);
        assert_eq!(result.value(4, "ID"), Some("5"));
        assert_eq!(result.value(4, "location_city"), Some("Chicago"));
    }

    #[test]
    fn test_where_and_order() {
        let (namespace, registry) = loaded();
        let result = run(
            &namespace,
            &registry,
            "SELECT code, Location_City FROM demo.airport WHERE location_state = 'TX'",
        )
        .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.value(0, "location_city"), Some("Austin"));

        let ordered = run(&namespace, &registry, "SELECT code FROM demo.airport ORDER BY code DESC").unwrap();
        let codes: Vec<&str> = (0..ordered.len()).filter_map(|i| ordered.value(i, "code")).collect();
        assert_eq!(codes, vec!["SFO", "PHL", "ORD", "BOS", "AUS"]);
    }

    #[test]
    fn test_query_errors() {
        let (namespace, registry) = loaded();
        let unknown_table = run(&namespace, &registry, "SELECT name FROM demo.gate");
        assert!(matches!(unknown_table, Err(DriverError::Query(msg)) if msg.contains("Table not found")));

        let serial = run(&namespace, &registry, "SELECT city FROM demo.location");
        assert!(matches!(serial, Err(DriverError::Query(_))));

        let unknown_column = run(&namespace, &registry, "SELECT runways FROM demo.airport");
        assert!(matches!(unknown_column, Err(DriverError::Query(msg)) if msg.contains("runways")));
    }

    #[test]
    fn test_table_requires_import() {
        let registry = quickstart_registry();
        let namespace = Namespace::in_memory("User");
        let result = run(&namespace, &registry, "SELECT name FROM demo.airport");
        assert!(matches!(result, Err(DriverError::Query(_))));
    }
}
