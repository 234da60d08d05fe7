//! Object adapter
//!
//! Records of a persistent schema live in the global named after the
//! schema, one subtree per record id: `^Demo.Airport(1,"location","city")`.
//! The last id handed out is kept at `^Extent.Ids(<schema>)` and imported
//! schemas are listed at `^Catalog(<schema>, ordinal) = column`.

use log::{debug, info, warn};

use crate::core::entity::{reconstruct_entity, Entity};
use crate::core::errors::{DriverError, DriverResult, StoreError};
use crate::core::path::Path;
use crate::model::{ColumnKind, Schema, SchemaRegistry};
use crate::storage::Namespace;

pub const CATALOG_GLOBAL: &str = "Catalog";
pub const ID_GLOBAL: &str = "Extent.Ids";

/// Record a schema as imported
pub fn import_schema(namespace: &mut Namespace, registry: &SchemaRegistry, name: &str) -> DriverResult<()> {
    let schema = registry
        .find(name)
        .ok_or_else(|| DriverError::Schema(format!("Unknown schema: {}", name)))?;

    let catalog = namespace.global(CATALOG_GLOBAL)?;
    let root = Path::from([schema.name.as_str()]);
    catalog.kill(&root)?;
    for (ordinal, column) in schema.columns.iter().enumerate() {
        catalog.set(root.child((ordinal + 1) as u64), column.name.clone())?;
    }

    info!("Imported schema {}", schema.name);
    Ok(())
}

/// Check whether a schema has been imported into the namespace
pub fn is_imported(namespace: &Namespace, schema_name: &str) -> DriverResult<bool> {
    let Some(catalog) = namespace.existing(CATALOG_GLOBAL) else {
        return Ok(false);
    };
    Ok(catalog.is_defined(&Path::from([schema_name]))?.is_defined())
}

/// Resolve a schema that is known and imported
pub fn imported_schema<'r>(
    namespace: &Namespace,
    registry: &'r SchemaRegistry,
    name: &str,
) -> DriverResult<Option<&'r Schema>> {
    match registry.find(name) {
        Some(schema) if is_imported(namespace, &schema.name)? => Ok(Some(schema)),
        _ => Ok(None),
    }
}

/// Remove every record of a schema and reset its ids
pub fn delete_extent(namespace: &mut Namespace, registry: &SchemaRegistry, name: &str) -> DriverResult<()> {
    let schema = registry
        .find(name)
        .ok_or_else(|| DriverError::Schema(format!("Unknown schema: {}", name)))?;

    let removed = namespace.global(&schema.name)?.count()?;
    namespace.global(&schema.name)?.clear()?;
    namespace.global(ID_GLOBAL)?.kill(&Path::from([schema.name.as_str()]))?;

    info!("Deleted extent {} ({} entries)", schema.name, removed);
    Ok(())
}

/// Validate and store records, returning their new ids
pub fn store_objects(
    namespace: &mut Namespace,
    registry: &SchemaRegistry,
    type_name: &str,
    records: &[Entity],
) -> DriverResult<Vec<u64>> {
    let schema = registry
        .find(type_name)
        .ok_or_else(|| DriverError::Persistence(format!("Unknown type: {}", type_name)))?;

    if schema.embeddable {
        return Err(DriverError::Persistence(format!(
            "{} is a serial type and can only be stored inside another record",
            schema.name
        )));
    }
    for needed in std::iter::once(schema.name.as_str()).chain(schema.embedded_schemas()) {
        if !is_imported(namespace, needed)? {
            return Err(DriverError::Persistence(format!("Schema {} has not been imported", needed)));
        }
    }
    for (index, record) in records.iter().enumerate() {
        validate(record, schema, registry)
            .map_err(|reason| DriverError::Persistence(format!("Record {}: {}", index + 1, reason)))?;
    }

    let counter = Path::from([schema.name.as_str()]);
    let first_id = match namespace.global(ID_GLOBAL)?.get(&counter) {
        Ok(value) => value
            .parse::<u64>()
            .map_err(|_| DriverError::Persistence(format!("Corrupt id counter for {}: {}", schema.name, value)))?,
        Err(StoreError::NotFound(_)) => 0,
        Err(e) => return Err(e.into()),
    };

    // reserve the ids before any record is written
    let ids: Vec<u64> = (first_id + 1..=first_id + records.len() as u64).collect();
    if let Some(last_id) = ids.last() {
        namespace.global(ID_GLOBAL)?.set(counter, last_id.to_string())?;
    }

    let extent = namespace.global(&schema.name)?;
    for (id, record) in ids.iter().zip(records) {
        for (path, value) in record.flatten(&Path::from([*id])) {
            extent.set(path, value)?;
        }
    }

    debug!("Stored {} {} records", ids.len(), schema.name);
    Ok(ids)
}

/// Load every record of a schema in id order
pub fn fetch_objects(
    namespace: &Namespace,
    registry: &SchemaRegistry,
    type_name: &str,
) -> DriverResult<Vec<(u64, Entity)>> {
    let schema = registry
        .find(type_name)
        .ok_or_else(|| DriverError::Persistence(format!("Unknown type: {}", type_name)))?;

    let Some(extent) = namespace.existing(&schema.name) else {
        return Ok(Vec::new());
    };

    let mut records = Vec::new();
    for subscript in extent.children(&Path::new())? {
        let Some(id) = subscript.as_number().and_then(|n| u64::try_from(n).ok()) else {
            warn!("Skipping non-record node {} in extent {}", subscript, schema.name);
            continue;
        };
        let entity = reconstruct_entity(extent, &Path::from([id]))?;
        records.push((id, entity));
    }

    Ok(records)
}

/// Check a record against its schema
fn validate(record: &Entity, schema: &Schema, registry: &SchemaRegistry) -> Result<(), String> {
    let Entity::Object(fields) = record else {
        return Err(format!("expected an object for {}", schema.name));
    };

    for (name, value) in fields {
        let column = schema
            .columns
            .iter()
            .find(|c| &c.name == name)
            .ok_or_else(|| format!("{} has no column {}", schema.name, name))?;

        match (&column.kind, value) {
            (_, Entity::Null) | (ColumnKind::Scalar, Entity::Value(_)) => {}
            (ColumnKind::Scalar, Entity::Object(_)) => {
                return Err(format!("column {} expects a value, found an object", name));
            }
            (ColumnKind::Embedded(embedded), _) => {
                let embedded_schema = registry
                    .find(embedded)
                    .ok_or_else(|| format!("unknown embedded schema {}", embedded))?;
                validate(value, embedded_schema, registry)?;
            }
        }
    }

    Ok(())
}
