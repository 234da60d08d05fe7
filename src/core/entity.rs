//! Entity flattening and reconstruction
//!
//! Records are stored as endpoints (path/value pairs) sharing a common
//! prefix. This module turns a record tree into endpoints and rebuilds
//! the tree from the endpoints found under a prefix.

use std::collections::BTreeMap;
use std::fmt;
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use super::path::{Path, Subscript};
use super::errors::{Result, StoreError};
use super::store::PathStore;

/// A record tree whose leaves are the string values kept in a global
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// Absent value, never stored
    Null,
    /// Leaf value
    Value(String),
    /// Object with named fields
    Object(BTreeMap<String, Entity>),
}

impl Entity {
    /// Convert a serializable record into an entity
    pub fn from_record<T: Serialize>(record: &T) -> Result<Entity> {
        let json = serde_json::to_value(record)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        Ok(Entity::from(json))
    }

    /// Convert the entity back into a typed record
    pub fn into_record<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_value(self.to_json())
            .map_err(|e| StoreError::SerializationError(e.to_string()))
    }

    /// Look up a direct field of an object entity
    pub fn field(&self, name: &str) -> Option<&Entity> {
        match self {
            Entity::Object(fields) => fields.get(name),
            _ => None,
        }
    }

    /// The leaf value, if this entity is one
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Entity::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Entity::Object(_))
    }

    /// Render the entity as JSON with string leaves
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Entity::Null => serde_json::Value::Null,
            Entity::Value(v) => serde_json::Value::String(v.clone()),
            Entity::Object(fields) => serde_json::Value::Object(
                fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Flatten the entity into endpoints rooted at `base`
    pub fn flatten(&self, base: &Path) -> Vec<(Path, String)> {
        let mut endpoints = Vec::new();
        self.flatten_into(base, &mut endpoints);
        endpoints
    }

    fn flatten_into(&self, base: &Path, endpoints: &mut Vec<(Path, String)>) {
        match self {
            Entity::Null => {}
            Entity::Value(v) => endpoints.push((base.clone(), v.clone())),
            Entity::Object(fields) => {
                for (name, field) in fields {
                    field.flatten_into(&base.child(name), endpoints);
                }
            }
        }
    }
}

/// Scalars become string leaves, arrays become objects keyed 1..n
impl From<serde_json::Value> for Entity {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Entity::Null,
            serde_json::Value::Bool(b) => Entity::Value(b.to_string()),
            serde_json::Value::Number(n) => Entity::Value(n.to_string()),
            serde_json::Value::String(s) => Entity::Value(s),
            serde_json::Value::Array(items) => Entity::Object(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| ((i + 1).to_string(), Entity::from(item)))
                    .collect(),
            ),
            serde_json::Value::Object(map) => Entity::Object(
                map.into_iter().map(|(k, v)| (k, Entity::from(v))).collect(),
            ),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Null => write!(f, "null"),
            Entity::Value(v) => write!(f, "{}", v),
            Entity::Object(_) => write!(f, "{}", self.to_json()),
        }
    }
}

/// Insert a value into the appropriate place in the entity
fn insert_into_entity(
    entity: &mut BTreeMap<String, Entity>,
    subscripts: &[Subscript],
    value: String,
) -> Result<()> {
    let (first, rest) = subscripts
        .split_first()
        .ok_or_else(|| StoreError::InvalidOperation("Empty subscripts".to_string()))?;
    let key = first.as_str().to_string();

    if rest.is_empty() {
        entity.insert(key, Entity::Value(value));
        return Ok(());
    }

    let nested = entity
        .entry(key)
        .or_insert_with(|| Entity::Object(BTreeMap::new()));

    match nested {
        Entity::Object(fields) => insert_into_entity(fields, rest, value),
        _ => Err(StoreError::InvalidOperation(format!(
            "Cannot insert beneath {}: expected object, found value",
            first
        ))),
    }
}

/// Reconstruct an entity from the endpoints stored under a prefix
pub fn reconstruct_entity<S: PathStore + ?Sized>(store: &S, prefix: &Path) -> Result<Entity> {
    let endpoints = store.descendants(prefix)?;

    if endpoints.is_empty() {
        return Err(StoreError::NotFound(prefix.clone()));
    }

    if endpoints.len() == 1 && &endpoints[0].0 == prefix {
        return Ok(Entity::Value(endpoints[0].1.clone()));
    }

    let mut result = BTreeMap::new();

    for (path, value) in endpoints {
        if &path == prefix {
            warn!("Ignoring value at {} shadowed by its children", prefix);
            continue;
        }
        insert_into_entity(&mut result, &path.subscripts()[prefix.len()..], value)?;
    }

    Ok(Entity::Object(result))
}
