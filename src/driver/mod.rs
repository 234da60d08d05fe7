//! Database driver interface
//!
//! A driver opens connections; a connection exposes the three access
//! patterns over one namespace: objects, SQL and native globals.

pub mod embedded;
pub mod objects;

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::core::definition::DefinitionState;
use crate::core::entity::Entity;
use crate::core::errors::{DriverError, DriverResult};
use crate::core::path::{Path, Subscript};
use crate::model::Persistent;
use crate::sql::ResultSet;

pub use embedded::{EmbeddedConnection, EmbeddedDriver};

/// Where and as whom to connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub namespace: String,
    pub user: String,
    pub password: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            host: "localhost".to_string(),
            port: 51773,
            namespace: "User".to_string(),
            user: "SuperUser".to_string(),
            password: "SYS".to_string(),
        }
    }
}

/// Settings of the embedded database engine
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Port the engine answers on
    pub port: u16,
    /// Directory holding one sled database per namespace; memory when `None`
    pub data_dir: Option<PathBuf>,
    /// Accepted user/password pairs
    pub credentials: BTreeMap<String, String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        let mut credentials = BTreeMap::new();
        credentials.insert("SuperUser".to_string(), "SYS".to_string());

        DriverConfig {
            port: 51773,
            data_dir: None,
            credentials,
        }
    }
}

/// Opens connections
pub trait Driver {
    type Connection: Connection;

    fn connect(&self, config: &ConnectionConfig) -> DriverResult<Self::Connection>;
}

/// An open session against one namespace
pub trait Connection {
    /// Make a known schema available for objects and SQL
    fn import_schema(&mut self, schema_name: &str) -> DriverResult<()>;

    /// Remove every stored object of a schema
    fn delete_extent(&mut self, schema_name: &str) -> DriverResult<()>;

    /// Store records of a type, returning their new ids
    fn store_objects(&mut self, type_name: &str, objects: &[Entity]) -> DriverResult<Vec<u64>>;

    /// Load every stored record of a type in id order
    fn fetch_objects(&mut self, type_name: &str) -> DriverResult<Vec<(u64, Entity)>>;

    /// Run a SQL statement
    fn execute_query(&mut self, sql: &str) -> DriverResult<ResultSet>;

    fn set_path(&mut self, global: &str, path: &Path, value: &str) -> DriverResult<()>;

    fn get_path(&mut self, global: &str, path: &Path) -> DriverResult<String>;

    fn is_path_defined(&mut self, global: &str, path: &Path) -> DriverResult<DefinitionState>;

    /// Subscripts one level below a path
    fn children(&mut self, global: &str, path: &Path) -> DriverResult<Vec<Subscript>>;

    /// Remove a node and its subtree, returning the number of removed entries
    fn kill_path(&mut self, global: &str, path: &Path) -> DriverResult<usize>;

    /// Names of the globals holding data in the namespace
    fn globals(&mut self) -> DriverResult<Vec<String>>;

    fn is_open(&self) -> bool;

    /// Release the connection; closing twice is a no-op
    fn close(&mut self) -> DriverResult<()>;
}

/// Store typed records through the object adapter
pub fn store_records<C, T>(connection: &mut C, records: &[T]) -> DriverResult<Vec<u64>>
where
    C: Connection + ?Sized,
    T: Persistent,
{
    let entities = records
        .iter()
        .map(Entity::from_record)
        .collect::<Result<Vec<_>, _>>()?;

    connection.store_objects(&T::schema().name, &entities)
}

/// Load typed records through the object adapter
pub fn load_records<C, T>(connection: &mut C) -> DriverResult<Vec<(u64, T)>>
where
    C: Connection + ?Sized,
    T: Persistent,
{
    connection
        .fetch_objects(&T::schema().name)?
        .into_iter()
        .map(|(id, entity)| {
            entity
                .into_record()
                .map(|record| (id, record))
                .map_err(|e| DriverError::Persistence(format!("Record {} is unreadable: {}", id, e)))
        })
        .collect()
}
