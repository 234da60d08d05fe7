//! Embedded driver
//!
//! Serves connections from inside the process. Host and port are only
//! checked against the local configuration; no socket is ever opened.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};

use crate::core::definition::DefinitionState;
use crate::core::entity::Entity;
use crate::core::errors::{DriverError, DriverResult, StoreError};
use crate::core::path::{validate_global_name, GlobalRef, Path, Subscript};
use crate::core::store::PathStore;
use crate::model::{quickstart_registry, SchemaRegistry};
use crate::sql::{self, ResultSet};
use crate::storage::{MemoryStore, Namespace};
use super::{objects, Connection, ConnectionConfig, Driver, DriverConfig};

const LOCAL_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

/// A database engine living in the current process
pub struct EmbeddedDriver {
    config: DriverConfig,
    registry: Arc<SchemaRegistry>,
    /// Opened namespaces keyed by upper-cased name
    namespaces: Mutex<HashMap<String, Arc<Mutex<Namespace>>>>,
}

impl EmbeddedDriver {
    pub fn new(config: DriverConfig, registry: SchemaRegistry) -> Self {
        if registry.is_empty() {
            warn!("Driver started without any schema; only native globals are usable");
        } else {
            debug!("Driver knows {} schemas", registry.len());
        }
        EmbeddedDriver {
            config,
            registry: Arc::new(registry),
            namespaces: Mutex::new(HashMap::new()),
        }
    }

    /// A memory-backed driver knowing the quickstart schemas
    pub fn in_memory() -> Self {
        EmbeddedDriver::new(DriverConfig::default(), quickstart_registry())
    }

    fn namespace(&self, name: &str) -> DriverResult<Arc<Mutex<Namespace>>> {
        let key = name.to_ascii_uppercase();
        let mut namespaces = self.namespaces
            .lock()
            .map_err(|_| DriverError::Connection("Namespace table is poisoned".to_string()))?;

        if let Some(namespace) = namespaces.get(&key) {
            return Ok(Arc::clone(namespace));
        }

        let namespace = match &self.config.data_dir {
            Some(dir) => Namespace::open(name, dir.join(&key))
                .map_err(|e| DriverError::Connection(format!("Cannot open namespace {}: {}", name, e)))?,
            None => Namespace::in_memory(name),
        };
        let namespace = Arc::new(Mutex::new(namespace));
        namespaces.insert(key, Arc::clone(&namespace));

        Ok(namespace)
    }
}

impl Driver for EmbeddedDriver {
    type Connection = EmbeddedConnection;

    fn connect(&self, config: &ConnectionConfig) -> DriverResult<EmbeddedConnection> {
        if !LOCAL_HOSTS.contains(&config.host.to_ascii_lowercase().as_str()) {
            return Err(DriverError::Connection(format!(
                "Cannot reach {}:{}: only local connections are served",
                config.host, config.port
            )));
        }
        if config.port != self.config.port {
            return Err(DriverError::Connection(format!(
                "Connection refused on {}:{}",
                config.host, config.port
            )));
        }
        let valid_namespace = config.namespace.chars().next().map_or(false, |c| c.is_ascii_alphabetic())
            && config.namespace.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid_namespace {
            return Err(DriverError::Connection(format!("Invalid namespace: {:?}", config.namespace)));
        }
        if self.config.credentials.get(&config.user) != Some(&config.password) {
            return Err(DriverError::Connection(format!("Access denied for user {}", config.user)));
        }

        let namespace = self.namespace(&config.namespace)?;
        info!("Connected to namespace {} as {}", config.namespace, config.user);

        Ok(EmbeddedConnection {
            namespace,
            registry: Arc::clone(&self.registry),
            open: true,
        })
    }
}

/// A connection served by the embedded driver; dropping it closes it
pub struct EmbeddedConnection {
    namespace: Arc<Mutex<Namespace>>,
    registry: Arc<SchemaRegistry>,
    open: bool,
}

impl EmbeddedConnection {
    fn with_namespace<T>(&self, f: impl FnOnce(&mut Namespace) -> DriverResult<T>) -> DriverResult<T> {
        if !self.open {
            return Err(DriverError::Connection("Connection is closed".to_string()));
        }
        let mut namespace = self.namespace
            .lock()
            .map_err(|_| DriverError::Connection("Namespace is poisoned".to_string()))?;
        f(&mut namespace)
    }

    /// Read from a global without creating it; a missing global reads as empty
    fn read_global<T>(
        &self,
        global: &str,
        f: impl FnOnce(&dyn PathStore) -> Result<T, StoreError>,
    ) -> DriverResult<T> {
        validate_global_name(global)?;
        self.with_namespace(|namespace| {
            let empty = MemoryStore::new();
            let store = namespace.existing(global).unwrap_or(&empty);
            Ok(f(store)?)
        })
    }
}

impl Connection for EmbeddedConnection {
    fn import_schema(&mut self, schema_name: &str) -> DriverResult<()> {
        let registry = Arc::clone(&self.registry);
        self.with_namespace(|namespace| objects::import_schema(namespace, &registry, schema_name))
    }

    fn delete_extent(&mut self, schema_name: &str) -> DriverResult<()> {
        let registry = Arc::clone(&self.registry);
        self.with_namespace(|namespace| objects::delete_extent(namespace, &registry, schema_name))
    }

    fn store_objects(&mut self, type_name: &str, records: &[Entity]) -> DriverResult<Vec<u64>> {
        let registry = Arc::clone(&self.registry);
        self.with_namespace(|namespace| objects::store_objects(namespace, &registry, type_name, records))
    }

    fn fetch_objects(&mut self, type_name: &str) -> DriverResult<Vec<(u64, Entity)>> {
        let registry = Arc::clone(&self.registry);
        self.with_namespace(|namespace| objects::fetch_objects(namespace, &registry, type_name))
    }

    fn execute_query(&mut self, query: &str) -> DriverResult<ResultSet> {
        debug!("Executing query: {}", query);
        let registry = Arc::clone(&self.registry);
        self.with_namespace(|namespace| sql::execute_query(namespace, &registry, query))
    }

    fn set_path(&mut self, global: &str, path: &Path, value: &str) -> DriverResult<()> {
        self.with_namespace(|namespace| {
            namespace.global(global)?.set(path.clone(), value.to_string())?;
            Ok(())
        })
    }

    fn get_path(&mut self, global: &str, path: &Path) -> DriverResult<String> {
        self.read_global(global, |store| store.get(path)).map_err(|e| match e {
            DriverError::Store(StoreError::NotFound(path)) => DriverError::NotFound(GlobalRef {
                name: global.to_string(),
                path,
            }),
            other => other,
        })
    }

    fn is_path_defined(&mut self, global: &str, path: &Path) -> DriverResult<DefinitionState> {
        self.read_global(global, |store| store.is_defined(path))
    }

    fn children(&mut self, global: &str, path: &Path) -> DriverResult<Vec<Subscript>> {
        self.read_global(global, |store| store.children(path))
    }

    fn kill_path(&mut self, global: &str, path: &Path) -> DriverResult<usize> {
        self.with_namespace(|namespace| Ok(namespace.global(global)?.kill(path)?))
    }

    fn globals(&mut self) -> DriverResult<Vec<String>> {
        self.with_namespace(|namespace| Ok(namespace.globals()?))
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) -> DriverResult<()> {
        if !self.open {
            return Ok(());
        }
        let flushed = self.with_namespace(|namespace| Ok(namespace.flush()?));
        self.open = false;
        info!("Connection closed");
        flushed
    }
}

impl Drop for EmbeddedConnection {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Error closing connection: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{load_records, store_records};
    use crate::model::Airport;
    use tempfile::tempdir;

    fn connect(driver: &EmbeddedDriver) -> EmbeddedConnection {
        driver.connect(&ConnectionConfig::default()).unwrap()
    }

    #[test]
    fn test_connect_validation() {
        let driver = EmbeddedDriver::in_memory();
        let defaults = ConnectionConfig::default();

        let remote = ConnectionConfig { host: "db.example.com".to_string(), ..defaults.clone() };
        let wrong_port = ConnectionConfig { port: 1972, ..defaults.clone() };
        let bad_namespace = ConnectionConfig { namespace: "%SYS".to_string(), ..defaults.clone() };
        let bad_password = ConnectionConfig { password: "nope".to_string(), ..defaults.clone() };

        for config in [remote, wrong_port, bad_namespace, bad_password] {
            assert!(matches!(driver.connect(&config), Err(DriverError::Connection(_))));
        }
        assert!(driver.connect(&ConnectionConfig { host: "127.0.0.1".to_string(), ..defaults }).is_ok());
    }

    #[test]
    fn test_globals_lists_written_globals() {
        let driver = EmbeddedDriver::in_memory();
        let mut connection = connect(&driver);
        assert!(connection.globals().unwrap().is_empty());

        connection.set_path("AIRPORT", &Path::from(["BOS", "AUS"]), "1698").unwrap();
        connection.import_schema("Demo.Location").unwrap();
        // reading a missing global does not create it
        assert_eq!(connection.is_path_defined("FARES", &Path::from(["BOS"])).unwrap(), DefinitionState::Undefined);

        assert_eq!(connection.globals().unwrap(), vec!["AIRPORT".to_string(), "Catalog".to_string()]);
    }

    #[test]
    fn test_close_is_idempotent() {
        let driver = EmbeddedDriver::in_memory();
        let mut connection = connect(&driver);

        connection.close().unwrap();
        connection.close().unwrap();
        assert!(!connection.is_open());

        let result = connection.set_path("AIRPORT", &Path::from(["BOS"]), "1");
        assert!(matches!(result, Err(DriverError::Connection(_))));
    }

    #[test]
    fn test_native_scenario() {
        let driver = EmbeddedDriver::in_memory();
        let mut connection = connect(&driver);
        let route = Path::from(["BOS", "AUS"]);

        connection.set_path("AIRPORT", &route, "1698").unwrap();
        connection.set_path("AIRPORT", &route.child("AA150"), "450").unwrap();
        connection.set_path("AIRPORT", &route.child("AA290"), "550").unwrap();

        assert_eq!(connection.is_path_defined("AIRPORT", &route).unwrap(), DefinitionState::ValueAndChildren);
        assert_eq!(connection.get_path("AIRPORT", &route).unwrap(), "1698");
        assert_eq!(
            connection.children("AIRPORT", &route).unwrap(),
            vec![Subscript::from("AA150"), Subscript::from("AA290")]
        );
    }

    #[test]
    fn test_get_missing_reports_global_ref() {
        let driver = EmbeddedDriver::in_memory();
        let mut connection = connect(&driver);

        match connection.get_path("AIRPORT", &Path::from(["BOS", "SFO"])) {
            Err(DriverError::NotFound(global)) => {
                assert_eq!(global.to_string(), "^AIRPORT(\"BOS\",\"SFO\")");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert_eq!(
            connection.is_path_defined("NOSUCH", &Path::from(["X"])).unwrap(),
            DefinitionState::Undefined
        );
    }

    #[test]
    fn test_reconnect_sees_same_memory_namespace() {
        let driver = EmbeddedDriver::in_memory();
        {
            let mut first = connect(&driver);
            first.set_path("AIRPORT", &Path::from(["BOS", "PHL", "UA110"]), "200").unwrap();
        }

        let lowercase = ConnectionConfig { namespace: "user".to_string(), ..ConnectionConfig::default() };
        let mut second = driver.connect(&lowercase).unwrap();
        assert_eq!(second.get_path("AIRPORT", &Path::from(["BOS", "PHL", "UA110"])).unwrap(), "200");
    }

    #[test]
    fn test_objects_and_sql_share_records() {
        let driver = EmbeddedDriver::in_memory();
        let mut connection = connect(&driver);
        connection.delete_extent("Demo.Airport").unwrap();
        connection.import_schema("Demo.Airport").unwrap();
        connection.import_schema("Demo.Location").unwrap();

        let ids = store_records(&mut connection, &Airport::sample_set()).unwrap();
        assert_eq!(ids.len(), 5);

        let loaded: Vec<(u64, Airport)> = load_records(&mut connection).unwrap();
        assert_eq!(loaded[1].1, Airport::sample_set()[1]);

        let rows = connection.execute_query("SELECT name, code FROM demo.airport WHERE code = 'ORD'").unwrap();
        assert_eq!(rows.value(0, "name"), Some("O'hare International"));
    }

    #[test]
    fn test_import_unknown_schema() {
        let driver = EmbeddedDriver::in_memory();
        let mut connection = connect(&driver);
        assert!(matches!(connection.import_schema("Demo.Gate"), Err(DriverError::Schema(_))));
        assert!(matches!(connection.delete_extent("Demo.Gate"), Err(DriverError::Schema(_))));
    }

    #[test]
    fn test_sled_namespace_survives_driver_restart() {
        let dir = tempdir().unwrap();
        let config = DriverConfig { data_dir: Some(dir.path().to_path_buf()), ..DriverConfig::default() };
        {
            let driver = EmbeddedDriver::new(config.clone(), quickstart_registry());
            let mut connection = connect(&driver);
            connection.set_path("AIRPORT", &Path::from(["BOS", "AUS"]), "1698").unwrap();
            connection.close().unwrap();
        }

        let driver = EmbeddedDriver::new(config, quickstart_registry());
        let mut connection = connect(&driver);
        assert_eq!(connection.get_path("AIRPORT", &Path::from(["BOS", "AUS"])).unwrap(), "1698");
    }
}
