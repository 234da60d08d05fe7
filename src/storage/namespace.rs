//! Namespaces of named globals
//!
//! A namespace hands out the store behind each global name, creating it
//! on first use. Memory namespaces keep one `MemoryStore` per global,
//! sled namespaces keep one tree per global inside a single database.

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::{debug, info};
use sled::Db;

use crate::core::errors::{Result, StoreError};
use crate::core::path::validate_global_name;
use crate::core::store::PathStore;
use super::{MemoryStore, PersistentStore};

enum Backend {
    Memory,
    Sled(Db),
}

/// A set of globals sharing one backend
pub struct Namespace {
    name: String,
    backend: Backend,
    globals: BTreeMap<String, Box<dyn PathStore>>,
}

impl Namespace {
    /// Create a namespace whose globals live in memory
    pub fn in_memory<S: Into<String>>(name: S) -> Self {
        Namespace {
            name: name.into(),
            backend: Backend::Memory,
            globals: BTreeMap::new(),
        }
    }

    /// Open (or create) a sled-backed namespace in the given directory
    pub fn open<S: Into<String>, P: Into<PathBuf>>(name: S, dir: P) -> Result<Self> {
        let name = name.into();
        let dir = dir.into();
        let db = sled::open(&dir)
            .map_err(|e| StoreError::Internal(format!("Failed to open database: {}", e)))?;
        info!("Opened namespace {} at {}", name, dir.display());

        Namespace::from_db(name, db)
    }

    /// Build a namespace over an already opened sled database, picking up
    /// the globals it holds
    pub fn from_db<S: Into<String>>(name: S, db: Db) -> Result<Self> {
        let name = name.into();
        let mut namespace = Namespace {
            name,
            backend: Backend::Sled(db),
            globals: BTreeMap::new(),
        };
        namespace.load_existing()?;

        Ok(namespace)
    }

    /// The namespace name
    pub fn name(&self) -> &str {
        &self.name
    }

    fn load_existing(&mut self) -> Result<()> {
        let Backend::Sled(db) = &self.backend else {
            return Ok(());
        };

        let mut opened: Vec<(String, Box<dyn PathStore>)> = Vec::new();
        for tree_name in db.tree_names() {
            let Ok(global) = String::from_utf8(tree_name.to_vec()) else {
                continue;
            };
            // skips sled's own default tree
            if validate_global_name(&global).is_err() {
                continue;
            }
            let tree = db.open_tree(&tree_name)
                .map_err(|e| StoreError::Internal(format!("Failed to open global {}: {}", global, e)))?;
            opened.push((global, Box::new(PersistentStore::from_tree(tree))));
        }

        debug!("Namespace {}: found {} existing globals", self.name, opened.len());
        self.globals.extend(opened);
        Ok(())
    }

    /// Get the store behind a global, creating the global if needed
    pub fn global(&mut self, name: &str) -> Result<&mut dyn PathStore> {
        validate_global_name(name)?;

        if !self.globals.contains_key(name) {
            let store: Box<dyn PathStore> = match &self.backend {
                Backend::Memory => Box::new(MemoryStore::new()),
                Backend::Sled(db) => {
                    let tree = db.open_tree(name)
                        .map_err(|e| StoreError::Internal(format!("Failed to open global {}: {}", name, e)))?;
                    Box::new(PersistentStore::from_tree(tree))
                }
            };
            debug!("Namespace {}: created global ^{}", self.name, name);
            self.globals.insert(name.to_string(), store);
        }

        let store: &mut dyn PathStore = self.globals
            .get_mut(name)
            .ok_or_else(|| StoreError::Internal(format!("Global {} vanished", name)))?
            .as_mut();
        Ok(store)
    }

    /// Get a global for reading, without creating it
    pub fn existing(&self, name: &str) -> Option<&dyn PathStore> {
        self.globals.get(name).map(|store| store.as_ref())
    }

    /// Names of the globals that currently hold data
    pub fn globals(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for (name, store) in &self.globals {
            if store.count()? > 0 {
                names.push(name.clone());
            }
        }
        Ok(names)
    }

    /// Flush every global to its backend
    pub fn flush(&self) -> Result<()> {
        for store in self.globals.values() {
            store.flush()?;
        }
        if let Backend::Sled(db) = &self.backend {
            db.flush()
                .map_err(|e| StoreError::Internal(format!("Failed to flush database: {}", e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::path::Path;
    use tempfile::tempdir;

    #[test]
    fn test_memory_globals_are_separate() {
        let mut namespace = Namespace::in_memory("User");
        namespace.global("AIRPORT").unwrap().set(Path::from(["BOS"]), "1".to_string()).unwrap();
        namespace.global("FARES").unwrap().set(Path::from(["BOS"]), "2".to_string()).unwrap();

        assert_eq!(namespace.global("AIRPORT").unwrap().get(&Path::from(["BOS"])).unwrap(), "1");
        assert_eq!(namespace.existing("FARES").unwrap().get(&Path::from(["BOS"])).unwrap(), "2");
        assert!(namespace.existing("EMPTY").is_none());
        assert_eq!(namespace.globals().unwrap(), vec!["AIRPORT".to_string(), "FARES".to_string()]);
    }

    #[test]
    fn test_invalid_global_name() {
        let mut namespace = Namespace::in_memory("User");
        assert!(matches!(namespace.global("^bad"), Err(StoreError::PathError(_))));
    }

    #[test]
    fn test_sled_globals_reload() {
        let dir = tempdir().unwrap();
        {
            let mut namespace = Namespace::open("User", dir.path()).unwrap();
            namespace.global("Demo.Airport").unwrap()
                .set(Path::from(["1", "code"]), "BOS".to_string()).unwrap();
            namespace.flush().unwrap();
        }

        let namespace = Namespace::open("User", dir.path()).unwrap();
        let global = namespace.existing("Demo.Airport").unwrap();
        assert_eq!(global.get(&Path::from(["1", "code"])).unwrap(), "BOS");
    }
}
