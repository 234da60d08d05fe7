// src/storage/persistent.rs

use std::path::PathBuf;

use bincode::{serialize, deserialize};
use log::debug;
use sled::{Batch, Db, Tree};

use crate::core::definition::DefinitionState;
use crate::core::path::{Path, Subscript};
use crate::core::errors::{Result, StoreError};
use crate::core::store::{ensure_addressable, PathStore};

/// Terminates every encoded subscript
const SUBSCRIPT_END: [u8; 2] = [0x00, 0x01];
/// Stands for a literal zero byte inside a subscript
const ESCAPED_ZERO: [u8; 2] = [0x00, 0xFF];

/// A persistent global backed by one sled tree
///
/// Keys are encoded so that the encoding of a path is a byte prefix of the
/// encoding of each of its extensions, which makes subtree scans a plain
/// `scan_prefix`. Byte order is not collation order, so listings are
/// sorted after the scan.
#[derive(Clone)]
pub struct PersistentStore {
    tree: Tree,
    /// Database opened by `open`, held so its lock lives as long as the store
    db: Option<Db>,
}

impl PersistentStore {
    /// Wrap an already opened sled tree
    pub fn from_tree(tree: Tree) -> Self {
        PersistentStore { tree, db: None }
    }

    /// Open a standalone persistent global at the given directory
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let db = sled::open(path.into())
            .map_err(|e| StoreError::Internal(format!("Failed to open database: {}", e)))?;

        Ok(PersistentStore {
            tree: (*db).clone(),
            db: Some(db),
        })
    }

    fn scan(&self, prefix: &Path) -> Result<Vec<(Path, String)>> {
        let mut pairs = Vec::new();

        for item in self.tree.scan_prefix(encode_path(prefix)) {
            let (key, value) = item
                .map_err(|e| StoreError::Internal(format!("Failed to scan global: {}", e)))?;
            pairs.push((decode_path(&key)?, decode_value(&value)?));
        }

        pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(pairs)
    }
}

impl PathStore for PersistentStore {
    fn set(&mut self, path: Path, value: String) -> Result<()> {
        ensure_addressable(&path, "set value")?;
        debug!("PersistentStore: set {} = {}", path, value);

        let value_bytes = serialize(&value)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;

        self.tree.insert(encode_path(&path), value_bytes)
            .map_err(|e| StoreError::Internal(format!("Failed to insert data: {}", e)))?;

        Ok(())
    }

    fn get(&self, path: &Path) -> Result<String> {
        ensure_addressable(path, "get value")?;

        let value_bytes = self.tree.get(encode_path(path))
            .map_err(|e| StoreError::Internal(format!("Failed to retrieve data: {}", e)))?
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;

        decode_value(&value_bytes)
    }

    fn is_defined(&self, path: &Path) -> Result<DefinitionState> {
        ensure_addressable(path, "check definition")?;

        let key = encode_path(path);
        let has_value = self.tree.contains_key(&key)
            .map_err(|e| StoreError::Internal(format!("Failed to check key: {}", e)))?;

        let mut has_children = false;
        for item in self.tree.scan_prefix(&key).keys() {
            let found = item
                .map_err(|e| StoreError::Internal(format!("Failed to scan global: {}", e)))?;
            if found.as_ref() != key.as_slice() {
                has_children = true;
                break;
            }
        }

        Ok(DefinitionState::from_parts(has_value, has_children))
    }

    fn kill(&mut self, path: &Path) -> Result<usize> {
        ensure_addressable(path, "kill")?;

        let mut batch = Batch::default();
        let mut removed = 0;
        for item in self.tree.scan_prefix(encode_path(path)).keys() {
            let key = item
                .map_err(|e| StoreError::Internal(format!("Failed to scan global: {}", e)))?;
            batch.remove(key);
            removed += 1;
        }

        self.tree.apply_batch(batch)
            .map_err(|e| StoreError::Internal(format!("Failed to delete data: {}", e)))?;
        debug!("PersistentStore: killed {} entries under {}", removed, path);

        Ok(removed)
    }

    fn descendants(&self, prefix: &Path) -> Result<Vec<(Path, String)>> {
        self.scan(prefix)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.tree.len())
    }

    fn clear(&mut self) -> Result<()> {
        self.tree.clear()
            .map_err(|e| StoreError::Internal(format!("Failed to clear global: {}", e)))
    }

    fn flush(&self) -> Result<()> {
        self.tree.flush()
            .map_err(|e| StoreError::Internal(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }
}

pub(crate) fn encode_path(path: &Path) -> Vec<u8> {
    let mut key = Vec::new();
    for subscript in path.subscripts() {
        for &byte in subscript.as_str().as_bytes() {
            if byte == 0 {
                key.extend_from_slice(&ESCAPED_ZERO);
            } else {
                key.push(byte);
            }
        }
        key.extend_from_slice(&SUBSCRIPT_END);
    }
    key
}

fn decode_path(key: &[u8]) -> Result<Path> {
    let corrupt = || StoreError::SerializationError(format!("Corrupt key: {:?}", key));
    let mut path = Path::new();
    let mut current = Vec::new();
    let mut bytes = key.iter();

    while let Some(&byte) = bytes.next() {
        if byte != 0 {
            current.push(byte);
            continue;
        }
        match bytes.next() {
            Some(0xFF) => current.push(0),
            Some(0x01) => {
                let subscript = String::from_utf8(std::mem::take(&mut current))
                    .map_err(|_| corrupt())?;
                path.push(Subscript::new(subscript));
            }
            _ => return Err(corrupt()),
        }
    }

    if !current.is_empty() {
        return Err(corrupt());
    }
    Ok(path)
}

fn decode_value(bytes: &[u8]) -> Result<String> {
    deserialize(bytes).map_err(|e| StoreError::SerializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> PersistentStore {
        let config = sled::Config::new().temporary(true);
        let db = config.open().unwrap();
        PersistentStore::from_tree(db.open_tree("AIRPORT").unwrap())
    }

    #[test]
    fn test_key_encoding() {
        let path = Path::from(["BOS", "A\0B"]);
        let key = encode_path(&path);
        assert_eq!(decode_path(&key).unwrap(), path);

        let prefix = encode_path(&Path::from(["BOS"]));
        assert!(key.starts_with(&prefix));
        assert!(!encode_path(&Path::from(["BOSX"])).starts_with(&prefix));
    }

    #[test]
    fn test_scenario() {
        let mut store = store();
        store.set(Path::from(["BOS", "AUS"]), "1698".to_string()).unwrap();
        store.set(Path::from(["BOS", "AUS", "AA150"]), "450".to_string()).unwrap();
        store.set(Path::from(["BOS", "AUS", "AA290"]), "550".to_string()).unwrap();

        let route = Path::from(["BOS", "AUS"]);
        assert_eq!(store.is_defined(&route).unwrap(), DefinitionState::ValueAndChildren);
        assert_eq!(store.get(&route).unwrap(), "1698");
        assert_eq!(
            store.is_defined(&Path::from(["BOS", "AUS", "AA150"])).unwrap(),
            DefinitionState::ValueOnly
        );
        assert_eq!(store.is_defined(&Path::from(["BOS"])).unwrap(), DefinitionState::ChildrenOnly);
        assert_eq!(store.is_defined(&Path::from(["BOS", "AU"])).unwrap(), DefinitionState::Undefined);
    }

    #[test]
    fn test_not_found_and_overwrite() {
        let mut store = store();
        store.set(Path::from(["BOS", "PHL", "UA110"]), "200".to_string()).unwrap();
        assert!(matches!(store.get(&Path::from(["BOS", "PHL"])), Err(StoreError::NotFound(_))));

        store.set(Path::from(["BOS", "PHL", "UA110"]), "210".to_string()).unwrap();
        assert_eq!(store.get(&Path::from(["BOS", "PHL", "UA110"])).unwrap(), "210");
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_children_sorted_by_collation() {
        let mut store = store();
        for id in ["1", "2", "10"] {
            store.set(Path::from([id, "code"]), format!("C{}", id)).unwrap();
        }

        let children = store.children(&Path::new()).unwrap();
        let ids: Vec<&str> = children.iter().map(|s| s.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "10"]);
    }

    #[test]
    fn test_kill_and_clear() {
        let mut store = store();
        store.set(Path::from(["BOS", "BIS", "AA330"]), "700".to_string()).unwrap();
        store.set(Path::from(["BOS", "BIS", "UA208"]), "710".to_string()).unwrap();
        store.set(Path::from(["BOS", "PHL", "UA110"]), "200".to_string()).unwrap();

        assert_eq!(store.kill(&Path::from(["BOS", "BIS"])).unwrap(), 2);
        assert_eq!(store.count().unwrap(), 1);

        store.clear().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_values_survive_reopening_the_tree() {
        let dir = tempdir().unwrap();
        let db = sled::open(dir.path().join("db")).unwrap();
        {
            let mut store = PersistentStore::from_tree(db.open_tree("AIRPORT").unwrap());
            store.set(Path::from(["BOS", "AUS"]), "1698".to_string()).unwrap();
            store.flush().unwrap();
        }

        let store = PersistentStore::from_tree(db.open_tree("AIRPORT").unwrap());
        assert!(store.db.is_none());
        assert_eq!(store.get(&Path::from(["BOS", "AUS"])).unwrap(), "1698");
    }

    #[test]
    fn test_open_keeps_database_handle() {
        let dir = tempdir().unwrap();
        let mut store = PersistentStore::open(dir.path().join("db")).unwrap();
        assert!(store.db.is_some());

        store.set(Path::from(["BOS", "PHL", "UA110"]), "200".to_string()).unwrap();
        store.flush().unwrap();

        // clones share the same open database
        let copy = store.clone();
        drop(store);
        assert_eq!(copy.get(&Path::from(["BOS", "PHL", "UA110"])).unwrap(), "200");
        assert!(copy.db.is_some());
    }
}
