//! In-memory store for multimodel
//!
//! This module provides a simple in-memory implementation of a global,
//! mapping paths to values in collation order.

use std::collections::BTreeMap;
use std::ops::Bound;
use crate::core::definition::DefinitionState;
use crate::core::path::Path;
use crate::core::errors::{Result, StoreError};
use crate::core::store::{ensure_addressable, PathStore};

/// An in-memory global
///
/// Paths order lexicographically by subscript, so every extension of a
/// path sits in one contiguous run right after the path itself.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Map of paths to values
    data: BTreeMap<Path, String>,
}

impl MemoryStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        MemoryStore {
            data: BTreeMap::new(),
        }
    }

    fn subtree<'a>(&'a self, prefix: &'a Path) -> impl Iterator<Item = (&'a Path, &'a String)> + 'a {
        self.data
            .range(prefix.clone()..)
            .take_while(move |(path, _)| path.starts_with(prefix))
    }
}

impl PathStore for MemoryStore {
    fn set(&mut self, path: Path, value: String) -> Result<()> {
        ensure_addressable(&path, "set value")?;

        self.data.insert(path, value);
        Ok(())
    }

    fn get(&self, path: &Path) -> Result<String> {
        ensure_addressable(path, "get value")?;

        self.data.get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.clone()))
    }

    fn is_defined(&self, path: &Path) -> Result<DefinitionState> {
        ensure_addressable(path, "check definition")?;

        let has_value = self.data.contains_key(path);
        let has_children = self.data
            .range((Bound::Excluded(path.clone()), Bound::Unbounded))
            .next()
            .map_or(false, |(next, _)| path.is_strict_prefix_of(next));

        Ok(DefinitionState::from_parts(has_value, has_children))
    }

    fn kill(&mut self, path: &Path) -> Result<usize> {
        ensure_addressable(path, "kill")?;

        let doomed: Vec<Path> = self.subtree(path).map(|(p, _)| p.clone()).collect();
        for p in &doomed {
            self.data.remove(p);
        }

        Ok(doomed.len())
    }

    fn descendants(&self, prefix: &Path) -> Result<Vec<(Path, String)>> {
        let pairs = self.subtree(prefix)
            .map(|(p, v)| (p.clone(), v.clone()))
            .collect();

        Ok(pairs)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.data.len())
    }

    fn clear(&mut self) -> Result<()> {
        self.data.clear();
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // No-op for in-memory store
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::path::Subscript;

    fn set(store: &mut MemoryStore, path: &[&str], value: &str) {
        store.set(Path::from(path.to_vec()), value.to_string()).unwrap();
    }

    #[test]
    fn test_set_then_get() {
        let mut store = MemoryStore::new();
        set(&mut store, &["BOS", "AUS"], "1698");

        assert_eq!(store.get(&Path::from(["BOS", "AUS"])).unwrap(), "1698");
    }

    #[test]
    fn test_last_write_wins_and_isolation() {
        let mut store = MemoryStore::new();
        set(&mut store, &["BOS", "AUS"], "1698");
        set(&mut store, &["BOS", "AUS", "AA150"], "450");
        set(&mut store, &["BOS", "AUS"], "1700");

        assert_eq!(store.get(&Path::from(["BOS", "AUS"])).unwrap(), "1700");
        assert_eq!(store.get(&Path::from(["BOS", "AUS", "AA150"])).unwrap(), "450");
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_get_never_set() {
        let mut store = MemoryStore::new();
        set(&mut store, &["BOS", "AUS", "AA150"], "450");

        // no fallback to children or prefixes
        assert!(matches!(store.get(&Path::from(["BOS", "AUS"])), Err(StoreError::NotFound(_))));
        assert!(matches!(store.get(&Path::from(["BOS"])), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_definition_states() {
        let mut store = MemoryStore::new();
        let route = Path::from(["BOS", "AUS"]);
        assert_eq!(store.is_defined(&route).unwrap(), DefinitionState::Undefined);

        set(&mut store, &["BOS", "AUS"], "1698");
        assert_eq!(store.is_defined(&route).unwrap(), DefinitionState::ValueOnly);

        set(&mut store, &["BOS", "AUS", "AA150"], "450");
        assert_eq!(store.is_defined(&route).unwrap(), DefinitionState::ValueAndChildren);

        let mut children_only = MemoryStore::new();
        set(&mut children_only, &["BOS", "AUS", "AA150"], "450");
        assert_eq!(children_only.is_defined(&route).unwrap(), DefinitionState::ChildrenOnly);
    }

    #[test]
    fn test_sibling_is_not_a_child() {
        let mut store = MemoryStore::new();
        set(&mut store, &["BOS", "AUSX"], "1");
        set(&mut store, &["BOS", "AUS2", "X"], "2");

        assert_eq!(store.is_defined(&Path::from(["BOS", "AUS"])).unwrap(), DefinitionState::Undefined);
    }

    #[test]
    fn test_empty_path_rejected() {
        let mut store = MemoryStore::new();
        assert!(matches!(store.set(Path::new(), "x".to_string()), Err(StoreError::InvalidOperation(_))));
        assert!(matches!(store.get(&Path::new()), Err(StoreError::InvalidOperation(_))));
        assert!(matches!(store.is_defined(&Path::new()), Err(StoreError::InvalidOperation(_))));
    }

    #[test]
    fn test_kill_subtree() {
        let mut store = MemoryStore::new();
        set(&mut store, &["BOS", "AUS"], "1698");
        set(&mut store, &["BOS", "AUS", "AA150"], "450");
        set(&mut store, &["BOS", "AUS", "AA290"], "550");
        set(&mut store, &["BOS", "PHL", "UA110"], "200");

        assert_eq!(store.kill(&Path::from(["BOS", "AUS"])).unwrap(), 3);
        assert_eq!(store.kill(&Path::from(["BOS", "AUS"])).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.is_defined(&Path::from(["BOS"])).unwrap(), DefinitionState::ChildrenOnly);
    }

    #[test]
    fn test_children_in_collation_order() {
        let mut store = MemoryStore::new();
        set(&mut store, &["10", "name"], "ten");
        set(&mut store, &["2", "name"], "two");
        set(&mut store, &["2", "code"], "TWO");
        set(&mut store, &["next"], "11");

        let children = store.children(&Path::new()).unwrap();
        assert_eq!(children, vec![Subscript::from("2"), Subscript::from("10"), Subscript::from("next")]);

        let fields = store.children(&Path::from(["2"])).unwrap();
        assert_eq!(fields, vec![Subscript::from("code"), Subscript::from("name")]);
    }
}
