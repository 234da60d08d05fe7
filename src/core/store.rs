use crate::core::definition::DefinitionState;
use crate::core::path::{Path, Subscript};
use crate::core::errors::{Result, StoreError};

/// Trait defining the operations of a sparse path store (one global)
pub trait PathStore: Send + Sync {
    /// Set a value at exactly the given path
    fn set(&mut self, path: Path, value: String) -> Result<()>;

    /// Get the value stored at exactly the given path
    fn get(&self, path: &Path) -> Result<String>;

    /// Report what exists at and beneath the given path
    fn is_defined(&self, path: &Path) -> Result<DefinitionState>;

    /// Remove the value at the given path and everything beneath it,
    /// returning the number of removed entries
    fn kill(&mut self, path: &Path) -> Result<usize>;

    /// Get every entry at or beneath a prefix, in collation order
    fn descendants(&self, prefix: &Path) -> Result<Vec<(Path, String)>>;

    /// Count the number of entries in the store
    fn count(&self) -> Result<usize>;

    /// Remove every entry
    fn clear(&mut self) -> Result<()>;

    /// Flush changes (for persistent stores)
    fn flush(&self) -> Result<()>;

    /// List the distinct subscripts one level below a prefix
    fn children(&self, prefix: &Path) -> Result<Vec<Subscript>> {
        let depth = prefix.len();
        let mut children: Vec<Subscript> = Vec::new();

        for (path, _) in self.descendants(prefix)? {
            if let Some(subscript) = path.subscript(depth) {
                // descendants are sorted, so duplicates are adjacent
                if children.last() != Some(subscript) {
                    children.push(subscript.clone());
                }
            }
        }

        Ok(children)
    }
}

/// Reject the empty path for operations that address a single node
pub(crate) fn ensure_addressable(path: &Path, operation: &str) -> Result<()> {
    if path.is_empty() {
        return Err(StoreError::InvalidOperation(format!("Cannot {} at empty path", operation)));
    }
    Ok(())
}
