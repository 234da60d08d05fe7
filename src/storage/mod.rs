pub mod memory;
pub mod persistent;
pub mod namespace;

pub use memory::MemoryStore;
pub use persistent::PersistentStore;
pub use namespace::Namespace;
