pub mod path;
pub mod definition;
pub mod store;
pub mod errors;
pub mod entity;

pub use path::{GlobalRef, Path, Subscript};
pub use definition::DefinitionState;
pub use store::PathStore;
pub use entity::Entity;
pub use errors::{DriverError, DriverResult, Result, StoreError};
