//! multimodel: objects, SQL and native globals over one database
//!
//! Records are stored as path-value endpoints in sparse hierarchical
//! globals (`^AIRPORT("BOS","AUS") = 1698`). The same records can be
//! read back as typed objects or queried with SQL.

pub mod core;
pub mod storage;
pub mod model;
pub mod driver;
pub mod sql;
pub mod airfare;

pub use crate::core::path::{GlobalRef, Path, Subscript};
pub use crate::core::definition::DefinitionState;
pub use crate::core::entity::Entity;
pub use crate::core::store::PathStore;
pub use crate::core::errors::{DriverError, DriverResult, Result, StoreError};
pub use crate::driver::{Connection, ConnectionConfig, Driver, DriverConfig, EmbeddedConnection, EmbeddedDriver};
pub use crate::sql::ResultSet;
