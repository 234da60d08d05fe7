pub mod demo;
pub mod global;
pub mod query;
