pub mod formatter;
pub mod text;
pub mod json;
pub mod table;

pub use formatter::Formatter;
use clap::ValueEnum;

/// Available output formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text
    Text,

    /// JSON
    Json,

    /// Tables
    Table,
}
