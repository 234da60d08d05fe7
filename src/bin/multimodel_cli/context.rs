use anyhow::{Context as _, Result};
use multimodel::driver::{ConnectionConfig, Driver, DriverConfig, EmbeddedConnection, EmbeddedDriver};
use multimodel::model::quickstart_registry;

use crate::app::ConnectionArgs;
use crate::formatters::{Formatter, OutputFormat};
use crate::formatters::json::JsonFormatter;
use crate::formatters::table::TableFormatter;
use crate::formatters::text::TextFormatter;

/// CLI execution context
pub struct Context {
    /// Embedded database engine
    driver: EmbeddedDriver,

    /// Where and as whom to connect
    connection: ConnectionConfig,

    /// Current formatter
    formatter: Box<dyn Formatter>,
}

impl Context {
    /// Create a new context
    pub fn new(args: &ConnectionArgs, format: OutputFormat) -> Self {
        let formatter: Box<dyn Formatter> = match format {
            OutputFormat::Text => Box::new(TextFormatter::new()),
            OutputFormat::Json => Box::new(JsonFormatter::new()),
            OutputFormat::Table => Box::new(TableFormatter::new()),
        };

        let driver_config = DriverConfig {
            data_dir: if args.in_memory { None } else { Some(args.data_dir.clone()) },
            ..DriverConfig::default()
        };

        Context {
            driver: EmbeddedDriver::new(driver_config, quickstart_registry()),
            connection: ConnectionConfig {
                host: args.host.clone(),
                port: args.port,
                namespace: args.namespace.clone(),
                user: args.user.clone(),
                password: args.password.clone(),
            },
            formatter,
        }
    }

    /// Open a connection with the configured settings
    pub fn connect(&self) -> Result<EmbeddedConnection> {
        self.driver
            .connect(&self.connection)
            .with_context(|| format!("Cannot connect to {}:{}", self.connection.host, self.connection.port))
    }

    /// Namespace being used
    pub fn namespace(&self) -> &str {
        &self.connection.namespace
    }

    /// Get the current formatter
    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }
}
