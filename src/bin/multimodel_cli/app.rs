use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::context::Context;
use crate::formatters::OutputFormat;

#[derive(Parser)]
#[command(name = "multimodel")]
#[command(about = "Objects, SQL and native globals side by side", long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format (text, json, table)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the data lives and how to log in
#[derive(Args)]
pub struct ConnectionArgs {
    /// Database host
    #[arg(long, env = "MULTIMODEL_HOST", default_value = "localhost")]
    pub host: String,

    /// Database port
    #[arg(long, env = "MULTIMODEL_PORT", default_value_t = 51773)]
    pub port: u16,

    /// Namespace to connect to
    #[arg(short, long, env = "MULTIMODEL_NAMESPACE", default_value = "User")]
    pub namespace: String,

    /// User name
    #[arg(short, long, env = "MULTIMODEL_USER", default_value = "SuperUser")]
    pub user: String,

    /// Password
    #[arg(long, env = "MULTIMODEL_PASSWORD", default_value = "SYS", hide_env_values = true)]
    pub password: String,

    /// Directory holding the namespaces
    #[arg(short, long, env = "MULTIMODEL_DATA_DIR", default_value = "multimodel-data")]
    pub data_dir: PathBuf,

    /// Keep everything in memory (nothing survives the process)
    #[arg(long)]
    pub in_memory: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store the sample airports, list them with SQL and optionally look up airfare
    Demo {
        /// Also store the airfare global and look up a route
        #[arg(long)]
        airfare: bool,

        /// Departure airport (prompted for when missing)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Destination airport (prompted for when missing)
        #[arg(long, requires = "from")]
        to: Option<String>,
    },

    /// Set a node, e.g. '^AIRPORT("BOS","AUS")' 1698
    Set {
        global: String,
        value: String,
    },

    /// Get the value of a node
    Get {
        global: String,
    },

    /// Show what exists at and beneath a node
    Defined {
        global: String,
    },

    /// List the subscripts one level below a node
    Children {
        global: String,
    },

    /// Remove a node and everything beneath it
    Kill {
        global: String,
    },

    /// List the globals holding data
    Globals,

    /// Run a SQL SELECT
    Query {
        sql: String,
    },
}

/// Run the CLI application
pub fn run(cli: Cli) -> Result<()> {
    let context = Context::new(&cli.connection, cli.format);

    match cli.command {
        Commands::Demo { airfare, from, to } => {
            let route = from.zip(to);
            commands::demo::execute(&context, airfare, route)
        }
        Commands::Set { global, value } => commands::global::set(&context, &global, &value),
        Commands::Get { global } => commands::global::get(&context, &global),
        Commands::Defined { global } => commands::global::defined(&context, &global),
        Commands::Children { global } => commands::global::children(&context, &global),
        Commands::Kill { global } => commands::global::kill(&context, &global),
        Commands::Globals => commands::global::list(&context),
        Commands::Query { sql } => commands::query::execute(&context, &sql),
    }
}
