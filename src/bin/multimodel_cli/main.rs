mod app;
mod context;
mod commands;
mod formatters;
mod prompt;

use anyhow::Result;
use clap::Parser;
use log::{info, LevelFilter};

fn main() -> Result<()> {
    let cli = app::Cli::parse();

    // RUST_LOG still overrides the -v flags
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    info!("Starting multimodel CLI");

    let result = app::run(cli);

    info!("Multimodel CLI finished");

    result
}
