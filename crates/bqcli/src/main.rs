use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bqcli::bigquery::BigQueryService;
use bqcli::config::Config;
use bqcli::pager::Pager;
use bqcli::repl::Repl;
use bqcli::session::Session;

/// Interactive SQL shell for BigQuery.
///
/// Enter submits a buffer that ends with `;` or starts with `\`. Settings
/// are read from ~/.config/bqcli/config.toml. Set RUST_LOG to enable
/// logging and BQCLI_LOG_FORMAT=json for JSON lines.
#[derive(Parser)]
#[command(name = "bqcli", version, about, long_about)]
struct Cli {}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let log_format = std::env::var("BQCLI_LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}

fn run() -> Result<()> {
    let config = Config::new()?;
    config
        .prepare()
        .with_context(|| format!("failed to create {}", config.dir_path().display()))?;
    let settings = config.load_settings()?;

    let service = BigQueryService::connect(&settings)?;
    println!(
        "bqcli {} (project: {})",
        env!("CARGO_PKG_VERSION"),
        service.project()
    );

    let color = settings.color && io::stdout().is_terminal();
    let session = Session::new(Arc::new(service), Pager::new(settings.pager));
    let mut repl = Repl::new(session, &config, color)?;
    repl.run()
}

fn main() {
    Cli::parse();
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
