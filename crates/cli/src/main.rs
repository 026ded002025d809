//! greptile-mcp - MCP server for hosted code search
//!
//! This binary provides the command-line interface: it loads configuration,
//! composes the services and serves MCP over stdio.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use greptile_mcp::{build_services, log_filter, Config};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "greptile-mcp")]
#[command(about = "MCP server for Greptile code search and repository Q&A")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server on stdio (default)
    Serve,
    /// Load and validate the configuration, then print it with secrets redacted
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Serve) | None => serve(cli.config.as_deref()).await,
        Some(Commands::CheckConfig) => check_config(cli.config.as_deref()),
    }
}

/// Initialize logging on stderr; stdout carries the MCP protocol
fn init_logging(verbose: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Start the MCP server
async fn serve(config_path: Option<&Path>) -> Result<()> {
    info!("Preparing to start greptile-mcp server...");

    let config = load_config(config_path)?;
    let services = build_services(&config)?;

    greptile_mcp_server::run_mcp_server(
        services.search_api.clone(),
        services.store.clone(),
        config.defaults.clone(),
    )
    .await
    .context("MCP server failed")?;

    Ok(())
}

fn check_config(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    println!("Configuration is valid:\n{config:#?}");
    Ok(())
}
