//! EntryStore CLI - Command-line interface for the audited entry store
//!
//! Provides commands for:
//! - Adding, reading, updating and deleting entries
//! - Listing entries, whole or paged
//! - Processing a JSON-lines request stream
//! - Inspecting configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod output;

use commands::{
    config::ConfigCommand,
    consume::ConsumeCommand,
    entry::{AddCommand, DeleteCommand, GetCommand, UpdateCommand},
    list::ListCommand,
};
use context::{load_config, AppContext};
use entrystore_core::config::LoggingConfig;
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "entrystore", version, about = "Audited key/value entry store")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use alternate database file
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a new entry
    Add(AddCommand),
    /// Show an entry and its audit trail
    Get(GetCommand),
    /// Replace an entry's key and payload
    Update(UpdateCommand),
    /// Delete an entry
    Delete(DeleteCommand),
    /// List entries
    List(ListCommand),
    /// Process JSON-lines requests from stdin
    Consume(ConsumeCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Sets up tracing on stderr, keeping stdout for command output
fn init_tracing(logging: &LoggingConfig, verbose: u8) {
    let filter = match verbose {
        0 => logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    if let Commands::Config(cmd) = &cli.command {
        init_tracing(&LoggingConfig::default(), cli.verbose);
        return cmd.execute(cli.config.as_ref(), format).await;
    }

    let (config, config_path) = load_config(cli.config.as_ref())?;
    init_tracing(&config.logging, cli.verbose);
    tracing::debug!(config_path = %config_path.display(), "Configuration loaded");

    let ctx = AppContext::open(config, cli.database.clone()).await?;

    match &cli.command {
        Commands::Add(cmd) => cmd.execute(&ctx, format).await,
        Commands::Get(cmd) => cmd.execute(&ctx, format).await,
        Commands::Update(cmd) => cmd.execute(&ctx, format).await,
        Commands::Delete(cmd) => cmd.execute(&ctx, format).await,
        Commands::List(cmd) => cmd.execute(&ctx, format).await,
        Commands::Consume(cmd) => cmd.execute(&ctx, format).await,
        Commands::Config(_) => Ok(()),
    }
}
