//! Satchel - session state storage with expiry
//!
//! Main entry point for the Satchel CLI.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

mod commands;

use commands::{destroy, gc, get, init, inspect, put, set, vars};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Satchel - session state storage with expiry
#[derive(Parser)]
#[command(name = "satchel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Load configuration from this file instead of discovering it
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Session database path (overrides [database].path)
    #[arg(long, global = true, env = "SATCHEL_DATABASE")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the session table if it does not exist
    Init(init::InitArgs),

    /// Print the value of a live session record
    Get(get::GetArgs),

    /// Store a value for a session id
    Put(put::PutArgs),

    /// Delete a session record
    Destroy(destroy::DestroyArgs),

    /// Show a record's expiry, even if it has expired
    Inspect(inspect::InspectArgs),

    /// Remove expired session records
    Gc(gc::GcArgs),

    /// Print a session's variables as JSON
    Vars(vars::VarsArgs),

    /// Set one session variable
    Set(set::SetArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing: console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "satchel=debug,satchel_session=debug,satchel_config=debug,info"
    } else {
        "satchel=info,satchel_session=info,warn"
    };

    let log_dir = satchel_config::user_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "satchel.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "satchel=trace,satchel_session=trace,satchel_config=trace,info",
                )),
        )
        .init();

    // Resolve configuration
    let (config, config_sources) = match &cli.config {
        Some(path) => {
            let config = satchel_config::load_config_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            (config, vec![path.clone()])
        }
        None => {
            let loaded = satchel_config::load_config(None)?;
            for warning in &loaded.warnings {
                warn!("{}", warning);
            }
            let sources = loaded
                .loaded_from()
                .into_iter()
                .map(Path::to_path_buf)
                .collect();
            (loaded.config, sources)
        }
    };
    debug!(sources = ?config_sources, "Configuration resolved");

    let database = match cli.database {
        Some(path) => path,
        None => config.database_path()?,
    };

    // Create context for commands
    let ctx = commands::Context {
        config,
        config_sources,
        database,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Init(args) => init::run(args, &ctx),
        Commands::Get(args) => get::run(args, &ctx),
        Commands::Put(args) => put::run(args, &ctx),
        Commands::Destroy(args) => destroy::run(args, &ctx),
        Commands::Inspect(args) => inspect::run(args, &ctx),
        Commands::Gc(args) => gc::run(args, &ctx),
        Commands::Vars(args) => vars::run(args, &ctx),
        Commands::Set(args) => set::run(args, &ctx),
    }
}
