//! Tower CLI - review console for AI-authored drafts.
//!
//! Loads assistant proposals, walks an operator through approving, editing,
//! auto-filling or rejecting each one, and writes approved records to the
//! backend through the sanitize-and-persist pipeline.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod commands;
mod config_bridge;
mod theme;

use commands::{config, fields, preview, review, suggest};

/// Tower - Control Tower draft review console
#[derive(Parser)]
#[command(name = "tower")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to an additional configuration file
    #[arg(long, global = true, env = "TOWER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Review drafts from a proposals file interactively
    Review {
        /// JSON file with one proposal or an array of proposals
        file: PathBuf,

        /// Write to an in-memory backend instead of the configured gateway
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the payload each draft would persist
    Preview {
        /// JSON file with one proposal or an array of proposals
        file: PathBuf,
    },

    /// List the fields each record kind may persist
    Fields {
        /// Record kind (drop, broadcast, promo, stamp, member)
        kind: Option<String>,
    },

    /// Ask the assistant to suggest values for a record kind
    Suggest {
        /// Record kind (drop, broadcast, promo, stamp, member)
        kind: String,

        /// Free-form brief for the assistant
        #[arg(short, long)]
        context: Option<String>,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the resolved configuration (secrets omitted)
    Show {
        /// Output format: toml (default) or json
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved = tower_config::Config::load(cli.config.as_deref());

    // Set up logging from config, with --verbose override.
    let log_config = match &resolved {
        Ok(r) => {
            let mut lc = config_bridge::to_log_config(&r.config);
            if cli.verbose {
                "debug".clone_into(&mut lc.level);
            }
            lc
        },
        Err(_) => {
            // Fallback if config loading fails.
            let level = if cli.verbose { "debug" } else { "warn" };
            tower_telemetry::LogConfig::new(level)
        },
    };
    if let Err(e) = tower_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let resolved = resolved.context("Failed to load configuration")?;
    let cfg = &resolved.config;

    match cli.command {
        Commands::Review { file, dry_run } => {
            let gateway = config_bridge::to_gateway(&cfg.gateway, dry_run)?;
            let mut manager = tower_drafts::ReviewManager::new(
                Arc::new(tower_drafts::DraftStore::new()),
                gateway,
                tower_drafts::Dispatcher::new(config_bridge::to_dispatch_rules(&cfg.drafts)),
            );
            if let Some(assistant) = config_bridge::to_assistant(&cfg.assistant)? {
                manager = manager.with_assistant(assistant);
            }
            review::run_review(&manager, &file, dry_run).await?;
        },
        Commands::Preview { file } => {
            let dispatcher =
                tower_drafts::Dispatcher::new(config_bridge::to_dispatch_rules(&cfg.drafts));
            preview::run_preview(&dispatcher, &file)?;
        },
        Commands::Fields { kind } => {
            fields::show_fields(kind.as_deref())?;
        },
        Commands::Suggest { kind, context } => {
            let assistant = config_bridge::to_assistant(&cfg.assistant)?;
            suggest::run_suggest(assistant, &kind, context.as_deref()).await?;
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show { format } => config::show_config(&resolved, &format)?,
        },
    }

    Ok(())
}
