// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # GCA Pilot CLI
//!
//! The `gca` binary drives skill memory, routing, strength tuning and the
//! risk gate against a model server.
//!
//! ## Commands
//!
//! - `gca skill list|show|learn` - Inspect and learn skills
//! - `gca route` - Route a prompt or raw embedding to a skill
//! - `gca tune` - Calibrate steering strength for a skill
//! - `gca evaluate` - Score a batch of actions (exit code 2 when blocked)
//! - `gca run` - Full pipeline for one prompt
//! - `gca health` - Check skill memory and the model server
//! - `gca config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use gca_cli::commands::{self, ConfigCommand, EvaluateArgs, RouteArgs, RunArgs, SkillCommand, TuneArgs};
use gca_cortex::domain::pilot_config::PilotConfigManifest;

/// GCA Pilot - geometric skill routing with a risk gate
#[derive(Parser)]
#[command(name = "gca")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, env = "GCA_CONFIG_PATH", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error) [default: config, else warn]
    #[arg(long, global = true, env = "GCA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (text, json) [default: config, else text]
    #[arg(long, global = true, env = "GCA_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Skill memory operations
    #[command(name = "skill")]
    Skill {
        #[command(subcommand)]
        command: SkillCommand,
    },

    /// Route a prompt to a skill
    #[command(name = "route")]
    Route(RouteArgs),

    /// Calibrate steering strength for a skill
    #[command(name = "tune")]
    Tune(TuneArgs),

    /// Evaluate a batch of actions against the risk gate
    #[command(name = "evaluate")]
    Evaluate(EvaluateArgs),

    /// Run the full pipeline for one prompt
    #[command(name = "run")]
    Run(RunArgs),

    /// Check skill memory and model server reachability
    #[command(name = "health")]
    Health,

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging is not up yet, so the config is peeked at silently here and
    // loaded again (with logs) by the command.
    let configured = PilotConfigManifest::load_or_default(cli.config.clone())
        .ok()
        .and_then(|m| m.spec.observability)
        .and_then(|o| o.logging);
    let level = cli
        .log_level
        .clone()
        .or_else(|| configured.as_ref().map(|l| l.level.clone()))
        .unwrap_or_else(|| "warn".to_string());
    let format = cli
        .log_format
        .clone()
        .or_else(|| configured.map(|l| l.format))
        .unwrap_or_else(|| "text".to_string());
    init_logging(&level, &format)?;

    match cli.command {
        Some(Commands::Skill { command }) => commands::skill::handle_command(command, cli.config).await,
        Some(Commands::Route(args)) => commands::route::execute(args, cli.config).await,
        Some(Commands::Tune(args)) => commands::tune::execute(args, cli.config).await,
        Some(Commands::Evaluate(args)) => {
            let approved = commands::evaluate::execute(args, cli.config).await?;
            if !approved {
                std::process::exit(2);
            }
            Ok(())
        }
        Some(Commands::Run(args)) => commands::run::execute(args, cli.config).await,
        Some(Commands::Health) => commands::health::execute(cli.config).await,
        Some(Commands::Config { command }) => commands::config::handle_command(command, cli.config).await,
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        "json" => builder.json().init(),
        "text" => builder.with_target(false).compact().init(),
        other => anyhow::bail!("Unknown log format '{}'. Use 'text' or 'json'", other),
    }

    Ok(())
}
