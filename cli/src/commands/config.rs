// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use gca_cortex::domain::pilot_config::PilotConfigManifest;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective configuration as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./gca-config.yaml)
        #[arg(short, long, default_value = "./gca-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let config =
        PilotConfigManifest::load_or_default(config_override.clone()).context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. GCA_CONFIG_PATH: {}",
            std::env::var("GCA_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./gca-config.yaml");
        println!("  4. ~/.gca/config.yaml");
        println!("  5. /etc/gca/config.yaml");
        println!();
    }

    if as_yaml {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    let spec = &config.spec;
    println!("{}", "Current configuration:".bold());
    println!("  Name: {}", config.metadata.name);
    println!();

    println!("{}", "Skill Memory:".bold());
    println!("  Basis: {}", spec.memory.basis_path.display());
    println!("  Registry: {}", spec.memory.registry_path.display());
    println!("  Layer: {}", spec.memory.layer);
    println!("  Default strength: {}", spec.memory.default_strength);
    println!();

    println!("{}", "Router:".bold());
    println!("  Min confidence: {}", spec.router.min_confidence);
    println!();

    println!("{}", "Auto-Tuner:".bold());
    println!("  Ladder: {:?}", spec.tuner.ladder);
    println!("  Collapse threshold: {}", spec.tuner.collapse_threshold);
    println!("  Probe tokens: {}", spec.tuner.probe_tokens);
    if let Some(timeout) = spec.tuner.probe_timeout_ms {
        println!("  Probe timeout: {} ms", timeout);
    }
    println!();

    println!("{}", "Risk Gate:".bold());
    println!("  Threshold: {}", spec.moral.threshold);
    println!();

    println!("{}", "Model Server:".bold());
    println!("  Endpoint: {}", spec.generation.endpoint);
    println!("  Model: {}", spec.generation.model);
    println!(
        "  Budget: {} tokens @ temperature {}",
        spec.generation.max_tokens, spec.generation.temperature
    );
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = PilotConfigManifest::load_or_default(config_path).context("Failed to load configuration")?;

    config.validate().context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    };

    std::fs::write(&output, sample).with_context(|| format!("Failed to write config to {:?}", output))?;

    println!("{}", format!("✓ Configuration generated: {}", output.display()).green());

    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_templates_are_valid() {
        for template in [
            include_str!("../../templates/config-minimal.yaml"),
            include_str!("../../templates/config-with-examples.yaml"),
        ] {
            let manifest = gca_cortex::domain::pilot_config::PilotConfigManifest::from_yaml_str(template).unwrap();
            manifest.validate().unwrap();
        }
    }
}
