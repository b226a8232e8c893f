// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Skill memory commands
//!
//! Commands: list, show, learn

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gca_cortex::application::{connect_model, open_memory, Reconstruction, SkillLearner};
use gca_cortex::domain::geometry::l2_norm;
use gca_cortex::domain::SkillMetadata;
use gca_cortex::infrastructure::LoggingEventBus;

use super::load_manifest;

#[derive(Subcommand)]
pub enum SkillCommand {
    /// List registered skills
    List,

    /// Show one skill's record
    Show {
        /// Skill name (case-insensitive)
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Learn a skill from example texts
    Learn {
        /// Skill name (case-insensitive)
        #[arg(value_name = "NAME")]
        name: String,

        /// Example text (repeatable)
        #[arg(short, long = "example", value_name = "TEXT")]
        examples: Vec<String>,

        /// File with one example per line
        #[arg(long, value_name = "FILE")]
        examples_file: Option<PathBuf>,
    },
}

pub async fn handle_command(command: SkillCommand, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        SkillCommand::List => list(config_path).await,
        SkillCommand::Show { name } => show(config_path, &name).await,
        SkillCommand::Learn {
            name,
            examples,
            examples_file,
        } => learn(config_path, &name, examples, examples_file.as_deref()).await,
    }
}

async fn list(config_path: Option<PathBuf>) -> Result<()> {
    let manifest = load_manifest(config_path)?;
    let memory = open_memory(&manifest)?;

    if memory.is_degraded() {
        println!(
            "{}",
            format!(
                "⚠ Basis {} unavailable; routing is disabled",
                manifest.spec.memory.basis_path.display()
            )
            .yellow()
        );
    }

    let records = memory.records();
    if records.is_empty() {
        println!("No skills registered.");
        return Ok(());
    }

    println!("{:<24} {:>6} {:>6} {:>9}", "NAME".bold(), "RANK".bold(), "LAYER".bold(), "STRENGTH".bold());
    for record in records {
        println!(
            "{:<24} {:>6} {:>6} {:>9.2}",
            record.name,
            record.coefficients.len(),
            record.layer,
            record.default_strength
        );
    }

    Ok(())
}

async fn show(config_path: Option<PathBuf>, name: &str) -> Result<()> {
    let manifest = load_manifest(config_path)?;
    let memory = open_memory(&manifest)?;

    let Some(record) = memory.record(name) else {
        println!("{}", format!("Skill '{}' not found", name).red());
        return Ok(());
    };

    println!("{}", record.name.bold());
    println!("  Layer: {}", record.layer);
    println!("  Default strength: {}", record.default_strength);
    println!("  Coefficients ({}): {:?}", record.coefficients.len(), record.coefficients);
    match memory.reconstruct(name) {
        Reconstruction::Vector(v) => {
            println!("  Direction: dim {}, norm {:.4}", v.len(), l2_norm(&v));
        }
        Reconstruction::NotFound | Reconstruction::Unavailable => {
            println!("  Direction: {}", "(unavailable)".dimmed());
        }
    }

    Ok(())
}

fn read_examples(mut examples: Vec<String>, file: Option<&Path>) -> Result<Vec<String>> {
    if let Some(path) = file {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read examples from {:?}", path))?;
        examples.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        );
    }
    Ok(examples)
}

async fn learn(config_path: Option<PathBuf>, name: &str, examples: Vec<String>, file: Option<&Path>) -> Result<()> {
    let examples = read_examples(examples, file)?;
    let manifest = load_manifest(config_path)?;
    let memory = open_memory(&manifest)?;

    let metadata = SkillMetadata {
        layer: manifest.spec.memory.layer,
        default_strength: manifest.spec.memory.default_strength,
    };
    let learner = SkillLearner::new(connect_model(&manifest)?, memory, Arc::new(LoggingEventBus::new()), metadata);

    println!("Learning {} from {} example(s)...", name.bold(), examples.len());
    let record = learner.learn(name, &examples).await.context("Failed to learn skill")?;

    println!(
        "{}",
        format!(
            "✓ Skill {} saved to {}",
            record.name,
            manifest.spec.memory.registry_path.display()
        )
        .green()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_examples_merges_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examples.txt");
        std::fs::write(&path, "SELECT * FROM users\n\n  list all orders  \n").unwrap();

        let examples = read_examples(vec!["count rows".to_string()], Some(&path)).unwrap();
        assert_eq!(examples, vec!["count rows", "SELECT * FROM users", "list all orders"]);
    }
}
