// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use gca_cortex::application::{connect_model, open_memory, GeometricRouter};
use gca_cortex::domain::GenerationService;

use super::load_manifest;

#[derive(Args)]
pub struct RouteArgs {
    /// Prompt to embed and route
    #[arg(value_name = "PROMPT", required_unless_present = "embedding")]
    pub prompt: Option<String>,

    /// Route a precomputed embedding (JSON array of floats) instead of a prompt
    #[arg(long, value_name = "FILE", conflicts_with = "prompt")]
    pub embedding: Option<PathBuf>,

    /// Print every skill's score
    #[arg(long)]
    pub all: bool,
}

pub async fn execute(args: RouteArgs, config_path: Option<PathBuf>) -> Result<()> {
    let manifest = load_manifest(config_path)?;
    let memory = open_memory(&manifest)?;
    let router = GeometricRouter::new(memory, manifest.spec.router.min_confidence);

    let embedding: Vec<f32> = match (&args.embedding, &args.prompt) {
        (Some(path), _) => {
            let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
            serde_json::from_str(&raw).with_context(|| format!("{:?} is not a JSON array of numbers", path))?
        }
        (None, Some(prompt)) => connect_model(&manifest)?
            .embed(prompt)
            .await
            .context("Failed to embed prompt")?,
        (None, None) => anyhow::bail!("Either PROMPT or --embedding is required"),
    };

    if args.all {
        for (skill, score) in router.scores(&embedding) {
            println!("  {:<24} {:>8.4}", skill, score);
        }
    }

    match router.route(&embedding) {
        Some(matched) => println!("{} {} (score {:.4})", "→".green(), matched.skill.bold(), matched.score),
        None => println!(
            "{}",
            format!("No skill above confidence {}", router.min_confidence()).yellow()
        ),
    }

    Ok(())
}
