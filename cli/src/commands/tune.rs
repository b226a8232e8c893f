// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use gca_cortex::application::{connect_model, open_memory, Reconstruction, StrengthTuner};

use super::load_manifest;

#[derive(Args)]
pub struct TuneArgs {
    /// Prompt the probes continue
    #[arg(value_name = "PROMPT")]
    pub prompt: String,

    /// Skill whose direction is injected
    #[arg(short, long, value_name = "NAME")]
    pub skill: String,
}

pub async fn execute(args: TuneArgs, config_path: Option<PathBuf>) -> Result<()> {
    let manifest = load_manifest(config_path)?;
    let memory = open_memory(&manifest)?;

    let direction = match memory.reconstruct(&args.skill) {
        Reconstruction::Vector(v) => v,
        Reconstruction::NotFound => anyhow::bail!("Skill '{}' not found", args.skill),
        Reconstruction::Unavailable => anyhow::bail!("Skill '{}' cannot be reconstructed; is the basis loaded?", args.skill),
    };
    let layer = memory
        .record(&args.skill)
        .map(|r| r.layer)
        .unwrap_or(manifest.spec.memory.layer);

    let tuner = StrengthTuner::new(connect_model(&manifest)?, manifest.spec.tuner.clone())
        .context("Invalid tuner configuration")?;
    let outcome = tuner
        .tune(&args.prompt, &direction, layer)
        .await
        .context("Strength tuning failed")?;

    for probe in &outcome.probes {
        let status = if probe.collapsed {
            "collapsed".red()
        } else {
            "ok".green()
        };
        println!("  strength {:>5.1}  ratio {:.3}  {}", probe.strength, probe.ratio, status);
    }
    println!("{} strength {}", "→".green(), outcome.strength.to_string().bold());

    Ok(())
}
