// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use gca_cortex::application::{Pilot, PilotOutcome};

use super::load_manifest;

#[derive(Args)]
pub struct RunArgs {
    /// Request to handle
    #[arg(value_name = "PROMPT")]
    pub prompt: String,

    /// Print the run as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let manifest = load_manifest(config_path)?;
    let pilot = Pilot::from_manifest(&manifest)?;

    let run = pilot.run(&args.prompt).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
        return Ok(());
    }

    println!("Run {}", run.run_id.to_string().dimmed());
    match &run.outcome {
        PilotOutcome::NoSkill => {
            println!("{}", "No skill matched; nothing to steer.".yellow());
        }
        PilotOutcome::TextOnly { skill, strength, text } => {
            println!("Skill {} at strength {}", skill.bold(), strength);
            println!();
            println!("{}", text);
        }
        PilotOutcome::Blocked {
            skill,
            request,
            verdict,
            ..
        } => {
            println!("Skill {} proposed {}", skill.bold(), request.kind);
            println!("{}", request.content.dimmed());
            println!("{}", format!("✗ BLOCKED: {}", verdict.reason).red());
        }
        PilotOutcome::Approved {
            skill,
            request,
            verdict,
            output,
            ..
        } => {
            println!("Skill {} proposed {}", skill.bold(), request.kind);
            println!("{}", request.content);
            println!("{}", format!("✓ APPROVED: {}", verdict.reason).green());
            if let Some(output) = output {
                println!();
                println!("{}", output);
            }
        }
    }

    Ok(())
}
