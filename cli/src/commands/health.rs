// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use gca_cortex::application::{connect_model, open_memory};
use gca_cortex::domain::GenerationService;

use super::load_manifest;

/// Reports skill memory state and model server reachability. Fails when the
/// model server does not answer its health endpoint.
pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let manifest = load_manifest(config_path)?;
    let memory = open_memory(&manifest)?;

    if memory.is_degraded() {
        println!(
            "{} skill memory: basis unavailable at {}",
            "⚠".yellow(),
            manifest.spec.memory.basis_path.display()
        );
    } else {
        println!("{} skill memory: {} skill(s)", "✓".green(), memory.len());
    }

    let endpoint = &manifest.spec.generation.endpoint;
    match connect_model(&manifest)?.health_check().await {
        Ok(()) => {
            println!("{} model server: {}", "✓".green(), endpoint);
            Ok(())
        }
        Err(e) => {
            println!("{} model server: {} ({})", "✗".red(), endpoint, e);
            anyhow::bail!("Model server at {} is unhealthy", endpoint)
        }
    }
}
