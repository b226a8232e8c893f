// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for GCA CLI

use anyhow::{Context, Result};
use std::path::PathBuf;

use gca_cortex::domain::pilot_config::PilotConfigManifest;

pub mod config;
pub mod evaluate;
pub mod health;
pub mod route;
pub mod run;
pub mod skill;
pub mod tune;

pub use self::config::ConfigCommand;
pub use self::evaluate::EvaluateArgs;
pub use self::route::RouteArgs;
pub use self::run::RunArgs;
pub use self::skill::SkillCommand;
pub use self::tune::TuneArgs;

/// Discovers, loads and validates the pilot configuration.
pub fn load_manifest(config_path: Option<PathBuf>) -> Result<PilotConfigManifest> {
    let manifest = PilotConfigManifest::load_or_default(config_path).context("Failed to load configuration")?;
    manifest.validate().context("Configuration validation failed")?;
    Ok(manifest)
}
