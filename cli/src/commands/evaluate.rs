// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

use gca_cortex::application::MoralKernel;
use gca_cortex::domain::Action;

use super::load_manifest;

#[derive(Args)]
pub struct EvaluateArgs {
    /// JSON file holding an array of actions (or a single action)
    #[arg(value_name = "ACTIONS")]
    pub actions: PathBuf,

    /// Override the configured threshold
    #[arg(long)]
    pub threshold: Option<f64>,
}

/// Reads a JSON array of actions, or a single action object.
pub fn read_actions(path: &Path) -> Result<Vec<Action>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let invalid = || format!("{:?} does not hold valid actions", path);
    if raw.trim_start().starts_with('[') {
        serde_json::from_str(&raw).with_context(invalid)
    } else {
        let action: Action = serde_json::from_str(&raw).with_context(invalid)?;
        Ok(vec![action])
    }
}

/// Prints the verdict and returns whether the batch was approved.
pub async fn execute(args: EvaluateArgs, config_path: Option<PathBuf>) -> Result<bool> {
    let manifest = load_manifest(config_path)?;
    let kernel = MoralKernel::new(args.threshold.unwrap_or(manifest.spec.moral.threshold));
    let actions = read_actions(&args.actions)?;

    for action in &actions {
        println!(
            "  {:<20} {:<13} {:>8.4}",
            action.kind(),
            action.entropy_class().to_string(),
            kernel.score(action)
        );
    }

    let verdict = kernel.evaluate(&actions);
    if verdict.approved {
        println!("{}", format!("✓ APPROVED: {}", verdict.reason).green());
    } else {
        println!("{}", format!("✗ BLOCKED: {}", verdict.reason).red());
    }

    Ok(verdict.approved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_single_and_batch() {
        let dir = tempfile::tempdir().unwrap();
        let action = r#"{"kind":"execute_SQL","harm":0.3,"utility":0.9,"uncertainty":0.2,"scale":1.0,"agents_affected":1,"entropy_class":"REVERSIBLE"}"#;

        let single = dir.path().join("single.json");
        std::fs::write(&single, action).unwrap();
        assert_eq!(read_actions(&single).unwrap().len(), 1);

        let batch = dir.path().join("batch.json");
        std::fs::write(&batch, format!("[{action},{action}]")).unwrap();
        assert_eq!(read_actions(&batch).unwrap().len(), 2);

        let invalid = dir.path().join("invalid.json");
        std::fs::write(&invalid, action.replace("0.3", "1.3")).unwrap();
        let err = format!("{:#}", read_actions(&invalid).unwrap_err());
        assert!(err.contains("Attribute 'harm' must be within [0, 1], got 1.3"), "{err}");

        let invalid_batch = dir.path().join("invalid_batch.json");
        std::fs::write(&invalid_batch, format!("  [{action},{}]", action.replace("0.9", "-0.5"))).unwrap();
        let err = format!("{:#}", read_actions(&invalid_batch).unwrap_err());
        assert!(err.contains("Attribute 'utility' must be within [0, 1], got -0.5"), "{err}");
    }
}
