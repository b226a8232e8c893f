// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository interfaces for skill memory
//! Defines the contract for the durable skill registry

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::SkillRecord;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read registry {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write registry {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Registry {path:?} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode registry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable source of truth for learned skills.
///
/// Implementations are synchronous: skill memory calls `save` while holding
/// its writer lock, so every persisted registry is one the readers saw.
pub trait SkillRegistryStore: Send + Sync {
    /// All records in registration order. An absent registry is empty.
    fn load(&self) -> Result<Vec<SkillRecord>, RegistryError>;

    /// Replaces the whole registry with `records`.
    fn save(&self, records: &[SkillRecord]) -> Result<(), RegistryError>;

    /// Human-readable location, used in logs.
    fn location(&self) -> String;
}
