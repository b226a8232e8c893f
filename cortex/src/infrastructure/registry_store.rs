// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Registry Store
//!
//! JSON file backing for the skill registry.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Whole-file persistence of skill records
//!
//! The file is a single object keyed by skill name, in registration order:
//!
//! ```json
//! {
//!   "SQL": { "vector_coeffs": [0.12, -0.4], "layer": 6, "default_strength": 5.0 }
//! }
//! ```

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

use super::repository::{RegistryError, SkillRegistryStore};
use crate::domain::{canonical_skill_name, SkillMetadata, SkillRecord};

#[derive(Debug, Serialize, Deserialize)]
struct RegistryEntry {
    vector_coeffs: Vec<f32>,
    layer: u32,
    default_strength: f32,
}

type RegistryDocument = IndexMap<String, RegistryEntry>;

pub struct JsonRegistryStore {
    path: PathBuf,
}

impl JsonRegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "skill_registry.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SkillRegistryStore for JsonRegistryStore {
    fn load(&self) -> Result<Vec<SkillRecord>, RegistryError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "No skill registry on disk, starting empty");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(RegistryError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let document: RegistryDocument =
            serde_json::from_str(&content).map_err(|source| RegistryError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        let mut records: IndexMap<String, SkillRecord> = IndexMap::with_capacity(document.len());
        for (name, entry) in document {
            let record = SkillRecord::new(
                &name,
                entry.vector_coeffs,
                SkillMetadata {
                    layer: entry.layer,
                    default_strength: entry.default_strength,
                },
            );
            if records.contains_key(&record.name) {
                warn!(skill = %name, "Registry holds the same skill under two spellings, keeping the later one");
            }
            records.insert(record.name.clone(), record);
        }

        Ok(records.into_values().collect())
    }

    fn save(&self, records: &[SkillRecord]) -> Result<(), RegistryError> {
        let document: RegistryDocument = records
            .iter()
            .map(|r| {
                (
                    r.name.clone(),
                    RegistryEntry {
                        vector_coeffs: r.coefficients.clone(),
                        layer: r.layer,
                        default_strength: r.default_strength,
                    },
                )
            })
            .collect();
        let json = serde_json::to_string_pretty(&document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| RegistryError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        let tmp = self.temp_path();
        std::fs::write(&tmp, json).map_err(|source| RegistryError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| RegistryError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = ?self.path, skills = records.len(), "Skill registry written");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Process-local registry, used in tests and for dry runs.
#[derive(Default)]
pub struct InMemoryRegistryStore {
    records: RwLock<Vec<SkillRecord>>,
}

impl InMemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<SkillRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl SkillRegistryStore for InMemoryRegistryStore {
    fn load(&self) -> Result<Vec<SkillRecord>, RegistryError> {
        Ok(self.records.read().clone())
    }

    fn save(&self, records: &[SkillRecord]) -> Result<(), RegistryError> {
        *self.records.write() = records.to_vec();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
