// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # SkillMemory: Learned Skill Directions
//!
//! Owns the basis and the in-process view of the skill registry. Storage is
//! read exactly once, when the instance is constructed; callers share one
//! instance (typically behind an `Arc`) for the lifetime of the process.
//!
//! ## Degraded state
//!
//! Without a usable basis nothing can be projected or reconstructed. The
//! memory still opens: [`SkillMemory::reconstruct`] reports
//! [`Reconstruction::Unavailable`], [`SkillMemory::snapshot`] returns `None`
//! and the router turns that into "no skill".
//!
//! ## Consistency
//!
//! The registry and its [`SkillMatrix`] live behind one lock and are replaced
//! together. [`SkillMemory::add_or_update`] is the only writer; it holds the
//! write lock across persistence, so updates are serialised and a reader never
//! sees a matrix that disagrees with the name list.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{canonical_skill_name, Basis, SkillMatrix, SkillMetadata, SkillRecord};
use crate::infrastructure::{load_basis, RegistryError, SkillRegistryStore};

#[derive(Debug, Error)]
pub enum SkillMemoryError {
    #[error("Basis is unavailable; skill memory is degraded")]
    BasisUnavailable,

    #[error("Skill name cannot be empty")]
    EmptyName,

    #[error("Skill '{skill}' has {found} coefficients, basis rank is {expected}")]
    DimensionMismatch {
        skill: String,
        expected: usize,
        found: usize,
    },

    #[error("Skill '{skill}' has a non-finite coefficient")]
    NonFinite { skill: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result of mapping a skill back into embedding space.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconstruction {
    Vector(Vec<f32>),
    NotFound,
    Unavailable,
}

/// Consistent view used for one routing decision.
#[derive(Debug, Clone)]
pub struct RoutingSnapshot {
    pub basis: Arc<Basis>,
    pub matrix: Arc<SkillMatrix>,
}

struct MemoryState {
    registry: IndexMap<String, SkillRecord>,
    matrix: Arc<SkillMatrix>,
}

pub struct SkillMemory {
    basis: Option<Arc<Basis>>,
    store: Arc<dyn SkillRegistryStore>,
    state: RwLock<MemoryState>,
}

impl SkillMemory {
    /// Reads the registry from `store` once and builds the skill matrix.
    ///
    /// A `None` basis opens the memory in the degraded state. A registry
    /// that exists but cannot be read is an error.
    pub fn new(basis: Option<Basis>, store: Arc<dyn SkillRegistryStore>) -> Result<Self, SkillMemoryError> {
        let records = store.load()?;

        let mut registry = IndexMap::with_capacity(records.len());
        for record in records {
            registry.insert(record.name.clone(), record);
        }

        let basis = basis.map(Arc::new);
        let matrix = Arc::new(build_matrix(basis.as_deref(), &registry));

        match &basis {
            Some(b) => info!(
                registry = %store.location(),
                rank = b.rank(),
                dim = b.dim(),
                skills = matrix.len(),
                "Skill memory loaded"
            ),
            None => warn!(
                registry = %store.location(),
                skills = registry.len(),
                "Skill memory loaded without a basis; routing and reconstruction are unavailable"
            ),
        }

        Ok(Self {
            basis,
            store,
            state: RwLock::new(MemoryState { registry, matrix }),
        })
    }

    /// Loads the basis from `basis_path`, degrading instead of failing when
    /// it is missing or invalid.
    pub fn open(basis_path: impl AsRef<Path>, store: Arc<dyn SkillRegistryStore>) -> Result<Self, SkillMemoryError> {
        let basis_path = basis_path.as_ref();
        let basis = match load_basis(basis_path) {
            Ok(basis) => Some(basis),
            Err(e) => {
                warn!(path = ?basis_path, error = %e, "Basis could not be loaded");
                None
            }
        };
        Self::new(basis, store)
    }

    pub fn is_degraded(&self) -> bool {
        self.basis.is_none()
    }

    pub fn basis(&self) -> Option<&Basis> {
        self.basis.as_deref()
    }

    /// Projects a full-space state onto the basis.
    ///
    /// `None` when degraded or when `state` has the wrong dimension.
    pub fn project(&self, state: &[f32]) -> Option<Vec<f32>> {
        self.basis.as_ref()?.project(state)
    }

    /// `coefficients(name) · Basis`.
    pub fn reconstruct(&self, name: &str) -> Reconstruction {
        let Some(basis) = &self.basis else {
            return Reconstruction::Unavailable;
        };

        let state = self.state.read();
        match state.registry.get(&canonical_skill_name(name)) {
            None => Reconstruction::NotFound,
            Some(record) => match basis.reconstruct(&record.coefficients) {
                Some(vector) => Reconstruction::Vector(vector),
                None => {
                    // Loaded with the wrong rank; it was left out of the matrix too.
                    debug!(skill = %record.name, "Skill coefficients do not match basis rank");
                    Reconstruction::Unavailable
                }
            },
        }
    }

    pub fn record(&self, name: &str) -> Option<SkillRecord> {
        self.state.read().registry.get(&canonical_skill_name(name)).cloned()
    }

    /// All skill names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.state.read().registry.keys().cloned().collect()
    }

    pub fn records(&self) -> Vec<SkillRecord> {
        self.state.read().registry.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Option<RoutingSnapshot> {
        let basis = self.basis.clone()?;
        let matrix = self.state.read().matrix.clone();
        Some(RoutingSnapshot { basis, matrix })
    }

    /// Writes or overwrites a skill, persists the registry and rebuilds the
    /// matrix. Returns `true` when an existing skill was replaced.
    ///
    /// Nothing changes in memory unless persistence succeeds.
    pub fn add_or_update(
        &self,
        name: &str,
        coefficients: Vec<f32>,
        metadata: SkillMetadata,
    ) -> Result<bool, SkillMemoryError> {
        let basis = self.basis.as_ref().ok_or(SkillMemoryError::BasisUnavailable)?;

        let record = SkillRecord::new(name, coefficients, metadata);
        if record.name.is_empty() {
            return Err(SkillMemoryError::EmptyName);
        }
        if record.coefficients.len() != basis.rank() {
            return Err(SkillMemoryError::DimensionMismatch {
                skill: record.name,
                expected: basis.rank(),
                found: record.coefficients.len(),
            });
        }
        if record.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(SkillMemoryError::NonFinite { skill: record.name });
        }

        let mut state = self.state.write();

        let mut registry = state.registry.clone();
        let skill = record.name.clone();
        let replaced = registry.insert(skill.clone(), record).is_some();

        let records: Vec<SkillRecord> = registry.values().cloned().collect();
        self.store.save(&records)?;

        let matrix = Arc::new(build_matrix(Some(basis), &registry));
        state.registry = registry;
        state.matrix = matrix;

        metrics::counter!("gca_skill_updates_total").increment(1);
        info!(skill = %skill, replaced, registry = %self.store.location(), "Skill persisted");

        Ok(replaced)
    }
}

fn build_matrix(basis: Option<&Basis>, registry: &IndexMap<String, SkillRecord>) -> SkillMatrix {
    let Some(basis) = basis else {
        return SkillMatrix::default();
    };

    let (matrix, skipped) = SkillMatrix::build(registry.values(), basis.rank());
    for name in skipped {
        warn!(skill = %name, rank = basis.rank(), "Skill coefficients do not match basis rank; skipped");
    }
    matrix
}
