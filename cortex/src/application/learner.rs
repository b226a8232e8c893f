// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use super::skill_memory::{SkillMemory, SkillMemoryError};
use super::EventBus;
use crate::domain::generation::{GenerationError, GenerationService};
use crate::domain::geometry::{l2_norm, l2_normalize, mean_vector, NORM_EPSILON};
use crate::domain::{GcaEvent, SkillMetadata, SkillRecord};

#[derive(Debug, Error)]
pub enum LearnError {
    #[error("No examples given for skill '{0}'")]
    NoExamples(String),

    #[error("Basis is unavailable; cannot learn skills")]
    BasisUnavailable,

    #[error("Example embeddings disagree on dimension")]
    InconsistentEmbeddings,

    #[error("Examples for skill '{0}' have no component in the basis")]
    Degenerate(String),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] GenerationError),

    #[error(transparent)]
    Memory(#[from] SkillMemoryError),

    #[error("Failed to publish skill event: {0:#}")]
    Event(anyhow::Error),
}

/// Derives a skill direction from example texts and stores it.
///
/// The mean embedding of the examples is projected onto the basis and
/// normalised to unit length before it is written to skill memory. The
/// record is persisted before `SkillRegistered` is published, so a bus
/// failure is reported after the skill is already stored.
pub struct SkillLearner {
    service: Arc<dyn GenerationService>,
    memory: Arc<SkillMemory>,
    event_bus: Arc<dyn EventBus>,
    metadata: SkillMetadata,
}

impl SkillLearner {
    pub fn new(
        service: Arc<dyn GenerationService>,
        memory: Arc<SkillMemory>,
        event_bus: Arc<dyn EventBus>,
        metadata: SkillMetadata,
    ) -> Self {
        Self {
            service,
            memory,
            event_bus,
            metadata,
        }
    }

    pub async fn learn(&self, name: &str, examples: &[String]) -> Result<SkillRecord, LearnError> {
        if examples.is_empty() {
            return Err(LearnError::NoExamples(name.to_string()));
        }
        let basis = self.memory.basis().ok_or(LearnError::BasisUnavailable)?;

        let embeddings = self.service.embed_batch(examples).await?;
        let mean = mean_vector(&embeddings).ok_or(LearnError::InconsistentEmbeddings)?;
        let coefficients = basis.project(&mean).ok_or(LearnError::InconsistentEmbeddings)?;

        if l2_norm(&coefficients) <= NORM_EPSILON {
            return Err(LearnError::Degenerate(name.to_string()));
        }
        let coefficients = l2_normalize(&coefficients);
        let rank = coefficients.len();

        let record = SkillRecord::new(name, coefficients.clone(), self.metadata);
        let replaced = self.memory.add_or_update(name, coefficients, self.metadata)?;

        info!(skill = %record.name, examples = examples.len(), replaced, "Skill learned");

        let event = GcaEvent::SkillRegistered {
            skill: record.name.clone(),
            rank,
            replaced,
            timestamp: Utc::now(),
        };
        self.event_bus.publish(event).await.map_err(LearnError::Event)?;

        Ok(record)
    }
}
