// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # GeometricRouter: Intent to Skill
//!
//! Maps a request embedding to the closest learned skill:
//!
//! 1. project the embedding onto the basis (`k` coefficients),
//! 2. L2-normalise the coefficients,
//! 3. score every skill with one matrix-vector product against the skill
//!    matrix (cosine similarity, since stored skills are unit-norm),
//! 4. keep the best score if it exceeds `min_confidence`.
//!
//! Normalisation makes routing independent of the embedding's magnitude.
//! Equal top scores resolve to the earliest registered skill.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::skill_memory::SkillMemory;
use crate::domain::geometry::l2_normalize;

pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteMatch {
    pub skill: String,
    pub score: f32,
}

pub struct GeometricRouter {
    memory: Arc<SkillMemory>,
    min_confidence: f32,
}

impl GeometricRouter {
    pub fn new(memory: Arc<SkillMemory>, min_confidence: f32) -> Self {
        Self { memory, min_confidence }
    }

    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    /// Normalised basis coefficients of `embedding`, or `None` when the
    /// memory is degraded or the embedding has the wrong dimension.
    fn query(&self, embedding: &[f32]) -> Option<Vec<f32>> {
        let coefficients = self.memory.project(embedding)?;
        Some(l2_normalize(&coefficients))
    }

    /// Every routable skill with its score, in registration order.
    pub fn scores(&self, embedding: &[f32]) -> Vec<(String, f32)> {
        let Some(snapshot) = self.memory.snapshot() else {
            return Vec::new();
        };
        let Some(query) = self.query(embedding) else {
            return Vec::new();
        };
        snapshot
            .matrix
            .names()
            .iter()
            .cloned()
            .zip(snapshot.matrix.scores(&query))
            .collect()
    }

    pub fn route(&self, embedding: &[f32]) -> Option<RouteMatch> {
        let Some(snapshot) = self.memory.snapshot() else {
            debug!("Skill memory degraded, no route");
            metrics::counter!("gca_route_total", "outcome" => "unavailable").increment(1);
            return None;
        };

        let Some(coefficients) = snapshot.basis.project(embedding) else {
            warn!(
                expected = snapshot.basis.dim(),
                found = embedding.len(),
                "Embedding dimension does not match basis"
            );
            metrics::counter!("gca_route_total", "outcome" => "dimension_mismatch").increment(1);
            return None;
        };
        let query = l2_normalize(&coefficients);

        let Some((skill, score)) = snapshot.matrix.best(&query) else {
            debug!("No skills registered, no route");
            metrics::counter!("gca_route_total", "outcome" => "empty").increment(1);
            return None;
        };

        metrics::histogram!("gca_route_score").record(score as f64);

        if score > self.min_confidence {
            info!(skill = %skill, score, "Routed to skill");
            metrics::counter!("gca_route_total", "outcome" => "matched").increment(1);
            Some(RouteMatch {
                skill: skill.to_string(),
                score,
            })
        } else {
            info!(
                best = %skill,
                score,
                min_confidence = self.min_confidence,
                "Best skill below confidence threshold"
            );
            metrics::counter!("gca_route_total", "outcome" => "below_threshold").increment(1);
            None
        }
    }
}
