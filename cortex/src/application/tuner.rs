// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # StrengthTuner: Steering Strength Calibration
//!
//! Walks the strength ladder in ascending order. At each rung a short probe
//! continuation is generated with the skill direction injected at that
//! strength, and its lexical diversity is measured:
//!
//! ```text
//! ratio = distinct whitespace tokens / (total tokens + 1e-5)
//! ```
//!
//! A ratio below `collapse_threshold` means the model started looping; the
//! ladder stops and the last passing strength is kept. When the very first
//! rung collapses the ladder floor is returned, so a matched skill always
//! gets some strength.
//!
//! Probes are sampled, so ratios are noisy. The guarantees are structural:
//! rungs are tried in order and nothing after the first collapse is probed.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::generation::{GenerationError, GenerationOptions, GenerationService, Steering};
use crate::domain::pilot_config::TunerConfig;

const RATIO_EPSILON: f32 = 1e-5;

#[derive(Debug, Error)]
pub enum TunerError {
    #[error("Strength ladder is empty")]
    EmptyLadder,

    #[error("Strength ladder must be finite, positive and strictly ascending, got {0:?}")]
    InvalidLadder(Vec<f32>),

    #[error("Probe at strength {strength} failed: {source}")]
    Probe {
        strength: f32,
        #[source]
        source: GenerationError,
    },

    #[error("Probe at strength {strength} timed out after {timeout_ms} ms")]
    Timeout { strength: f32, timeout_ms: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    pub strength: f32,
    pub ratio: f32,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuneOutcome {
    pub strength: f32,
    /// Every rung that was probed, in order.
    pub probes: Vec<Probe>,
}

impl TuneOutcome {
    /// Whether the ladder was cut short by a collapse.
    pub fn collapsed(&self) -> bool {
        self.probes.last().is_some_and(|p| p.collapsed)
    }
}

/// Distinct whitespace-delimited tokens over total tokens.
pub fn diversity_ratio(text: &str) -> f32 {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let unique: HashSet<&str> = tokens.iter().copied().collect();
    unique.len() as f32 / (tokens.len() as f32 + RATIO_EPSILON)
}

pub struct StrengthTuner {
    service: Arc<dyn GenerationService>,
    config: TunerConfig,
    floor: f32,
}

impl StrengthTuner {
    /// Rejects ladders without a usable floor, so every matched skill is
    /// steered with a positive strength.
    pub fn new(service: Arc<dyn GenerationService>, config: TunerConfig) -> Result<Self, TunerError> {
        let floor = *config.ladder.first().ok_or(TunerError::EmptyLadder)?;
        let ascending = config.ladder.windows(2).all(|w| w[0] < w[1]);
        if !ascending || config.ladder.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(TunerError::InvalidLadder(config.ladder));
        }
        Ok(Self { service, config, floor })
    }

    /// Lowest rung of the ladder.
    pub fn floor(&self) -> f32 {
        self.floor
    }

    async fn probe(&self, prompt: &str, steering: &Steering) -> Result<String, TunerError> {
        let options = GenerationOptions::probe(self.config.probe_tokens, self.config.temperature);
        let call = self.service.generate(prompt, Some(steering), &options);

        let result = match self.config.probe_timeout_ms {
            Some(timeout_ms) => tokio::time::timeout(Duration::from_millis(timeout_ms), call)
                .await
                .map_err(|_| TunerError::Timeout {
                    strength: steering.strength,
                    timeout_ms,
                })?,
            None => call.await,
        };

        result.map_err(|source| TunerError::Probe {
            strength: steering.strength,
            source,
        })
    }

    /// Picks the strongest rung that keeps probes diverse.
    ///
    /// `direction` is the skill's full-space vector; `layer` is where it is
    /// injected.
    pub async fn tune(&self, prompt: &str, direction: &[f32], layer: u32) -> Result<TuneOutcome, TunerError> {
        let mut best = self.floor;
        let mut probes = Vec::with_capacity(self.config.ladder.len());
        let mut steering = Steering {
            vector: direction.to_vec(),
            strength: self.floor,
            layer,
        };

        for &strength in &self.config.ladder {
            steering.strength = strength;
            let text = self.probe(prompt, &steering).await?;
            metrics::counter!("gca_tune_probes_total").increment(1);

            let ratio = diversity_ratio(&text);
            let collapsed = ratio < self.config.collapse_threshold;
            debug!(strength, ratio, collapsed, "Strength probe");
            probes.push(Probe {
                strength,
                ratio,
                collapsed,
            });

            if collapsed {
                info!(
                    strength,
                    ratio,
                    threshold = self.config.collapse_threshold,
                    "Probe collapsed, stopping ladder"
                );
                break;
            }
            best = strength;
        }

        metrics::histogram!("gca_tune_strength").record(best as f64);
        info!(strength = best, probes = probes.len(), "Strength selected");

        Ok(TuneOutcome { strength: best, probes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Answers each probe with a ten-token text whose distinct-token count is
    /// chosen per strength.
    struct LadderService {
        distinct: Vec<(f32, usize)>,
        calls: Mutex<Vec<f32>>,
    }

    impl LadderService {
        fn new(distinct: Vec<(f32, usize)>) -> Self {
            Self {
                distinct,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerationService for LadderService {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, GenerationError> {
            Ok(vec![0.0])
        }

        async fn generate(
            &self,
            _prompt: &str,
            steering: Option<&Steering>,
            options: &GenerationOptions,
        ) -> Result<String, GenerationError> {
            let strength = steering.map(|s| s.strength).unwrap_or(0.0);
            assert_eq!(options.max_tokens, 20);
            assert_eq!(options.repetition_penalty, None);
            self.calls.lock().push(strength);

            let distinct = self
                .distinct
                .iter()
                .find(|(s, _)| *s == strength)
                .map(|(_, d)| *d)
                .ok_or_else(|| GenerationError::InvalidInput(format!("unexpected strength {strength}")))?;
            let tokens: Vec<String> = (0..10).map(|i| format!("w{}", i % distinct)).collect();
            Ok(tokens.join(" "))
        }

        async fn health_check(&self) -> Result<(), GenerationError> {
            Ok(())
        }
    }

    #[test]
    fn test_diversity_ratio() {
        assert!((diversity_ratio("a b c d") - 1.0).abs() < 1e-4);
        assert!((diversity_ratio("the the the the") - 0.25).abs() < 1e-4);
        assert_eq!(diversity_ratio(""), 0.0);
        assert_eq!(diversity_ratio("   \n "), 0.0);
    }

    #[tokio::test]
    async fn test_stops_at_first_collapse() {
        let service = Arc::new(LadderService::new(vec![(2.0, 9), (4.0, 8), (6.0, 5), (8.0, 9)]));
        let tuner = StrengthTuner::new(service.clone(), TunerConfig::default()).unwrap();

        let outcome = tuner.tune("list users", &[1.0, 0.0], 6).await.unwrap();
        assert_eq!(outcome.strength, 4.0);
        assert!(outcome.collapsed());
        assert_eq!(outcome.probes.len(), 3);
        assert_eq!(*service.calls.lock(), vec![2.0, 4.0, 6.0]);
    }

    #[tokio::test]
    async fn test_first_collapse_returns_floor() {
        let service = Arc::new(LadderService::new(vec![(2.0, 1)]));
        let tuner = StrengthTuner::new(service.clone(), TunerConfig::default()).unwrap();

        let outcome = tuner.tune("list users", &[1.0], 6).await.unwrap();
        assert_eq!(outcome.strength, 2.0);
        assert_eq!(outcome.strength, tuner.floor());
        assert_eq!(*service.calls.lock(), vec![2.0]);
    }

    #[tokio::test]
    async fn test_full_ladder_passes() {
        let service = Arc::new(LadderService::new(vec![(2.0, 10), (4.0, 10), (6.0, 10), (8.0, 10)]));
        let tuner = StrengthTuner::new(service, TunerConfig::default()).unwrap();

        let outcome = tuner.tune("x", &[1.0], 6).await.unwrap();
        assert_eq!(outcome.strength, 8.0);
        assert!(!outcome.collapsed());
        assert_eq!(outcome.probes.len(), 4);
    }

    #[tokio::test]
    async fn test_probe_error_propagates() {
        let service = Arc::new(LadderService::new(vec![(2.0, 10)]));
        let tuner = StrengthTuner::new(service, TunerConfig::default()).unwrap();

        let err = tuner.tune("x", &[1.0], 6).await.unwrap_err();
        assert!(matches!(err, TunerError::Probe { strength, .. } if strength == 4.0));
    }

    #[test]
    fn test_ladder_without_floor_is_rejected() {
        let service: Arc<dyn GenerationService> = Arc::new(LadderService::new(vec![]));
        let with_ladder = |ladder: Vec<f32>| TunerConfig {
            ladder,
            ..TunerConfig::default()
        };

        assert!(matches!(
            StrengthTuner::new(service.clone(), with_ladder(vec![])),
            Err(TunerError::EmptyLadder)
        ));
        for ladder in [vec![4.0, 2.0], vec![2.0, 2.0], vec![0.0, 2.0], vec![f32::NAN]] {
            assert!(matches!(
                StrengthTuner::new(service.clone(), with_ladder(ladder)),
                Err(TunerError::InvalidLadder(_))
            ));
        }

        let tuner = StrengthTuner::new(service, with_ladder(vec![1.5, 3.0])).unwrap();
        assert_eq!(tuner.floor(), 1.5);
    }
}
