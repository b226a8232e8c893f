// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # MoralKernel: Action Risk Gate
//!
//! Deterministic scalar gate over declared action attributes. Per action:
//!
//! ```text
//! magnitude = sqrt(harm² + (1 − utility)² + uncertainty²)
//! scaled    = magnitude × scale × ln(agents_affected + 1)
//! scaled   ×= 2   if entropy_class == IRREVERSIBLE
//! ```
//!
//! A batch is judged on the sum of its scaled magnitudes, so one risky
//! action blocks everything submitted with it. Approval requires the total to
//! be strictly below the threshold. An empty batch scores zero.

use tracing::{info, warn};

use crate::domain::{Action, Verdict};

pub const DEFAULT_MORAL_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct MoralKernel {
    threshold: f64,
}

impl Default for MoralKernel {
    fn default() -> Self {
        Self::new(DEFAULT_MORAL_THRESHOLD)
    }
}

impl MoralKernel {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Scaled risk contribution of a single action.
    pub fn score(&self, action: &Action) -> f64 {
        let magnitude = (action.harm().powi(2)
            + (1.0 - action.utility()).powi(2)
            + action.uncertainty().powi(2))
        .sqrt();
        let reach = (f64::from(action.agents_affected()) + 1.0).ln();
        magnitude * action.scale() * reach * action.entropy_class().weight()
    }

    /// Judges one action on its own.
    pub fn assess(&self, action: &Action) -> Verdict {
        Verdict::against_threshold(self.score(action), self.threshold)
    }

    /// Judges a batch on its summed score.
    pub fn evaluate(&self, actions: &[Action]) -> Verdict {
        let total: f64 = actions.iter().map(|a| self.score(a)).sum();
        let verdict = Verdict::against_threshold(total, self.threshold);

        metrics::histogram!("gca_gate_score").record(total);
        if verdict.approved {
            metrics::counter!("gca_gate_total", "decision" => "approved").increment(1);
            info!(actions = actions.len(), score = total, threshold = self.threshold, "Plan approved");
        } else {
            metrics::counter!("gca_gate_total", "decision" => "blocked").increment(1);
            warn!(
                actions = actions.len(),
                score = total,
                threshold = self.threshold,
                kinds = ?actions.iter().map(|a| a.kind()).collect::<Vec<_>>(),
                "Plan blocked"
            );
        }

        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntropyClass;

    fn action(harm: f64, utility: f64, uncertainty: f64, scale: f64, agents: u32, class: EntropyClass) -> Action {
        Action::new("test", "", harm, utility, uncertainty, scale, agents, class).unwrap()
    }

    #[test]
    fn test_score_formula() {
        let kernel = MoralKernel::default();
        // magnitude = sqrt(0.09 + 0.01 + 0.04) = sqrt(0.14); reach = ln 2
        let a = action(0.3, 0.9, 0.2, 1.0, 1, EntropyClass::Reversible);
        let expected = 0.14f64.sqrt() * 2f64.ln();
        assert!((kernel.score(&a) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zero_agents_scores_zero() {
        let kernel = MoralKernel::default();
        let a = action(1.0, 0.0, 1.0, 1.0, 0, EntropyClass::Irreversible);
        assert_eq!(kernel.score(&a), 0.0);
        assert!(kernel.assess(&a).approved);
    }

    #[test]
    fn test_empty_batch_approved() {
        let verdict = MoralKernel::default().evaluate(&[]);
        assert!(verdict.approved);
        assert_eq!(verdict.total_score, 0.0);
        assert!(verdict.reason.contains("below threshold"));
    }

    #[test]
    fn test_batch_is_vetoed_by_sum() {
        let kernel = MoralKernel::default();
        let low = action(0.1, 0.9, 0.1, 0.5, 1, EntropyClass::Reversible);
        let high = action(0.8, 0.2, 0.5, 1.0, 5, EntropyClass::Irreversible);

        assert!(kernel.assess(&low).approved);
        assert!(!kernel.assess(&high).approved);

        let verdict = kernel.evaluate(&[low, high]);
        assert!(!verdict.approved);
        assert!(verdict.reason.contains("exceeds threshold 0.5"));
    }

    #[test]
    fn test_default_tool_action_is_blocked() {
        // 0.374 * ln 2 = 0.259 on its own, doubled when destructive.
        let kernel = MoralKernel::default();
        let read = action(0.3, 0.9, 0.2, 1.0, 1, EntropyClass::Reversible);
        let delete = read.clone().with_entropy_class(EntropyClass::Irreversible);

        assert!(kernel.evaluate(&[read]).approved);
        assert!(!kernel.evaluate(&[delete]).approved);
    }
}
