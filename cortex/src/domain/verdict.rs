// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};

/// Outcome of scoring one action or a batch of actions against the risk
/// threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub approved: bool,
    /// Shown verbatim to the operator when a plan is blocked.
    pub reason: String,
    pub total_score: f64,
}

impl Verdict {
    /// Approved iff `total_score < threshold`.
    pub fn against_threshold(total_score: f64, threshold: f64) -> Self {
        let approved = total_score < threshold;
        let relation = if approved { "below" } else { "exceeds" };
        Self {
            approved,
            reason: format!("Moral vector {total_score:.3} {relation} threshold {threshold}"),
            total_score,
        }
    }

    pub fn is_blocked(&self) -> bool {
        !self.approved
    }
}
