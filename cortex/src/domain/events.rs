// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Domain events emitted by the pilot pipeline and skill memory
//! Published to the EventBus for observability and integration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlates every event produced while handling one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GcaEvent {
    /// A skill was written to the registry (new or overwritten)
    SkillRegistered {
        skill: String,
        rank: usize,
        replaced: bool,
        timestamp: DateTime<Utc>,
    },

    /// The router finished; `skill` is None when nothing cleared the threshold
    IntentRouted {
        run_id: RunId,
        skill: Option<String>,
        score: Option<f32>,
        timestamp: DateTime<Utc>,
    },

    /// The auto-tuner settled on a strength
    StrengthTuned {
        run_id: RunId,
        skill: String,
        strength: f32,
        probes: usize,
        collapsed: bool,
        timestamp: DateTime<Utc>,
    },

    /// The risk gate judged a batch of actions
    PlanEvaluated {
        run_id: RunId,
        approved: bool,
        total_score: f64,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl GcaEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            GcaEvent::SkillRegistered { timestamp, .. } => *timestamp,
            GcaEvent::IntentRouted { timestamp, .. } => *timestamp,
            GcaEvent::StrengthTuned { timestamp, .. } => *timestamp,
            GcaEvent::PlanEvaluated { timestamp, .. } => *timestamp,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            GcaEvent::SkillRegistered { .. } => "skill_registered",
            GcaEvent::IntentRouted { .. } => "intent_routed",
            GcaEvent::StrengthTuned { .. } => "strength_tuned",
            GcaEvent::PlanEvaluated { .. } => "plan_evaluated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = GcaEvent::IntentRouted {
            run_id: RunId::new(),
            skill: Some("SQL".to_string()),
            score: Some(0.92),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"intent_routed\""));

        let deserialized: GcaEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event.event_type(), deserialized.event_type());
        assert_eq!(event.timestamp(), deserialized.timestamp());
    }

    #[test]
    fn test_event_types() {
        let event = GcaEvent::PlanEvaluated {
            run_id: RunId::new(),
            approved: false,
            total_score: 0.9,
            reason: "Moral vector 0.900 exceeds threshold 0.5".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type(), "plan_evaluated");
    }
}
