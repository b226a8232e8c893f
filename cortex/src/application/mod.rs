// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::GcaEvent;

pub mod learner;
pub mod moral_gate;
pub mod pilot;
pub mod router;
pub mod skill_memory;
pub mod tuner;

pub use learner::{LearnError, SkillLearner};
pub use moral_gate::MoralKernel;
pub use pilot::{connect_model, open_memory, Pilot, PilotOutcome, PilotRun, ToolExecutor};
pub use router::{GeometricRouter, RouteMatch};
pub use skill_memory::{Reconstruction, RoutingSnapshot, SkillMemory, SkillMemoryError};
pub use tuner::{diversity_ratio, Probe, StrengthTuner, TuneOutcome, TunerError};

/// Event bus trait for publishing domain events
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: GcaEvent) -> Result<()>;
}
