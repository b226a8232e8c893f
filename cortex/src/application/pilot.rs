// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Pilot: Request Dispatch
//!
//! Sequences one request through the pipeline:
//!
//! ```text
//! embed → route → reconstruct → tune → steered generate → parse tool request
//!       → risk gate → tool executor
//! ```
//!
//! Every early exit is an ordinary [`PilotOutcome`]: no matching skill, a
//! plain-text answer, or a blocked plan. Only failures of the embedding or
//! generation calls and of event publication are surfaced as errors. A
//! failed strength probe does not abort the run; the ladder floor is used.
//! The tuner refuses ladders without a positive floor, so a pilot cannot be
//! built that would steer a matched skill at zero strength.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::moral_gate::MoralKernel;
use super::router::{GeometricRouter, RouteMatch};
use super::skill_memory::{Reconstruction, SkillMemory};
use super::tuner::StrengthTuner;
use super::EventBus;
use crate::domain::generation::{GenerationOptions, GenerationService, Steering};
use crate::domain::pilot_config::{PilotConfigManifest, PilotConfigSpec};
use crate::domain::{ActionProfile, GcaEvent, RunId, ToolRequest, Verdict};
use crate::infrastructure::{HttpGenerationClient, JsonRegistryStore, LoggingEventBus};

/// Runs an approved tool request (SQL engine, code sandbox, ...).
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, request: &ToolRequest) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PilotOutcome {
    /// Nothing cleared the router threshold, or the skill could not be
    /// reconstructed.
    NoSkill,

    /// The steered response carried no tool request.
    TextOnly {
        skill: String,
        strength: f32,
        text: String,
    },

    /// The risk gate refused the tool request.
    Blocked {
        skill: String,
        strength: f32,
        request: ToolRequest,
        verdict: Verdict,
    },

    /// The tool request passed the gate. `output` is `None` when no executor
    /// is attached.
    Approved {
        skill: String,
        strength: f32,
        request: ToolRequest,
        verdict: Verdict,
        output: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PilotRun {
    pub run_id: RunId,
    pub route: Option<RouteMatch>,
    pub outcome: PilotOutcome,
}

pub struct Pilot {
    service: Arc<dyn GenerationService>,
    memory: Arc<SkillMemory>,
    router: GeometricRouter,
    tuner: StrengthTuner,
    kernel: MoralKernel,
    event_bus: Arc<dyn EventBus>,
    executor: Option<Arc<dyn ToolExecutor>>,
    generation: GenerationOptions,
    profile: ActionProfile,
}

impl Pilot {
    pub fn new(
        service: Arc<dyn GenerationService>,
        memory: Arc<SkillMemory>,
        spec: &PilotConfigSpec,
        event_bus: Arc<dyn EventBus>,
    ) -> Result<Self> {
        let tuner = StrengthTuner::new(service.clone(), spec.tuner.clone()).context("Invalid tuner configuration")?;
        Ok(Self {
            router: GeometricRouter::new(memory.clone(), spec.router.min_confidence),
            tuner,
            kernel: MoralKernel::new(spec.moral.threshold),
            generation: spec.generation.options(),
            profile: ActionProfile::default(),
            executor: None,
            service,
            memory,
            event_bus,
        })
    }

    /// Wires the pilot from a configuration manifest: JSON registry, basis
    /// file, HTTP model server and the logging event bus.
    pub fn from_manifest(manifest: &PilotConfigManifest) -> Result<Self> {
        manifest.validate().context("Configuration validation failed")?;
        let memory = open_memory(manifest)?;
        let service = connect_model(manifest)?;
        Self::new(service, memory, &manifest.spec, Arc::new(LoggingEventBus::new()))
    }

    pub fn with_executor(mut self, executor: Arc<dyn ToolExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn with_action_profile(mut self, profile: ActionProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Embeds `prompt` and routes it.
    pub async fn route_text(&self, prompt: &str) -> Result<Option<RouteMatch>> {
        let embedding = self
            .service
            .embed(prompt)
            .await
            .context("Failed to embed prompt")?;
        Ok(self.router.route(&embedding))
    }

    /// Picks a steering strength for `skill`, falling back to the ladder
    /// floor when probing fails. `None` when the skill cannot be
    /// reconstructed.
    pub async fn strength_for(&self, run_id: RunId, prompt: &str, skill: &str) -> Result<Option<Steering>> {
        let vector = match self.memory.reconstruct(skill) {
            Reconstruction::Vector(vector) => vector,
            Reconstruction::NotFound => {
                warn!(skill = %skill, "Routed skill missing from memory");
                return Ok(None);
            }
            Reconstruction::Unavailable => {
                warn!(skill = %skill, "Skill cannot be reconstructed");
                return Ok(None);
            }
        };
        let layer = self
            .memory
            .record(skill)
            .map(|r| r.layer)
            .unwrap_or(crate::domain::skill::DEFAULT_SKILL_LAYER);

        let (strength, probes, collapsed) = match self.tuner.tune(prompt, &vector, layer).await {
            Ok(outcome) => (outcome.strength, outcome.probes.len(), outcome.collapsed()),
            Err(e) => {
                warn!(skill = %skill, error = %e, floor = self.tuner.floor(), "Tuning failed, using ladder floor");
                (self.tuner.floor(), 0, false)
            }
        };

        self.event_bus
            .publish(GcaEvent::StrengthTuned {
                run_id,
                skill: skill.to_string(),
                strength,
                probes,
                collapsed,
                timestamp: Utc::now(),
            })
            .await?;

        Ok(Some(Steering {
            vector,
            strength,
            layer,
        }))
    }

    pub async fn run(&self, prompt: &str) -> Result<PilotRun> {
        let run_id = RunId::new();
        info!(run_id = %run_id, "Pilot run started");

        let route = self.route_text(prompt).await?;
        self.event_bus
            .publish(GcaEvent::IntentRouted {
                run_id,
                skill: route.as_ref().map(|m| m.skill.clone()),
                score: route.as_ref().map(|m| m.score),
                timestamp: Utc::now(),
            })
            .await?;

        let Some(matched) = route.clone() else {
            info!(run_id = %run_id, "No skill matched");
            return Ok(PilotRun {
                run_id,
                route,
                outcome: PilotOutcome::NoSkill,
            });
        };
        let skill = matched.skill;

        let Some(steering) = self.strength_for(run_id, prompt, &skill).await? else {
            return Ok(PilotRun {
                run_id,
                route,
                outcome: PilotOutcome::NoSkill,
            });
        };
        let strength = steering.strength;

        let text = self
            .service
            .generate(prompt, Some(&steering), &self.generation)
            .await
            .context("Steered generation failed")?;
        debug!(run_id = %run_id, chars = text.len(), "Steered generation complete");

        let request = ToolRequest::parse(&text);
        if !request.is_actionable() {
            return Ok(PilotRun {
                run_id,
                route,
                outcome: PilotOutcome::TextOnly { skill, strength, text },
            });
        }

        let action = request
            .to_action(&self.profile)
            .context("Action profile produced an invalid action")?;
        let verdict = self.kernel.evaluate(std::slice::from_ref(&action));
        self.event_bus
            .publish(GcaEvent::PlanEvaluated {
                run_id,
                approved: verdict.approved,
                total_score: verdict.total_score,
                reason: verdict.reason.clone(),
                timestamp: Utc::now(),
            })
            .await?;

        if verdict.is_blocked() {
            warn!(run_id = %run_id, kind = %request.kind, reason = %verdict.reason, "Tool request blocked");
            return Ok(PilotRun {
                run_id,
                route,
                outcome: PilotOutcome::Blocked {
                    skill,
                    strength,
                    request,
                    verdict,
                },
            });
        }

        let output = match &self.executor {
            Some(executor) => Some(
                executor
                    .execute(&request)
                    .await
                    .with_context(|| format!("Tool executor failed for {}", request.kind))?,
            ),
            None => None,
        };

        info!(run_id = %run_id, kind = %request.kind, executed = output.is_some(), "Tool request approved");
        Ok(PilotRun {
            run_id,
            route,
            outcome: PilotOutcome::Approved {
                skill,
                strength,
                request,
                verdict,
                output,
            },
        })
    }
}

/// Opens skill memory from the manifest's storage settings.
pub fn open_memory(manifest: &PilotConfigManifest) -> Result<Arc<SkillMemory>> {
    let memory_config = &manifest.spec.memory;
    let store = JsonRegistryStore::new(memory_config.registry_path.clone());
    let memory = SkillMemory::open(&memory_config.basis_path, Arc::new(store))
        .with_context(|| format!("Failed to open skill registry {:?}", memory_config.registry_path))?;
    Ok(Arc::new(memory))
}

/// HTTP client for the configured model server.
pub fn connect_model(manifest: &PilotConfigManifest) -> Result<Arc<HttpGenerationClient>> {
    let generation = &manifest.spec.generation;
    let api_key = generation
        .resolved_api_key()
        .context("Failed to resolve generation api_key")?;
    let client = HttpGenerationClient::new(
        generation.endpoint.clone(),
        generation.model.clone(),
        manifest.spec.memory.layer,
    )
    .with_api_key(api_key)
    .with_timeout(generation.timeout_ms.map(std::time::Duration::from_millis));
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::generation::GenerationError;
    use crate::domain::{Basis, SkillMetadata, ToolKind};
    use crate::infrastructure::InMemoryRegistryStore;
    use parking_lot::Mutex;

    struct MockEventBus {
        events: Mutex<Vec<GcaEvent>>,
    }

    impl MockEventBus {
        fn new() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
            }
        }

        fn types(&self) -> Vec<&'static str> {
            self.events.lock().iter().map(|e| e.event_type()).collect()
        }
    }

    #[async_trait]
    impl EventBus for MockEventBus {
        async fn publish(&self, event: GcaEvent) -> Result<()> {
            self.events.lock().push(event);
            Ok(())
        }
    }

    /// Embeds everything onto the x axis; probes are diverse; the steered
    /// answer is fixed.
    struct ScriptedService {
        answer: String,
        fail_probes: bool,
    }

    #[async_trait]
    impl GenerationService for ScriptedService {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, GenerationError> {
            Ok(vec![2.0, 0.0, 0.0])
        }

        async fn generate(
            &self,
            _prompt: &str,
            _steering: Option<&Steering>,
            options: &GenerationOptions,
        ) -> Result<String, GenerationError> {
            if options.max_tokens == 20 {
                if self.fail_probes {
                    return Err(GenerationError::Timeout(5));
                }
                return Ok("each word here is different".to_string());
            }
            Ok(self.answer.clone())
        }

        async fn health_check(&self) -> Result<(), GenerationError> {
            Ok(())
        }
    }

    struct EchoExecutor;

    #[async_trait]
    impl ToolExecutor for EchoExecutor {
        async fn execute(&self, request: &ToolRequest) -> Result<String> {
            Ok(format!("ran {}", request.kind))
        }
    }

    fn pilot(answer: &str, fail_probes: bool, skills: &[(&str, Vec<f32>)]) -> (Pilot, Arc<MockEventBus>) {
        pilot_with_spec(answer, fail_probes, skills, &PilotConfigSpec::default()).unwrap()
    }

    fn pilot_with_spec(
        answer: &str,
        fail_probes: bool,
        skills: &[(&str, Vec<f32>)],
        spec: &PilotConfigSpec,
    ) -> Result<(Pilot, Arc<MockEventBus>)> {
        let basis = Basis::from_rows(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]).unwrap();
        let memory = SkillMemory::new(Some(basis), Arc::new(InMemoryRegistryStore::new())).unwrap();
        for (name, coeffs) in skills {
            memory.add_or_update(name, coeffs.clone(), SkillMetadata::default()).unwrap();
        }
        let bus = Arc::new(MockEventBus::new());
        let service = Arc::new(ScriptedService {
            answer: answer.to_string(),
            fail_probes,
        });
        let pilot = Pilot::new(service, Arc::new(memory), spec, bus.clone())?;
        Ok((pilot, bus))
    }

    #[tokio::test]
    async fn test_no_skill() {
        let (pilot, bus) = pilot("irrelevant", false, &[("CORPORATE", vec![0.0, 1.0])]);
        let run = pilot.run("hello").await.unwrap();
        assert_eq!(run.outcome, PilotOutcome::NoSkill);
        assert!(run.route.is_none());
        assert_eq!(bus.types(), vec!["intent_routed"]);
    }

    #[tokio::test]
    async fn test_approved_sql_is_executed() {
        let (pilot, bus) = pilot("SELECT name FROM users", false, &[("SQL", vec![1.0, 0.0])]);
        let pilot = pilot.with_executor(Arc::new(EchoExecutor));

        let run = pilot.run("who are the users?").await.unwrap();
        match run.outcome {
            PilotOutcome::Approved {
                skill,
                strength,
                request,
                verdict,
                output,
            } => {
                assert_eq!(skill, "SQL");
                assert_eq!(strength, 8.0);
                assert_eq!(request.kind, ToolKind::Sql);
                assert!(verdict.approved);
                assert_eq!(output.as_deref(), Some("ran SQL"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(bus.types(), vec!["intent_routed", "strength_tuned", "plan_evaluated"]);
    }

    #[tokio::test]
    async fn test_destructive_sql_is_blocked() {
        let (pilot, _) = pilot("DELETE FROM users WHERE id IN (SELECT id FROM users)", false, &[("SQL", vec![1.0, 0.0])]);
        let run = pilot.with_executor(Arc::new(EchoExecutor)).run("clean up").await.unwrap();
        match run.outcome {
            PilotOutcome::Blocked { verdict, .. } => {
                assert!(verdict.reason.contains("exceeds threshold"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_probe_failure_uses_floor() {
        let (pilot, _) = pilot("Sure, here is a summary.", true, &[("SQL", vec![1.0, 0.0])]);
        let run = pilot.run("summarise").await.unwrap();
        assert_eq!(
            run.outcome,
            PilotOutcome::TextOnly {
                skill: "SQL".to_string(),
                strength: 2.0,
                text: "Sure, here is a summary.".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_ladder_floor_is_never_zero() {
        let mut spec = PilotConfigSpec::default();
        spec.tuner.ladder = vec![];
        let err = pilot_with_spec("plain words only", true, &[("SQL", vec![1.0, 0.0])], &spec)
            .err()
            .map(|e| format!("{e:#}"));
        assert!(err.is_some_and(|e| e.contains("Strength ladder is empty")));

        spec.tuner.ladder = vec![0.5, 3.0];
        let (pilot, _) = pilot_with_spec("plain words only", true, &[("SQL", vec![1.0, 0.0])], &spec).unwrap();
        match pilot.run("anything").await.unwrap().outcome {
            PilotOutcome::TextOnly { strength, .. } => assert_eq!(strength, 0.5),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_action_profile_feeds_the_gate() {
        // Default attributes pass a read-only query; a wide-reaching profile
        // pushes the same query over the threshold.
        let (pilot, _) = pilot("SELECT name FROM users", false, &[("SQL", vec![1.0, 0.0])]);
        let pilot = pilot.with_action_profile(ActionProfile {
            agents_affected: 100,
            ..ActionProfile::default()
        });
        match pilot.run("who are the users?").await.unwrap().outcome {
            PilotOutcome::Blocked { request, verdict, .. } => {
                assert_eq!(request.kind, ToolKind::Sql);
                assert!(verdict.total_score > 0.5);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_event_bus_failure_aborts_run() {
        struct DownBus;

        #[async_trait]
        impl EventBus for DownBus {
            async fn publish(&self, _event: GcaEvent) -> Result<()> {
                anyhow::bail!("bus down")
            }
        }

        let basis = Basis::from_rows(vec![vec![1.0, 0.0, 0.0]]).unwrap();
        let memory = SkillMemory::new(Some(basis), Arc::new(InMemoryRegistryStore::new())).unwrap();
        let service = Arc::new(ScriptedService {
            answer: "SELECT 1 FROM dual".to_string(),
            fail_probes: false,
        });
        let pilot = Pilot::new(service, Arc::new(memory), &PilotConfigSpec::default(), Arc::new(DownBus)).unwrap();
        assert!(pilot.run("anything").await.is_err());
    }
}
