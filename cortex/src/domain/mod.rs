// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Pure types and vector math for the pilot: the basis, skills, proposed
//! actions and their verdicts, tool requests, events and configuration.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** No I/O; everything here is deterministic

pub mod action;
pub mod basis;
pub mod events;
pub mod generation;
pub mod geometry;
pub mod pilot_config;
pub mod skill;
pub mod tool_request;
pub mod verdict;

pub use action::{Action, ActionError, ActionSpec, EntropyClass};
pub use basis::{Basis, BasisError, BasisFile};
pub use events::{GcaEvent, RunId};
pub use generation::{GenerationError, GenerationOptions, GenerationService, Steering};
pub use pilot_config::PilotConfigManifest;
pub use skill::{canonical_skill_name, SkillMatrix, SkillMetadata, SkillRecord};
pub use tool_request::{ActionProfile, ToolKind, ToolRequest};
pub use verdict::Verdict;
