// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! GCA Cortex
//!
//! Skill memory, geometric routing, steering-strength calibration and the
//! action risk gate, plus the pilot that sequences them.
//!
//! # Architecture
//!
//! - **Layer:** Learning & Memory Layer
//! - **Purpose:** Library behind the `gca` CLI

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::*;
pub use domain::*;
pub use infrastructure::*;
