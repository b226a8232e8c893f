// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Proposed Actions
//!
//! An [`Action`] describes one effect the pilot wants to have on the world
//! (run a query, execute code, write a file). It is built fresh for every
//! decision and never persisted. The risk gate scores actions from five
//! bounded attributes plus an [`EntropyClass`].
//!
//! Attributes are validated at construction: `harm`, `utility`,
//! `uncertainty` and `scale` must lie in `[0, 1]`. The agent count is
//! unsigned, so a negative value cannot be represented and is rejected by the
//! deserializer. Deserialization goes through the same validation as
//! [`Action::new`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse reversibility tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntropyClass {
    Reversible,
    Bounded,
    Irreversible,
}

impl EntropyClass {
    /// Multiplier applied to an action's scaled magnitude.
    pub fn weight(&self) -> f64 {
        match self {
            EntropyClass::Irreversible => 2.0,
            EntropyClass::Reversible | EntropyClass::Bounded => 1.0,
        }
    }
}

impl std::fmt::Display for EntropyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntropyClass::Reversible => "REVERSIBLE",
            EntropyClass::Bounded => "BOUNDED",
            EntropyClass::Irreversible => "IRREVERSIBLE",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ActionError {
    #[error("Attribute '{attribute}' must be within [0, 1], got {value}")]
    OutOfRange { attribute: &'static str, value: f64 },
}

/// Unvalidated wire shape; see [`Action`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSpec {
    pub kind: String,
    #[serde(default)]
    pub summary: String,
    pub harm: f64,
    pub utility: f64,
    pub uncertainty: f64,
    pub scale: f64,
    pub agents_affected: u32,
    pub entropy_class: EntropyClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ActionSpec", into = "ActionSpec")]
pub struct Action {
    kind: String,
    summary: String,
    harm: f64,
    utility: f64,
    uncertainty: f64,
    scale: f64,
    agents_affected: u32,
    entropy_class: EntropyClass,
}

impl Action {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: impl Into<String>,
        summary: impl Into<String>,
        harm: f64,
        utility: f64,
        uncertainty: f64,
        scale: f64,
        agents_affected: u32,
        entropy_class: EntropyClass,
    ) -> Result<Self, ActionError> {
        check_unit("harm", harm)?;
        check_unit("utility", utility)?;
        check_unit("uncertainty", uncertainty)?;
        check_unit("scale", scale)?;

        Ok(Self {
            kind: kind.into(),
            summary: summary.into(),
            harm,
            utility,
            uncertainty,
            scale,
            agents_affected,
            entropy_class,
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn harm(&self) -> f64 {
        self.harm
    }

    pub fn utility(&self) -> f64 {
        self.utility
    }

    pub fn uncertainty(&self) -> f64 {
        self.uncertainty
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn agents_affected(&self) -> u32 {
        self.agents_affected
    }

    pub fn entropy_class(&self) -> EntropyClass {
        self.entropy_class
    }

    /// Copy of this action tagged with a different entropy class.
    pub fn with_entropy_class(mut self, entropy_class: EntropyClass) -> Self {
        self.entropy_class = entropy_class;
        self
    }
}

impl TryFrom<ActionSpec> for Action {
    type Error = ActionError;

    fn try_from(spec: ActionSpec) -> Result<Self, Self::Error> {
        Action::new(
            spec.kind,
            spec.summary,
            spec.harm,
            spec.utility,
            spec.uncertainty,
            spec.scale,
            spec.agents_affected,
            spec.entropy_class,
        )
    }
}

impl From<Action> for ActionSpec {
    fn from(action: Action) -> Self {
        Self {
            kind: action.kind,
            summary: action.summary,
            harm: action.harm,
            utility: action.utility,
            uncertainty: action.uncertainty,
            scale: action.scale,
            agents_affected: action.agents_affected,
            entropy_class: action.entropy_class,
        }
    }
}

fn check_unit(attribute: &'static str, value: f64) -> Result<(), ActionError> {
    // NaN fails the range check as well.
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ActionError::OutOfRange { attribute, value })
    }
}
