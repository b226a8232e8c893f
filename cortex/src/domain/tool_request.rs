// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Tool requests extracted from steered generations, and the entropy class
//! each request carries into the risk gate.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::action::{Action, ActionError, EntropyClass};

static PYTHON_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```python(.*?)```").expect("static regex is valid"));

/// Longest summary attached to an action built from a request.
const SUMMARY_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolKind {
    Sql,
    Python,
    Text,
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ToolKind::Sql => "SQL",
            ToolKind::Python => "PYTHON",
            ToolKind::Text => "TEXT",
        };
        f.write_str(label)
    }
}

/// Attribute values for actions derived from a tool request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionProfile {
    pub harm: f64,
    pub utility: f64,
    pub uncertainty: f64,
    pub scale: f64,
    pub agents_affected: u32,
}

impl Default for ActionProfile {
    fn default() -> Self {
        Self {
            harm: 0.3,
            utility: 0.9,
            uncertainty: 0.2,
            scale: 1.0,
            agents_affected: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub kind: ToolKind,
    pub content: String,
}

impl ToolRequest {
    /// Classifies a model response.
    ///
    /// SQL wins when the response mentions both `SELECT` and `FROM`; the whole
    /// trimmed response becomes the query. Otherwise the first fenced python
    /// block is extracted. Anything else is plain text.
    pub fn parse(response: &str) -> Self {
        let upper = response.to_uppercase();
        if upper.contains("SELECT") && upper.contains("FROM") {
            return Self {
                kind: ToolKind::Sql,
                content: response.trim().to_string(),
            };
        }

        if let Some(caps) = PYTHON_BLOCK.captures(response) {
            return Self {
                kind: ToolKind::Python,
                content: caps[1].trim().to_string(),
            };
        }

        Self {
            kind: ToolKind::Text,
            content: response.to_string(),
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.kind != ToolKind::Text
    }

    /// Data loss is irreversible; code execution is contained; queries are
    /// reversible.
    pub fn entropy_class(&self) -> EntropyClass {
        let upper = self.content.to_uppercase();
        if upper.contains("DELETE") || upper.contains("DROP") {
            return EntropyClass::Irreversible;
        }
        match self.kind {
            ToolKind::Python => EntropyClass::Bounded,
            ToolKind::Sql | ToolKind::Text => EntropyClass::Reversible,
        }
    }

    pub fn to_action(&self, profile: &ActionProfile) -> Result<Action, ActionError> {
        let summary: String = self.content.chars().take(SUMMARY_CHARS).collect();
        Action::new(
            format!("execute_{}", self.kind),
            summary,
            profile.harm,
            profile.utility,
            profile.uncertainty,
            profile.scale,
            profile.agents_affected,
            self.entropy_class(),
        )
    }
}
