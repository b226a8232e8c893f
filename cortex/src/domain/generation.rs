// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Generation
//!
//! Domain interface for the external embedding/generation model.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Anti-corruption layer around the language model

// The model's internals (hooks on hidden layers, tokenizer, sampling loop)
// stay behind this trait. The core only ever sees two black-box operations:
// embed a text, and generate a continuation with an optional steering
// direction added to the activations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Direction injected into the model's activations during generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Steering {
    /// Full-space (`d`-dimensional) direction.
    pub vector: Vec<f32>,
    pub strength: f32,
    /// Hidden layer the direction is added at.
    pub layer: u32,
}

/// Options for a single generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// New tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Penalty applied to repeated tokens (1.0 disables it)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 150,
            temperature: 0.7,
            repetition_penalty: Some(1.2),
        }
    }
}

impl GenerationOptions {
    /// Short, unpenalised budget used by the auto-tuner's probes.
    pub fn probe(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
            repetition_penalty: None,
        }
    }
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Mean-pooled hidden state of `text` (padding excluded), `d`-dimensional.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, GenerationError>;

    /// Embeds several texts. Adapters that can batch should override this.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, GenerationError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Continues `prompt`, optionally steered.
    async fn generate(
        &self,
        prompt: &str,
        steering: Option<&Steering>,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError>;

    async fn health_check(&self) -> Result<(), GenerationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timed out after {0} ms")]
    Timeout(u64),
}
