// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// HTTP Embedding/Generation Adapter
//
// Anti-Corruption Layer for a model server that exposes activation-level
// endpoints: pooled embeddings at a hidden layer and steered generation.
//
//   POST {endpoint}/embed     {model, text, layer}
//   POST {endpoint}/generate  {model, prompt, max_tokens, temperature, repetition_penalty, steering?}
//   GET  {endpoint}/health

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::generation::{GenerationError, GenerationOptions, GenerationService, Steering};
use crate::domain::geometry::masked_mean_pool;

pub struct HttpGenerationClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    layer: u32,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    text: &'a str,
    layer: u32,
}

/// Servers either pool themselves or hand back token-level states.
#[derive(Deserialize)]
#[serde(untagged)]
enum EmbedResponse {
    Pooled {
        embedding: Vec<f32>,
    },
    Tokens {
        hidden_states: Vec<Vec<f32>>,
        attention_mask: Vec<u8>,
    },
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    repetition_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    steering: Option<&'a Steering>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    text: String,
}

impl HttpGenerationClient {
    pub fn new(endpoint: String, model: String, layer: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            model,
            layer,
            api_key: None,
            timeout: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Bounds each request from connect until the body is read.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> GenerationError {
        match self.timeout {
            Some(timeout) if e.is_timeout() => GenerationError::Timeout(timeout.as_millis() as u64),
            _ => GenerationError::Network(e.to_string()),
        }
    }

    fn decode_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            return self.transport_error(e);
        }
        GenerationError::Provider(format!("Failed to parse response: {}", e))
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response, GenerationError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            401 | 403 => GenerationError::Authentication(error_text),
            404 => GenerationError::ModelNotFound(self.model.clone()),
            400 | 422 => GenerationError::InvalidInput(error_text),
            _ => GenerationError::Provider(format!("HTTP {}: {}", status, error_text)),
        })
    }
}

#[async_trait]
impl GenerationService for HttpGenerationClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, GenerationError> {
        let request = EmbedRequest {
            model: &self.model,
            text,
            layer: self.layer,
        };

        let response = self
            .authorize(self.client.post(self.url("embed")))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check_status(response).await?;

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| self.decode_error(e))?;

        let embedding = match body {
            EmbedResponse::Pooled { embedding } => embedding,
            EmbedResponse::Tokens {
                hidden_states,
                attention_mask,
            } => {
                if hidden_states.len() != attention_mask.len() {
                    return Err(GenerationError::Provider(format!(
                        "Attention mask covers {} tokens but {} hidden states were returned",
                        attention_mask.len(),
                        hidden_states.len()
                    )));
                }
                masked_mean_pool(&hidden_states, &attention_mask)
            }
        };

        if embedding.is_empty() {
            return Err(GenerationError::Provider("Empty embedding returned".to_string()));
        }
        Ok(embedding)
    }

    async fn generate(
        &self,
        prompt: &str,
        steering: Option<&Steering>,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            repetition_penalty: options.repetition_penalty,
            steering,
        };

        let response = self
            .authorize(self.client.post(self.url("generate")))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check_status(response).await?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| self.decode_error(e))?;

        Ok(body.text)
    }

    async fn health_check(&self) -> Result<(), GenerationError> {
        let response = self
            .authorize(self.client.get(self.url("health")))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(GenerationError::Network(format!("HTTP {}", response.status())))
        }
    }
}
