// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Pilot Configuration Types
//
// Defines the configuration schema for a GCA pilot node:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Skill memory storage locations
// - Router, auto-tuner and risk gate thresholds
// - Embedding/generation service endpoint
// - Observability settings

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::generation::GenerationOptions;

pub const API_VERSION: &str = "gca/v1";
pub const KIND: &str = "PilotConfig";

/// Top-level Kubernetes-style pilot configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PilotConfigManifest {
    /// API version (must be "gca/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "PilotConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: PilotConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Configuration specification (content under spec:)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PilotConfigSpec {
    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub tuner: TunerConfig,

    #[serde(default)]
    pub moral: MoralConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observability: Option<ObservabilityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Basis file (`.json`, or `.bin` for bincode)
    #[serde(default = "default_basis_path")]
    pub basis_path: PathBuf,

    /// Skill registry JSON file
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,

    /// Hidden layer recorded on newly learned skills
    #[serde(default = "default_layer")]
    pub layer: u32,

    /// Strength recorded on newly learned skills
    #[serde(default = "default_strength")]
    pub default_strength: f32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            basis_path: default_basis_path(),
            registry_path: default_registry_path(),
            layer: default_layer(),
            default_strength: default_strength(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Best score must exceed this for a skill to be selected
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TunerConfig {
    /// Candidate strengths, strictly ascending
    #[serde(default = "default_ladder")]
    pub ladder: Vec<f32>,

    /// Diversity ratio below which a probe counts as collapsed
    #[serde(default = "default_collapse_threshold")]
    pub collapse_threshold: f32,

    /// Token budget of each probe
    #[serde(default = "default_probe_tokens")]
    pub probe_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on a single probe call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_timeout_ms: Option<u64>,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            ladder: default_ladder(),
            collapse_threshold: default_collapse_threshold(),
            probe_tokens: default_probe_tokens(),
            temperature: default_temperature(),
            probe_timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoralConfig {
    /// Batches scoring at or above this are blocked
    #[serde(default = "default_moral_threshold")]
    pub threshold: f64,
}

impl Default for MoralConfig {
    fn default() -> Self {
        Self {
            threshold: default_moral_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// API key (supports "env:VAR_NAME" for environment variables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f32,

    /// Upper bound on a single model server request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            repetition_penalty: default_repetition_penalty(),
            timeout_ms: None,
        }
    }
}

impl GenerationConfig {
    pub fn options(&self) -> GenerationOptions {
        GenerationOptions {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            repetition_penalty: Some(self.repetition_penalty),
        }
    }

    /// Resolves `env:VAR` indirection. A missing variable is an error.
    pub fn resolved_api_key(&self) -> anyhow::Result<Option<String>> {
        match self.api_key.as_deref() {
            None => Ok(None),
            Some(key) => match key.strip_prefix("env:") {
                Some(var) => std::env::var(var)
                    .map(Some)
                    .map_err(|_| anyhow::anyhow!("Environment variable '{}' not set", var)),
                None => Ok(Some(key.to_string())),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("json" or "text")
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_basis_path() -> PathBuf {
    PathBuf::from("universal_basis.json")
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("skill_registry.json")
}

fn default_layer() -> u32 {
    super::skill::DEFAULT_SKILL_LAYER
}

fn default_strength() -> f32 {
    super::skill::DEFAULT_SKILL_STRENGTH
}

fn default_min_confidence() -> f32 {
    0.3
}

fn default_ladder() -> Vec<f32> {
    vec![2.0, 4.0, 6.0, 8.0]
}

fn default_collapse_threshold() -> f32 {
    0.6
}

fn default_probe_tokens() -> u32 {
    20
}

fn default_temperature() -> f32 {
    0.7
}

fn default_moral_threshold() -> f64 {
    0.5
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8088".to_string()
}

fn default_model() -> String {
    "gpt2".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_repetition_penalty() -> f32 {
    1.2
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for PilotConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "gca-pilot".to_string(),
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: PilotConfigSpec::default(),
        }
    }
}

impl PilotConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. GCA_CONFIG_PATH environment variable
    /// 2. ./gca-config.yaml (working directory)
    /// 3. ~/.gca/config.yaml (user home)
    /// 4. /etc/gca/config.yaml (system, Unix) or C:\ProgramData\Gca\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("GCA_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./gca-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".gca").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/gca/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Gca\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // An explicit path must exist and parse.
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::debug!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("GCA_BASIS_PATH") {
            tracing::info!("Environment override: GCA_BASIS_PATH={}", val);
            self.spec.memory.basis_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("GCA_REGISTRY_PATH") {
            tracing::info!("Environment override: GCA_REGISTRY_PATH={}", val);
            self.spec.memory.registry_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("GCA_GENERATION_ENDPOINT") {
            tracing::info!("Environment override: GCA_GENERATION_ENDPOINT={}", val);
            self.spec.generation.endpoint = val;
        }

        if let Some(v) = parse_env::<f32>("GCA_ROUTER_MIN_CONFIDENCE") {
            self.spec.router.min_confidence = v;
        }

        if let Some(v) = parse_env::<f32>("GCA_COLLAPSE_THRESHOLD") {
            self.spec.tuner.collapse_threshold = v;
        }

        if let Some(v) = parse_env::<f64>("GCA_MORAL_THRESHOLD") {
            self.spec.moral.threshold = v;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        let router = &self.spec.router;
        if !(-1.0..=1.0).contains(&router.min_confidence) {
            anyhow::bail!(
                "router.min_confidence must be within [-1, 1], got {}",
                router.min_confidence
            );
        }

        let tuner = &self.spec.tuner;
        if tuner.ladder.is_empty() {
            anyhow::bail!("tuner.ladder cannot be empty");
        }
        if tuner.ladder.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            anyhow::bail!("tuner.ladder strengths must be finite and positive");
        }
        if tuner.ladder.windows(2).any(|w| w[0] >= w[1]) {
            anyhow::bail!("tuner.ladder must be strictly ascending");
        }
        if !tuner.collapse_threshold.is_finite() || tuner.collapse_threshold <= 0.0 {
            anyhow::bail!(
                "tuner.collapse_threshold must be finite and positive, got {}",
                tuner.collapse_threshold
            );
        }
        if tuner.probe_tokens == 0 {
            anyhow::bail!("tuner.probe_tokens must be greater than zero");
        }

        let moral = &self.spec.moral;
        if !moral.threshold.is_finite() || moral.threshold <= 0.0 {
            anyhow::bail!(
                "moral.threshold must be finite and positive, got {}",
                moral.threshold
            );
        }

        if self.spec.generation.timeout_ms == Some(0) {
            anyhow::bail!("generation.timeout_ms must be greater than zero");
        }

        if self.spec.generation.endpoint.is_empty() {
            anyhow::bail!("generation.endpoint cannot be empty");
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(var: &str) -> Option<T> {
    let val = std::env::var(var).ok()?;
    match val.parse::<T>() {
        Ok(v) => {
            tracing::info!("Environment override: {}={}", var, val);
            Some(v)
        }
        Err(_) => {
            tracing::warn!("Invalid value for {}: '{}'. Ignoring.", var, val);
            None
        }
    }
}
