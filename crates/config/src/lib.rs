//! Configuration loading, validation, and management for roleweave.
//!
//! Loads configuration from `roleweave.toml` with environment variable
//! overrides (`ROLEWEAVE_*`). Validates all settings at load; defaults
//! reproduce the engine's canonical constants so a missing file is never
//! an error.

use roleweave_core::Role;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Semantic segmentation parameters
    #[serde(default)]
    pub segmenter: SegmenterConfig,

    /// Role assignment scoring parameters
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Interruption stability parameters
    #[serde(default)]
    pub stability: StabilityConfig,

    /// Generator call parameters
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Session store selection
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Cosine similarity needed to join the current paragraph group
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Groups smaller than this are merged into a neighbor
    #[serde(default = "default_min_group_size")]
    pub min_group_size: usize,

    /// Hard cap on paragraphs per group
    #[serde(default = "default_max_group_size")]
    pub max_group_size: usize,

    /// Paragraphs shorter than this (after trimming) are dropped
    #[serde(default = "default_min_paragraph_chars")]
    pub min_paragraph_chars: usize,
}

fn default_similarity_threshold() -> f32 {
    0.75
}
fn default_min_group_size() -> usize {
    2
}
fn default_max_group_size() -> usize {
    5
}
fn default_min_paragraph_chars() -> usize {
    20
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            min_group_size: default_min_group_size(),
            max_group_size: default_max_group_size(),
            min_paragraph_chars: default_min_paragraph_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight of the structural component
    #[serde(default = "default_structural_weight")]
    pub structural_weight: f64,

    /// Weight of the lexical component
    #[serde(default = "default_lexical_weight")]
    pub lexical_weight: f64,

    /// Weight of the topic component
    #[serde(default = "default_topic_weight")]
    pub topic_weight: f64,

    /// Per-role primary-share targets for balanced assignment
    #[serde(default)]
    pub target_ratios: TargetRatios,
}

fn default_structural_weight() -> f64 {
    0.4
}
fn default_lexical_weight() -> f64 {
    0.3
}
fn default_topic_weight() -> f64 {
    0.3
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            structural_weight: default_structural_weight(),
            lexical_weight: default_lexical_weight(),
            topic_weight: default_topic_weight(),
            target_ratios: TargetRatios::default(),
        }
    }
}

/// Target share of primary assignments per role in balanced mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRatios {
    #[serde(default = "default_ratio_explainer")]
    pub explainer: f64,
    #[serde(default = "default_ratio_challenger")]
    pub challenger: f64,
    #[serde(default = "default_ratio_example_generator")]
    pub example_generator: f64,
    #[serde(default = "default_ratio_summarizer")]
    pub summarizer: f64,
    #[serde(default = "default_ratio_misconception_spotter")]
    pub misconception_spotter: f64,
}

fn default_ratio_explainer() -> f64 {
    0.30
}
fn default_ratio_challenger() -> f64 {
    0.20
}
fn default_ratio_example_generator() -> f64 {
    0.20
}
fn default_ratio_summarizer() -> f64 {
    0.15
}
fn default_ratio_misconception_spotter() -> f64 {
    0.15
}

impl Default for TargetRatios {
    fn default() -> Self {
        Self {
            explainer: default_ratio_explainer(),
            challenger: default_ratio_challenger(),
            example_generator: default_ratio_example_generator(),
            summarizer: default_ratio_summarizer(),
            misconception_spotter: default_ratio_misconception_spotter(),
        }
    }
}

impl TargetRatios {
    pub fn ratio(&self, role: Role) -> f64 {
        match role {
            Role::Explainer => self.explainer,
            Role::Challenger => self.challenger,
            Role::ExampleGenerator => self.example_generator,
            Role::Summarizer => self.summarizer,
            Role::MisconceptionSpotter => self.misconception_spotter,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityConfig {
    /// Turns the queue stays frozen after a reallocation
    #[serde(default = "default_transition_delay_turns")]
    pub transition_delay_turns: u64,

    /// Turns a demoted role stays pinned to the queue tail
    #[serde(default = "default_hysteresis_window_turns")]
    pub hysteresis_window_turns: u64,

    /// Minimum intent confidence to reallocate at all
    #[serde(default = "default_reallocation_threshold")]
    pub reallocation_threshold: f64,
}

fn default_transition_delay_turns() -> u64 {
    3
}
fn default_hysteresis_window_turns() -> u64 {
    7
}
fn default_reallocation_threshold() -> f64 {
    0.7
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            transition_delay_turns: default_transition_delay_turns(),
            hysteresis_window_turns: default_hysteresis_window_turns(),
            reallocation_threshold: default_reallocation_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Deadline for a single generator call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Default token budget per response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// How many trailing history turns feed the prompt context block
    #[serde(default = "default_context_window_turns")]
    pub context_window_turns: usize,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_tokens() -> u32 {
    500
}
fn default_context_window_turns() -> usize {
    10
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            context_window_turns: default_context_window_turns(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend name: "memory" or "file"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// Root directory for the file backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<std::path::PathBuf>,
}

fn default_store_backend() -> String {
    "memory".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            root: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from `roleweave.toml` in the working directory,
    /// then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(Path::new("roleweave.toml"))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path. Missing files yield
    /// defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Environment variable overrides (highest priority).
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("ROLEWEAVE_GENERATOR_TIMEOUT_SECS") {
            if let Ok(secs) = value.parse() {
                self.generator.timeout_secs = secs;
            }
        }
        if let Ok(value) = std::env::var("ROLEWEAVE_REALLOCATION_THRESHOLD") {
            if let Ok(threshold) = value.parse() {
                self.stability.reallocation_threshold = threshold;
            }
        }
        if let Ok(backend) = std::env::var("ROLEWEAVE_STORE_BACKEND") {
            self.store.backend = backend;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weight_sum = self.scoring.structural_weight
            + self.scoring.lexical_weight
            + self.scoring.topic_weight;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::ValidationError(format!(
                "scoring weights must sum to 1.0, got {weight_sum}"
            )));
        }

        if !(0.0..=1.0).contains(&self.segmenter.similarity_threshold) {
            return Err(ConfigError::ValidationError(
                "similarity_threshold must be between 0.0 and 1.0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.stability.reallocation_threshold) {
            return Err(ConfigError::ValidationError(
                "reallocation_threshold must be between 0.0 and 1.0".into(),
            ));
        }

        if self.segmenter.min_group_size == 0 || self.segmenter.max_group_size == 0 {
            return Err(ConfigError::ValidationError(
                "group sizes must be at least 1".into(),
            ));
        }

        if self.segmenter.min_group_size > self.segmenter.max_group_size {
            return Err(ConfigError::ValidationError(
                "min_group_size must not exceed max_group_size".into(),
            ));
        }

        if self.generator.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "generator timeout must be at least 1 second".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        path: std::path::PathBuf,
        reason: String,
    },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError {
        path: std::path::PathBuf,
        reason: String,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
