use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::correction::{CorrectionOptions, CorrectionPromptTemplate, RetryPolicy, DEFAULT_BATCH_SIZE};
use crate::correction::batch::CONTEXT_OVERLAP;
use crate::errors::ConfigError;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language of the subtitles (ISO)
    #[serde(default = "default_language")]
    pub language: String,

    /// AI provider selection and settings
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Correction run settings
    #[serde(default)]
    pub correction: CorrectionConfig,

    /// Optional JSON homophone dictionary; the built-in one is used otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homophone_dictionary: Option<PathBuf>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// AI provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: Google Gemini
    #[default]
    Gemini,
    // @provider: Ollama
    Ollama,
    // @provider: Anthropic
    Anthropic,
}

impl ProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::Ollama => "Ollama",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
            Self::Anthropic => "anthropic",
        }
    }

    /// Hosted providers need an API key
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Settings for one provider
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param kind: Provider enum
    // @returns: Provider config with defaults
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            provider_type: kind.as_str().to_string(),
            model: default_model(kind),
            api_key: String::new(),
            endpoint: default_endpoint(kind),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Provider selection
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProvidersConfig {
    /// Provider to use
    #[serde(default)]
    pub provider: ProviderKind,

    /// Settings per provider type
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            available_providers: vec![
                ProviderConfig::new(ProviderKind::Gemini),
                ProviderConfig::new(ProviderKind::Ollama),
                ProviderConfig::new(ProviderKind::Anthropic),
            ],
        }
    }
}

impl ProvidersConfig {
    /// Settings of the selected provider, defaults if it is not listed
    pub fn active(&self) -> ProviderConfig {
        self.get(self.provider)
            .cloned()
            .unwrap_or_else(|| ProviderConfig::new(self.provider))
    }

    /// Settings listed for `kind`
    pub fn get(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        self.available_providers
            .iter()
            .find(|p| p.provider_type.eq_ignore_ascii_case(kind.as_str()))
    }

    /// Mutable settings for `kind`, inserting defaults if missing
    pub fn get_or_insert_mut(&mut self, kind: ProviderKind) -> &mut ProviderConfig {
        let position = match self
            .available_providers
            .iter()
            .position(|p| p.provider_type.eq_ignore_ascii_case(kind.as_str()))
        {
            Some(position) => position,
            None => {
                self.available_providers.push(ProviderConfig::new(kind));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[position]
    }

    /// Get the model for the active provider
    pub fn model(&self) -> String {
        let active = self.active();
        if active.model.is_empty() {
            default_model(self.provider)
        } else {
            active.model
        }
    }

    /// Get the API key for the active provider
    pub fn api_key(&self) -> String {
        self.active().api_key
    }

    /// Get the endpoint for the active provider
    pub fn endpoint(&self) -> String {
        let active = self.active();
        if active.endpoint.is_empty() {
            default_endpoint(self.provider)
        } else {
            active.endpoint
        }
    }
}

/// Correction run settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CorrectionConfig {
    /// Entries per batch, context included
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause before each batch after the first, in milliseconds
    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,

    /// Total attempts for a rate-limited batch
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, doubled for every further retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Maximum relative text-length change per entry
    #[serde(default = "default_max_length_delta")]
    pub max_length_delta: f64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Custom prompt with `{transcript}` and `{subtitles}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            pacing_delay_ms: default_pacing_delay_ms(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_length_delta: default_max_length_delta(),
            temperature: default_temperature(),
            prompt_template: None,
        }
    }
}

impl CorrectionConfig {
    /// Engine options described by these settings
    pub fn to_options(&self) -> CorrectionOptions {
        CorrectionOptions {
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                initial_backoff: Duration::from_millis(self.retry_backoff_ms),
                multiplier: 2,
            },
            pacing_delay: Duration::from_millis(self.pacing_delay_ms),
            max_length_delta: self.max_length_delta,
            template: self
                .prompt_template
                .as_deref()
                .map(CorrectionPromptTemplate::new)
                .unwrap_or_default(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size <= CONTEXT_OVERLAP {
            return Err(ConfigError::BatchSizeTooSmall {
                batch_size: self.batch_size,
                overlap: CONTEXT_OVERLAP,
            });
        }
        if !(self.max_length_delta.is_finite() && self.max_length_delta > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_length_delta must be positive, got {}",
                self.max_length_delta
            )));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".to_string()));
        }
        if let Some(template) = &self.prompt_template {
            if !CorrectionPromptTemplate::has_required_placeholders(template) {
                return Err(ConfigError::Invalid(
                    "prompt_template must contain {transcript} and {subtitles}".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_language() -> String {
    "zh".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_pacing_delay_ms() -> u64 {
    5000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    5000
}

fn default_max_length_delta() -> f64 {
    0.3
}

fn default_temperature() -> f32 {
    0.2
}

fn default_model(kind: ProviderKind) -> String {
    match kind {
        ProviderKind::Gemini => "gemini-2.0-flash".to_string(),
        ProviderKind::Ollama => "qwen2.5:7b".to_string(),
        ProviderKind::Anthropic => "claude-3-5-haiku-latest".to_string(),
    }
}

fn default_endpoint(kind: ProviderKind) -> String {
    match kind {
        ProviderKind::Gemini => "https://generativelanguage.googleapis.com".to_string(),
        ProviderKind::Ollama => "http://localhost:11434".to_string(),
        ProviderKind::Anthropic => "https://api.anthropic.com".to_string(),
    }
}

impl Config {
    /// Load the configuration file, writing defaults first if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()));
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.language)?;
        self.correction.validate()?;

        let kind = self.providers.provider;
        if kind.requires_api_key() && self.providers.api_key().trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "API key is required for the {} provider",
                kind.display_name()
            ))
            .into());
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            language: default_language(),
            providers: ProvidersConfig::default(),
            correction: CorrectionConfig::default(),
            homophone_dictionary: None,
            log_level: LogLevel::default(),
        }
    }
}
