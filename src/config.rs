//! Configuration types.
//!
//! Everything the pipeline needs is read once at startup into a
//! [`PipelineConfig`] and passed down; nothing re-reads the environment
//! mid-pipeline.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// Sampling parameters for one stage's model call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl StageParams {
    /// Summaries need coverage: low randomness, larger budget.
    pub const SUMMARY: Self = Self {
        temperature: 0.3,
        max_tokens: 500,
    };

    /// Reviews need judgment with a little more variance, and less room
    /// than the summary they critique.
    pub const REVIEW: Self = Self {
        temperature: 0.4,
        max_tokens: 400,
    };

    pub const REFINE: Self = Self::SUMMARY;
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Which completion service to talk to.
    pub backend: LlmBackend,
    /// Credential for the backend. `None` routes every stage to its fallback.
    pub api_key: Option<SecretString>,
    /// Model identifier passed to the backend.
    pub model: String,
    /// Endpoint override (proxies, local OpenAI-compatible servers).
    pub base_url: Option<String>,
    /// Per-call provider timeout. `None` waits on the transport.
    pub request_timeout: Option<Duration>,
    pub summary: StageParams,
    pub review: StageParams,
    pub refine: StageParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::Gemini,
            api_key: None,
            model: LlmBackend::Gemini.default_model().to_string(),
            base_url: None,
            request_timeout: None,
            summary: StageParams::SUMMARY,
            review: StageParams::REVIEW,
            refine: StageParams::REFINE,
        }
    }
}

impl PipelineConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("EMAIL_CREW_BACKEND") {
            Some(raw) if !raw.trim().is_empty() => {
                raw.parse::<LlmBackend>()
                    .map_err(|message| ConfigError::InvalidValue {
                        key: "EMAIL_CREW_BACKEND".to_string(),
                        message,
                    })?
            }
            _ => LlmBackend::Gemini,
        };

        let api_key = lookup(backend.api_key_var())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(SecretString::from);

        let model = lookup("EMAIL_CREW_MODEL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| backend.default_model().to_string());

        let base_url = lookup("EMAIL_CREW_BASE_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        let request_timeout = match lookup("EMAIL_CREW_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "EMAIL_CREW_TIMEOUT_SECS".to_string(),
                    message: format!("expected a whole number of seconds, got '{raw}'"),
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            backend,
            api_key,
            model,
            base_url,
            request_timeout,
            ..Self::default()
        })
    }

    /// Whether a credential is present.
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Provider configuration, or `None` when no credential is configured.
    pub fn llm_config(&self) -> Option<LlmConfig> {
        self.api_key.as_ref().map(|api_key| LlmConfig {
            backend: self.backend,
            api_key: api_key.clone(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            request_timeout: self.request_timeout,
        })
    }
}
