//! LLM integration for email-crew.
//!
//! Supports:
//! - **Gemini**: Direct API access via rig-core
//! - **OpenAI**: Direct API access via rig-core, or a compatible endpoint
//!   through a base URL override
//!
//! Uses the rig-core crate for HTTP transport and the `RigAdapter` to bridge
//! rig's `CompletionModel` trait to our `LlmProvider` trait. Stages never call
//! a provider directly; they go through `CompletionClient`, which fails closed.

pub mod client;
pub mod costs;
pub mod provider;
mod rig_adapter;

pub use client::CompletionClient;
pub use provider::*;
pub use rig_adapter::RigAdapter;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rig::client::CompletionClient as _;
use secrecy::{ExposeSecret, SecretString};

use crate::error::LlmError;

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Gemini,
    OpenAi,
}

impl LlmBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }

    /// Environment variable holding this backend's credential.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.0-flash",
            Self::OpenAi => "gpt-4o-mini",
        }
    }
}

impl FromStr for LlmBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            other => Err(format!("unknown backend '{other}' (expected gemini or openai)")),
        }
    }
}

impl std::fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: SecretString,
    pub model: String,
    pub base_url: Option<String>,
    pub request_timeout: Option<Duration>,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    if let Some(ref url) = config.base_url {
        validate_base_url(config.backend, url)?;
    }
    match config.backend {
        LlmBackend::Gemini => create_gemini_provider(config),
        LlmBackend::OpenAi => create_openai_provider(config),
    }
}

fn validate_base_url(backend: LlmBackend, url: &str) -> Result<(), LlmError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(LlmError::RequestFailed {
            provider: backend.to_string(),
            reason: format!("Base URL '{}' must start with http:// or https://", url),
        })
    }
}

fn create_gemini_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::gemini;

    let api_key = config.api_key.expose_secret();
    let client: rig::client::Client<gemini::client::GeminiExt> = match config.base_url.as_deref()
    {
        Some(url) => gemini::Client::builder().api_key(api_key).base_url(url).build(),
        None => gemini::Client::new(api_key),
    }
    .map_err(|e| LlmError::RequestFailed {
        provider: "gemini".to_string(),
        reason: format!("Failed to create Gemini client: {}", e),
    })?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using Gemini (model: {})", config.model);
    Ok(Arc::new(
        RigAdapter::new(model, &config.model).with_timeout(config.request_timeout),
    ))
}

fn create_openai_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::openai;

    let api_key = config.api_key.expose_secret();
    let client: rig::client::Client<openai::client::OpenAIResponsesExt> =
        match config.base_url.as_deref() {
            Some(url) => openai::Client::builder().api_key(api_key).base_url(url).build(),
            None => openai::Client::new(api_key),
        }
        .map_err(|e| LlmError::RequestFailed {
            provider: "openai".to_string(),
            reason: format!("Failed to create OpenAI client: {}", e),
        })?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using OpenAI (model: {})", config.model);
    Ok(Arc::new(
        RigAdapter::new(model, &config.model).with_timeout(config.request_timeout),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_gemini_provider() {
        let config = LlmConfig {
            backend: LlmBackend::Gemini,
            api_key: SecretString::from("test-key"),
            model: "gemini-2.0-flash".to_string(),
            base_url: None,
            request_timeout: Some(Duration::from_secs(30)),
        };
        let provider = create_provider(&config);
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().model_name(), "gemini-2.0-flash");
    }

    #[test]
    fn test_create_openai_provider() {
        let config = LlmConfig {
            backend: LlmBackend::OpenAi,
            api_key: SecretString::from("sk-test"),
            model: "gpt-4o".to_string(),
            base_url: Some("http://localhost:11434/v1".to_string()),
            request_timeout: None,
        };
        let provider = create_provider(&config);
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().model_name(), "gpt-4o");
    }

    #[test]
    fn base_url_without_scheme_is_rejected() {
        let config = LlmConfig {
            backend: LlmBackend::Gemini,
            api_key: SecretString::from("test-key"),
            model: "gemini-2.0-flash".to_string(),
            base_url: Some("localhost:8080".to_string()),
            request_timeout: None,
        };
        let err = create_provider(&config).err().unwrap();
        assert!(matches!(err, LlmError::RequestFailed { .. }));
        assert!(err.to_string().contains("localhost:8080"));
    }

    #[test]
    fn backend_parsing() {
        assert_eq!("Gemini".parse::<LlmBackend>(), Ok(LlmBackend::Gemini));
        assert_eq!(" openai ".parse::<LlmBackend>(), Ok(LlmBackend::OpenAi));
        assert!("palm".parse::<LlmBackend>().is_err());
        assert_eq!(LlmBackend::OpenAi.api_key_var(), "OPENAI_API_KEY");
    }
}
