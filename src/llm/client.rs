//! Completion client: the single boundary between stages and providers.
//!
//! Fails closed: a missing credential, transport error, bad status or
//! malformed body all come back as `Err(LlmError)`. One attempt per call.

use std::sync::Arc;

use tracing::{debug, warn};

use super::costs;
use super::provider::{CompletionRequest, LlmProvider};
use super::{create_provider, LlmConfig};
use crate::error::LlmError;

/// Wraps an optional provider. `None` means no credential was configured.
#[derive(Clone)]
pub struct CompletionClient {
    provider: Option<Arc<dyn LlmProvider>>,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// A client with no credential. Every call fails with `MissingCredential`.
    pub fn unconfigured() -> Self {
        Self { provider: None }
    }

    /// Build from an optional provider config (`None` when no credential).
    pub fn from_config(config: Option<&LlmConfig>) -> Result<Self, LlmError> {
        match config {
            Some(config) => Ok(Self::new(create_provider(config)?)),
            None => Ok(Self::unconfigured()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.provider.as_deref().map(|p| p.model_name())
    }

    /// Run one completion and return the generated text.
    pub async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let Some(provider) = self.provider.as_ref() else {
            return Err(LlmError::MissingCredential {
                provider: "unconfigured".to_string(),
            });
        };

        let response = provider.complete(request).await.inspect_err(|e| {
            warn!(model = provider.model_name(), error = %e, "Completion call failed");
        })?;

        let cost = costs::estimate(
            provider.cost_per_token(),
            response.input_tokens,
            response.output_tokens,
        );
        debug!(
            model = provider.model_name(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            cost_usd = %cost,
            "Completion succeeded"
        );

        if response.content.trim().is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: provider.model_name().to_string(),
                reason: "empty completion".to_string(),
            });
        }
        Ok(response.content)
    }
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("model", &self.model_name())
            .finish()
    }
}
