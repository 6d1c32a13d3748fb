//! Bridges rig's `CompletionModel` to our `LlmProvider` trait.
//!
//! rig owns the wire format and HTTP transport for each backend. This adapter
//! maps our provider-neutral request onto rig's builder, enforces the
//! configured request timeout, and maps rig's errors onto `LlmError`.

use std::time::Duration;

use async_trait::async_trait;
use rig::completion::{AssistantContent, CompletionError, CompletionModel, Message};
use rust_decimal::Decimal;

use super::costs;
use super::provider::{ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role};
use crate::error::LlmError;

/// Wraps a rig completion model.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
    timeout: Option<Duration>,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            timeout: None,
        }
    }

    /// Abort calls that take longer than `timeout`. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn map_error(&self, error: CompletionError) -> LlmError {
        match error {
            CompletionError::JsonError(e) => LlmError::Json(e),
            CompletionError::ResponseError(reason) => LlmError::InvalidResponse {
                provider: self.model_name.clone(),
                reason,
            },
            other => LlmError::RequestFailed {
                provider: self.model_name.clone(),
                reason: other.to_string(),
            },
        }
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn cost_per_token(&self) -> (Decimal, Decimal) {
        costs::model_cost(&self.model_name).unwrap_or_else(costs::default_cost)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let (prompt, history) =
            split_turns(&request.messages).ok_or_else(|| LlmError::RequestFailed {
                provider: self.model_name.clone(),
                reason: "request has no user or assistant message".to_string(),
            })?;

        let mut builder = self.model.completion_request(prompt).messages(history);
        if let Some(preamble) = request.system_prompt() {
            builder = builder.preamble(preamble);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }
        let rig_request = builder.build();

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.model.completion(rig_request))
                .await
                .map_err(|_| LlmError::RequestFailed {
                    provider: self.model_name.clone(),
                    reason: format!("timed out after {}s", limit.as_secs()),
                })?,
            None => self.model.completion(rig_request).await,
        };
        let response = result.map_err(|e| self.map_error(e))?;

        let content = response
            .choice
            .iter()
            .filter_map(|c| match c {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if content.trim().is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.model_name.clone(),
                reason: "response contained no text".to_string(),
            });
        }

        Ok(CompletionResponse {
            content,
            input_tokens: saturating_u32(response.usage.input_tokens),
            output_tokens: saturating_u32(response.usage.output_tokens),
        })
    }
}

/// Split chat turns into rig's (prompt, history). System messages travel as
/// the preamble and are skipped here.
fn split_turns(messages: &[ChatMessage]) -> Option<(Message, Vec<Message>)> {
    let mut turns: Vec<Message> = messages
        .iter()
        .filter_map(|m| match m.role {
            Role::System => None,
            Role::User => Some(Message::user(m.content.clone())),
            Role::Assistant => Some(Message::assistant(m.content.clone())),
        })
        .collect();
    let prompt = turns.pop()?;
    Some((prompt, turns))
}

fn saturating_u32(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_turn_becomes_the_prompt() {
        let messages = vec![
            ChatMessage::system("persona"),
            ChatMessage::user("first"),
            ChatMessage::assistant("reply"),
            ChatMessage::user("second"),
        ];
        let (_prompt, history) = split_turns(&messages).unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn system_only_request_has_no_prompt() {
        assert!(split_turns(&[ChatMessage::system("persona")]).is_none());
        assert!(split_turns(&[]).is_none());
    }

    #[test]
    fn token_counts_saturate() {
        assert_eq!(saturating_u32(42), 42);
        assert_eq!(saturating_u32(u64::MAX), u32::MAX);
    }
}
