//! Pipeline stages.
//!
//! Each stage turns text into text with one model call and a built-in
//! offline fallback. Model failures never leave a stage: they are logged and
//! replaced by fallback text. A stage only returns `Err` when it was
//! composed incorrectly (e.g. the review stage was given no summary).

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::StageParams;
use crate::error::PipelineError;
use crate::llm::{ChatMessage, CompletionClient, CompletionRequest};
use crate::pipeline::fallback::{fallback_review, fallback_summary};
use crate::pipeline::prompts;

/// Inputs handed to a stage. Later stages read earlier stages' output.
#[derive(Debug, Clone, Copy)]
pub struct StageInput<'a> {
    pub email: &'a str,
    pub summary: Option<&'a str>,
    pub feedback: Option<&'a str>,
}

impl<'a> StageInput<'a> {
    pub fn new(email: &'a str) -> Self {
        Self {
            email,
            summary: None,
            feedback: None,
        }
    }

    pub fn with_summary(mut self, summary: &'a str) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn with_feedback(mut self, feedback: &'a str) -> Self {
        self.feedback = Some(feedback);
        self
    }
}

/// One step of the pipeline.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Short name for logging ("summarize", "review", ...).
    fn name(&self) -> &'static str;

    /// Produce this stage's text.
    async fn run(&self, input: StageInput<'_>) -> Result<String, PipelineError>;
}

/// Call the model, or degrade to `fallback` when there is no credential or
/// the call fails.
async fn complete_or_fallback<F>(
    client: &CompletionClient,
    stage: &'static str,
    system_prompt: String,
    user_prompt: String,
    params: StageParams,
    fallback: F,
) -> String
where
    F: FnOnce() -> String,
{
    if !client.is_configured() {
        debug!(stage, "No credential configured, using fallback");
        return fallback();
    }

    let request = CompletionRequest::new(vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(user_prompt),
    ])
    .with_temperature(params.temperature)
    .with_max_tokens(params.max_tokens);

    match client.complete(request).await {
        Ok(text) => {
            info!(stage, chars = text.len(), "Stage completed");
            text
        }
        Err(e) => {
            warn!(stage, error = %e, "Completion failed, using fallback");
            fallback()
        }
    }
}

/// Email → structured summary.
#[derive(Debug, Clone)]
pub struct SummarizeStage {
    client: CompletionClient,
    params: StageParams,
}

impl SummarizeStage {
    pub fn new(client: CompletionClient, params: StageParams) -> Self {
        Self { client, params }
    }
}

#[async_trait]
impl Stage for SummarizeStage {
    fn name(&self) -> &'static str {
        "summarize"
    }

    async fn run(&self, input: StageInput<'_>) -> Result<String, PipelineError> {
        let email = input.email;
        Ok(complete_or_fallback(
            &self.client,
            self.name(),
            prompts::summarizer_system_prompt(),
            prompts::build_summary_prompt(email),
            self.params,
            || fallback_summary(email),
        )
        .await)
    }
}

/// (email, summary) → quality review.
#[derive(Debug, Clone)]
pub struct ReviewStage {
    client: CompletionClient,
    params: StageParams,
}

impl ReviewStage {
    pub fn new(client: CompletionClient, params: StageParams) -> Self {
        Self { client, params }
    }
}

#[async_trait]
impl Stage for ReviewStage {
    fn name(&self) -> &'static str {
        "review"
    }

    async fn run(&self, input: StageInput<'_>) -> Result<String, PipelineError> {
        let summary = input.summary.ok_or(PipelineError::MissingInput {
            stage: "review",
            input: "summary",
        })?;
        Ok(complete_or_fallback(
            &self.client,
            self.name(),
            prompts::reviewer_system_prompt(),
            prompts::build_review_prompt(input.email, summary),
            self.params,
            fallback_review,
        )
        .await)
    }
}

/// (email, summary, feedback) → revised summary.
#[derive(Debug, Clone)]
pub struct RefineStage {
    client: CompletionClient,
    params: StageParams,
}

impl RefineStage {
    pub fn new(client: CompletionClient, params: StageParams) -> Self {
        Self { client, params }
    }
}

#[async_trait]
impl Stage for RefineStage {
    fn name(&self) -> &'static str {
        "refine"
    }

    async fn run(&self, input: StageInput<'_>) -> Result<String, PipelineError> {
        let summary = input.summary.ok_or(PipelineError::MissingInput {
            stage: "refine",
            input: "summary",
        })?;
        let feedback = input.feedback.ok_or(PipelineError::MissingInput {
            stage: "refine",
            input: "feedback",
        })?;
        let email = input.email;
        Ok(complete_or_fallback(
            &self.client,
            self.name(),
            prompts::summarizer_system_prompt(),
            prompts::build_refine_prompt(email, summary, feedback),
            self.params,
            || fallback_summary(email),
        )
        .await)
    }
}
