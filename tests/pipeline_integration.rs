//! End-to-end tests for the summarize → review pipeline.
//!
//! Every test drives `EmailPipeline` through stub `LlmProvider`s; no real
//! API calls are made.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use email_crew::config::PipelineConfig;
use email_crew::error::{LlmError, PipelineError};
use email_crew::history::History;
use email_crew::llm::{
    CompletionClient, CompletionRequest, CompletionResponse, LlmProvider,
};
use email_crew::pipeline::fallback::{fallback_summary, FALLBACK_REVIEW};
use email_crew::pipeline::{
    EmailPipeline, PipelineResult, PipelineStatus, ReviewStage, Stage, StageInput, SummarizeStage,
};

const EMAIL: &str = "Subject: Test\n\nPlease respond by Friday.";

const LONG_EMAIL: &str = "Subject: Q4 Planning Meeting - Action Required

Hi Team,

First, I need everyone to submit their departmental goals by October 15th.

Second, Marketing needs to have the campaign ready by November 1st, and Engineering must \
complete the final testing phase by October 25th.

Lastly, HR needs final headcount for the team event by October 8th.

Best regards,
John";

fn response(content: String) -> CompletionResponse {
    CompletionResponse {
        content,
        input_tokens: 12,
        output_tokens: 34,
    }
}

/// Fails every call, counting attempts.
#[derive(Default)]
struct FailingLlm {
    calls: AtomicUsize,
}

#[async_trait]
impl LlmProvider for FailingLlm {
    fn model_name(&self) -> &str {
        "failing"
    }

    fn cost_per_token(&self) -> (Decimal, Decimal) {
        (Decimal::ZERO, Decimal::ZERO)
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LlmError::RequestFailed {
            provider: "failing".into(),
            reason: "connection refused".into(),
        })
    }
}

/// Replies with the user prompt it was given, prefixed by a call number.
#[derive(Default)]
struct EchoLlm {
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LlmProvider for EchoLlm {
    fn model_name(&self) -> &str {
        "echo"
    }

    fn cost_per_token(&self) -> (Decimal, Decimal) {
        (Decimal::ZERO, Decimal::ZERO)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let prompt = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt.clone());
        Ok(response(format!("[call {n}]\n{prompt}")))
    }
}

/// Always returns the same text.
struct FixedLlm;

#[async_trait]
impl LlmProvider for FixedLlm {
    fn model_name(&self) -> &str {
        "fixed"
    }

    fn cost_per_token(&self) -> (Decimal, Decimal) {
        (Decimal::ZERO, Decimal::ZERO)
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Ok(response("MAIN TOPIC: fixed".to_string()))
    }
}

/// Stage that blows up, standing in for a programming defect.
struct PanickingStage;

#[async_trait]
impl Stage for PanickingStage {
    fn name(&self) -> &'static str {
        "panicking"
    }

    async fn run(&self, _input: StageInput<'_>) -> Result<String, PipelineError> {
        panic!("malformed upstream shape");
    }
}

fn pipeline_with(provider: Arc<dyn LlmProvider>) -> EmailPipeline {
    EmailPipeline::new(CompletionClient::new(provider), &PipelineConfig::default())
}

fn offline_pipeline() -> EmailPipeline {
    EmailPipeline::new(CompletionClient::unconfigured(), &PipelineConfig::default())
}

#[tokio::test]
async fn no_credential_yields_fallbacks_with_success_status() {
    let result = offline_pipeline().process(EMAIL).await;

    assert_eq!(result.status, PipelineStatus::Success);
    assert!(result.summary.contains("6 words"));
    assert!(result.summary.contains("2 lines"));
    assert_eq!(result.summary, fallback_summary(EMAIL));
    assert_eq!(result.review, FALLBACK_REVIEW);
    assert!(result.error_detail.is_none());
}

#[tokio::test]
async fn failing_service_behaves_like_no_credential() {
    let llm = Arc::new(FailingLlm::default());
    let degraded = pipeline_with(llm.clone()).process(LONG_EMAIL).await;
    let offline = offline_pipeline().process(LONG_EMAIL).await;

    assert_eq!(degraded, offline);
    assert_eq!(degraded.status, PipelineStatus::Success);
    // One attempt per stage, no retries.
    assert_eq!(llm.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn review_receives_summary_from_same_call() {
    let llm = Arc::new(EchoLlm::default());
    let pipeline = pipeline_with(llm.clone());

    let result = pipeline.process(LONG_EMAIL).await;
    assert!(result.is_success());
    assert!(result.summary.starts_with("[call 1]"));
    assert!(result.review.starts_with("[call 2]"));

    let prompts = llm.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains(&result.summary));
    assert!(prompts[1].contains(LONG_EMAIL));
}

#[tokio::test]
async fn review_never_sees_a_stale_summary() {
    let llm = Arc::new(EchoLlm::default());
    let pipeline = pipeline_with(llm.clone());

    let first = pipeline.process("first email").await;
    let second = pipeline.process("second email").await;

    let prompts = llm.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 4);
    assert!(prompts[3].contains(&second.summary));
    assert!(!prompts[3].contains(&first.summary));
}

#[tokio::test]
async fn repeated_processing_is_idempotent() {
    let pipeline = pipeline_with(Arc::new(FixedLlm));
    let a = pipeline.process(LONG_EMAIL).await;
    let b = pipeline.process(LONG_EMAIL).await;
    assert_eq!(a, b);
    assert_eq!(a, PipelineResult::success("MAIN TOPIC: fixed", "MAIN TOPIC: fixed"));
}

#[tokio::test]
async fn composition_panic_yields_error_status() {
    let client = CompletionClient::unconfigured();
    let config = PipelineConfig::default();
    let pipeline = EmailPipeline::with_stages(
        Arc::new(PanickingStage),
        Arc::new(ReviewStage::new(client.clone(), config.review)),
        Arc::new(SummarizeStage::new(client, config.summary)),
    );

    let result = pipeline.process(EMAIL).await;
    assert_eq!(result.status, PipelineStatus::Error);
    assert!(result.summary.starts_with("Error processing email:"));
    assert_eq!(result.review, "Unable to review due to processing error");
    assert!(
        result
            .error_detail
            .as_deref()
            .unwrap()
            .contains("malformed upstream shape")
    );
}

#[tokio::test]
async fn fields_are_never_empty() {
    for email in ["", "x", EMAIL, LONG_EMAIL] {
        let result = offline_pipeline().process(email).await;
        assert!(!result.summary.trim().is_empty());
        assert!(!result.review.trim().is_empty());
    }
}

#[tokio::test]
async fn refine_uses_review_as_feedback() {
    let llm = Arc::new(EchoLlm::default());
    let pipeline = pipeline_with(llm.clone());

    let result = pipeline.process(EMAIL).await;
    let refined = pipeline
        .refine(EMAIL, &result.summary, &result.review)
        .await;

    assert!(refined.starts_with("[call 3]"));
    let prompts = llm.prompts.lock().unwrap();
    assert!(prompts[2].contains(&result.summary));
    assert!(prompts[2].contains(&result.review));
}

#[tokio::test]
async fn refine_degrades_when_service_fails() {
    let pipeline = pipeline_with(Arc::new(FailingLlm::default()));
    let refined = pipeline.refine(EMAIL, "draft", "feedback").await;
    assert_eq!(refined, fallback_summary(EMAIL));
}

#[tokio::test]
async fn concurrent_calls_share_one_pipeline() {
    let history = Arc::new(History::new());
    let pipeline = Arc::new(pipeline_with(Arc::new(FixedLlm)).with_recorder(history.clone()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let pipeline = Arc::clone(&pipeline);
        handles.push(tokio::spawn(async move {
            pipeline.process(&format!("email number {i}")).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_success());
    }

    let stats = history.stats();
    assert_eq!(stats.total, 8);
    assert_eq!(stats.successes, 8);
}
