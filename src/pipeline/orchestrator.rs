//! Pipeline orchestrator. Summarize, then review, as one call.
//!
//! Flow:
//! 1. Summarize stage → summary
//! 2. Review stage (email + that summary) → review
//! 3. Normalize into a `PipelineResult`
//!
//! Stages already absorb model failures, so the only failures seen here are
//! composition defects: a stage returning `Err`, empty text, or a panic.
//! Those are caught once and turned into an error result. Refinement is a
//! separate entry point.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::history::ResultRecorder;
use crate::llm::CompletionClient;
use crate::pipeline::stage::{RefineStage, ReviewStage, Stage, StageInput, SummarizeStage};
use crate::pipeline::types::PipelineResult;

/// Summarize → review pipeline.
///
/// Holds only shared, immutable stage handlers; concurrent `process` calls
/// are independent.
pub struct EmailPipeline {
    summarizer: Arc<dyn Stage>,
    reviewer: Arc<dyn Stage>,
    refiner: Arc<dyn Stage>,
    recorder: Option<Arc<dyn ResultRecorder>>,
}

impl EmailPipeline {
    /// Build the standard stages around one completion client.
    pub fn new(client: CompletionClient, config: &PipelineConfig) -> Self {
        Self::with_stages(
            Arc::new(SummarizeStage::new(client.clone(), config.summary)),
            Arc::new(ReviewStage::new(client.clone(), config.review)),
            Arc::new(RefineStage::new(client, config.refine)),
        )
    }

    /// Build from configuration. No credential, or a provider that cannot be
    /// constructed, yields an offline pipeline.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let client = match CompletionClient::from_config(config.llm_config().as_ref()) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Completion provider unavailable, running offline");
                CompletionClient::unconfigured()
            }
        };
        Self::new(client, config)
    }

    /// Assemble a pipeline from arbitrary stages.
    pub fn with_stages(
        summarizer: Arc<dyn Stage>,
        reviewer: Arc<dyn Stage>,
        refiner: Arc<dyn Stage>,
    ) -> Self {
        Self {
            summarizer,
            reviewer,
            refiner,
            recorder: None,
        }
    }

    /// Report every result to `recorder`.
    pub fn with_recorder(mut self, recorder: Arc<dyn ResultRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Summarize `email`, then review the summary.
    pub async fn process(&self, email: &str) -> PipelineResult {
        info!(chars = email.len(), "Processing email");

        let outcome = AssertUnwindSafe(self.run_stages(email))
            .catch_unwind()
            .await;

        let result = match outcome {
            Ok(Ok((summary, review))) => PipelineResult::success(summary, review),
            Ok(Err(e)) => {
                error!(error = %e, "Email processing failed");
                PipelineResult::failure(e)
            }
            Err(panic) => {
                let e = PipelineError::Panicked(panic_message(panic.as_ref()));
                error!(error = %e, "Email processing panicked");
                PipelineResult::failure(e)
            }
        };

        info!(status = result.status.label(), "Email processed");
        if let Some(ref recorder) = self.recorder {
            let recorded =
                std::panic::catch_unwind(AssertUnwindSafe(|| recorder.record(email, &result)));
            if let Err(panic) = recorded {
                error!(panic = %panic_message(panic.as_ref()), "Result recorder panicked");
            }
        }
        result
    }

    /// Process each email in order. Always one result per input.
    pub async fn process_batch<I, S>(&self, emails: I) -> Vec<PipelineResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut results = Vec::new();
        for email in emails {
            results.push(self.process(email.as_ref()).await);
        }

        let successes = results.iter().filter(|r| r.is_success()).count();
        info!(
            processed = results.len(),
            successes,
            "Batch processing complete"
        );
        results
    }

    /// Revise `summary` using `feedback`. Not part of `process`.
    pub async fn refine(&self, email: &str, summary: &str, feedback: &str) -> String {
        let input = StageInput::new(email)
            .with_summary(summary)
            .with_feedback(feedback);

        let outcome = AssertUnwindSafe(run_stage(self.refiner.as_ref(), input))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(refined)) => refined,
            Ok(Err(e)) => {
                error!(error = %e, "Summary refinement failed");
                format!("Error refining summary: {e}")
            }
            Err(panic) => {
                let e = PipelineError::Panicked(panic_message(panic.as_ref()));
                error!(error = %e, "Summary refinement panicked");
                format!("Error refining summary: {e}")
            }
        }
    }

    async fn run_stages(&self, email: &str) -> Result<(String, String), PipelineError> {
        let summary = run_stage(self.summarizer.as_ref(), StageInput::new(email)).await?;
        let review = run_stage(
            self.reviewer.as_ref(),
            StageInput::new(email).with_summary(&summary),
        )
        .await?;
        Ok((summary, review))
    }
}

/// Run one stage and reject empty output.
async fn run_stage(stage: &dyn Stage, input: StageInput<'_>) -> Result<String, PipelineError> {
    let text = stage.run(input).await?;
    if text.trim().is_empty() {
        return Err(PipelineError::Stage {
            stage: stage.name().to_string(),
            reason: "produced empty output".to_string(),
        });
    }
    Ok(text)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
