//! Summarize → review pipeline with fallback degradation.
//!
//! Every email flows through:
//! 1. `SummarizeStage`: structured summary of the email
//! 2. `ReviewStage`: quality review of that summary
//!
//! `RefineStage` runs separately, on request, using the review as feedback.
//! Stages degrade to offline fallback text instead of failing.

pub mod fallback;
pub mod orchestrator;
pub mod prompts;
pub mod stage;
pub mod types;

pub use orchestrator::EmailPipeline;
pub use stage::{RefineStage, ReviewStage, Stage, StageInput, SummarizeStage};
pub use types::{PipelineResult, PipelineStatus};
