//! Shared types for the summarize/review pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Review text used when processing failed before a review was possible.
pub const PROCESSING_ERROR_REVIEW: &str = "Unable to review due to processing error";

/// Outcome of one `process` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Success,
    Error,
}

impl PipelineStatus {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The uniform record returned to every caller of the pipeline.
///
/// `summary` and `review` are always populated: model output, fallback
/// text, or an error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub summary: String,
    pub review: String,
    pub status: PipelineStatus,
    #[serde(rename = "error", default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl PipelineResult {
    pub fn success(summary: impl Into<String>, review: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            review: review.into(),
            status: PipelineStatus::Success,
            error_detail: None,
        }
    }

    /// Result for a processing failure. Both text fields explain what happened.
    pub fn failure(cause: impl fmt::Display) -> Self {
        let cause = cause.to_string();
        Self {
            summary: format!("Error processing email: {cause}"),
            review: PROCESSING_ERROR_REVIEW.to_string(),
            status: PipelineStatus::Error,
            error_detail: Some(cause),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PipelineStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_serializes_without_error_key() {
        let result = PipelineResult::success("sum", "rev");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["summary"], "sum");
        assert_eq!(json["review"], "rev");
        assert!(json.get("error").is_none());
        assert!(result.is_success());
    }

    #[test]
    fn failure_populates_every_field() {
        let result = PipelineResult::failure("boom");
        assert_eq!(result.summary, "Error processing email: boom");
        assert_eq!(result.review, PROCESSING_ERROR_REVIEW);
        assert_eq!(result.status, PipelineStatus::Error);
        assert_eq!(result.error_detail.as_deref(), Some("boom"));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "boom");
    }

    #[test]
    fn deserializes_without_error_key() {
        let result: PipelineResult = serde_json::from_str(
            r#"{"summary": "s", "review": "r", "status": "success"}"#,
        )
        .unwrap();
        assert_eq!(result, PipelineResult::success("s", "r"));
    }
}
