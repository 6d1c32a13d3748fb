//! Error types for email-crew.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Completion service errors.
///
/// Every failure of an outbound model call ends up as one of these. Stages
/// consume them and substitute fallback text.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("No credential configured for provider {provider}")]
    MissingCredential { provider: String },

    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Pipeline-related errors.
///
/// The built-in stages never return these for model failures; they surface
/// only when the composition itself goes wrong.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{stage} stage is missing its {input} input")]
    MissingInput {
        stage: &'static str,
        input: &'static str,
    },

    #[error("{stage} stage failed: {reason}")]
    Stage { stage: String, reason: String },

    #[error("stage panicked: {0}")]
    Panicked(String),
}

/// Errors reading email text in the shell.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to read {source_name}: {error}")]
    Read {
        source_name: String,
        error: std::io::Error,
    },

    #[error("{source_name} is empty")]
    Empty { source_name: String },
}
