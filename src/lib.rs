//! email-crew: summarize an email, then review the summary.

pub mod config;
pub mod error;
pub mod history;
pub mod llm;
pub mod pipeline;
pub mod shell;
