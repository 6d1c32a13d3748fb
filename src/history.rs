//! Processing history kept by the shell.
//!
//! The pipeline does not own history. It reports each result through the
//! [`ResultRecorder`] callback; [`History`] is the in-memory, append-only
//! implementation the CLI uses.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::PipelineResult;

/// Characters of the email kept in a history preview.
pub const PREVIEW_CHARS: usize = 100;

/// How many entries the shell shows by default.
pub const DEFAULT_RECENT: usize = 5;

/// Receives every result the pipeline produces.
pub trait ResultRecorder: Send + Sync {
    fn record(&self, email: &str, result: &PipelineResult);
}

/// One processed email.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub email_preview: String,
    pub result: PipelineResult,
}

impl HistoryEntry {
    pub fn new(email: &str, result: PipelineResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            email_preview: preview(email),
            result,
        }
    }
}

/// First [`PREVIEW_CHARS`] characters followed by `...`.
pub fn preview(email: &str) -> String {
    let mut out: String = email.chars().take(PREVIEW_CHARS).collect();
    out.push_str("...");
    out
}

/// Aggregate numbers over the whole history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    pub successes: usize,
    pub last_processed: Option<DateTime<Utc>>,
}

/// Append-only in-memory history.
#[derive(Debug, Default)]
pub struct History {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: HistoryEntry) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Up to `limit` most recent entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> HistoryStats {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        HistoryStats {
            total: entries.len(),
            successes: entries.iter().filter(|e| e.result.is_success()).count(),
            last_processed: entries.last().map(|e| e.timestamp),
        }
    }
}

impl ResultRecorder for History {
    fn record(&self, email: &str, result: &PipelineResult) {
        self.push(HistoryEntry::new(email, result.clone()));
    }
}
