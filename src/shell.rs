//! CLI shell helpers: reading email text and rendering results.

use std::fmt;
use std::fmt::Write as _;
use std::path::PathBuf;

use tokio::io::AsyncReadExt;

use crate::error::InputError;
use crate::history::{HistoryEntry, HistoryStats};
use crate::pipeline::PipelineResult;

/// Where an email comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailSource {
    Stdin,
    File(PathBuf),
}

impl fmt::Display for EmailSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("stdin"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Read the whole email. Whitespace-only input is rejected.
pub async fn load_email(source: &EmailSource) -> Result<String, InputError> {
    let read_error = |error| InputError::Read {
        source_name: source.to_string(),
        error,
    };

    let text = match source {
        EmailSource::Stdin => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .map_err(read_error)?;
            buf
        }
        EmailSource::File(path) => tokio::fs::read_to_string(path).await.map_err(read_error)?,
    };

    if text.trim().is_empty() {
        return Err(InputError::Empty {
            source_name: source.to_string(),
        });
    }
    Ok(text)
}

/// Text rendering of one result.
pub fn render_result(source: &EmailSource, result: &PipelineResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "### {source} [{}]", result.status);
    let _ = writeln!(out, "\n=== SUMMARY ===\n{}", result.summary.trim_end());
    let _ = writeln!(out, "\n=== REVIEW ===\n{}", result.review.trim_end());
    out
}

pub fn render_refined(refined: &str) -> String {
    format!("\n=== REFINED SUMMARY ===\n{}\n", refined.trim_end())
}

/// Stats line followed by the given entries (already newest first).
pub fn render_history(stats: &HistoryStats, entries: &[HistoryEntry]) -> String {
    let mut out = String::new();
    let last = stats
        .last_processed
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    let _ = writeln!(
        out,
        "Processed: {}  Successful: {}  Last: {}",
        stats.total, stats.successes, last
    );
    for entry in entries {
        let preview = entry.email_preview.replace(['\r', '\n'], " ");
        let _ = writeln!(
            out,
            "  {} [{}] {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.result.status,
            preview
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::history::{History, ResultRecorder};

    #[tokio::test]
    async fn loads_email_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Subject: Hi\n\nSee you Monday.").unwrap();

        let source = EmailSource::File(file.path().to_path_buf());
        let email = load_email(&source).await.unwrap();
        assert_eq!(email, "Subject: Hi\n\nSee you Monday.");
    }

    #[tokio::test]
    async fn blank_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "  \n\n").unwrap();

        let source = EmailSource::File(file.path().to_path_buf());
        let err = load_email(&source).await.unwrap_err();
        assert!(matches!(err, InputError::Empty { .. }));
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = EmailSource::File(dir.path().join("nope.eml"));
        let err = load_email(&source).await.unwrap_err();
        assert!(matches!(err, InputError::Read { .. }));
        assert!(err.to_string().contains("nope.eml"));
    }

    #[test]
    fn result_rendering_has_both_sections() {
        let text = render_result(&EmailSource::Stdin, &PipelineResult::success("S\n", "R"));
        assert!(text.starts_with("### stdin [success]"));
        assert!(text.contains("=== SUMMARY ===\nS\n"));
        assert!(text.contains("=== REVIEW ===\nR\n"));
    }

    #[test]
    fn history_rendering_flattens_previews() {
        let history = History::new();
        history.record("line one\nline two", &PipelineResult::success("s", "r"));
        history.record("bad", &PipelineResult::failure("boom"));

        let text = render_history(&history.stats(), &history.recent(5));
        assert!(text.starts_with("Processed: 2  Successful: 1"));
        assert!(text.contains("[error] bad..."));
        assert!(text.contains("[success] line one line two..."));
    }

    #[test]
    fn empty_history_renders_never() {
        let history = History::new();
        let text = render_history(&history.stats(), &[]);
        assert_eq!(text, "Processed: 0  Successful: 0  Last: never\n");
    }
}
