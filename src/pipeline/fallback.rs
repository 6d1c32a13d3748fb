//! Offline placeholder output used when the completion service is
//! unavailable. Deterministic and computed locally.

/// Static review returned when no model review could be produced.
pub const FALLBACK_REVIEW: &str = "**FALLBACK FEEDBACK (AI review unavailable)**

QUALITY SCORE: N/A

FEEDBACK:
• Unable to provide AI-powered feedback without API access
• Set GEMINI_API_KEY (or OPENAI_API_KEY with EMAIL_CREW_BACKEND=openai)
• Once configured, you'll receive detailed quality assessments

SUGGESTED ACTION:
1. Export your API key in the environment
2. Run email-crew again

Note: AI-powered review features require a valid API key.";

/// Cheap statistics embedded in the fallback summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailStats {
    /// Whitespace-separated tokens.
    pub words: usize,
    /// Lines containing something other than whitespace.
    pub lines: usize,
}

impl EmailStats {
    pub fn of(email: &str) -> Self {
        Self {
            words: email.split_whitespace().count(),
            lines: email.lines().filter(|l| !l.trim().is_empty()).count(),
        }
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Placeholder summary carrying the email's word and line counts.
pub fn fallback_summary(email: &str) -> String {
    let stats = EmailStats::of(email);
    format!(
        "**FALLBACK SUMMARY (AI processing unavailable)**

MAIN TOPIC: Email regarding various matters

KEY POINTS:
• Email contains {words}
• {lines} of text
• Unable to process with AI - an API key is not configured or the model call failed

ACTION ITEMS:
• Set GEMINI_API_KEY (or OPENAI_API_KEY with EMAIL_CREW_BACKEND=openai)
• Run email-crew again

TONE/URGENCY: Unable to assess without API access

Note: This is a fallback summary. For AI-powered summaries, configure an API key.",
        words = plural(stats.words, "word"),
        lines = plural(stats.lines, "line"),
    )
}

/// Placeholder review. Takes no input.
pub fn fallback_review() -> String {
    FALLBACK_REVIEW.to_string()
}
