//! Redaction of resolved spans.
//!
//! The output is built by copying the untouched slices between spans into a
//! fresh buffer, so no offset is ever invalidated by an earlier replacement.

use crate::catalog::{Category, Severity};
use crate::extract::Span;
use serde::{Deserialize, Serialize};

/// One replaced span. Carries no trace of the matched text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionEvent {
    /// Category of the match
    pub category: Category,
    /// Detector name (equal to the category name for built-ins)
    pub detector: String,
    /// Severity of the match
    pub severity: Severity,
    /// Start byte offset in the original text
    pub start: usize,
    /// End byte offset in the original text
    pub end: usize,
    /// Placeholder written in place of the match
    pub label: String,
}

/// Redacted text plus one event per replaced span, ordered by start
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redaction {
    pub text: String,
    pub events: Vec<RedactionEvent>,
}

impl Redaction {
    /// Whether anything was replaced
    pub fn is_clean(&self) -> bool {
        self.events.is_empty()
    }

    /// Distinct detector names, in order of first appearance
    pub fn detected(&self) -> Vec<String> {
        detector_names(&self.events)
    }
}

/// Distinct detector names of `events`, in order of first appearance
pub fn detector_names(events: &[RedactionEvent]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for event in events {
        if !seen.iter().any(|name| name == &event.detector) {
            seen.push(event.detector.clone());
        }
    }
    seen
}

/// Replace every span in `text` with its detector's placeholder.
///
/// `spans` must be non-overlapping, as returned by
/// [`crate::extract::extract_spans`]. They are processed in start order
/// regardless of the order given; a span overlapping one already written
/// is skipped.
pub fn redact(text: &str, spans: &[Span<'_>]) -> Redaction {
    let mut ordered: Vec<&Span<'_>> = spans.iter().filter(|s| !s.is_empty()).collect();
    ordered.sort_by_key(|s| (s.start, s.end));

    let mut out = String::with_capacity(text.len());
    let mut events = Vec::with_capacity(ordered.len());
    let mut cursor = 0;

    for span in ordered {
        if span.start < cursor || span.end > text.len() {
            continue;
        }
        let Some(untouched) = text.get(cursor..span.start) else {
            continue;
        };

        out.push_str(untouched);
        let label = span.detector.replace(span.matched_text);
        out.push_str(label);
        cursor = span.end;

        events.push(RedactionEvent {
            category: span.category(),
            detector: span.detector.name().to_string(),
            severity: span.severity(),
            start: span.start,
            end: span.end,
            label: label.to_string(),
        });
    }
    out.push_str(text.get(cursor..).unwrap_or_default());

    Redaction { text: out, events }
}
