//! Span extraction and overlap resolution.
//!
//! Every detector runs independently over the full, unmodified input.
//! Candidates are then resolved greedily by `(rank, start)`: a candidate is
//! accepted only if it overlaps nothing already accepted. The result is
//! re-sorted by start offset.
//!
//! A candidate may not cut a word of the surrounding text in two. Together
//! with placeholder shielding this keeps redaction idempotent: running the
//! extractor over redacted output finds nothing new.
//!
//! Offsets are byte offsets into the UTF-8 input and always fall on char
//! boundaries.

use crate::catalog::{Category, Detector, PatternCatalog, Severity};

/// A matched region of the original text. Half-open: `start..end`.
#[derive(Clone, Copy)]
pub struct Span<'a> {
    /// Detector that produced the match
    pub detector: &'a Detector,
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive), always greater than `start`
    pub end: usize,
    /// The matched slice of the original text
    pub matched_text: &'a str,
}

impl<'a> Span<'a> {
    pub fn category(&self) -> Category {
        self.detector.category()
    }

    pub fn severity(&self) -> Severity {
        self.detector.severity()
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether two spans share at least one byte. Touching spans do not.
    pub fn overlaps(&self, other: &Span<'_>) -> bool {
        self.start < other.end && other.start < self.end
    }
}

// Omits the matched text.
impl std::fmt::Debug for Span<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Span")
            .field("detector", &self.detector.name())
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}

impl PatternCatalog {
    /// Extract resolved, non-overlapping spans ordered by start offset
    pub fn extract_spans<'a>(&'a self, text: &'a str) -> Vec<Span<'a>> {
        extract_spans(self, text)
    }
}

/// Run every detector over `text` and resolve overlaps.
///
/// Placeholder tokens already present in the text (`[REDACTED_*]`) are
/// treated as claimed regions: no candidate touching one survives.
pub fn extract_spans<'a>(catalog: &'a PatternCatalog, text: &'a str) -> Vec<Span<'a>> {
    if text.is_empty() {
        return Vec::new();
    }

    let claimed: Vec<(usize, usize)> = catalog
        .placeholder()
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();

    let candidates: Vec<Span<'a>> = catalog
        .detectors()
        .iter()
        .flat_map(|detector| candidates_for(detector, text))
        .filter(|span| {
            !claimed
                .iter()
                .any(|&(start, end)| span.start < end && start < span.end)
        })
        .collect();

    let candidate_count = candidates.len();
    let accepted = resolve_overlaps(candidates);
    tracing::trace!(
        candidates = candidate_count,
        accepted = accepted.len(),
        "Spans resolved"
    );
    accepted
}

/// Greedy overlap resolution.
///
/// Sorts by `(rank, start)`, accepts each span that overlaps no accepted
/// span, drops empty spans, and returns the survivors ordered by start.
pub fn resolve_overlaps<'a>(mut candidates: Vec<Span<'a>>) -> Vec<Span<'a>> {
    candidates.retain(|span| !span.is_empty());
    candidates.sort_by_key(|span| (span.detector.rank(), span.start, span.end));

    let mut accepted: Vec<Span<'a>> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !accepted.iter().any(|span| span.overlaps(&candidate)) {
            accepted.push(candidate);
        }
    }

    accepted.sort_by_key(|span| (span.start, span.end));
    accepted
}

/// All validated matches of one detector.
///
/// The search resumes one character after each match's start, so matches of
/// the same detector may overlap. Resolution keeps the earliest one unless a
/// higher-ranked span claims it first, in which case a later alternative can
/// still win.
fn candidates_for<'a>(detector: &'a Detector, text: &'a str) -> Vec<Span<'a>> {
    let pattern = detector.pattern();
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos <= text.len() {
        let Some(caps) = pattern.captures_at(text, pos) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };

        let target = if detector.has_value_group() {
            caps.name("value").unwrap_or(whole)
        } else {
            whole
        };

        if target.start() < target.end()
            && !splits_word(text, whole, target)
            && detector.accepts(target.as_str())
        {
            spans.push(Span {
                detector,
                start: target.start(),
                end: target.end(),
                matched_text: target.as_str(),
            });
        }
        pos = next_char(text, whole.start());
    }

    spans
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether `target` would cut a word of the surrounding text in two.
///
/// Redacting such a match would leave the rest of the word next to the
/// placeholder, where it can match on its own. A neighbor that belongs to
/// the whole match (a keyword prefix before a value group) does not count.
fn splits_word(text: &str, whole: regex::Match<'_>, target: regex::Match<'_>) -> bool {
    let matched = target.as_str();
    let cuts_start = target.start() == whole.start()
        && matched.chars().next().is_some_and(is_word_char)
        && text[..target.start()]
            .chars()
            .next_back()
            .is_some_and(is_word_char);
    let cuts_end = target.end() == whole.end()
        && matched.chars().next_back().is_some_and(is_word_char)
        && text[target.end()..].chars().next().is_some_and(is_word_char);
    cuts_start || cuts_end
}

fn next_char(text: &str, at: usize) -> usize {
    text[at..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| at + c.len_utf8())
}
