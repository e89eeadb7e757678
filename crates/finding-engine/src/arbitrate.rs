//! Span arbitration
//!
//! Pass A reclassifies replacement-less, sentence-shaped `Replace` findings as
//! `Avoid`. Pass B drops every `Replace` overlapping an `Avoid`. Pass C
//! ([`flatten`]) is the final non-overlap walk used when rendering.

use serde::{Deserialize, Serialize};
use shared_types::{Finding, FindingKind, TextSpan};

use crate::patterns::{SENTENCE_PUNCTUATION, SENTENCE_SPAN_MIN_CHARS};

/// Heuristic thresholds for arbitration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrationConfig {
    /// Span length at which a replacement-less `Replace` reads as sentence-level
    #[serde(default = "default_sentence_span_min_chars")]
    pub sentence_span_min_chars: usize,
}

fn default_sentence_span_min_chars() -> usize {
    SENTENCE_SPAN_MIN_CHARS
}

impl Default for ArbitrationConfig {
    fn default() -> Self {
        Self {
            sentence_span_min_chars: SENTENCE_SPAN_MIN_CHARS,
        }
    }
}

/// Does this span read like a clause or sentence rather than a single term?
pub fn looks_like_sentence_span(original: &str, span_len: usize, config: &ArbitrationConfig) -> bool {
    let original = original.trim();
    if original.is_empty() {
        return false;
    }

    original.chars().any(char::is_whitespace)
        || span_len >= config.sentence_span_min_chars
        || original.contains(SENTENCE_PUNCTUATION)
}

/// Pass A: coerce mislabeled sentence-level `Replace` findings to `Avoid`
pub fn coerce_sentence_spans(findings: Vec<Finding>, config: &ArbitrationConfig) -> Vec<Finding> {
    findings
        .into_iter()
        .map(|mut finding| {
            if finding.kind == FindingKind::Replace
                && !finding.has_replacement()
                && looks_like_sentence_span(&finding.original_text, finding.span().len(), config)
            {
                finding.kind = FindingKind::Avoid;
            }
            finding
        })
        .collect()
}

/// Pass B: an `Avoid` finding suppresses every overlapping `Replace`
pub fn prioritize_avoid(findings: Vec<Finding>) -> Vec<Finding> {
    let avoid_spans: Vec<TextSpan> = findings
        .iter()
        .filter(|f| f.is_avoid())
        .map(Finding::span)
        .collect();

    if avoid_spans.is_empty() {
        return findings;
    }

    findings
        .into_iter()
        .filter(|f| f.is_avoid() || !avoid_spans.iter().any(|a| a.overlaps(&f.span())))
        .collect()
}

/// Pass C over any span-bearing items.
///
/// Sorts by `(start asc, end desc)` and keeps an item only when it starts at or
/// after the end of the last kept one. The sort is stable, so ties keep input order.
pub fn flatten_by<T, F>(mut items: Vec<T>, span_of: F) -> Vec<T>
where
    F: Fn(&T) -> TextSpan,
{
    items.sort_by(|a, b| {
        let (a, b) = (span_of(a), span_of(b));
        a.start.cmp(&b.start).then(b.end.cmp(&a.end))
    });

    let mut last_end = 0;
    items
        .into_iter()
        .filter(|item| {
            let span = span_of(item);
            if span.start < last_end {
                return false;
            }
            last_end = span.end;
            true
        })
        .collect()
}

/// Pass C over findings
pub fn flatten(findings: &[Finding]) -> Vec<Finding> {
    flatten_by(findings.to_vec(), Finding::span)
}

/// Input-order-independent ordering: start asc, end desc, avoid first, then id
fn canonical_order(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(b.end.cmp(&a.end))
            .then(b.is_avoid().cmp(&a.is_avoid()))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Run Pass A then Pass B and return the findings in canonical order
pub fn arbitrate(findings: Vec<Finding>, config: &ArbitrationConfig) -> Vec<Finding> {
    let mut arbitrated = prioritize_avoid(coerce_sentence_spans(findings, config));
    canonical_order(&mut arbitrated);
    arbitrated
}

/// The finding the UI should surface first: first avoid, else first replace
pub fn dominant(findings: &[Finding]) -> Option<&Finding> {
    findings
        .iter()
        .find(|f| f.kind == FindingKind::Avoid)
        .or_else(|| findings.iter().find(|f| f.kind == FindingKind::Replace))
}
