//! Result normalizer
//!
//! Converts whatever the analysis service returned into canonical findings
//! plus the top-level copy/popup flags. Missing or oddly named fields degrade
//! to defaults; items without resolvable offsets are dropped.

use serde_json::Value;
use shared_types::{Finding, FindingKind, TextSpan};
use tracing::debug;

use crate::patterns::{
    AVOID_KINDS, CONFIDENCE_PATHS, COPY_DISABLED_PATHS, COPY_ENABLED_PATHS,
    DEFAULT_AVOID_MESSAGE, DEFAULT_REPLACE_MESSAGE, END_PATHS, KIND_PATHS, LIST_KEYS, MASK_PATHS,
    MESSAGE_PATHS, ORIGINAL_PATHS, POPUP_MESSAGE_PATHS, REPLACEMENT_PATHS, START_PATHS,
    WRAPPER_KEYS,
};
use crate::probe::{first_bool, first_number, first_offset, first_text};
use crate::text::{char_len, find_case_insensitive, slice_chars};

static EMPTY: Value = Value::Null;

/// Canonical view of one analysis response
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub findings: Vec<Finding>,
    pub copy_enabled: bool,
    pub popup_message: Option<String>,
}

/// Normalize a raw response; finding ids take the form `f_{idx}_{start}_{end}`
pub fn normalize(raw: &Value, subject: &str) -> Normalized {
    normalize_with_prefix(raw, subject, "f".to_string())
}

/// Normalize a raw response for a numbered pass; ids take the form `p{pass}_f_{idx}_{start}_{end}`
pub fn normalize_pass(raw: &Value, subject: &str, pass: u64) -> Normalized {
    normalize_with_prefix(raw, subject, format!("p{}_f", pass))
}

fn normalize_with_prefix(raw: &Value, subject: &str, prefix: String) -> Normalized {
    let payload = unwrap_payload(raw);

    let copy_enabled = resolve_copy_enabled(payload);
    let popup_message = first_text(payload, POPUP_MESSAGE_PATHS);

    let findings = match pick_list(payload) {
        Some(items) => {
            let subject_len = char_len(subject);
            items
                .iter()
                .enumerate()
                .filter_map(|(idx, item)| {
                    let finding = resolve_finding(
                        item,
                        idx,
                        subject,
                        subject_len,
                        popup_message.as_deref(),
                        &prefix,
                    );
                    if finding.is_none() {
                        debug!(index = idx, "Dropping finding without resolvable offsets");
                    }
                    finding
                })
                .collect()
        }
        None => Vec::new(),
    };

    Normalized {
        findings,
        copy_enabled,
        popup_message,
    }
}

/// Unwrap one object-valued wrapper level, then take the first object of a
/// top-level array
pub fn unwrap_payload(raw: &Value) -> &Value {
    let mut working = raw;

    if let Some(nested) = WRAPPER_KEYS.iter().find_map(|key| raw.get(*key)) {
        if nested.is_object() {
            working = nested;
        }
    }

    match working {
        Value::Array(items) => items.iter().find(|v| v.is_object()).unwrap_or(&EMPTY),
        other => other,
    }
}

fn list_at(value: &Value) -> Option<&Vec<Value>> {
    LIST_KEYS
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_array))
}

fn pick_list(payload: &Value) -> Option<&Vec<Value>> {
    list_at(payload).or_else(|| {
        payload
            .get("data")
            .filter(|data| data.is_object())
            .and_then(list_at)
    })
}

fn resolve_copy_enabled(payload: &Value) -> bool {
    first_bool(payload, COPY_ENABLED_PATHS)
        .or_else(|| first_bool(payload, COPY_DISABLED_PATHS).map(|disabled| !disabled))
        .unwrap_or(true)
}

fn resolve_span(
    item: &Value,
    subject: &str,
    subject_len: usize,
    original: Option<&str>,
) -> Option<TextSpan> {
    let explicit = match (first_offset(item, START_PATHS), first_offset(item, END_PATHS)) {
        (Some(start), Some(end)) if start < end && end <= subject_len => {
            Some(TextSpan::new(start, end))
        }
        _ => None,
    };

    explicit.or_else(|| original.and_then(|literal| find_case_insensitive(subject, literal)))
}

fn resolve_kind(item: &Value) -> FindingKind {
    let label = first_text(item, KIND_PATHS)
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    if AVOID_KINDS.contains(&label.as_str()) {
        FindingKind::Avoid
    } else {
        FindingKind::Replace
    }
}

fn resolve_finding(
    item: &Value,
    idx: usize,
    subject: &str,
    subject_len: usize,
    popup_message: Option<&str>,
    prefix: &str,
) -> Option<Finding> {
    let original = first_text(item, ORIGINAL_PATHS);
    let span = resolve_span(item, subject, subject_len, original.as_deref())?;
    let kind = resolve_kind(item);

    let message = first_text(item, MESSAGE_PATHS)
        .or_else(|| popup_message.map(str::to_string))
        .unwrap_or_else(|| {
            match kind {
                FindingKind::Avoid => DEFAULT_AVOID_MESSAGE,
                FindingKind::Replace => DEFAULT_REPLACE_MESSAGE,
            }
            .to_string()
        });

    let replacement = match kind {
        FindingKind::Replace => first_text(item, REPLACEMENT_PATHS),
        FindingKind::Avoid => None,
    };

    let confidence =
        first_number(item, CONFIDENCE_PATHS).filter(|c| (0.0..=1.0).contains(c));

    Some(Finding {
        id: format!("{}_{}_{}_{}", prefix, idx, span.start, span.end),
        kind,
        start: span.start,
        end: span.end,
        original_text: original
            .unwrap_or_else(|| slice_chars(subject, span.start, span.end).to_string()),
        mask: first_text(item, MASK_PATHS),
        message,
        replacement,
        confidence,
    })
}
