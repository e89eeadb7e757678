//! Synonym key lists and heuristic constants for tolerant result parsing
//!
//! Each list is a probe order: the first path that yields a usable value wins.
//! A path segment that parses as a number indexes into an array.

/// A path into a JSON value, e.g. `&["suggestions", "0", "replacement"]`
pub type ProbePath = &'static [&'static str];

/// Wrapper keys the service may nest its real payload under
pub const WRAPPER_KEYS: &[&str] = &["data", "result", "analysis", "payload", "response"];

/// Keys that may hold the list of flagged spans
pub const LIST_KEYS: &[&str] = &[
    "findings",
    "issues",
    "spans",
    "matches",
    "results",
    "items",
    "highlights",
    "flags",
];

pub const START_PATHS: &[ProbePath] = &[&["start"], &["span_start"], &["from"], &["begin"]];

pub const END_PATHS: &[ProbePath] = &[&["end"], &["span_end"], &["to"], &["finish"]];

/// Literal text of a finding, used for offset recovery
pub const ORIGINAL_PATHS: &[ProbePath] = &[
    &["original"],
    &["term"],
    &["text"],
    &["token"],
    &["match"],
    &["value"],
];

pub const KIND_PATHS: &[ProbePath] = &[
    &["type"],
    &["action"],
    &["kind"],
    &["category"],
    &["label"],
];

/// Kind labels that map to a sentence-level avoid finding
pub const AVOID_KINDS: &[&str] = &["avoid", "block", "disallow", "reject"];

pub const REPLACEMENT_PATHS: &[ProbePath] = &[
    &["suggestions", "0", "replacement"],
    &["suggestions", "0", "text"],
    &["replacement"],
    &["suggested"],
    &["suggestion"],
    &["suggested_replacement"],
    &["best_replacement"],
    &["neutral"],
    &["neutral_term"],
    &["alternative"],
    &["alternatives", "0"],
    &["alt"],
];

/// Item-level rationale; the top-level popup message is probed after these
pub const MESSAGE_PATHS: &[ProbePath] = &[
    &["suggestions", "0", "message"],
    &["message"],
    &["reason"],
];

pub const MASK_PATHS: &[ProbePath] = &[&["mask"], &["masked"], &["masked_text"]];

pub const CONFIDENCE_PATHS: &[ProbePath] = &[&["confidence"], &["score"]];

pub const POPUP_MESSAGE_PATHS: &[ProbePath] = &[
    &["popup_message"],
    &["reason"],
    &["message"],
    &["detail"],
    &["warning"],
];

/// Boolean flags that grant copy permission directly
pub const COPY_ENABLED_PATHS: &[ProbePath] = &[
    &["actions", "copy_enabled"],
    &["can_copy"],
    &["copy_enabled"],
    &["copy_allowed"],
];

/// Boolean flags that revoke copy permission when true
pub const COPY_DISABLED_PATHS: &[ProbePath] = &[&["copy_disabled"]];

pub const DEFAULT_AVOID_MESSAGE: &str = "We suggest not using this sentence.";

pub const DEFAULT_REPLACE_MESSAGE: &str =
    "We strongly suggest changing this word to a neutral term.";

/// Span length (in characters) at which a replacement-less span reads as sentence-level
pub const SENTENCE_SPAN_MIN_CHARS: usize = 20;

/// Punctuation that marks a span as sentence-like
pub const SENTENCE_PUNCTUATION: &[char] = &['.', '!', '?'];

// Intervention verdict keys (typing-assist surface)

pub const OVERALL_KEYS: &[&str] = &["overall"];

pub const PRIMARY_ACTION_KEYS: &[&str] = &["primary_action"];

pub const VERDICT_MESSAGE_KEYS: &[&str] = &["popup_message", "message"];

pub const DECISION_KEYS: &[&str] = &["decision", "action", "result", "status", "verdict", "intent"];

pub const SEVERITY_KEYS: &[&str] = &["severity", "level", "rating", "tier", "risk"];

pub const EXPLANATION_KEYS: &[&str] = &[
    "explanation",
    "reason",
    "message",
    "why",
    "rationale",
    "note",
    "feedback",
];

pub const REWRITE_KEYS: &[&str] = &[
    "rewritten_text",
    "rewrite",
    "rewrite_text",
    "suggestion",
    "suggested_text",
    "replacement",
    "output",
    "inclusive_text",
    "proposed_text",
    "fixed_text",
];

pub const FLAGGED_KEYS: &[&str] = &[
    "flagged",
    "is_discriminatory",
    "discriminatory",
    "unsafe",
    "blocked",
];

pub const CAN_COPY_KEYS: &[&str] = &["can_copy", "copy_allowed"];

pub const COPY_DISABLED_KEYS: &[&str] = &["copy_disabled"];

/// Decisions or primary actions that call for intervention
pub const INTERVENE_DECISIONS: &[&str] = &[
    "rewrite",
    "flag",
    "block",
    "replace",
    "suggest",
    "warn",
    "disable_copy",
    "avoid",
];

/// Overall / primary-action values that mean "leave the text alone"
pub const CLEAN_VALUES: &[&str] = &["clean", "ok"];

pub const AVOID_EXPLANATION: &str = "This sentence may reinforce a stereotype or exclude a group. Consider using neutral, inclusive wording focused on context or behavior rather than identity.";

pub const GENERIC_EXPLANATION: &str =
    "This sentence may be discriminatory. Consider revising it to be more neutral and inclusive.";
