//! Finding normalization, arbitration and highlight composition
//!
//! This crate turns an untrusted analysis-service response into a canonical,
//! conflict-free list of findings and renders them as a highlight layer.
//!
//! - [`normalize`]: tolerant payload parsing into [`Finding`] records
//! - [`arbitrate`]: sentence-span reclassification, avoid dominance, flattening
//! - [`compose`]: escaped markup with non-overlapping marks
//! - [`verdict`]: whole-text intervention verdict for the typing assist

pub mod arbitrate;
pub mod compose;
pub mod normalize;
pub mod patterns;
pub mod probe;
pub mod text;
pub mod verdict;

pub use arbitrate::{arbitrate, dominant, flatten, ArbitrationConfig};
pub use compose::{compose, escape_html};
pub use normalize::{normalize, normalize_pass, Normalized};
pub use verdict::assess_intervention;

use serde_json::Value;
use shared_types::{Finding, TextSpan};

/// Result of one analysis pass after normalization and arbitration
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub findings: Vec<Finding>,
    pub copy_enabled: bool,
    pub popup_message: Option<String>,
}

/// FindingEngine entry point
#[derive(Debug, Clone, Default)]
pub struct FindingEngine {
    config: ArbitrationConfig,
}

impl FindingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ArbitrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArbitrationConfig {
        &self.config
    }

    /// Normalize and arbitrate a raw response for `text`
    pub fn process(&self, raw: &Value, text: &str) -> Analysis {
        self.finish(normalize(raw, text))
    }

    /// Same as [`FindingEngine::process`], with ids scoped to a numbered pass
    pub fn process_pass(&self, raw: &Value, text: &str, pass: u64) -> Analysis {
        self.finish(normalize_pass(raw, text, pass))
    }

    fn finish(&self, normalized: Normalized) -> Analysis {
        Analysis {
            findings: arbitrate(normalized.findings, &self.config),
            copy_enabled: normalized.copy_enabled,
            popup_message: normalized.popup_message,
        }
    }

    /// Render the highlight layer for `text`
    pub fn render(&self, text: &str, findings: &[Finding], transient: Option<TextSpan>) -> String {
        compose(text, findings, transient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use shared_types::FindingKind;

    #[test]
    fn test_engine_man_up_scenario() {
        let engine = FindingEngine::new();
        let text = "You should man up.";
        let raw = json!({"findings": [
            {"term": "man up", "type": "replace", "replacement": "toughen up"}
        ]});
        let analysis = engine.process(&raw, text);

        assert_eq!(analysis.findings.len(), 1);
        let finding = &analysis.findings[0];
        assert_eq!(finding.kind, FindingKind::Replace);
        assert_eq!((finding.start, finding.end), (11, 17));
        assert_eq!(finding.actionable_replacement(), Some("toughen up"));

        let markup = engine.render(text, &analysis.findings, None);
        assert_eq!(
            markup,
            "You should <mark data-id=\"f_0_11_17\" class=\"et_mark\">man up</mark>."
        );
    }

    #[test]
    fn test_engine_overlap_scenario_keeps_only_avoid() {
        let engine = FindingEngine::new();
        let raw = json!({"findings": [
            {"start": 0, "end": 18, "type": "avoid"},
            {"start": 4, "end": 8, "type": "replace", "replacement": "x"}
        ]});
        let analysis = engine.process(&raw, "You should man up.");

        assert_eq!(analysis.findings.len(), 1);
        assert_eq!(analysis.findings[0].kind, FindingKind::Avoid);
        assert_eq!(analysis.findings[0].id, "f_0_0_18");
    }

    #[test]
    fn test_engine_unmatched_term_scenario() {
        let engine = FindingEngine::new();
        let raw = json!({"findings": [
            {"type": "replace", "term": "policeman", "start": null, "end": null}
        ]});
        let analysis = engine.process(&raw, "The officer helped.");

        assert!(analysis.findings.is_empty());
        assert!(analysis.copy_enabled);
    }

    #[test]
    fn test_engine_coerces_replacement_less_phrase() {
        let engine = FindingEngine::new();
        let raw = json!({"findings": [
            {"original": "women are too emotional", "type": "replace"},
            {"original": "emotional", "type": "replace", "replacement": "upset"}
        ]});
        let analysis = engine.process(&raw, "I think women are too emotional to lead.");

        assert_eq!(analysis.findings.len(), 1);
        assert_eq!(analysis.findings[0].kind, FindingKind::Avoid);
        assert_eq!(dominant(&analysis.findings).map(|f| f.id.as_str()), Some("f_0_8_31"));
    }
}
