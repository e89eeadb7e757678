#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingKind {
    /// Word or phrase level; carries a suggested substitute
    Replace,
    /// Sentence or clause level; recommends removal or rewrite
    Avoid,
}

/// Half-open `[start, end)` range of character offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Open-interval intersection; touching ranges do not overlap
    pub fn overlaps(&self, other: &TextSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub id: String,
    pub kind: FindingKind,
    pub start: usize, // Character offset into the subject text
    pub end: usize,   // Exclusive end offset
    pub original_text: String,
    pub mask: Option<String>,
    pub message: String,
    pub replacement: Option<String>,
    pub confidence: Option<f64>,
}

impl Finding {
    pub fn span(&self) -> TextSpan {
        TextSpan::new(self.start, self.end)
    }

    pub fn overlaps(&self, other: &Finding) -> bool {
        self.span().overlaps(&other.span())
    }

    pub fn is_avoid(&self) -> bool {
        self.kind == FindingKind::Avoid
    }

    /// True when the replacement has any non-whitespace content
    pub fn has_replacement(&self) -> bool {
        self.replacement
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty())
    }

    /// Trimmed replacement that can be spliced into the text.
    ///
    /// Parenthetical placeholders such as `"(no neutral term)"` are not actionable.
    pub fn actionable_replacement(&self) -> Option<&str> {
        if self.kind != FindingKind::Replace {
            return None;
        }
        self.replacement
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty() && !r.starts_with('('))
    }
}

/// Request body for the remote analysis service
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
    pub locale: String,
    #[serde(default)]
    pub context: serde_json::Value,
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            locale: locale.into(),
            context: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

/// Everything the presentation layer needs to draw the editor
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderState {
    pub markup: String,
    pub findings: Vec<Finding>,
    pub dominant_finding_id: Option<String>,
    pub copy_enabled: bool,
    pub blocked_message: Option<String>,
}

/// Whole-text verdict used by the typing-assist surface
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterventionVerdict {
    pub should_intervene: bool,
    pub severity: String,
    pub explanation: String,
    pub rewrite: String,
    pub decision: String,
}
