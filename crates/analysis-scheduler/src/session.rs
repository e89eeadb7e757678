//! Editor session
//!
//! [`EditorSession`] is the engine state behind one text box: the current text,
//! the findings of the last accepted pass, copy permission, the user-facing
//! notice, and the scheduler. Every operation returns the [`Effect`]s an
//! executor must still perform (timers and analyze calls); result handling
//! effects are applied here.

use finding_engine::{dominant, FindingEngine};
use serde_json::Value;
use shared_types::{AnalysisRequest, Finding, FindingKind, RenderState, TextSpan};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::edits::splice_replacement;
use crate::error::AnalyzeError;
use crate::machine::{Decision, Effect, Event, Phase, Scheduler, SchedulerState, TimerId};

pub const NO_REPLACEMENT_MESSAGE: &str =
    "No safe replacement suggestion is available for this term yet.";
pub const COPY_RESTRICTED_MESSAGE: &str =
    "This wording may unintentionally exclude or stereotype some people. We recommend revising it.";
pub const KEEP_REPLACE_MESSAGE: &str = "This word has a long history of harm and exclusion. For this reason, it cannot be copied or used in this context. We strongly suggest revising it for inclusive language.";
pub const REJECT_AVOID_MESSAGE: &str = "This wording may unintentionally exclude or stereotype some people. We recommend revising or avoiding it.";

#[derive(Debug, Clone)]
pub struct EditorSession {
    engine: FindingEngine,
    scheduler: Scheduler,
    locale: String,
    text: String,
    findings: Vec<Finding>,
    active_id: Option<String>,
    copy_enabled: bool,
    blocked_message: Option<String>,
    transient: Option<TextSpan>,
    /// Sequence and text of the request whose result is still wanted
    pending: Option<(u64, String)>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            engine: FindingEngine::with_config(config.arbitration),
            scheduler: Scheduler::new(config.scheduler.clone()),
            locale: config.request.locale.clone(),
            text: String::new(),
            findings: Vec::new(),
            active_id: None,
            copy_enabled: false,
            blocked_message: None,
            transient: None,
            pending: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn copy_enabled(&self) -> bool {
        self.copy_enabled
    }

    pub fn blocked_message(&self) -> Option<&str> {
        self.blocked_message.as_deref()
    }

    pub fn transient(&self) -> Option<TextSpan> {
        self.transient
    }

    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    pub fn scheduler_state(&self) -> &SchedulerState {
        self.scheduler.state()
    }

    /// The finding currently surfaced for a decision
    pub fn active_finding(&self) -> Option<&Finding> {
        let id = self.active_id.as_deref()?;
        self.findings.iter().find(|f| f.id == id)
    }

    /// Surface a specific finding; returns false for unknown ids
    pub fn select(&mut self, id: &str) -> bool {
        if self.findings.iter().any(|f| f.id == id) {
            self.active_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Request body for an `Analyze` effect
    pub fn request(&self, text: &str) -> AnalysisRequest {
        AnalysisRequest::new(text, self.locale.as_str())
    }

    pub fn render(&self) -> RenderState {
        RenderState {
            markup: self.engine.render(&self.text, &self.findings, self.transient),
            findings: self.findings.clone(),
            dominant_finding_id: dominant(&self.findings).map(|f| f.id.clone()),
            copy_enabled: self.copy_enabled,
            blocked_message: self.blocked_message.clone(),
        }
    }

    pub fn set_text(&mut self, text: &str) -> Vec<Effect> {
        let previous = std::mem::replace(&mut self.text, text.to_string());
        self.transient = None;
        let effects = self.scheduler.handle(Event::TextChanged {
            previous,
            text: text.to_string(),
        });
        self.absorb(effects)
    }

    pub fn timer_fired(&mut self, timer: TimerId) -> Vec<Effect> {
        let effects = self.scheduler.handle(Event::TimerFired { timer });
        self.absorb(effects)
    }

    /// Deliver the outcome of the analyze call for `sequence`
    pub fn complete(&mut self, sequence: u64, outcome: Result<Value, AnalyzeError>) -> Vec<Effect> {
        let event = match &outcome {
            Ok(_) => Event::AnalyzeCompleted { sequence },
            Err(_) => Event::AnalyzeFailed { sequence },
        };
        let effects = self.scheduler.handle(event);

        for effect in &effects {
            match (effect, &outcome) {
                (Effect::Accept { sequence }, Ok(raw)) => self.accept(*sequence, raw),
                (Effect::Reject { sequence }, Err(err)) => self.reject(*sequence, err),
                (Effect::Discard { sequence }, _) => {
                    debug!(sequence, "Discarding stale analysis result")
                }
                _ => {}
            }
        }
        self.absorb(effects)
    }

    /// Splice in the suggested replacement of a `Replace` finding
    pub fn apply_replace(&mut self, id: &str) -> Vec<Effect> {
        let Some(finding) = self.findings.iter().find(|f| f.id == id).cloned() else {
            debug!(id, "Unknown finding");
            return Vec::new();
        };
        if finding.kind != FindingKind::Replace {
            return Vec::new();
        }

        let Some(replacement) = finding.actionable_replacement() else {
            self.blocked_message = Some(NO_REPLACEMENT_MESSAGE.to_string());
            self.copy_enabled = false;
            self.active_id = None;
            return Vec::new();
        };

        let splice = splice_replacement(&self.text, finding.span(), replacement);
        self.text = splice.text;
        self.transient = Some(splice.inserted);
        self.findings.clear();
        self.active_id = None;
        self.copy_enabled = true;
        self.blocked_message = None;

        self.decide(Decision::ApplyReplace)
    }

    /// Keep the flagged term; copying stays revoked
    pub fn keep_replace(&mut self) -> Vec<Effect> {
        self.blocked_message = Some(KEEP_REPLACE_MESSAGE.to_string());
        self.copy_enabled = false;
        self.active_id = None;
        self.decide(Decision::KeepReplace)
    }

    /// Accept the avoid advice by discarding the text
    pub fn accept_avoid(&mut self) -> Vec<Effect> {
        self.text.clear();
        self.findings.clear();
        self.transient = None;
        self.active_id = None;
        self.copy_enabled = false;
        self.blocked_message = None;
        self.decide(Decision::AcceptAvoid)
    }

    pub fn reject_avoid(&mut self) -> Vec<Effect> {
        self.blocked_message = Some(REJECT_AVOID_MESSAGE.to_string());
        self.copy_enabled = false;
        self.active_id = None;
        self.decide(Decision::RejectAvoid)
    }

    fn decide(&mut self, decision: Decision) -> Vec<Effect> {
        let effects = self.scheduler.handle(Event::Decision {
            decision,
            text: self.text.clone(),
        });
        self.absorb(effects)
    }

    /// Apply local effects and hand back the ones an executor must run
    fn absorb(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        if self.scheduler.state().in_flight.is_none() {
            self.pending = None;
        }
        for effect in &effects {
            match effect {
                Effect::Analyze { sequence, text } => {
                    self.pending = Some((*sequence, text.clone()));
                }
                Effect::Clear => self.clear(),
                _ => {}
            }
        }
        effects.into_iter().filter(Effect::is_external).collect()
    }

    fn clear(&mut self) {
        self.findings.clear();
        self.active_id = None;
        self.copy_enabled = false;
        self.blocked_message = None;
    }

    fn accept(&mut self, sequence: u64, raw: &Value) {
        let subject = match self.pending.take() {
            Some((pending, text)) if pending == sequence => text,
            _ => self.text.clone(),
        };
        let analysis = self.engine.process_pass(raw, &subject, sequence);
        debug!(
            sequence,
            findings = analysis.findings.len(),
            copy_enabled = analysis.copy_enabled,
            "Accepted analysis"
        );

        self.findings = analysis.findings;
        self.copy_enabled = analysis.copy_enabled;
        self.blocked_message = match analysis.popup_message {
            Some(message) => Some(message),
            None if self.findings.is_empty() && !self.copy_enabled => {
                Some(COPY_RESTRICTED_MESSAGE.to_string())
            }
            None if self.findings.is_empty() => None,
            None => self.blocked_message.take(),
        };

        if self.active_finding().is_none() {
            self.active_id = dominant(&self.findings).map(|f| f.id.clone());
        }
    }

    fn reject(&mut self, sequence: u64, err: &AnalyzeError) {
        warn!(sequence, error = %err, "Analysis failed");
        self.pending = None;
        self.findings.clear();
        self.active_id = None;
        self.copy_enabled = false;
        self.blocked_message = Some(err.to_string());
    }
}
