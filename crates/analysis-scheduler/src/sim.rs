//! Deterministic virtual-clock executor
//!
//! Runs an [`EditorSession`] against a scripted responder with millisecond
//! ticks. Used by the CLI `simulate` command and by timing tests.

use serde::Serialize;
use serde_json::Value;
use shared_types::AnalysisRequest;
use std::collections::BTreeMap;

use crate::error::AnalyzeError;
use crate::machine::{Effect, TimerId};
use crate::session::EditorSession;

/// Scripted answer to one analyze call
#[derive(Debug, Clone)]
pub struct Reply {
    pub latency_ms: u64,
    pub outcome: Result<Value, AnalyzeError>,
}

impl Reply {
    pub fn ok(latency_ms: u64, raw: Value) -> Self {
        Self {
            latency_ms,
            outcome: Ok(raw),
        }
    }

    pub fn err(latency_ms: u64, error: AnalyzeError) -> Self {
        Self {
            latency_ms,
            outcome: Err(error),
        }
    }
}

/// An analyze call made during the simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzeCall {
    pub at_ms: u64,
    pub sequence: u64,
    pub text: String,
}

struct PendingCompletion {
    due_ms: u64,
    order: u64,
    sequence: u64,
    outcome: Result<Value, AnalyzeError>,
}

pub struct Simulation<R> {
    session: EditorSession,
    responder: R,
    now_ms: u64,
    order: u64,
    timers: BTreeMap<TimerId, (u64, u64)>,
    completions: Vec<PendingCompletion>,
    calls: Vec<AnalyzeCall>,
}

impl<R> Simulation<R>
where
    R: FnMut(&AnalysisRequest) -> Reply,
{
    pub fn new(session: EditorSession, responder: R) -> Self {
        Self {
            session,
            responder,
            now_ms: 0,
            order: 0,
            timers: BTreeMap::new(),
            completions: Vec::new(),
            calls: Vec::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn calls(&self) -> &[AnalyzeCall] {
        &self.calls
    }

    pub fn into_session(self) -> EditorSession {
        self.session
    }

    pub fn type_text(&mut self, text: &str) {
        let effects = self.session.set_text(text);
        self.perform(effects);
    }

    pub fn select(&mut self, id: &str) -> bool {
        self.session.select(id)
    }

    pub fn apply_replace(&mut self, id: &str) {
        let effects = self.session.apply_replace(id);
        self.perform(effects);
    }

    pub fn keep_replace(&mut self) {
        let effects = self.session.keep_replace();
        self.perform(effects);
    }

    pub fn accept_avoid(&mut self) {
        let effects = self.session.accept_avoid();
        self.perform(effects);
    }

    pub fn reject_avoid(&mut self) {
        let effects = self.session.reject_avoid();
        self.perform(effects);
    }

    /// Move the clock forward, firing due timers and completions in time order
    pub fn advance(&mut self, ms: u64) {
        let target = self.now_ms + ms;
        while let Some(due) = self.next_due().filter(|due| *due <= target) {
            self.now_ms = due;
            self.fire_next(due);
        }
        self.now_ms = target;
    }

    /// Advance until nothing is scheduled
    pub fn run_until_idle(&mut self) {
        while let Some(due) = self.next_due() {
            self.now_ms = self.now_ms.max(due);
            self.fire_next(due);
        }
    }

    fn next_due(&self) -> Option<u64> {
        let timer = self.timers.values().map(|(due, _)| *due).min();
        let completion = self.completions.iter().map(|c| c.due_ms).min();
        match (timer, completion) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn fire_next(&mut self, due: u64) {
        let timer = self
            .timers
            .iter()
            .filter(|(_, (d, _))| *d == due)
            .min_by_key(|(_, (_, order))| *order)
            .map(|(timer, (_, order))| (*timer, *order));
        let completion = self
            .completions
            .iter()
            .enumerate()
            .filter(|(_, c)| c.due_ms == due)
            .min_by_key(|(_, c)| c.order)
            .map(|(idx, c)| (idx, c.order));

        let effects = match (timer, completion) {
            (Some((timer, t_order)), c) if c.map_or(true, |(_, c_order)| t_order < c_order) => {
                self.timers.remove(&timer);
                self.session.timer_fired(timer)
            }
            (_, Some((idx, _))) => {
                let completion = self.completions.remove(idx);
                self.session.complete(completion.sequence, completion.outcome)
            }
            _ => return,
        };
        self.perform(effects);
    }

    fn next_order(&mut self) -> u64 {
        self.order += 1;
        self.order
    }

    fn perform(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ArmTimer { timer, delay_ms, .. } => {
                    let order = self.next_order();
                    self.timers.insert(timer, (self.now_ms + delay_ms, order));
                }
                Effect::CancelTimer { timer } => {
                    self.timers.remove(&timer);
                }
                Effect::Analyze { sequence, text } => {
                    self.calls.push(AnalyzeCall {
                        at_ms: self.now_ms,
                        sequence,
                        text: text.clone(),
                    });
                    let request = self.session.request(&text);
                    let reply = (self.responder)(&request);
                    let order = self.next_order();
                    self.completions.push(PendingCompletion {
                        due_ms: self.now_ms + reply.latency_ms,
                        order,
                        sequence,
                        outcome: reply.outcome,
                    });
                }
                _ => {}
            }
        }
    }
}
