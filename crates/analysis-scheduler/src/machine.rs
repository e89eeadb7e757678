//! Analysis scheduling state machine
//!
//! All scheduling decisions are pure: [`SchedulerState::step`] maps the current
//! state and one [`Event`] to the next state plus the [`Effect`]s an executor
//! must perform. Timers, clocks and network calls live outside.
//!
//! Phases:
//! - `Idle`: nothing armed, nothing in flight
//! - `PendingDebounce`: a debounce timer is armed
//! - `Analyzing`: a request is in flight
//! - `Locked`: the user made a decision; automatic analysis is suppressed
//!   until the next edit (one forced pass may still run)

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SchedulerConfig;

lazy_static! {
    static ref SENTENCE_END: Regex = Regex::new(r"[.!?]\s*$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    Debounce,
    MaxWait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    PendingDebounce,
    Analyzing,
    Locked,
}

/// A user decision on the surfaced finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    ApplyReplace,
    KeepReplace,
    AcceptAvoid,
    RejectAvoid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    TextChanged { previous: String, text: String },
    TimerFired { timer: TimerId },
    AnalyzeCompleted { sequence: u64 },
    AnalyzeFailed { sequence: u64 },
    Decision { decision: Decision, text: String },
}

/// Work requested from the executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    ArmTimer {
        timer: TimerId,
        kind: TimerKind,
        delay_ms: u64,
    },
    CancelTimer {
        timer: TimerId,
    },
    Analyze {
        sequence: u64,
        text: String,
    },
    /// Apply the completed result of `sequence`
    Accept {
        sequence: u64,
    },
    /// Surface the failure of `sequence`
    Reject {
        sequence: u64,
    },
    /// Drop a stale completion
    Discard {
        sequence: u64,
    },
    /// Remove findings without calling the service
    Clear,
}

impl Effect {
    /// Whether an outside executor has to act on this effect
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Effect::ArmTimer { .. } | Effect::CancelTimer { .. } | Effect::Analyze { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SchedulerState,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerState {
    pub pending_timer: Option<TimerId>,
    pub max_wait_timer: Option<TimerId>,
    /// Last allocated request sequence
    pub sequence: u64,
    /// The only sequence whose completion is still wanted
    pub in_flight: Option<u64>,
    pub locked: bool,
    /// One analysis may still run while locked
    pub forced_once: bool,
    pub latest_text: String,
    next_timer: u64,
}

/// Did this edit append a sentence terminator or a newline?
pub fn ends_sentence(previous: &str, text: &str) -> bool {
    let previous_len = previous.chars().count();
    if text.chars().count() <= previous_len {
        return false;
    }
    let suffix: String = text.chars().skip(previous_len).collect();
    suffix.ends_with('\n') || SENTENCE_END.is_match(&suffix)
}

impl SchedulerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.locked {
            Phase::Locked
        } else if self.in_flight.is_some() {
            Phase::Analyzing
        } else if self.pending_timer.is_some() {
            Phase::PendingDebounce
        } else {
            Phase::Idle
        }
    }

    /// Compute the next state and effects for `event`
    pub fn step(&self, event: &Event, config: &SchedulerConfig) -> Transition {
        let mut state = self.clone();
        let mut effects = Vec::new();

        match event {
            Event::TextChanged { previous, text } => {
                state.on_text_changed(previous, text, config, &mut effects)
            }
            Event::TimerFired { timer } => state.on_timer_fired(*timer, config, &mut effects),
            Event::AnalyzeCompleted { sequence } => state.on_completed(*sequence, &mut effects),
            Event::AnalyzeFailed { sequence } => state.on_failed(*sequence, &mut effects),
            Event::Decision { decision, text } => {
                state.on_decision(*decision, text, config, &mut effects)
            }
        }

        Transition { state, effects }
    }

    fn allocate_timer(&mut self) -> TimerId {
        self.next_timer += 1;
        TimerId(self.next_timer)
    }

    fn cancel_timers(&mut self, effects: &mut Vec<Effect>) {
        for timer in [self.pending_timer.take(), self.max_wait_timer.take()]
            .into_iter()
            .flatten()
        {
            effects.push(Effect::CancelTimer { timer });
        }
    }

    fn on_text_changed(
        &mut self,
        previous: &str,
        text: &str,
        config: &SchedulerConfig,
        effects: &mut Vec<Effect>,
    ) {
        self.latest_text = text.to_string();
        if self.locked {
            self.locked = false;
            self.forced_once = false;
        }

        if self.is_too_short(config) {
            self.cancel_timers(effects);
            self.in_flight = None;
            effects.push(Effect::Clear);
            return;
        }

        if ends_sentence(previous, text) {
            self.begin_analysis(config, effects);
            return;
        }

        if let Some(timer) = self.pending_timer.take() {
            effects.push(Effect::CancelTimer { timer });
        }
        let timer = self.allocate_timer();
        self.pending_timer = Some(timer);
        effects.push(Effect::ArmTimer {
            timer,
            kind: TimerKind::Debounce,
            delay_ms: config.debounce_ms,
        });

        if self.max_wait_timer.is_none() {
            let timer = self.allocate_timer();
            self.max_wait_timer = Some(timer);
            effects.push(Effect::ArmTimer {
                timer,
                kind: TimerKind::MaxWait,
                delay_ms: config.max_wait_ms,
            });
        }
    }

    fn on_timer_fired(&mut self, timer: TimerId, config: &SchedulerConfig, effects: &mut Vec<Effect>) {
        if self.pending_timer == Some(timer) {
            self.pending_timer = None;
            self.begin_analysis(config, effects);
        } else if self.max_wait_timer == Some(timer) {
            self.max_wait_timer = None;
            if self.pending_timer.is_some() {
                self.begin_analysis(config, effects);
            }
        } else {
            debug!(timer = timer.0, "Ignoring cancelled timer");
        }
    }

    fn is_too_short(&self, config: &SchedulerConfig) -> bool {
        self.latest_text.trim().chars().count() < config.min_text_chars.max(1)
    }

    fn begin_analysis(&mut self, config: &SchedulerConfig, effects: &mut Vec<Effect>) {
        if self.locked && !self.forced_once {
            return;
        }
        self.cancel_timers(effects);

        if self.is_too_short(config) {
            self.in_flight = None;
            self.forced_once = false;
            effects.push(Effect::Clear);
            return;
        }

        self.sequence += 1;
        self.in_flight = Some(self.sequence);
        effects.push(Effect::Analyze {
            sequence: self.sequence,
            text: self.latest_text.clone(),
        });
    }

    fn on_completed(&mut self, sequence: u64, effects: &mut Vec<Effect>) {
        if self.in_flight != Some(sequence) {
            effects.push(Effect::Discard { sequence });
            return;
        }
        self.in_flight = None;
        self.forced_once = false;
        effects.push(Effect::Accept { sequence });
    }

    fn on_failed(&mut self, sequence: u64, effects: &mut Vec<Effect>) {
        if self.in_flight != Some(sequence) {
            effects.push(Effect::Discard { sequence });
            return;
        }
        self.in_flight = None;
        self.forced_once = false;
        self.locked = false;
        effects.push(Effect::Reject { sequence });
    }

    fn on_decision(
        &mut self,
        decision: Decision,
        text: &str,
        config: &SchedulerConfig,
        effects: &mut Vec<Effect>,
    ) {
        self.latest_text = text.to_string();
        self.cancel_timers(effects);
        self.locked = true;
        self.forced_once = false;

        // Only a new analysis supersedes the request already in flight
        if decision == Decision::ApplyReplace {
            self.forced_once = true;
            self.begin_analysis(config, effects);
        }
    }
}

/// Owns a [`SchedulerState`] and advances it in place
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    state: SchedulerState,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            state: SchedulerState::new(),
            config,
        }
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        let Transition { state, effects } = self.state.step(&event, &self.config);
        self.state = state;
        effects
    }
}
