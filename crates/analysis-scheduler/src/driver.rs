//! Tokio executor for an [`EditorSession`]
//!
//! Timers are spawned sleep tasks whose handles are aborted on cancel. Analyze
//! calls run as spawned tasks and report back through a channel, so all
//! session state is mutated on the driver loop only. The latest
//! [`RenderState`] is published on a `watch` channel.

use serde_json::Value;
use shared_types::RenderState;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::analyzer::Analyzer;
use crate::error::AnalyzeError;
use crate::machine::{Effect, TimerId};
use crate::session::EditorSession;

/// UI input forwarded to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetText(String),
    Select(String),
    ApplyReplace(String),
    KeepReplace,
    AcceptAvoid,
    RejectAvoid,
}

enum Wake {
    TimerFired(TimerId),
    Completed {
        sequence: u64,
        outcome: Result<Value, AnalyzeError>,
    },
}

pub struct SessionDriver<A> {
    session: EditorSession,
    analyzer: Arc<A>,
    timers: HashMap<TimerId, JoinHandle<()>>,
    wake_tx: mpsc::UnboundedSender<Wake>,
    wake_rx: mpsc::UnboundedReceiver<Wake>,
    render_tx: watch::Sender<RenderState>,
}

impl<A: Analyzer + 'static> SessionDriver<A> {
    pub fn new(session: EditorSession, analyzer: Arc<A>) -> (Self, watch::Receiver<RenderState>) {
        let (wake_tx, wake_rx) = mpsc::unbounded_channel();
        let (render_tx, render_rx) = watch::channel(session.render());
        (
            Self {
                session,
                analyzer,
                timers: HashMap::new(),
                wake_tx,
                wake_rx,
                render_tx,
            },
            render_rx,
        )
    }

    /// Process commands until the sender side is dropped, then return the session
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> EditorSession {
        loop {
            let effects = tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.apply(command),
                    None => break,
                },
                Some(wake) = self.wake_rx.recv() => self.wake(wake),
            };
            self.perform(effects);
            self.render_tx.send_replace(self.session.render());
        }

        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
        self.session
    }

    fn apply(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::SetText(text) => self.session.set_text(&text),
            Command::Select(id) => {
                self.session.select(&id);
                Vec::new()
            }
            Command::ApplyReplace(id) => self.session.apply_replace(&id),
            Command::KeepReplace => self.session.keep_replace(),
            Command::AcceptAvoid => self.session.accept_avoid(),
            Command::RejectAvoid => self.session.reject_avoid(),
        }
    }

    fn wake(&mut self, wake: Wake) -> Vec<Effect> {
        match wake {
            Wake::TimerFired(timer) => {
                self.timers.remove(&timer);
                self.session.timer_fired(timer)
            }
            Wake::Completed { sequence, outcome } => {
                info!(sequence, ok = outcome.is_ok(), "Analysis finished");
                self.session.complete(sequence, outcome)
            }
        }
    }

    fn perform(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ArmTimer {
                    timer,
                    kind,
                    delay_ms,
                } => {
                    debug!(timer = timer.0, ?kind, delay_ms, "Arming timer");
                    let tx = self.wake_tx.clone();
                    let handle = tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        let _ = tx.send(Wake::TimerFired(timer));
                    });
                    self.timers.insert(timer, handle);
                }
                Effect::CancelTimer { timer } => {
                    if let Some(handle) = self.timers.remove(&timer) {
                        handle.abort();
                    }
                }
                Effect::Analyze { sequence, text } => {
                    info!(sequence, chars = text.chars().count(), "Starting analysis");
                    let request = self.session.request(&text);
                    let analyzer = Arc::clone(&self.analyzer);
                    let tx = self.wake_tx.clone();
                    tokio::spawn(async move {
                        let outcome = analyzer.analyze(request).await;
                        let _ = tx.send(Wake::Completed { sequence, outcome });
                    });
                }
                _ => {}
            }
        }
    }
}

/// Spawn a driver for `session` and return its command sender, render
/// receiver and join handle
pub fn spawn_session<A: Analyzer + 'static>(
    session: EditorSession,
    analyzer: Arc<A>,
) -> (
    mpsc::Sender<Command>,
    watch::Receiver<RenderState>,
    JoinHandle<EditorSession>,
) {
    let (command_tx, command_rx) = mpsc::channel(64);
    let (driver, render_rx) = SessionDriver::new(session, analyzer);
    let handle = tokio::spawn(driver.run(command_rx));
    (command_tx, render_rx, handle)
}
