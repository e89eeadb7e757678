//! Scripted editor runs for `equaltype simulate`
//!
//! A script is a JSON document:
//!
//! ```json
//! {
//!   "latency_ms": 120,
//!   "responses": [
//!     {"result": {"findings": [{"term": "man up", "type": "replace", "replacement": "toughen up"}]}},
//!     {"error": "connection reset", "latency_ms": 40}
//!   ],
//!   "steps": [
//!     {"at_ms": 0, "action": "type", "text": "You should man up."},
//!     {"at_ms": 800, "action": "apply_replace", "id": "p1_f_0_11_17"}
//!   ]
//! }
//! ```
//!
//! Responses are consumed one per analyze call; the last one repeats.

use analysis_scheduler::{AnalyzeCall, AnalyzeError, EditorSession, EngineConfig, Phase, Reply, Simulation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_types::{AnalysisRequest, RenderState};

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    #[serde(default)]
    pub responses: Vec<ScriptResponse>,
    pub steps: Vec<Step>,
}

fn default_latency_ms() -> u64 {
    100
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptResponse {
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub result: Option<Value>,
    /// Reported as a transport failure
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Type { text: String },
    Select { id: String },
    ApplyReplace { id: String },
    KeepReplace,
    AcceptAvoid,
    RejectAvoid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub calls: Vec<AnalyzeCall>,
    pub phase: Phase,
    pub text: String,
    pub render: RenderState,
}

fn reply_for(script: &Script, index: usize) -> Reply {
    let response = script
        .responses
        .get(index)
        .or_else(|| script.responses.last())
        .cloned()
        .unwrap_or_default();
    let latency_ms = response.latency_ms.unwrap_or(script.latency_ms);

    match response.error {
        Some(detail) => Reply::err(latency_ms, AnalyzeError::Transport(detail)),
        None => Reply::ok(
            latency_ms,
            response.result.unwrap_or_else(|| json!({"findings": []})),
        ),
    }
}

/// Play `script` on a virtual clock and report every call plus the final state
pub fn run_script(config: &EngineConfig, script: &Script) -> Report {
    let mut served = 0usize;
    let responder = |_: &AnalysisRequest| {
        let reply = reply_for(script, served);
        served += 1;
        reply
    };

    let mut steps = script.steps.clone();
    steps.sort_by_key(|step| step.at_ms);

    let mut sim = Simulation::new(EditorSession::new(config), responder);
    for step in steps {
        sim.advance(step.at_ms.saturating_sub(sim.now_ms()));
        match step.action {
            Action::Type { text } => sim.type_text(&text),
            Action::Select { id } => {
                sim.select(&id);
            }
            Action::ApplyReplace { id } => sim.apply_replace(&id),
            Action::KeepReplace => sim.keep_replace(),
            Action::AcceptAvoid => sim.accept_avoid(),
            Action::RejectAvoid => sim.reject_avoid(),
        }
    }
    sim.run_until_idle();

    let calls = sim.calls().to_vec();
    let session = sim.into_session();
    Report {
        calls,
        phase: session.phase(),
        text: session.text().to_string(),
        render: session.render(),
    }
}
