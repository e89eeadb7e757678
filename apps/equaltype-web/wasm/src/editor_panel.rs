//! Browser binding for one editor
//!
//! The JS host owns timers and `fetch`. Every mutating call returns a JSON
//! array of effects to execute:
//!
//! - `{"type": "arm_timer", "timer": 3, "kind": "debounce", "delay_ms": 550}`
//! - `{"type": "cancel_timer", "timer": 3}`
//! - `{"type": "analyze", "sequence": 2, "text": "..."}`
//!
//! Fired timers come back through `timer_fired`, responses through `complete`
//! or `fail`.

use analysis_scheduler::{parse_response, AnalyzeError, Effect, EditorSession, EngineConfig};
use wasm_bindgen::prelude::*;

fn js_error(context: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, e))
}

#[wasm_bindgen]
pub struct EditorPanel {
    session: EditorSession,
}

impl Default for EditorPanel {
    fn default() -> Self {
        Self {
            session: EditorSession::default(),
        }
    }
}

impl EditorPanel {
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            session: EditorSession::new(config),
        }
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    fn effects_json(effects: &[Effect]) -> Result<String, serde_json::Error> {
        serde_json::to_string(effects)
    }
}

#[wasm_bindgen]
impl EditorPanel {
    /// Create a panel; `config_toml` may be empty for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config_toml: &str) -> Result<EditorPanel, JsValue> {
        if config_toml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config = EngineConfig::from_str(config_toml).map_err(|e| js_error("Invalid config", e))?;
        Ok(Self::with_config(&config))
    }

    pub fn set_text(&mut self, text: &str) -> Result<String, JsValue> {
        let effects = self.session.set_text(text);
        Self::effects_json(&effects).map_err(|e| js_error("Failed to serialize effects", e))
    }

    pub fn timer_fired(&mut self, timer: u64) -> Result<String, JsValue> {
        let effects = self
            .session
            .timer_fired(analysis_scheduler::TimerId(timer));
        Self::effects_json(&effects).map_err(|e| js_error("Failed to serialize effects", e))
    }

    /// Deliver an HTTP response for `sequence`
    pub fn complete(&mut self, sequence: u64, status: u16, body: &str) -> Result<String, JsValue> {
        let effects = self.session.complete(sequence, parse_response(status, body));
        Self::effects_json(&effects).map_err(|e| js_error("Failed to serialize effects", e))
    }

    /// Deliver a transport failure for `sequence`
    pub fn fail(&mut self, sequence: u64, detail: &str) -> Result<String, JsValue> {
        let effects = self
            .session
            .complete(sequence, Err(AnalyzeError::Transport(detail.to_string())));
        Self::effects_json(&effects).map_err(|e| js_error("Failed to serialize effects", e))
    }

    pub fn select(&mut self, id: &str) -> bool {
        self.session.select(id)
    }

    pub fn apply_replace(&mut self, id: &str) -> Result<String, JsValue> {
        let effects = self.session.apply_replace(id);
        Self::effects_json(&effects).map_err(|e| js_error("Failed to serialize effects", e))
    }

    pub fn keep_replace(&mut self) -> Result<String, JsValue> {
        let effects = self.session.keep_replace();
        Self::effects_json(&effects).map_err(|e| js_error("Failed to serialize effects", e))
    }

    pub fn accept_avoid(&mut self) -> Result<String, JsValue> {
        let effects = self.session.accept_avoid();
        Self::effects_json(&effects).map_err(|e| js_error("Failed to serialize effects", e))
    }

    pub fn reject_avoid(&mut self) -> Result<String, JsValue> {
        let effects = self.session.reject_avoid();
        Self::effects_json(&effects).map_err(|e| js_error("Failed to serialize effects", e))
    }

    /// Current text (after replacements)
    pub fn text(&self) -> String {
        self.session.text().to_string()
    }

    /// Id of the finding the popup should show
    pub fn active_finding_id(&self) -> Option<String> {
        self.session.active_finding().map(|f| f.id.clone())
    }

    /// Render state as camelCase JSON
    pub fn render(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.render())
            .map_err(|e| js_error("Failed to serialize render state", e))
    }

    /// Request body for an `analyze` effect
    pub fn request_body(&self, text: &str) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.request(text))
            .map_err(|e| js_error("Failed to serialize request", e))
    }
}
