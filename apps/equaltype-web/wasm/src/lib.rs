use finding_engine::{assess_intervention, dominant, FindingEngine};
use serde_json::Value;
use shared_types::RenderState;
use wasm_bindgen::prelude::*;

pub mod editor_panel;

pub use editor_panel::EditorPanel;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

fn render_raw(raw: &Value, text: &str) -> RenderState {
    let engine = FindingEngine::new();
    let analysis = engine.process(raw, text);
    RenderState {
        markup: engine.render(text, &analysis.findings, None),
        dominant_finding_id: dominant(&analysis.findings).map(|f| f.id.clone()),
        copy_enabled: analysis.copy_enabled,
        blocked_message: analysis.popup_message,
        findings: analysis.findings,
    }
}

/// Normalize, arbitrate and render a raw analysis response for `text`
#[wasm_bindgen]
pub fn render_findings_wasm(raw_json: &str, text: &str) -> Result<String, JsValue> {
    let raw: Value = serde_json::from_str(raw_json)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse response: {}", e)))?;
    serde_json::to_string(&render_raw(&raw, text))
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize render state: {}", e)))
}

/// Whole-text intervention verdict for the typing assist
#[wasm_bindgen]
pub fn intervention_verdict_wasm(raw_json: &str, original_text: &str) -> Result<String, JsValue> {
    let raw: Value = serde_json::from_str(raw_json)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse response: {}", e)))?;
    serde_json::to_string(&assess_intervention(&raw, original_text))
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize verdict: {}", e)))
}
