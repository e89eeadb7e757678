//! SessionDriver on a paused tokio clock
#![cfg(feature = "driver")]

use analysis_scheduler::{spawn_session, AnalyzeError, Analyzer, Command, EditorSession};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use shared_types::AnalysisRequest;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct MockAnalyzer {
    latency: Duration,
    response: Result<Value, AnalyzeError>,
    calls: Mutex<Vec<String>>,
}

impl MockAnalyzer {
    fn new(latency_ms: u64, response: Result<Value, AnalyzeError>) -> Arc<Self> {
        Arc::new(Self {
            latency: Duration::from_millis(latency_ms),
            response,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    async fn analyze(&self, request: AnalysisRequest) -> Result<Value, AnalyzeError> {
        self.calls.lock().unwrap().push(request.text);
        tokio::time::sleep(self.latency).await;
        self.response.clone()
    }
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_debounced_analysis_is_published() {
    let analyzer = MockAnalyzer::new(
        100,
        Ok(json!({"findings": [{"term": "man up", "type": "replace", "replacement": "toughen up"}]})),
    );
    let (commands, render, handle) = spawn_session(EditorSession::default(), analyzer.clone());

    commands
        .send(Command::SetText("You should man up".to_string()))
        .await
        .unwrap();
    sleep_ms(300).await;
    assert!(analyzer.calls().is_empty());

    sleep_ms(400).await;
    assert_eq!(analyzer.calls(), vec!["You should man up".to_string()]);

    let state = render.borrow().clone();
    assert_eq!(state.findings.len(), 1);
    assert_eq!(state.dominant_finding_id.as_deref(), Some("p1_f_0_11_17"));
    assert!(state.copy_enabled);

    drop(commands);
    let session = handle.await.unwrap();
    assert_eq!(session.text(), "You should man up");
}

#[tokio::test(start_paused = true)]
async fn test_continuous_typing_hits_max_wait() {
    let analyzer = MockAnalyzer::new(10, Ok(json!({"findings": []})));
    let (commands, _render, handle) = spawn_session(EditorSession::default(), analyzer.clone());

    let mut text = String::new();
    for _ in 0..31 {
        text.push('x');
        commands.send(Command::SetText(text.clone())).await.unwrap();
        sleep_ms(100).await;
    }
    assert_eq!(analyzer.calls().len(), 2);

    sleep_ms(1000).await;
    assert_eq!(analyzer.calls().len(), 3);
    assert_eq!(analyzer.calls().last().map(String::len), Some(31));

    drop(commands);
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_failure_is_published_as_message() {
    let analyzer = MockAnalyzer::new(
        20,
        Err(AnalyzeError::Transport("offline".to_string())),
    );
    let (commands, render, handle) = spawn_session(EditorSession::default(), analyzer);

    commands
        .send(Command::SetText("Hello there.".to_string()))
        .await
        .unwrap();
    sleep_ms(50).await;

    let state = render.borrow().clone();
    assert_eq!(state.blocked_message.as_deref(), Some("Request failed: offline"));
    assert!(!state.copy_enabled);

    drop(commands);
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_apply_replace_through_driver() {
    let analyzer = MockAnalyzer::new(
        10,
        Ok(json!({"findings": [{"term": "man up", "type": "replace", "replacement": "toughen up"}]})),
    );
    let (commands, render, handle) = spawn_session(EditorSession::default(), analyzer.clone());

    commands
        .send(Command::SetText("You should man up.".to_string()))
        .await
        .unwrap();
    sleep_ms(50).await;
    let id = render.borrow().dominant_finding_id.clone().unwrap();

    commands.send(Command::ApplyReplace(id)).await.unwrap();
    sleep_ms(50).await;

    let state = render.borrow().clone();
    assert!(state.markup.contains("<mark class=\"et_good\">toughen up</mark>"));
    assert_eq!(analyzer.calls().len(), 2);

    sleep_ms(5000).await;
    assert_eq!(analyzer.calls().len(), 2);

    drop(commands);
    let session = handle.await.unwrap();
    assert_eq!(session.text(), "You should toughen up.");
}
