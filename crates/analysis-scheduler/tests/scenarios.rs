//! End-to-end editor scenarios on the virtual clock

use analysis_scheduler::{EditorSession, Phase, Reply, Simulation};
use pretty_assertions::assert_eq;
use serde_json::json;
use shared_types::{AnalysisRequest, FindingKind};

fn quiet(_: &AnalysisRequest) -> Reply {
    Reply::ok(50, json!({"findings": []}))
}

fn man_up(_: &AnalysisRequest) -> Reply {
    Reply::ok(
        50,
        json!({"findings": [{"term": "man up", "type": "replace", "replacement": "toughen up"}]}),
    )
}

#[test]
fn test_replace_finding_is_located_and_rendered() {
    let mut sim = Simulation::new(EditorSession::default(), man_up);
    sim.type_text("You should man up.");
    sim.run_until_idle();

    let render = sim.session().render();
    assert_eq!(render.findings.len(), 1);
    assert_eq!(render.findings[0].kind, FindingKind::Replace);
    assert_eq!((render.findings[0].start, render.findings[0].end), (11, 17));
    assert_eq!(
        render.markup,
        "You should <mark data-id=\"p1_f_0_11_17\" class=\"et_mark\">man up</mark>."
    );
    assert!(render.copy_enabled);
}

#[test]
fn test_overlapping_avoid_suppresses_replace() {
    let responder = |_: &AnalysisRequest| {
        Reply::ok(
            10,
            json!({"result": {"findings": [
                {"start": 0, "end": 18, "type": "avoid"},
                {"start": 4, "end": 8, "type": "replace", "replacement": "x"}
            ]}}),
        )
    };
    let mut sim = Simulation::new(EditorSession::default(), responder);
    sim.type_text("You should man up.");
    sim.run_until_idle();

    let findings = sim.session().findings();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, FindingKind::Avoid);
    assert_eq!(
        sim.session().render().dominant_finding_id.as_deref(),
        Some("p1_f_0_0_18")
    );
}

#[test]
fn test_unmatched_term_is_dropped() {
    let responder = |_: &AnalysisRequest| {
        Reply::ok(
            10,
            json!({"findings": [{"type": "replace", "term": "policeman", "start": null, "end": null}]}),
        )
    };
    let mut sim = Simulation::new(EditorSession::default(), responder);
    sim.type_text("The officer helped.");
    sim.run_until_idle();

    assert!(sim.session().findings().is_empty());
    assert!(sim.session().copy_enabled());
    assert_eq!(sim.session().blocked_message(), None);
}

#[test]
fn test_empty_replacement_leaves_text_unlocked() {
    let responder = |_: &AnalysisRequest| {
        Reply::ok(
            10,
            json!({"findings": [{"term": "guys", "type": "replace", "replacement": ""}]}),
        )
    };
    let mut sim = Simulation::new(EditorSession::default(), responder);
    sim.type_text("Hey guys.");
    sim.run_until_idle();

    let id = sim.session().findings()[0].id.clone();
    sim.apply_replace(&id);

    assert_eq!(sim.session().text(), "Hey guys.");
    assert_eq!(
        sim.session().blocked_message(),
        Some("No safe replacement suggestion is available for this term yet.")
    );
    assert_ne!(sim.session().phase(), Phase::Locked);
    assert_eq!(sim.calls().len(), 1);
}

#[test]
fn test_continuous_typing_is_bounded_by_max_wait() {
    let mut sim = Simulation::new(EditorSession::default(), quiet);
    let mut text = String::from("x");
    sim.type_text(&text);
    for _ in 0..30 {
        sim.advance(100);
        text.push('x');
        sim.type_text(&text);
    }
    sim.advance(2000);

    let times: Vec<u64> = sim.calls().iter().map(|c| c.at_ms).collect();
    assert_eq!(times, vec![1200, 2400, 3550]);
    assert_eq!(sim.calls().last().map(|c| c.text.len()), Some(31));
}

#[test]
fn test_apply_replace_forces_one_analysis_then_unlocks_on_edit() {
    let mut sim = Simulation::new(EditorSession::default(), man_up);
    sim.type_text("You should man up.");
    sim.run_until_idle();

    sim.apply_replace("p1_f_0_11_17");
    assert_eq!(sim.session().text(), "You should toughen up.");
    assert_eq!(sim.session().phase(), Phase::Locked);
    assert_eq!(sim.calls().len(), 2);
    assert_eq!(sim.calls()[1].text, "You should toughen up.");

    sim.run_until_idle();
    assert_eq!(sim.session().phase(), Phase::Locked);
    sim.advance(5000);
    assert_eq!(sim.calls().len(), 2);

    sim.type_text("You should toughen up. Ok");
    assert_eq!(sim.session().phase(), Phase::PendingDebounce);
    sim.advance(550);
    assert_eq!(sim.calls().len(), 3);
}

#[test]
fn test_slow_stale_response_never_overwrites_newer_one() {
    let responder = |request: &AnalysisRequest| {
        if request.text == "Hey guys." {
            Reply::ok(500, json!({"findings": [{"term": "Hey", "type": "avoid"}]}))
        } else {
            Reply::ok(
                50,
                json!({"findings": [{"term": "guys", "type": "replace", "replacement": "folks"}]}),
            )
        }
    };
    let mut sim = Simulation::new(EditorSession::default(), responder);
    sim.type_text("Hey guys.");
    sim.advance(10);
    sim.type_text("Hey guys. Hi all.");
    sim.advance(1000);

    let findings = sim.session().findings();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, FindingKind::Replace);
    assert!(findings[0].id.starts_with("p2_"));
}

#[test]
fn test_failure_surfaces_message_and_returns_to_idle() {
    let responder = |_: &AnalysisRequest| {
        Reply::err(
            20,
            analysis_scheduler::AnalyzeError::Transport("connection refused".to_string()),
        )
    };
    let mut sim = Simulation::new(EditorSession::default(), responder);
    sim.type_text("Hello there.");
    sim.run_until_idle();

    assert_eq!(
        sim.session().blocked_message(),
        Some("Request failed: connection refused")
    );
    assert!(!sim.session().copy_enabled());
    assert_eq!(sim.session().phase(), Phase::Idle);
}
