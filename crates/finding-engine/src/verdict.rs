//! Whole-text intervention verdict
//!
//! The typing-assist surface does not draw spans; it only needs to know whether
//! to interrupt the user, with an explanation and an optional rewrite.

use serde_json::Value;
use shared_types::InterventionVerdict;

use crate::normalize::unwrap_payload;
use crate::patterns::{
    AVOID_EXPLANATION, CAN_COPY_KEYS, CLEAN_VALUES, COPY_DISABLED_KEYS, DECISION_KEYS,
    EXPLANATION_KEYS, FLAGGED_KEYS, GENERIC_EXPLANATION, INTERVENE_DECISIONS, OVERALL_KEYS,
    PRIMARY_ACTION_KEYS, REWRITE_KEYS, SEVERITY_KEYS, VERDICT_MESSAGE_KEYS,
};
use crate::probe::{first_bool_key, first_string_key};

/// Descend into `items[0]` / `results[0]` when the payload is a batch
fn descend_batch(payload: &Value) -> &Value {
    let mut current = payload;
    for key in ["items", "results"] {
        if let Some(first) = current
            .get(key)
            .and_then(Value::as_array)
            .and_then(|items| items.first())
        {
            current = first;
        }
    }
    current
}

fn is_clean(value: &str) -> bool {
    value.is_empty() || CLEAN_VALUES.contains(&value)
}

/// Decide whether the typing assist should interrupt for `original_text`
pub fn assess_intervention(raw: &Value, original_text: &str) -> InterventionVerdict {
    let result = descend_batch(unwrap_payload(raw));

    let overall_raw = first_string_key(result, OVERALL_KEYS).unwrap_or_default();
    let primary_raw = first_string_key(result, PRIMARY_ACTION_KEYS).unwrap_or_default();
    let popup_message = first_string_key(result, VERDICT_MESSAGE_KEYS);
    let decision_raw = first_string_key(result, DECISION_KEYS).unwrap_or_default();
    let severity = first_string_key(result, SEVERITY_KEYS);

    let overall = overall_raw.to_lowercase();
    let primary_action = primary_raw.to_lowercase();
    let decision = decision_raw.to_lowercase();

    let actions = result.get("actions").filter(|a| a.is_object());

    let explanation = actions
        .and_then(|a| first_string_key(a, EXPLANATION_KEYS))
        .or(popup_message)
        .unwrap_or_default();

    let rewrite = actions
        .and_then(|a| first_string_key(a, REWRITE_KEYS))
        .or_else(|| first_string_key(result, REWRITE_KEYS))
        .unwrap_or_default();

    let flagged = first_bool_key(result, FLAGGED_KEYS);
    let can_copy = first_bool_key(result, CAN_COPY_KEYS);
    let copy_disabled = first_bool_key(result, COPY_DISABLED_KEYS);

    let rewrite_differs = !rewrite.is_empty() && rewrite != original_text.trim();

    let decision_intervene = INTERVENE_DECISIONS.contains(&decision.as_str())
        || INTERVENE_DECISIONS.contains(&primary_action.as_str());
    let copy_intervene = can_copy == Some(false) || copy_disabled == Some(true);

    let should_intervene = !is_clean(&overall)
        || !is_clean(&primary_action)
        || decision_intervene
        || flagged == Some(true)
        || copy_intervene
        || rewrite_differs;

    let explanation = if should_intervene && explanation.is_empty() {
        if overall == "avoid" || primary_action == "avoid" {
            AVOID_EXPLANATION.to_string()
        } else {
            GENERIC_EXPLANATION.to_string()
        }
    } else {
        explanation
    };

    InterventionVerdict {
        should_intervene,
        severity: severity.unwrap_or_else(|| overall_raw.clone()),
        explanation,
        rewrite,
        decision: if primary_raw.is_empty() {
            decision_raw
        } else {
            primary_raw
        },
    }
}
