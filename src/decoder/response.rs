use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    decoder::{
        fields::{int_field, non_empty_str},
        step::value_kind,
    },
    error::RequestFailure,
    models::{AgentResponse, IntermediateResult, PlanPreview, PlanStep, TimelineEntry},
};

const EXECUTE_KEYS: [&str; 4] = ["plan", "intermediate", "final_summary", "timeline"];
const PLAN_KEYS: [&str; 3] = ["plan", "steps", "final_summary"];

/// Decodes an `execute` body.
///
/// Only a non-object body, or one carrying none of the expected keys, is rejected.
/// Plan and timeline entries without an id are dropped. Intermediate entries are
/// kept whenever they are objects, with a default step if theirs is unusable.
pub fn decode_agent_response(body: &Value) -> Result<AgentResponse, RequestFailure> {
    let obj = expect_shape(body, &EXECUTE_KEYS)?;

    let plan = decode_steps(obj, "plan");
    warn_duplicate_ids(&plan);

    Ok(AgentResponse {
        plan,
        intermediate: decode_intermediate(obj),
        final_summary: summary_field(obj),
        timeline: decode_timeline(obj),
    })
}

/// Decodes a `plan` body.
pub fn decode_plan_preview(body: &Value) -> Result<PlanPreview, RequestFailure> {
    let obj = expect_shape(body, &PLAN_KEYS)?;

    let plan = decode_steps(obj, "plan");
    warn_duplicate_ids(&plan);

    Ok(PlanPreview {
        plan,
        steps: decode_steps(obj, "steps"),
        final_summary: summary_field(obj),
    })
}

fn expect_shape<'a>(
    body: &'a Value,
    keys: &[&str],
) -> Result<&'a Map<String, Value>, RequestFailure> {
    let Some(obj) = body.as_object() else {
        return Err(RequestFailure::decode(format!(
            "Malformed agent response: expected a JSON object, got {}",
            value_kind(body)
        )));
    };
    if !keys.iter().any(|key| obj.contains_key(*key)) {
        return Err(RequestFailure::decode(format!(
            "Malformed agent response: none of {} present",
            keys.join(", ")
        )));
    }
    Ok(obj)
}

fn summary_field(obj: &Map<String, Value>) -> String {
    obj.get("final_summary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn array_field<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    match obj.get(key) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            debug!(field = key, kind = value_kind(other), "expected an array");
            &[]
        }
        None => &[],
    }
}

fn decode_step(value: &Value) -> Option<PlanStep> {
    let obj = value.as_object()?;
    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(PlanStep {
        id: int_field(obj, "id"),
        description,
    })
}

fn decode_steps(obj: &Map<String, Value>, key: &str) -> Vec<PlanStep> {
    array_field(obj, key)
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let step = decode_step(entry).filter(|step| step.id.is_some());
            if step.is_none() {
                debug!(field = key, index, "dropping step without an integer id");
            }
            step
        })
        .collect()
}

fn decode_intermediate(obj: &Map<String, Value>) -> Vec<IntermediateResult> {
    array_field(obj, "intermediate")
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let Some(fields) = entry.as_object() else {
                debug!(index, kind = value_kind(entry), "dropping non-object intermediate entry");
                return None;
            };
            let step = fields.get("step").and_then(decode_step).unwrap_or_default();
            if step.id.is_none() {
                debug!(index, "intermediate entry has no step id");
            }
            let result = fields.get("result").cloned().unwrap_or(Value::Null);
            Some(IntermediateResult { step, result })
        })
        .collect()
}

fn decode_timeline(obj: &Map<String, Value>) -> Vec<TimelineEntry> {
    array_field(obj, "timeline")
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let fields = entry.as_object();
            let Some(step_id) = fields.and_then(|f| int_field(f, "step_id")) else {
                debug!(index, "dropping timeline entry without step_id");
                return None;
            };
            let tool = fields
                .and_then(|f| non_empty_str(f, "tool"))
                .unwrap_or("unknown")
                .to_string();
            let duration = fields
                .and_then(|f| f.get("duration"))
                .and_then(Value::as_f64)
                .filter(|d| d.is_finite() && *d >= 0.0)
                .unwrap_or_default();
            Some(TimelineEntry {
                step_id,
                tool,
                duration,
            })
        })
        .collect()
}

fn warn_duplicate_ids(plan: &[PlanStep]) {
    let mut seen = std::collections::HashSet::new();
    for id in plan.iter().filter_map(|step| step.id) {
        if !seen.insert(id) {
            warn!(step_id = id, "duplicate step id in plan");
        }
    }
}
