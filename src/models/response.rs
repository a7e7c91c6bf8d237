use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A planned step. `id` is `None` for an executed step the agent sent without one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub description: String,
}

impl PlanStep {
    /// The id as shown to the user, `?` when there is none.
    pub fn id_label(&self) -> String {
        self.id.map_or_else(|| "?".to_string(), |id| id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub step_id: i64,
    pub tool: String,
    /// Seconds.
    pub duration: f64,
}

/// One executed step and whatever its tool produced. `result` is kept as raw JSON;
/// [`crate::decoder::decode_step_result`] turns it into a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntermediateResult {
    pub step: PlanStep,
    pub result: Value,
}

/// Body of a successful `execute` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub plan: Vec<PlanStep>,
    pub intermediate: Vec<IntermediateResult>,
    pub final_summary: String,
    pub timeline: Vec<TimelineEntry>,
}

/// Body of a successful `plan` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanPreview {
    pub plan: Vec<PlanStep>,
    pub steps: Vec<PlanStep>,
    pub final_summary: String,
}

impl TimelineEntry {
    /// `"1.23s"`.
    pub fn duration_label(&self) -> String {
        format!("{:.2}s", self.duration)
    }
}
