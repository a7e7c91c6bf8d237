use serde::Serialize;
use uuid::Uuid;

/// Notifications published as a run moves through its lifecycle. Observers are
/// optional; nothing in the controller waits on them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    Started {
        run_id: Uuid,
        goal: String,
        max_steps: u8,
    },
    /// Results are ready; presentation may bring them into view.
    Succeeded { run_id: Uuid, steps: usize },
    Failed { run_id: Uuid, message: String },
    Rejected { reason: String },
    Reset,
    /// A run finished after a reset and its result was dropped.
    Discarded { run_id: Uuid },
}

impl RunEvent {
    pub fn brings_results_into_view(&self) -> bool {
        matches!(self, RunEvent::Succeeded { .. })
    }
}
