use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    decoder::ResultsView,
    models::{AgentResponse, MaxSteps},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Running => write!(f, "running"),
            Phase::Succeeded => write!(f, "succeeded"),
            Phase::Failed => write!(f, "failed"),
        }
    }
}

/// Lifecycle of the current run. The response only exists when succeeded and the
/// error only when failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Succeeded(AgentResponse),
    Failed(String),
}

impl RunState {
    pub fn phase(&self) -> Phase {
        match self {
            RunState::Idle => Phase::Idle,
            RunState::Running => Phase::Running,
            RunState::Succeeded(_) => Phase::Succeeded,
            RunState::Failed(_) => Phase::Failed,
        }
    }
}

/// Identity and timing of the latest accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Everything the controller owns. Only the controller mutates it.
#[derive(Debug, Clone, Default)]
pub(crate) struct Session {
    pub goal: String,
    pub max_steps: MaxSteps,
    pub state: RunState,
    pub run: Option<RunInfo>,
    pub validation_error: Option<String>,
    /// Run holding the single-flight slot. Survives a reset until the call resolves.
    pub in_flight: Option<Uuid>,
    /// Bumped on reset so a stale in-flight result is dropped.
    pub generation: u64,
}

/// Read-only copy of the session handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSnapshot {
    pub phase: Phase,
    pub goal: String,
    pub max_steps: MaxSteps,
    pub error: Option<String>,
    pub response: Option<AgentResponse>,
    /// Last rejected submission, e.g. a blank goal. Never moves the phase.
    pub validation_error: Option<String>,
    pub run: Option<RunInfo>,
    /// A call still holds the single-flight slot, possibly one discarded by a reset.
    pub in_flight: bool,
}

impl RunSnapshot {
    pub(crate) fn of(session: &Session) -> Self {
        let (error, response) = match &session.state {
            RunState::Failed(message) => (Some(message.clone()), None),
            RunState::Succeeded(response) => (None, Some(response.clone())),
            RunState::Idle | RunState::Running => (None, None),
        };
        Self {
            phase: session.state.phase(),
            goal: session.goal.clone(),
            max_steps: session.max_steps,
            error,
            response,
            validation_error: session.validation_error.clone(),
            run: session.run.clone(),
            in_flight: session.in_flight.is_some(),
        }
    }

    pub fn results_view(&self) -> Option<ResultsView> {
        self.response.as_ref().map(ResultsView::from_response)
    }

    pub fn can_submit(&self) -> bool {
        !self.in_flight && self.phase != Phase::Running && !self.goal.trim().is_empty()
    }
}
