use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

pub const MAX_STEPS_FLOOR: u8 = 3;
pub const MAX_STEPS_CEILING: u8 = 10;
pub const DEFAULT_MAX_STEPS: u8 = 5;

pub const EMPTY_GOAL_MESSAGE: &str = "Please enter a goal to get started.";

/// Step budget for a run, always inside `[MAX_STEPS_FLOOR, MAX_STEPS_CEILING]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MaxSteps(u8);

impl MaxSteps {
    /// Clamps `value` into the allowed range.
    pub fn new(value: i64) -> Self {
        let clamped = value.clamp(MAX_STEPS_FLOOR as i64, MAX_STEPS_CEILING as i64) as u8;
        if clamped as i64 != value {
            debug!(requested = value, clamped, "max_steps clamped");
        }
        Self(clamped)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for MaxSteps {
    fn default() -> Self {
        Self(DEFAULT_MAX_STEPS)
    }
}

impl<'de> Deserialize<'de> for MaxSteps {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

/// A goal ready to go on the wire. Construction rejects blank goals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalRequest {
    pub goal: String,
    pub max_steps: MaxSteps,
}

impl GoalRequest {
    pub fn new(goal: &str, max_steps: MaxSteps) -> Result<Self> {
        let goal = goal.trim();
        if goal.is_empty() {
            return Err(Error::Validation(EMPTY_GOAL_MESSAGE.to_string()));
        }
        Ok(Self {
            goal: goal.to_string(),
            max_steps,
        })
    }
}

/// `{ "plan_request": { ... } }` body accepted by both agent endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub plan_request: GoalRequest,
}

impl From<GoalRequest> for ExecuteRequest {
    fn from(plan_request: GoalRequest) -> Self {
        Self { plan_request }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn max_steps_is_clamped_into_range() {
        assert_eq!(MaxSteps::new(0).get(), 3);
        assert_eq!(MaxSteps::new(-4).get(), 3);
        assert_eq!(MaxSteps::new(7).get(), 7);
        assert_eq!(MaxSteps::new(11).get(), 10);
        assert_eq!(MaxSteps::new(i64::MAX).get(), 10);
        assert_eq!(MaxSteps::default().get(), 5);
    }

    #[test]
    fn blank_goal_is_rejected() {
        for goal in ["", "   ", "\n\t "] {
            let err = GoalRequest::new(goal, MaxSteps::default()).unwrap_err();
            assert!(matches!(err, Error::Validation(ref msg) if msg == EMPTY_GOAL_MESSAGE));
        }
    }

    #[test]
    fn envelope_serializes_trimmed_goal() {
        let request = GoalRequest::new("  Compare the latest Groq models \n", MaxSteps::new(5)).unwrap();
        let body = serde_json::to_value(ExecuteRequest::from(request)).unwrap();
        assert_eq!(
            body,
            json!({ "plan_request": { "goal": "Compare the latest Groq models", "max_steps": 5 } })
        );
    }

    #[test]
    fn deserialized_max_steps_is_clamped() {
        let request: GoalRequest =
            serde_json::from_value(json!({ "goal": "x", "max_steps": 42 })).unwrap();
        assert_eq!(request.max_steps.get(), 10);
    }
}
