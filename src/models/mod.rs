pub mod request;
pub mod response;

pub use request::{
    DEFAULT_MAX_STEPS, EMPTY_GOAL_MESSAGE, ExecuteRequest, GoalRequest, MAX_STEPS_CEILING,
    MAX_STEPS_FLOOR, MaxSteps,
};
pub use response::{AgentResponse, IntermediateResult, PlanPreview, PlanStep, TimelineEntry};
