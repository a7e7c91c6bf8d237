//! Turns untrusted agent response bodies into models and renderable views.
//!
//! Everything here is pure. Field presence decides what gets rendered; a field of
//! the wrong type counts as missing, and nothing in this module can fail on
//! step-level content.

mod fields;
pub mod response;
pub mod step;
pub mod view;

pub use response::{decode_agent_response, decode_plan_preview};
pub use step::decode_step_result;
pub use view::{
    CompositeView, NO_OUTPUT_LABEL, REPOSITORY_PLACEHOLDER, RawDataBlock, RepoItem,
    RepoListBlock, ResultsView, StepCard, StepView, TEXT_PREVIEW_CHARS, TextBlock,
};
