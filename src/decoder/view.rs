use serde_json::Value;

use crate::{
    decoder::step::decode_step_result,
    models::{AgentResponse, PlanStep, TimelineEntry},
};

/// Characters of `text` shown before the compact view cuts off.
pub const TEXT_PREVIEW_CHARS: usize = 300;
/// Label for repository hits that arrive without a name.
pub const REPOSITORY_PLACEHOLDER: &str = "Repository";
pub const NO_OUTPUT_LABEL: &str = "no output";

const CONTINUATION_MARKER: &str = "...";

/// The single view chosen for one step result.
#[derive(Debug, Clone, PartialEq)]
pub enum StepView {
    /// The step reported an error; nothing else from it is shown.
    Error(String),
    Composite(CompositeView),
}

impl StepView {
    pub fn is_error(&self) -> bool {
        matches!(self, StepView::Error(_))
    }

    pub fn as_composite(&self) -> Option<&CompositeView> {
        match self {
            StepView::Composite(view) => Some(view),
            StepView::Error(_) => None,
        }
    }
}

/// Independent blocks; any subset may be present. All absent means "no output".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeView {
    pub summary: Option<String>,
    pub text: Option<TextBlock>,
    pub repositories: Option<RepoListBlock>,
    pub raw_data: Option<RawDataBlock>,
}

impl CompositeView {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.text.is_none()
            && self.repositories.is_none()
            && self.raw_data.is_none()
    }
}

/// Long free text. The full value is kept; [`TextBlock::compact`] is display-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    full: String,
}

impl TextBlock {
    pub fn new(full: impl Into<String>) -> Self {
        Self { full: full.into() }
    }

    pub fn full(&self) -> &str {
        &self.full
    }

    pub fn is_truncated(&self) -> bool {
        self.full.chars().count() > TEXT_PREVIEW_CHARS
    }

    pub fn compact(&self) -> String {
        match self.full.char_indices().nth(TEXT_PREVIEW_CHARS) {
            Some((cut, _)) => format!("{}{}", &self.full[..cut], CONTINUATION_MARKER),
            None => self.full.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoListBlock {
    pub items: Vec<RepoItem>,
    pub total_count: Option<u64>,
}

impl RepoListBlock {
    /// `Found 1 repositories (42 total)`
    pub fn headline(&self) -> String {
        let mut line = format!("Found {} repositories", self.items.len());
        if let Some(total) = self.total_count {
            line.push_str(&format!(" ({total} total)"));
        }
        line
    }
}

/// A repository hit. Optional fields that were missing or mistyped stay `None`
/// and are left out of rendering entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoItem {
    pub url: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: Option<u64>,
}

impl RepoItem {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(REPOSITORY_PLACEHOLDER)
    }

    pub fn stars_label(&self) -> Option<String> {
        self.stars.map(|stars| format!("⭐{stars}"))
    }

    pub fn language_label(&self) -> Option<String> {
        self.language.as_ref().map(|language| format!("🔤{language}"))
    }
}

/// Opaque payload kept for inspection; starts collapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDataBlock {
    pub value: Value,
    pub collapsed: bool,
}

impl RawDataBlock {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            collapsed: true,
        }
    }

    pub fn toggle(&mut self) {
        self.collapsed = !self.collapsed;
    }

    /// Two-space indented JSON.
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.value).unwrap_or_else(|_| self.value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepCard {
    pub step: PlanStep,
    pub view: StepView,
}

/// Everything the presentation layer needs for a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub summary_markdown: String,
    pub plan: Vec<PlanStep>,
    pub timeline: Vec<TimelineEntry>,
    /// In `intermediate` order, which may differ from `plan` order.
    pub cards: Vec<StepCard>,
}

impl ResultsView {
    pub fn from_response(response: &AgentResponse) -> Self {
        let cards = response
            .intermediate
            .iter()
            .map(|item| StepCard {
                step: item.step.clone(),
                view: decode_step_result(&item.result),
            })
            .collect();

        Self {
            summary_markdown: response.final_summary.clone(),
            plan: response.plan.clone(),
            timeline: response.timeline.clone(),
            cards,
        }
    }
}
