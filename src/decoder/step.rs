use serde_json::{Map, Value};
use tracing::debug;

use crate::decoder::{
    fields::{int_field, is_truthy, non_empty_str},
    view::{CompositeView, RawDataBlock, RepoItem, RepoListBlock, StepView, TextBlock},
};

/// Maps one step's `result` payload to its view. Total: never fails.
///
/// A non-empty `error` wins outright. Otherwise each known field contributes its
/// own block to a [`CompositeView`]; a field of the wrong type is dropped on its
/// own without affecting the others.
pub fn decode_step_result(result: &Value) -> StepView {
    let Some(obj) = result.as_object() else {
        if !result.is_null() {
            debug!(kind = value_kind(result), "step result is not an object");
        }
        return StepView::Composite(CompositeView::default());
    };

    if let Some(message) = non_empty_str(obj, "error") {
        return StepView::Error(message.to_string());
    }

    StepView::Composite(CompositeView {
        summary: non_empty_str(obj, "summary").map(str::to_string),
        text: non_empty_str(obj, "text").map(TextBlock::new),
        repositories: decode_repositories(obj),
        raw_data: obj
            .get("data")
            .filter(|data| is_truthy(data))
            .cloned()
            .map(RawDataBlock::new),
    })
}

fn decode_repositories(obj: &Map<String, Value>) -> Option<RepoListBlock> {
    let raw = obj.get("results")?;
    let Some(entries) = raw.as_array() else {
        debug!(kind = value_kind(raw), "ignoring non-array `results`");
        return None;
    };

    let items: Vec<RepoItem> = entries
        .iter()
        .filter_map(|entry| match entry.as_object() {
            Some(hit) => Some(decode_repo_item(hit)),
            None => {
                debug!(kind = value_kind(entry), "skipping non-object repository hit");
                None
            }
        })
        .collect();

    if items.is_empty() {
        return None;
    }

    let total_count = int_field(obj, "total_count")
        .and_then(|total| u64::try_from(total).ok())
        .filter(|&total| total > 0)
        .filter(|&total| {
            let consistent = total >= items.len() as u64;
            if !consistent {
                debug!(total, shown = items.len(), "ignoring total_count below hit count");
            }
            consistent
        });

    Some(RepoListBlock { items, total_count })
}

fn decode_repo_item(hit: &Map<String, Value>) -> RepoItem {
    RepoItem {
        url: non_empty_str(hit, "url").map(str::to_string),
        name: non_empty_str(hit, "name").map(str::to_string),
        description: non_empty_str(hit, "desc").map(str::to_string),
        language: non_empty_str(hit, "language").map(str::to_string),
        stars: int_field(hit, "stars").and_then(|stars| u64::try_from(stars).ok()),
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
