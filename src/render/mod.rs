//! Plain-text rendering of decoded views for terminal output.

use std::fmt::Write;

use crate::{
    decoder::{CompositeView, NO_OUTPUT_LABEL, ResultsView, StepCard, StepView},
    models::PlanPreview,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Print `text` in full instead of the compact preview.
    pub full_text: bool,
    /// Expand raw data blocks.
    pub expand_data: bool,
}

pub fn render_results(view: &ResultsView, options: RenderOptions) -> String {
    let mut out = String::new();

    out.push_str("== Executive Summary ==\n");
    if view.summary_markdown.trim().is_empty() {
        out.push_str("(empty)\n");
    } else {
        out.push_str(view.summary_markdown.trim_end());
        out.push('\n');
    }

    out.push_str("\n== Execution Plan ==\n");
    for step in &view.plan {
        let _ = writeln!(out, "{:>3}. {}", step.id_label(), step.description);
    }

    out.push_str("\n== Execution Timeline ==\n");
    for entry in &view.timeline {
        let _ = writeln!(
            out,
            "  [step {}] {} {}",
            entry.step_id,
            entry.tool,
            entry.duration_label()
        );
    }

    out.push_str("\n== Detailed Findings ==\n");
    for card in &view.cards {
        render_card(&mut out, card, options);
    }
    out
}

pub fn render_card(out: &mut String, card: &StepCard, options: RenderOptions) {
    let _ = writeln!(out, "\n-- Step {}: {}", card.step.id_label(), card.step.description);
    match &card.view {
        StepView::Error(message) => {
            let _ = writeln!(out, "⚠️ {message}");
        }
        StepView::Composite(view) => render_composite(out, view, options),
    }
}

fn render_composite(out: &mut String, view: &CompositeView, options: RenderOptions) {
    if view.is_empty() {
        let _ = writeln!(out, "({NO_OUTPUT_LABEL})");
        return;
    }

    if let Some(summary) = &view.summary {
        let _ = writeln!(out, "{summary}");
    }

    if let Some(text) = &view.text {
        let shown = if options.full_text {
            text.full().to_string()
        } else {
            text.compact()
        };
        let _ = writeln!(out, "{shown}");
    }

    if let Some(repos) = &view.repositories {
        let _ = writeln!(out, "{}", repos.headline());
        for item in &repos.items {
            let _ = write!(out, "  * {}", item.label());
            if let Some(url) = &item.url {
                let _ = write!(out, " <{url}>");
            }
            out.push('\n');
            if let Some(description) = &item.description {
                let _ = writeln!(out, "    {description}");
            }
            let badges: Vec<String> = [item.language_label(), item.stars_label()]
                .into_iter()
                .flatten()
                .collect();
            if !badges.is_empty() {
                let _ = writeln!(out, "    {}", badges.join("  "));
            }
        }
    }

    if let Some(data) = &view.raw_data {
        if data.collapsed && !options.expand_data {
            out.push_str("[+] View Raw Data\n");
        } else {
            out.push_str("[-] View Raw Data\n");
            let _ = writeln!(out, "{}", data.pretty());
        }
    }
}

pub fn render_plan_preview(preview: &PlanPreview) -> String {
    let mut out = String::from("== Proposed Plan ==\n");
    let steps = if preview.steps.is_empty() {
        &preview.plan
    } else {
        &preview.steps
    };
    for step in steps {
        let _ = writeln!(out, "{:>3}. {}", step.id_label(), step.description);
    }
    if !preview.final_summary.trim().is_empty() {
        let _ = writeln!(out, "\n{}", preview.final_summary.trim_end());
    }
    out
}
