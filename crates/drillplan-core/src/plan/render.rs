//! Markdown rendering of a daily plan.
//!
//! The output is the document the user edits and hands back to `sync`, so
//! every entry carries the three fields [`super::document`] reads.

use std::fmt::Write;

use indoc::indoc;

use super::{DailyPlan, EntryKind, PlanEntry};
use crate::problem::{ProblemCatalog, ProblemDefinition};
use crate::progress::RichnessLevel;

const LEGEND: &str = indoc! {"
    ### Rating Legend
    - **1: Again** - I was lost and need to see this again tomorrow.
    - **2: Hard** - I needed hints or the solution to finish it.
    - **3: Good** - I solved it, with some effort or a bug or two.
    - **4: Easy** - I solved it quickly and feel confident.
"};

const SECTIONS: [(EntryKind, &str); 4] = [
    (EntryKind::Overdue, "## Overdue Focus"),
    (EntryKind::Review, "## Reviews Due Today"),
    (EntryKind::New, "## New Problems"),
    (EntryKind::Extra, "## Extra Practice"),
];

/// Render `plan` as an editable markdown document.
///
/// Resources come from `catalog`; without one, entries only carry their
/// fields.
pub fn render_plan(plan: &DailyPlan, catalog: Option<&ProblemCatalog>, richness: RichnessLevel) -> String {
    let mut out = format!("# Daily Plan: {}\n\n", plan.date.format("%Y-%m-%d"));
    out.push_str(LEGEND);

    if plan.backlog_focus {
        let _ = write!(
            out,
            "\n> {} more problem(s) are overdue. New problems are paused until the backlog is under control.\n",
            plan.deferred
        );
    }

    for (kind, heading) in SECTIONS {
        let entries: Vec<&PlanEntry> = plan.entries.iter().filter(|e| e.kind == kind).collect();
        if entries.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n---\n\n{heading}\n");
        for entry in entries {
            let problem = catalog.and_then(|c| c.get(entry.id));
            render_entry(&mut out, entry, problem, richness);
        }
    }

    if plan.is_empty() {
        out.push_str(
            "\n*Nothing scheduled for today. Use `drillplan plan add` to practice more or \
             `drillplan plan rebalance` to adjust your schedule.*\n",
        );
    }
    out
}

fn render_entry(out: &mut String, entry: &PlanEntry, problem: Option<&ProblemDefinition>, richness: RichnessLevel) {
    let note = match entry.kind {
        EntryKind::Overdue => format!(" (Overdue from {})", entry.due_date.format("%Y-%m-%d")),
        _ => String::new(),
    };
    let check = if entry.completed { 'x' } else { ' ' };
    let _ = writeln!(out, "- [{check}] {}\\. {} ({}){note}", entry.id, entry.title, entry.category);
    let rating = entry.rating.map(|r| r.value().to_string()).unwrap_or_default();
    let _ = writeln!(out, "    *   **Rating (1-4)**: {rating}");
    let _ = writeln!(out, "    *   **Notes**: {}", entry.notes.as_deref().unwrap_or_default());
    let _ = writeln!(
        out,
        "    *   **Time Taken (Manual)**: {}",
        entry.manual_time.as_deref().unwrap_or_default()
    );

    let Some(problem) = problem else {
        return;
    };
    let resources = resources(problem, richness);
    if !resources.is_empty() {
        out.push_str("    *   **Resources**:\n");
        for block in resources {
            out.push_str(&block);
            out.push('\n');
        }
    }
}

fn resources(problem: &ProblemDefinition, richness: RichnessLevel) -> Vec<String> {
    let mut blocks = Vec::new();

    if let Some(url) = &problem.leetcode_url {
        blocks.push(format!("        *   [LeetCode Problem]({url})"));
    }
    if let Some(link) = &problem.solution_link {
        blocks.push(format!("        *   [{}]({})", link.text, link.url));
    }

    if richness.includes_spoilers() {
        if !problem.hints.is_empty() {
            let mut block = String::from("        *   **Hints:**");
            for (i, hint) in problem.hints.iter().enumerate() {
                let _ = write!(
                    block,
                    "\n            - <details><summary>Hint {}</summary>{hint}</details>",
                    i + 1
                );
            }
            blocks.push(block);
        }
        if let Some(solution) = &problem.solution {
            let mut block = String::from("        *   <details><summary>Full Solution (Spoilers)</summary>\n");
            if let Some(explanation) = &solution.explanation {
                let _ = write!(block, "\n            **Explanation:**\n            {explanation}\n");
            }
            for (lang, code) in &solution.code {
                let _ = write!(block, "\n            **{} Code:**\n            ```{lang}\n", capitalize(lang));
                for line in code.lines() {
                    let _ = writeln!(block, "            {line}");
                }
                block.push_str("            ```\n");
            }
            block.push_str("            </details>");
            blocks.push(block);
        }
    }

    if richness.includes_video() {
        if let Some(yt) = &problem.youtube_id {
            if richness == RichnessLevel::VideoEmbed {
                blocks.push(format!(
                    "        *   **Video Walkthrough:**\n            \
                     <iframe src=\"https://www.youtube.com/embed/{yt}\" width=\"560\" height=\"315\" \
                     frameborder=\"0\" allowfullscreen></iframe>"
                ));
            } else {
                blocks.push(format!("        *   [Video Walkthrough](https://www.youtube.com/watch?v={yt})"));
            }
        }
    }
    blocks
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
