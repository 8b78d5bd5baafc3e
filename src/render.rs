use crate::agenda::{Bucket, BucketCounts};
use crate::completion::CompletionState;
use crate::day::{days_between, Day};
use crate::types::Task;

/// Relative label for a task's anchor day, e.g. " (in 3 days)"
fn offset_label(task: &Task, today: Day) -> String {
    if task.is_undated() || task.recurrence_rule.is_repeating() {
        return String::new();
    }
    match days_between(today, task.anchor_date) {
        Some(0) | None => String::new(),
        Some(offset) if offset > 0 => format!(" (in {offset} days)"),
        Some(offset) => format!(" ({} days ago)", -offset),
    }
}

fn completion_label(state: &CompletionState) -> String {
    match state {
        CompletionState::Flag(true) => "done".to_string(),
        CompletionState::Flag(false) => "open".to_string(),
        CompletionState::Marks(marks) => format!("{} occurrence(s) done", marks.len()),
    }
}

/// Render one bucket as Markdown
pub fn render_markdown(bucket: Bucket, today: Day, tasks: &[&Task]) -> String {
    let mut output = format!("# {} ({})\n\n", capitalize(bucket.name()), today);

    for task in tasks {
        output.push_str(&format!("## {}{}\n", task.title, offset_label(task, today)));
        output.push_str(&format!("**Id:** {}\n", task.id));
        if task.anchor_date.is_valid() && !task.is_undated() {
            output.push_str(&format!("**Date:** {}\n", task.anchor_date));
        }
        if task.recurrence_rule.is_repeating() {
            output.push_str(&format!("**Repeats:** {}\n", task.recurrence_rule));
        }
        output.push_str(&format!("**Status:** {}\n", completion_label(&task.completion_state)));
        if task.priority != 0 {
            output.push_str(&format!("**Priority:** {}\n", task.priority));
        }
        if !task.tags.is_empty() {
            let tags: Vec<&str> = task.tags.iter().map(String::as_str).collect();
            output.push_str(&format!("**Tags:** {}\n", tags.join(", ")));
        }
        output.push('\n');
    }

    output
}

/// Render one bucket as HTML
pub fn render_html(bucket: Bucket, today: Day, tasks: &[&Task]) -> String {
    let mut output = format!(
        "<html><body><h1>{} ({})</h1>\n",
        capitalize(bucket.name()),
        today
    );

    for task in tasks {
        output.push_str(&format!(
            "<h2>{}</h2>\n",
            html_escape(&format!("{}{}", task.title, offset_label(task, today)))
        ));
        output.push_str(&format!("<p><strong>Id:</strong> {}</p>\n", html_escape(&task.id)));
        if task.anchor_date.is_valid() && !task.is_undated() {
            output.push_str(&format!("<p><strong>Date:</strong> {}</p>\n", task.anchor_date));
        }
        if task.recurrence_rule.is_repeating() {
            output.push_str(&format!("<p><strong>Repeats:</strong> {}</p>\n", task.recurrence_rule));
        }
        output.push_str(&format!(
            "<p><strong>Status:</strong> {}</p>\n",
            completion_label(&task.completion_state)
        ));
        if task.priority != 0 {
            output.push_str(&format!("<p><strong>Priority:</strong> {}</p>\n", task.priority));
        }
        if !task.tags.is_empty() {
            let tags: Vec<String> = task.tags.iter().map(|t| html_escape(t)).collect();
            output.push_str(&format!("<p><strong>Tags:</strong> {}</p>\n", tags.join(", ")));
        }
    }

    output.push_str("</body></html>");
    output
}

/// Render bucket counts as a Markdown table
pub fn render_summary_markdown(today: Day, counts: &BucketCounts) -> String {
    let mut output = format!("# Summary ({today})\n\n| Bucket | Tasks |\n|---|---|\n");
    for bucket in Bucket::ALL {
        output.push_str(&format!("| {} | {} |\n", bucket, counts.get(bucket)));
    }
    output
}

/// Render bucket counts as an HTML table
pub fn render_summary_html(today: Day, counts: &BucketCounts) -> String {
    let mut output = format!(
        "<html><body><h1>Summary ({today})</h1>\n<table>\n<tr><th>Bucket</th><th>Tasks</th></tr>\n"
    );
    for bucket in Bucket::ALL {
        output.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            bucket,
            counts.get(bucket)
        ));
    }
    output.push_str("</table>\n</body></html>");
    output
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
