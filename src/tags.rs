use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid WHITESPACE_RE regex"));

/// Canonical form of a tag: trimmed, lowercased, inner whitespace collapsed.
/// Returns `None` for tags that are empty after trimming.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(WHITESPACE_RE.replace_all(trimmed, " ").to_lowercase())
}

/// Normalize and deduplicate a collection of raw tags
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .filter_map(|t| normalize_tag(t.as_ref()))
        .collect()
}

/// AND filter: every active tag must be present on the task.
/// An empty active set keeps everything.
pub fn matches_all(task_tags: &BTreeSet<String>, active: &BTreeSet<String>) -> bool {
    active.is_subset(task_tags)
}
