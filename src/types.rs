use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::completion::{self, CompletionState};
use crate::day::Day;
use crate::recurrence::RecurrenceRule;
use crate::tags::normalize_tags;

/// Maximum number of tasks loaded into one collection
pub const MAX_TASKS: usize = 10_000;

/// A task record as supplied by the caller
///
/// The evaluation functions only read `anchor_date`, `recurrence_rule` and
/// `completion_state`; everything else is carried for filtering, sorting
/// and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "date")]
    pub anchor_date: Day,
    #[serde(default, alias = "repeat")]
    pub recurrence_rule: RecurrenceRule,
    #[serde(default, alias = "completed")]
    pub completion_state: CompletionState,
    #[serde(default)]
    pub priority: i64,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: BTreeSet<String>,
}

/// Identifier of a raw task record; numeric ids are read as their decimal text
pub fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid task id: {other}"))),
    }
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Value::deserialize(deserializer)? {
        Value::Null => BTreeSet::new(),
        Value::String(tag) => normalize_tags([tag]),
        Value::Array(items) => normalize_tags(items.iter().filter_map(Value::as_str)),
        other => {
            tracing::warn!(value = %other, "ignoring malformed tags");
            BTreeSet::new()
        }
    };
    Ok(tags)
}

impl Task {
    /// New undated, non-repeating, incomplete task
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            anchor_date: Day::Invalid,
            recurrence_rule: RecurrenceRule::None,
            completion_state: CompletionState::default(),
            priority: 0,
            tags: BTreeSet::new(),
        }
    }

    pub fn anchored(mut self, anchor: impl Into<Day>) -> Self {
        self.anchor_date = anchor.into();
        self
    }

    /// Set the recurrence rule; an untouched flag becomes an empty day-set
    pub fn repeating(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence_rule = rule;
        if rule.is_repeating() && matches!(self.completion_state, CompletionState::Flag(false)) {
            self.completion_state = CompletionState::empty_marks();
        }
        self
    }

    pub fn with_completion(mut self, state: CompletionState) -> Self {
        self.completion_state = state;
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    /// Non-repeating task with no usable anchor: due every day until done
    pub fn is_undated(&self) -> bool {
        !self.recurrence_rule.is_repeating() && self.anchor_date.is_undated()
    }

    /// Copy of this task with the occurrence on `day` toggled
    pub fn toggle_completion(&self, day: Day) -> Task {
        Task {
            completion_state: completion::toggle(&self.completion_state, self.recurrence_rule, day),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_deserialize_full_record() {
        let json = r#"{
            "id": "t1",
            "title": "Water plants",
            "anchorDate": "2024-01-01T08:00:00",
            "recurrenceRule": "weekly",
            "completionState": ["2024-01-08"],
            "priority": 3,
            "tags": [" Home ", "GARDEN"]
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.anchor_date, Day::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert_eq!(task.recurrence_rule, RecurrenceRule::Weekly);
        assert_eq!(task.priority, 3);
        assert!(task.tags.contains("home"));
        assert!(task.tags.contains("garden"));
    }

    #[test]
    fn test_deserialize_minimal_record_is_undated() {
        let task: Task = serde_json::from_str(r#"{"id": "t2"}"#).unwrap();
        assert!(task.is_undated());
        assert_eq!(task.completion_state, CompletionState::Flag(false));
    }

    #[test]
    fn test_deserialize_aliases() {
        let json = r#"{"id": "t3", "date": "2024-05-01", "repeat": "daily", "completed": true}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.recurrence_rule, RecurrenceRule::Daily);
        assert_eq!(task.completion_state, CompletionState::Flag(true));
        assert!(!task.is_undated());
    }

    #[test]
    fn test_deserialize_badly_typed_fields() {
        let json = r#"{
            "id": 42,
            "anchorDate": 0,
            "recurrenceRule": 7,
            "completionState": "yes",
            "tags": ["Work", 3, null]
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "42");
        assert!(task.is_undated());
        assert_eq!(task.recurrence_rule, RecurrenceRule::None);
        assert_eq!(task.completion_state, CompletionState::Flag(false));
        assert_eq!(task.tags, normalize_tags(["work"]));
    }

    #[test]
    fn test_record_id() {
        assert_eq!(record_id(&serde_json::json!({"id": "a"})), Some("a".to_string()));
        assert_eq!(record_id(&serde_json::json!({"id": 7})), Some("7".to_string()));
        assert_eq!(record_id(&serde_json::json!({"title": "x"})), None);
    }

    #[test]
    fn test_epoch_anchor_is_undated() {
        let task = Task::new("t4", "Someday").anchored(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        assert!(task.is_undated());
    }

    #[test]
    fn test_toggle_completion_keeps_other_fields() {
        let day = Day::Date(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        let task = Task::new("t5", "Standup")
            .anchored(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .repeating(RecurrenceRule::Daily)
            .with_priority(2);
        let toggled = task.toggle_completion(day);
        assert_eq!(toggled.priority, 2);
        assert_eq!(toggled.completion_state, CompletionState::marks([day]));
        assert_eq!(toggled.toggle_completion(day), task);
    }
}
