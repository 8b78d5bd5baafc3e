use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::day::{days_between, Day};

/// How often a task comes back after its anchor day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub enum RecurrenceRule {
    #[default]
    None,
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
}

impl RecurrenceRule {
    /// Parse a rule tag like "weekly" or "BiWeekly" (case-insensitive)
    pub fn from_tag(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "once" => Some(RecurrenceRule::None),
            "daily" => Some(RecurrenceRule::Daily),
            "weekly" => Some(RecurrenceRule::Weekly),
            "biweekly" | "bi-weekly" | "fortnightly" => Some(RecurrenceRule::BiWeekly),
            "monthly" => Some(RecurrenceRule::Monthly),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            RecurrenceRule::None => "none",
            RecurrenceRule::Daily => "daily",
            RecurrenceRule::Weekly => "weekly",
            RecurrenceRule::BiWeekly => "biweekly",
            RecurrenceRule::Monthly => "monthly",
        }
    }

    pub fn is_repeating(self) -> bool {
        self != RecurrenceRule::None
    }
}

impl From<Value> for RecurrenceRule {
    fn from(raw: Value) -> Self {
        match raw {
            Value::Null => RecurrenceRule::None,
            Value::String(tag) => RecurrenceRule::from_tag(&tag).unwrap_or_else(|| {
                tracing::warn!(tag = %tag, "unrecognized recurrence rule, treating as non-repeating");
                RecurrenceRule::None
            }),
            other => {
                tracing::warn!(value = %other, "non-string recurrence rule, treating as non-repeating");
                RecurrenceRule::None
            }
        }
    }
}

impl From<RecurrenceRule> for String {
    fn from(rule: RecurrenceRule) -> Self {
        rule.tag().to_string()
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Decide whether a task anchored on `anchor` has an occurrence on `target`
///
/// Nothing occurs before its anchor, and invalid days never occur.
/// Monthly rules match on day-of-month only: an anchor on the 31st skips
/// every shorter month.
pub fn occurs_on(anchor: Day, rule: RecurrenceRule, target: Day) -> bool {
    let (Day::Date(a), Day::Date(t)) = (anchor, target) else {
        return false;
    };
    if t < a {
        return false;
    }

    match rule {
        RecurrenceRule::None => t == a,
        RecurrenceRule::Daily => true,
        RecurrenceRule::Weekly => t.weekday() == a.weekday(),
        RecurrenceRule::BiWeekly => {
            days_between(anchor, target).is_some_and(|diff| diff.abs() % 14 == 0)
        }
        RecurrenceRule::Monthly => t.day() == a.day(),
    }
}
