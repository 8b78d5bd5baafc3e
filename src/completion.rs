use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::day::Day;
use crate::recurrence::RecurrenceRule;

/// Completion state of a task
///
/// Non-repeating tasks carry a single flag. Repeating tasks carry one mark
/// per completed occurrence day. Marks are normalized to calendar days when
/// they are read, so a mark written with a stray time of day still matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCompletion", into = "RawCompletion")]
pub enum CompletionState {
    Flag(bool),
    Marks(BTreeSet<NaiveDate>),
}

impl Default for CompletionState {
    fn default() -> Self {
        CompletionState::Flag(false)
    }
}

impl CompletionState {
    /// Build a day-set from arbitrary days, dropping invalid ones
    pub fn marks<I: IntoIterator<Item = Day>>(days: I) -> Self {
        CompletionState::Marks(days.into_iter().filter_map(Day::date).collect())
    }

    pub fn empty_marks() -> Self {
        CompletionState::Marks(BTreeSet::new())
    }

    fn has_mark(&self, target: Day) -> bool {
        match (self, target) {
            (CompletionState::Marks(marks), Day::Date(d)) => marks.contains(&d),
            _ => false,
        }
    }
}

/// Wire form: a bare boolean, an array of date strings, or null.
/// Anything else lands in `Other` and reads as not completed.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawCompletion {
    Flag(bool),
    Marks(Vec<Day>),
    Missing,
    Other(serde_json::Value),
}

impl From<RawCompletion> for CompletionState {
    fn from(raw: RawCompletion) -> Self {
        match raw {
            RawCompletion::Flag(flag) => CompletionState::Flag(flag),
            RawCompletion::Marks(days) => CompletionState::marks(days),
            RawCompletion::Missing => CompletionState::default(),
            RawCompletion::Other(value) => {
                tracing::warn!(%value, "unrecognized completion state, treating as not completed");
                CompletionState::default()
            }
        }
    }
}

impl From<CompletionState> for RawCompletion {
    fn from(state: CompletionState) -> Self {
        match state {
            CompletionState::Flag(flag) => RawCompletion::Flag(flag),
            CompletionState::Marks(marks) => {
                RawCompletion::Marks(marks.into_iter().map(Day::Date).collect())
            }
        }
    }
}

/// Whether the occurrence on `target` is already completed
///
/// Repeating tasks are only ever completed per occurrence: a bare flag on a
/// repeating task is legacy data and reads as "not completed" whatever its
/// value. A day-set on a non-repeating task is read per day as well.
pub fn is_completed_on(state: &CompletionState, rule: RecurrenceRule, target: Day) -> bool {
    match (rule, state) {
        (RecurrenceRule::None, CompletionState::Flag(flag)) => *flag,
        (_, CompletionState::Flag(_)) => false,
        (_, CompletionState::Marks(_)) => state.has_mark(target),
    }
}

/// Compute the completion state after toggling the occurrence on `target`
///
/// Applying the same toggle twice to a well-formed state gives the state
/// back. A legacy flag on a repeating task becomes the day-set `{target}`.
/// Toggling an invalid day on a day-set changes nothing.
pub fn toggle(state: &CompletionState, rule: RecurrenceRule, target: Day) -> CompletionState {
    match (rule, state) {
        (RecurrenceRule::None, CompletionState::Flag(flag)) => CompletionState::Flag(!flag),
        (_, CompletionState::Flag(_)) => CompletionState::marks([target]),
        (_, CompletionState::Marks(marks)) => {
            let Day::Date(day) = target else {
                return state.clone();
            };
            let mut marks = marks.clone();
            if !marks.remove(&day) {
                marks.insert(day);
            }
            CompletionState::Marks(marks)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Day {
        Day::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_flag_for_single_task() {
        let day = ymd(2024, 1, 1);
        assert!(is_completed_on(&CompletionState::Flag(true), RecurrenceRule::None, day));
        assert!(!is_completed_on(&CompletionState::Flag(false), RecurrenceRule::None, day));
    }

    #[test]
    fn test_flag_ignored_for_repeating_task() {
        let day = ymd(2024, 1, 1);
        for rule in [
            RecurrenceRule::Daily,
            RecurrenceRule::Weekly,
            RecurrenceRule::BiWeekly,
            RecurrenceRule::Monthly,
        ] {
            assert!(!is_completed_on(&CompletionState::Flag(true), rule, day));
        }
    }

    #[test]
    fn test_marks_are_occurrence_scoped() {
        let state = CompletionState::marks([ymd(2024, 1, 8)]);
        assert!(is_completed_on(&state, RecurrenceRule::Weekly, ymd(2024, 1, 8)));
        assert!(!is_completed_on(&state, RecurrenceRule::Weekly, ymd(2024, 1, 15)));
        assert!(!is_completed_on(&state, RecurrenceRule::Weekly, Day::Invalid));
    }

    #[test]
    fn test_marks_with_time_of_day_still_match() {
        let state: CompletionState =
            serde_json::from_str(r#"["2024-01-08T18:30:00", "garbage"]"#).unwrap();
        assert_eq!(state, CompletionState::marks([ymd(2024, 1, 8)]));
        assert!(is_completed_on(&state, RecurrenceRule::Daily, ymd(2024, 1, 8)));
    }

    #[test]
    fn test_toggle_is_involution() {
        let day = ymd(2024, 1, 8);
        let states = [
            (CompletionState::Flag(false), RecurrenceRule::None),
            (CompletionState::Flag(true), RecurrenceRule::None),
            (CompletionState::empty_marks(), RecurrenceRule::Weekly),
            (CompletionState::marks([day]), RecurrenceRule::Daily),
            (CompletionState::marks([ymd(2024, 1, 1)]), RecurrenceRule::Monthly),
            (CompletionState::marks([day]), RecurrenceRule::None),
        ];
        for (state, rule) in states {
            let once = toggle(&state, rule, day);
            assert_ne!(once, state);
            assert_eq!(toggle(&once, rule, day), state);
        }
    }

    #[test]
    fn test_toggle_marks_insert_and_remove() {
        let day = ymd(2024, 1, 8);
        let state = toggle(&CompletionState::empty_marks(), RecurrenceRule::Weekly, day);
        assert!(is_completed_on(&state, RecurrenceRule::Weekly, day));
        let state = toggle(&state, RecurrenceRule::Weekly, day);
        assert!(!is_completed_on(&state, RecurrenceRule::Weekly, day));
    }

    #[test]
    fn test_toggle_upgrades_legacy_flag() {
        let day = ymd(2024, 1, 8);
        let state = toggle(&CompletionState::Flag(true), RecurrenceRule::Daily, day);
        assert_eq!(state, CompletionState::marks([day]));
    }

    #[test]
    fn test_toggle_invalid_day_is_noop() {
        let state = CompletionState::marks([ymd(2024, 1, 8)]);
        assert_eq!(toggle(&state, RecurrenceRule::Daily, Day::Invalid), state);
    }

    #[test]
    fn test_wire_forms() {
        let flag: CompletionState = serde_json::from_str("true").unwrap();
        assert_eq!(flag, CompletionState::Flag(true));
        let missing: CompletionState = serde_json::from_str("null").unwrap();
        assert_eq!(missing, CompletionState::Flag(false));
        for raw in [r#""yes""#, "1", r#"{"done": true}"#] {
            let state: CompletionState = serde_json::from_str(raw).unwrap();
            assert_eq!(state, CompletionState::Flag(false), "{raw}");
        }
        let mixed: CompletionState = serde_json::from_str(r#"["2024-01-08", 5, null]"#).unwrap();
        assert_eq!(mixed, CompletionState::marks([ymd(2024, 1, 8)]));
        let marks = CompletionState::marks([ymd(2024, 1, 8), ymd(2024, 1, 1)]);
        assert_eq!(serde_json::to_string(&marks).unwrap(), r#"["2024-01-01","2024-01-08"]"#);
    }
}
