use crate::completion::is_completed_on;
use crate::day::Day;
use crate::recurrence::occurs_on;
use crate::types::Task;

/// How far back the overdue scan looks from the reference day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lookback {
    /// Scan every day since the anchor
    #[default]
    Unbounded,
    /// Scan at most this many days before the reference day
    Days(u32),
}

/// Task occurs on `target` and that occurrence is not completed
///
/// Undated non-repeating tasks occur on every valid day.
pub fn is_pending_on(task: &Task, target: Day) -> bool {
    let occurs = if task.is_undated() {
        target.is_valid()
    } else {
        occurs_on(task.anchor_date, task.recurrence_rule, target)
    };
    occurs && !is_completed_on(&task.completion_state, task.recurrence_rule, target)
}

/// Pending on any day of `[start, start + span_days - 1]`
pub fn has_pending_within(task: &Task, start: Day, span_days: u32) -> bool {
    if !start.is_valid() {
        return false;
    }
    (0..i64::from(span_days)).any(|i| is_pending_on(task, start.offset(i)))
}

/// Pending on some day on/after the anchor and strictly before `target`
///
/// Walks day by day, so an old daily task costs one step per day of age
/// unless `lookback` caps the window. Undated tasks have no window and are
/// never overdue.
pub fn has_pending_before(task: &Task, target: Day, lookback: Lookback) -> bool {
    if task.is_undated() {
        return false;
    }
    let (Day::Date(anchor), Day::Date(end)) = (task.anchor_date, target) else {
        return false;
    };

    let start = match lookback {
        Lookback::Unbounded => Day::Date(anchor),
        Lookback::Days(n) => match target.offset(-i64::from(n)) {
            Day::Date(floor) if floor > anchor => Day::Date(floor),
            _ => Day::Date(anchor),
        },
    };

    let mut day = start;
    while let Day::Date(d) = day {
        if d >= end {
            break;
        }
        if is_pending_on(task, day) {
            return true;
        }
        day = day.succ();
    }
    false
}
