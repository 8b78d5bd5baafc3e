use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::day::{normalize, Day};
use crate::pending::{has_pending_before, has_pending_within, is_pending_on, Lookback};
use crate::tags::matches_all;
use crate::types::Task;

/// Length of the "this week" window, starting today
pub const WEEK_SPAN_DAYS: u32 = 7;

/// Default forward window of the incomplete bucket
pub const DEFAULT_HORIZON_DAYS: u32 = 90;

/// Knobs shared by every bucket query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Normalized tags a task must all carry; empty keeps every task
    pub tags: BTreeSet<String>,
    /// Overdue scan window
    pub lookback: Lookback,
    /// Forward window of the incomplete bucket, in days
    pub horizon_days: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            tags: BTreeSet::new(),
            lookback: Lookback::Unbounded,
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

/// Named agenda bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Today,
    Tomorrow,
    Week,
    Overdue,
    Incomplete,
}

impl Bucket {
    pub const ALL: [Bucket; 5] = [
        Bucket::Today,
        Bucket::Tomorrow,
        Bucket::Week,
        Bucket::Overdue,
        Bucket::Incomplete,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Bucket::Today => "today",
            Bucket::Tomorrow => "tomorrow",
            Bucket::Week => "week",
            Bucket::Overdue => "overdue",
            Bucket::Incomplete => "incomplete",
        }
    }

    /// The single predicate behind both the list and the count of a bucket
    fn matches(self, task: &Task, today: Day, opts: &QueryOptions) -> bool {
        if !matches_all(&task.tags, &opts.tags) {
            return false;
        }
        match self {
            Bucket::Today => is_pending_on(task, today),
            Bucket::Tomorrow => is_pending_on(task, today.succ()),
            Bucket::Week => has_pending_within(task, today, WEEK_SPAN_DAYS),
            Bucket::Overdue => has_pending_before(task, today, opts.lookback),
            Bucket::Incomplete => {
                is_pending_on(task, today)
                    || has_pending_within(task, today, opts.horizon_days)
                    || has_pending_before(task, today, opts.lookback)
            }
        }
    }
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Bucket::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown bucket '{s}'. Use: today, tomorrow, week, overdue, incomplete"))
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tasks in `bucket` relative to `now`
///
/// Input order is kept, except for the incomplete bucket which is sorted
/// by descending priority (stable, so ties keep input order).
pub fn select<'a>(
    tasks: &'a [Task],
    now: NaiveDateTime,
    bucket: Bucket,
    opts: &QueryOptions,
) -> Vec<&'a Task> {
    let today = normalize(now);
    let mut selected: Vec<&Task> = tasks
        .iter()
        .filter(|t| bucket.matches(t, today, opts))
        .collect();
    if bucket == Bucket::Incomplete {
        selected.sort_by_key(|t| Reverse(t.priority));
    }
    selected
}

/// Number of tasks `select` would return for the same inputs
pub fn count(tasks: &[Task], now: NaiveDateTime, bucket: Bucket, opts: &QueryOptions) -> usize {
    let today = normalize(now);
    tasks
        .iter()
        .filter(|t| bucket.matches(t, today, opts))
        .count()
}

pub fn due_today<'a>(tasks: &'a [Task], now: NaiveDateTime, opts: &QueryOptions) -> Vec<&'a Task> {
    select(tasks, now, Bucket::Today, opts)
}

pub fn count_due_today(tasks: &[Task], now: NaiveDateTime, opts: &QueryOptions) -> usize {
    count(tasks, now, Bucket::Today, opts)
}

pub fn due_tomorrow<'a>(tasks: &'a [Task], now: NaiveDateTime, opts: &QueryOptions) -> Vec<&'a Task> {
    select(tasks, now, Bucket::Tomorrow, opts)
}

pub fn count_due_tomorrow(tasks: &[Task], now: NaiveDateTime, opts: &QueryOptions) -> usize {
    count(tasks, now, Bucket::Tomorrow, opts)
}

pub fn due_this_week<'a>(tasks: &'a [Task], now: NaiveDateTime, opts: &QueryOptions) -> Vec<&'a Task> {
    select(tasks, now, Bucket::Week, opts)
}

pub fn count_due_this_week(tasks: &[Task], now: NaiveDateTime, opts: &QueryOptions) -> usize {
    count(tasks, now, Bucket::Week, opts)
}

pub fn overdue<'a>(tasks: &'a [Task], now: NaiveDateTime, opts: &QueryOptions) -> Vec<&'a Task> {
    select(tasks, now, Bucket::Overdue, opts)
}

pub fn count_overdue(tasks: &[Task], now: NaiveDateTime, opts: &QueryOptions) -> usize {
    count(tasks, now, Bucket::Overdue, opts)
}

pub fn incomplete<'a>(tasks: &'a [Task], now: NaiveDateTime, opts: &QueryOptions) -> Vec<&'a Task> {
    select(tasks, now, Bucket::Incomplete, opts)
}

pub fn count_incomplete(tasks: &[Task], now: NaiveDateTime, opts: &QueryOptions) -> usize {
    count(tasks, now, Bucket::Incomplete, opts)
}

/// Badge numbers for every bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub today: usize,
    pub tomorrow: usize,
    pub week: usize,
    pub overdue: usize,
    pub incomplete: usize,
}

impl BucketCounts {
    pub fn get(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::Today => self.today,
            Bucket::Tomorrow => self.tomorrow,
            Bucket::Week => self.week,
            Bucket::Overdue => self.overdue,
            Bucket::Incomplete => self.incomplete,
        }
    }
}

pub fn summarize(tasks: &[Task], now: NaiveDateTime, opts: &QueryOptions) -> BucketCounts {
    BucketCounts {
        today: count_due_today(tasks, now, opts),
        tomorrow: count_due_tomorrow(tasks, now, opts),
        week: count_due_this_week(tasks, now, opts),
        overdue: count_overdue(tasks, now, opts),
        incomplete: count_incomplete(tasks, now, opts),
    }
}
