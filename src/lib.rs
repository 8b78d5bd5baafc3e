//! Recurrence and completion evaluation for todo tasks.
//!
//! Given a flat list of task records and a reference instant, decides for
//! each task whether it occurs on a day, whether that occurrence is done,
//! and which agenda buckets (today, tomorrow, week, overdue, incomplete)
//! it belongs to. Every function is pure: no clock reads, no I/O, no shared
//! state. Malformed dates and unknown recurrence tags degrade to "not due"
//! instead of failing.

pub mod agenda;
pub mod cli;
pub mod completion;
pub mod day;
pub mod error;
pub mod ledger;
pub mod loader;
pub mod pending;
pub mod recurrence;
pub mod render;
pub mod tags;
pub mod types;

pub use agenda::{
    count, count_due_this_week, count_due_today, count_due_tomorrow, count_incomplete,
    count_overdue, due_this_week, due_today, due_tomorrow, incomplete, overdue, select, summarize,
    Bucket, BucketCounts, QueryOptions,
};
pub use completion::{is_completed_on, toggle, CompletionState};
pub use day::{days_between, normalize, Day};
pub use error::{Error, Result};
pub use ledger::TaskLedger;
pub use pending::{has_pending_before, has_pending_within, is_pending_on, Lookback};
pub use recurrence::{occurs_on, RecurrenceRule};
pub use types::Task;
