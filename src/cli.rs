use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use clap::Parser;
use std::path::PathBuf;

use crate::agenda::{QueryOptions, DEFAULT_HORIZON_DAYS};
use crate::error::{Error, Result};
use crate::pending::Lookback;
use crate::tags::normalize_tags;

/// CLI arguments for todo-agenda
#[derive(Parser)]
#[command(name = "todo-agenda")]
#[command(about = "Evaluate todo task collections into agenda buckets")]
#[command(version)]
pub struct Cli {
    /// Directory to search for task files
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Glob pattern for task files
    #[arg(long, default_value = "*.json")]
    pub glob: String,

    /// Output format: json, md, html
    #[arg(long, default_value = "json", value_parser = ["json", "md", "html"])]
    pub format: String,

    /// Output file path (stdout if not specified)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Agenda bucket: today, tomorrow, week, overdue, incomplete, summary
    #[arg(
        long,
        default_value = "today",
        value_parser = ["today", "tomorrow", "week", "overdue", "incomplete", "summary"]
    )]
    pub agenda: String,

    /// Print only the number of tasks in the bucket
    #[arg(long)]
    pub count: bool,

    /// Reference date (YYYY-MM-DD format); today in --tz if not specified
    #[arg(long, value_parser = validate_date)]
    pub date: Option<String>,

    /// Timezone used to resolve today's date (IANA timezone, e.g., "Europe/Moscow")
    #[arg(long, default_value = "UTC")]
    pub tz: String,

    /// Keep only tasks carrying this tag (repeatable, all must match)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Limit the overdue scan to this many days before the reference date
    #[arg(long)]
    pub lookback: Option<u32>,

    /// Forward window of the incomplete bucket, in days
    #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS)]
    pub horizon: u32,

    /// Toggle completion of the task with this id on --date and rewrite its file
    #[arg(long, requires = "date")]
    pub toggle: Option<String>,
}

impl Cli {
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            tags: normalize_tags(&self.tags),
            lookback: self.lookback.map_or(Lookback::Unbounded, Lookback::Days),
            horizon_days: self.horizon,
        }
    }

    /// Reference instant for every query
    ///
    /// This is the only place the wall clock is read: midnight of `--date`
    /// when given, otherwise the current local time in `--tz`.
    pub fn reference_time(&self) -> Result<NaiveDateTime> {
        if let Some(ref date) = self.date {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|_| Error::InvalidDate(date.clone()))?;
            return Ok(date.and_time(NaiveTime::MIN));
        }
        let tz: Tz = self
            .tz
            .parse()
            .map_err(|_| Error::Timezone(self.tz.clone()))?;
        Ok(tz.from_utc_datetime(&Utc::now().naive_utc()).naive_local())
    }
}

/// Validate date format (YYYY-MM-DD)
fn validate_date(s: &str) -> std::result::Result<String, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|_| s.to_string())
        .map_err(|e| format!("Invalid date '{s}': {e}. Use YYYY-MM-DD format"))
}
