use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Calendar date, optional wall-clock time, optional trailing zone designator.
/// The zone is accepted but never applied: dates are taken as written.
static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^\s*(\d{4})-(\d{1,2})-(\d{1,2})",
        r"(?:[T ](\d{1,2}):(\d{2})(?::(\d{2})(?:\.\d+)?)?)?",
        r"\s*(?:Z|[+-]\d{2}(?::?\d{2})?)?\s*$",
    ))
    .expect("Invalid TIMESTAMP_RE regex")
});

/// A calendar day with all sub-day precision dropped.
///
/// `Invalid` stands in for anything that could not be read as a date. It
/// never occurs and is never an error. `Day` has no ordering; compare the
/// inner `NaiveDate`s when both sides are valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Value", into = "Option<String>")]
pub enum Day {
    #[default]
    Invalid,
    Date(NaiveDate),
}

impl Day {
    /// Parse a date or timestamp string into its calendar day
    ///
    /// # Arguments
    /// * `s` - `YYYY-MM-DD`, optionally followed by a time and zone
    ///   (e.g. "2024-01-08T13:45:00Z", "2024-01-08 09:30")
    ///
    /// # Returns
    /// The calendar day as written, or `Day::Invalid`
    pub fn parse(s: &str) -> Day {
        let Some(caps) = TIMESTAMP_RE.captures(s) else {
            return Day::Invalid;
        };

        let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

        let date = match (caps[1].parse::<i32>().ok(), field(2), field(3)) {
            (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d),
            _ => None,
        };
        let Some(date) = date else {
            return Day::Invalid;
        };

        if let Some(hour) = field(4) {
            let minute = field(5).unwrap_or(0);
            let second = field(6).unwrap_or(0);
            if NaiveTime::from_hms_opt(hour, minute, second).is_none() {
                return Day::Invalid;
            }
        }

        Day::Date(date)
    }

    pub fn date(self) -> Option<NaiveDate> {
        match self {
            Day::Date(d) => Some(d),
            Day::Invalid => None,
        }
    }

    pub fn is_valid(self) -> bool {
        matches!(self, Day::Date(_))
    }

    /// True for the "no date" values: `Invalid` and the epoch sentinel.
    pub fn is_undated(self) -> bool {
        match self {
            Day::Invalid => true,
            Day::Date(d) => (d.year(), d.month(), d.day()) == (1970, 1, 1),
        }
    }

    /// Shift by a signed number of days. Out-of-range results become `Invalid`.
    pub fn offset(self, days: i64) -> Day {
        match self {
            Day::Date(d) => d
                .checked_add_signed(Duration::days(days))
                .map_or(Day::Invalid, Day::Date),
            Day::Invalid => Day::Invalid,
        }
    }

    pub fn succ(self) -> Day {
        self.offset(1)
    }
}

/// Collapse a timestamp to its calendar day (wall clock as given).
pub fn normalize(timestamp: NaiveDateTime) -> Day {
    Day::Date(timestamp.date())
}

/// Signed number of days from `a` to `b`; `None` if either side is invalid.
pub fn days_between(a: Day, b: Day) -> Option<i64> {
    match (a, b) {
        (Day::Date(a), Day::Date(b)) => Some((b - a).num_days()),
        _ => None,
    }
}

impl From<NaiveDate> for Day {
    fn from(date: NaiveDate) -> Self {
        Day::Date(date)
    }
}

impl From<NaiveDateTime> for Day {
    fn from(timestamp: NaiveDateTime) -> Self {
        normalize(timestamp)
    }
}

/// Any JSON value: strings are parsed, a numeric 0 is the epoch "no date"
/// sentinel, everything else is an invalid day.
impl From<Value> for Day {
    fn from(raw: Value) -> Self {
        match raw {
            Value::Null => Day::Invalid,
            Value::String(s) => {
                let day = Day::parse(&s);
                if !day.is_valid() && !s.trim().is_empty() {
                    tracing::warn!(value = %s, "unparseable date, treating as invalid day");
                }
                day
            }
            Value::Number(n) if n.as_f64() == Some(0.0) => {
                NaiveDate::from_ymd_opt(1970, 1, 1).map_or(Day::Invalid, Day::Date)
            }
            other => {
                tracing::warn!(value = %other, "non-string date, treating as invalid day");
                Day::Invalid
            }
        }
    }
}

impl From<Day> for Option<String> {
    fn from(day: Day) -> Self {
        day.date().map(|d| d.format("%Y-%m-%d").to_string())
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Day::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Day::Invalid => f.write_str("invalid"),
        }
    }
}
