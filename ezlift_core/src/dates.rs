//! Calendar helpers shared by the dashboard statistics.

use crate::{Error, Result};
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Monday of the ISO week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset))
        .unwrap_or(NaiveDate::MIN)
}

/// Human label for how long ago `date` was, relative to `now`
///
/// `Today`, `Yesterday`, `N days ago` for 2 ≤ N < 7, otherwise an absolute
/// `MMM d` date. Dates in the future are formatted absolutely.
pub fn format_relative_date(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now.date_naive() - date.date_naive()).num_days();
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{} days ago", days),
        _ => date.format("%b %-d").to_string(),
    }
}

/// Inclusive range of calendar days
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidData(format!(
                "Date range starts after it ends: {} > {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The last `weeks` ISO weeks up to and including the week of `now`
    ///
    /// A span reaching past the earliest representable date starts there.
    pub fn last_weeks(weeks: u32, now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let back = u64::from(weeks.max(1) - 1) * 7;
        Self {
            start: week_start(today)
                .checked_sub_days(Days::new(back))
                .unwrap_or(NaiveDate::MIN),
            end: today,
        }
    }

    /// Everything up to and including today
    pub fn all_time(now: DateTime<Utc>) -> Self {
        Self {
            start: NaiveDate::MIN,
            end: now.date_naive(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}
