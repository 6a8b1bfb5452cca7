//! Business-day arithmetic and date resolution.
//!
//! The provider numbers its per-day folders with one key per business day, so a
//! date maps to `anchor.key + count_business_days(anchor.date, date)`.

use crate::domain::model::{DateRequest, DateSource, KeyAnchor, RequestDate, ResourceKey};
use crate::utils::error::{FetchError, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Signed number of weekdays in `[min(start, end), max(start, end))`.
///
/// Negative when `end` precedes `start`, zero when they are equal.
pub fn count_business_days(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return -count_business_days(end, start);
    }

    let days = (end - start).num_days();
    let full_weeks = days / 7;
    let mut count = full_weeks * 5;

    let mut day = start + Duration::days(full_weeks * 7);
    while day < end {
        if is_business_day(day) {
            count += 1;
        }
        day += Duration::days(1);
    }

    count
}

pub fn resource_key(anchor: &KeyAnchor, date: NaiveDate) -> ResourceKey {
    ResourceKey(anchor.key + count_business_days(anchor.date, date))
}

/// Files for `date` are only published after its session closes.
pub fn is_unpublished(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today
}

/// Resolves the requested date against `today`.
///
/// Explicit weekend dates are rejected. In default mode yesterday is used,
/// except that a Monday run falls back to the previous Friday and a Sunday
/// run (yesterday = Saturday) is rejected.
pub fn resolve(request: DateRequest, today: NaiveDate) -> Result<RequestDate> {
    match request {
        DateRequest::Explicit(date) => {
            reject_weekend(date)?;
            Ok(RequestDate {
                date,
                source: DateSource::Explicit,
            })
        }
        DateRequest::Yesterday => {
            let yesterday = today - Duration::days(1);
            match yesterday.weekday() {
                Weekday::Sun => Ok(RequestDate {
                    date: today - Duration::days(3),
                    source: DateSource::RolledBackToFriday,
                }),
                Weekday::Sat => Err(FetchError::WeekendDate {
                    date: yesterday,
                    weekday: Weekday::Sat,
                }),
                _ => Ok(RequestDate {
                    date: yesterday,
                    source: DateSource::Yesterday,
                }),
            }
        }
    }
}

fn reject_weekend(date: NaiveDate) -> Result<()> {
    if is_business_day(date) {
        Ok(())
    } else {
        Err(FetchError::WeekendDate {
            date,
            weekday: date.weekday(),
        })
    }
}
