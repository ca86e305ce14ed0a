//! Calendar-day arithmetic.
//!
//! Every daily rule in the engine (streaks, refresh gates, caps) compares
//! calendar days in the caller's time zone, never raw 24h durations. A day is
//! identified by a [`DayIndex`]: the number of days since 1970-01-01 in that
//! zone's local calendar.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Midnight-truncated local day, counted from 1970-01-01.
///
/// The default value is day 0, which lies before any real "today", so a
/// default-initialised marker always compares as stale.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DayIndex(pub i64);

impl DayIndex {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE)
    }

    /// Calendar date for this index, if it is representable.
    pub fn to_date(self) -> Option<NaiveDate> {
        let days = i32::try_from(self.0.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?).ok()?;
        NaiveDate::from_num_days_from_ce_opt(days)
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Signed number of days from `self` to `later`.
    pub fn days_until(self, later: DayIndex) -> i64 {
        later.0.saturating_sub(self.0)
    }
}

/// Day index of `at` in its own time zone.
pub fn day_index<Tz: TimeZone>(at: &DateTime<Tz>) -> DayIndex {
    DayIndex::from_date(at.date_naive())
}

/// Day index of a stored UTC instant, seen from `now`'s time zone.
pub fn day_index_in<Tz: TimeZone>(instant: &DateTime<Utc>, now: &DateTime<Tz>) -> DayIndex {
    day_index(&instant.with_timezone(&now.timezone()))
}

/// Calendar days elapsed between a stored instant and `now`.
///
/// Negative when the stored instant lies on a later local day (clock moved
/// backwards).
pub fn calendar_days_between<Tz: TimeZone>(earlier: &DateTime<Utc>, now: &DateTime<Tz>) -> i64 {
    day_index_in(earlier, now).days_until(day_index(now))
}

/// First instant of `day` in `tz`.
///
/// When local midnight does not exist (a DST jump at 00:00) the first instant
/// after the gap is returned.
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, day: DayIndex) -> Option<DateTime<Tz>> {
    let midnight = day.to_date()?.and_hms_opt(0, 0, 0)?;
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(at) => Some(at),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz
            .from_local_datetime(&(midnight + Duration::hours(1)))
            .earliest(),
    }
}

/// The next local midnight after `now`.
pub fn next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    start_of_day(&now.timezone(), day_index(now).next())
}
