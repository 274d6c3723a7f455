use crate::models::{Preferences, ReservationSummary};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Outer bound of the quota-driven search, in days from today
pub const MAX_SEARCH_HORIZON_DAYS: i64 = 21;

/// Longest wait accepted before the release time; anything longer is skipped
pub const MAX_RELEASE_WAIT_SECS: i64 = 300;

/// Days probed for one venue
///
/// The caller starts at `start_day` and advances one day at a time while the
/// day is before `search_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub start_day: NaiveDate,
    pub search_limit: NaiveDate,
}

impl SearchWindow {
    /// Last instant of the first probed day
    pub fn end_of_start_day(&self) -> NaiveDateTime {
        end_of_day(self.start_day)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let limit = self.search_limit;
        self.start_day.iter_days().take_while(move |d| *d < limit)
    }
}

/// Compute where to start searching and where to stop
///
/// An explicit start offset probes `[today + offset, today + offset + days_ahead)`
/// regardless of quota. Otherwise a consumed weekly quota moves the start to
/// next Monday, and the search runs up to `min(21, days_ahead + 7)` days out.
pub fn compute_search_window(today: NaiveDate, week_reservations: u32, preferences: &Preferences) -> SearchWindow {
    let days_ahead = preferences.days_ahead;

    if let Some(offset) = preferences.start_days_ahead {
        let start_day = today + Duration::days(offset);
        return SearchWindow {
            start_day,
            search_limit: start_day + Duration::days(days_ahead),
        };
    }

    let start_day = if week_reservations >= preferences.reservations_per_week {
        next_monday(today)
    } else {
        today + Duration::days(days_ahead)
    };

    SearchWindow {
        start_day,
        search_limit: today + Duration::days(MAX_SEARCH_HORIZON_DAYS.min(days_ahead + 7)),
    }
}

pub fn next_monday(day: NaiveDate) -> NaiveDate {
    day + Duration::days(7 - day.weekday().num_days_from_monday() as i64)
}

pub fn start_of_week(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

pub fn end_of_day(day: NaiveDate) -> NaiveDateTime {
    NaiveDateTime::new(day, NaiveTime::default()) + Duration::days(1) - Duration::microseconds(1)
}

/// Monday 00:00 up to (not including) next Monday 00:00 of the week containing `today`
pub fn is_within_current_week(moment: NaiveDateTime, today: NaiveDate) -> bool {
    let week_start = start_of_week(today);
    let day = moment.date();
    day >= week_start && day < week_start + Duration::days(7)
}

/// The platform reports times as UTC wall clock without an offset
pub fn utc_to_local(naive_utc: NaiveDateTime) -> DateTime<Local> {
    Utc.from_utc_datetime(&naive_utc).with_timezone(&Local)
}

/// Pending reservations that fall in the current local week
pub fn count_week_reservations(summaries: &[ReservationSummary], now: DateTime<Local>) -> u32 {
    let today = now.date_naive();

    summaries
        .iter()
        .filter(|m| m.is_pending())
        .filter_map(|m| m.start_date.as_deref())
        .filter_map(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
        .map(utc_to_local)
        .filter(|start| is_within_current_week(start.naive_local(), today))
        .count() as u32
}

/// How long to sleep until `release` today, if it is ahead and close enough
pub fn release_wait(now: NaiveDateTime, release: NaiveTime) -> Option<std::time::Duration> {
    let target = now.date().and_time(release);
    let wait = target - now;

    if wait <= Duration::zero() || wait > Duration::seconds(MAX_RELEASE_WAIT_SECS) {
        return None;
    }
    wait.to_std().ok()
}
