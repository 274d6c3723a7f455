use crate::core::window::utc_to_local;
use crate::models::{Preferences, Slot};
use chrono::{DateTime, Datelike, Local, NaiveDateTime, Timelike};

const SLOT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local start of a slot, from the entry's UTC day and the slot's UTC time
///
/// Returns `None` for anything that does not parse; such slots are skipped.
pub fn parse_slot_start(entry_date: &str, start_time: &str) -> Option<DateTime<Local>> {
    let raw = format!("{} {}", entry_date.trim(), start_time.trim());
    NaiveDateTime::parse_from_str(&raw, SLOT_DATETIME_FORMAT)
        .ok()
        .map(utc_to_local)
}

/// Slot length must equal the configured duration exactly
#[inline]
pub fn matches_duration(slot: &Slot, preferences: &Preferences) -> bool {
    slot.duration == preferences.duration_minutes
}

/// Weekday filter; always passes when `weekdays_only` is off
#[inline]
pub fn matches_weekday(start: &DateTime<Local>, preferences: &Preferences) -> bool {
    if !preferences.weekdays_only {
        return true;
    }
    let weekday = start.weekday().num_days_from_monday() as u8;
    preferences.target_weekdays.contains(&weekday)
}

/// Minute-exact match against the target hours, unless any time is accepted
#[inline]
pub fn matches_target_time(start: &DateTime<Local>, preferences: &Preferences) -> bool {
    if preferences.accept_any_time {
        return true;
    }
    preferences
        .target_hours
        .iter()
        .any(|t| t.hour() == start.hour() && t.minute() == start.minute())
}

/// Weekday and time filters combined
#[inline]
pub fn slot_matches_target(start: &DateTime<Local>, preferences: &Preferences) -> bool {
    matches_weekday(start, preferences) && matches_target_time(start, preferences)
}
