use chrono::{DateTime, Local, NaiveTime, Timelike};

/// Preference rank of a slot start (lower is better)
///
/// The rank is the index of the start time in `preferred_hours`. Times not in
/// the list rank after all listed ones; with no preferred hours every slot ranks 0.
pub fn preference_rank(start: &DateTime<Local>, preferred_hours: &[NaiveTime]) -> usize {
    preferred_hours
        .iter()
        .position(|t| t.hour() == start.hour() && t.minute() == start.minute())
        .unwrap_or(preferred_hours.len())
}
