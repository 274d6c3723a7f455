use crate::core::{
    filters::{matches_duration, parse_slot_start, slot_matches_target},
    scoring::preference_rank,
};
use crate::models::{AvailabilityEntry, Candidate, Preferences};

/// Result of matching one availability entry
#[derive(Debug)]
pub struct MatchResult {
    pub candidates: Vec<Candidate>,
    pub total_slots: usize,
}

/// Turns raw availability into an ordered list of bookable candidates
///
/// # Pipeline Stages
/// 1. Duration filter (exact minutes)
/// 2. Timestamp normalization (UTC wall clock to local time)
/// 3. Weekday and target-time filter
/// 4. Ranking by preferred hour, then by start time
#[derive(Debug, Clone)]
pub struct SlotMatcher {
    preferences: Preferences,
}

impl SlotMatcher {
    pub fn new(preferences: Preferences) -> Self {
        Self { preferences }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Candidates for one entry (one resource, one day), best first
    ///
    /// The caller books them strictly in this order and stops at the first success.
    pub fn find_candidates(&self, entry: &AvailabilityEntry) -> MatchResult {
        let prefs = &self.preferences;
        let total_slots = entry.slots.len();

        let mut candidates: Vec<Candidate> = entry
            .slots
            .iter()
            // Stage 1: duration
            .filter(|slot| matches_duration(slot, prefs))
            // Stage 2: normalize to local time
            .filter_map(|slot| parse_slot_start(&entry.start_date, &slot.start_time))
            // Stage 3: weekday + time
            .filter(|start| slot_matches_target(start, prefs))
            // Stage 4: rank
            .map(|start| Candidate {
                preference_rank: preference_rank(&start, &prefs.preferred_hours),
                resource_id: entry.resource_id.clone(),
                start,
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.preference_rank
                .cmp(&b.preference_rank)
                .then_with(|| a.start.cmp(&b.start))
        });

        MatchResult {
            candidates,
            total_slots,
        }
    }
}
