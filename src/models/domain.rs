use chrono::{DateTime, Local, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Effective booking preferences for one account and one run
///
/// Built by overriding the base booking settings with the account's
/// overrides. Never mutated once a run has started.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    /// Target weekdays, 0 = Monday .. 6 = Sunday
    pub target_weekdays: Vec<u8>,
    pub target_hours: Vec<NaiveTime>,
    /// Times tried first, in order. Empty means all target hours rank equally.
    pub preferred_hours: Vec<NaiveTime>,
    pub duration_minutes: u32,
    pub weekdays_only: bool,
    pub accept_any_time: bool,
    /// First day to probe relative to today. `None` uses the quota-driven window.
    pub start_days_ahead: Option<i64>,
    pub days_ahead: i64,
    pub reservations_per_week: u32,
    pub number_of_players: u8,
}

impl Default for Preferences {
    fn default() -> Self {
        let target_hours = (18..22)
            .flat_map(|h| [NaiveTime::from_hms_opt(h, 0, 0), NaiveTime::from_hms_opt(h, 30, 0)])
            .flatten()
            .collect();

        Self {
            target_weekdays: vec![0, 1, 2, 3, 4],
            target_hours,
            preferred_hours: vec![],
            duration_minutes: 90,
            weekdays_only: true,
            accept_any_time: false,
            start_days_ahead: None,
            days_ahead: 14,
            reservations_per_week: 1,
            number_of_players: 4,
        }
    }
}

/// A bookable venue (tenant on the platform)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl Tenant {
    /// Name for logs, falling back to the id
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// One bookable interval inside an availability entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// UTC wall-clock start, `HH:MM:SS`
    pub start_time: String,
    /// Length in minutes
    #[serde(default)]
    pub duration: u32,
    /// Number or string, depending on the venue; never inspected
    #[serde(default)]
    pub price: Option<Value>,
}

/// Availability of one resource (court) on one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityEntry {
    pub resource_id: String,
    /// UTC calendar day, `YYYY-MM-DD`
    pub start_date: String,
    #[serde(default)]
    pub slots: Vec<Slot>,
}

/// A slot that passed filtering, ready to be booked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// 0 = first preferred hour; higher is less preferred
    pub preference_rank: usize,
    pub resource_id: String,
    pub start: DateTime<Local>,
}

/// Payment option offered on a payment intent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    #[serde(default)]
    pub payment_method_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
}

impl PaymentMethod {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("0 EUR option")
    }
}

/// Server-side transaction created for a booking attempt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    #[serde(default)]
    pub available_payment_methods: Vec<PaymentMethod>,
    #[serde(default)]
    pub total_amount: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Entry of the "my matches" list, used only to estimate the weekly quota
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationSummary {
    #[serde(default)]
    pub status: Option<String>,
    /// UTC, `YYYY-MM-DDTHH:MM:SS`
    #[serde(default)]
    pub start_date: Option<String>,
}

impl ReservationSummary {
    pub fn is_pending(&self) -> bool {
        self.status.as_deref() == Some("PENDING")
    }
}

/// Confirmation returned once the reservation is placed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationRecord {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub match_id: Option<String>,
    #[serde(default)]
    pub reservation_id: Option<String>,
}

/// Outcome of one run for one account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservationResult {
    pub confirmed: bool,
    /// Dry run only: a qualifying slot was found
    pub found: bool,
}

impl ReservationResult {
    pub fn succeeded(&self) -> bool {
        self.confirmed || self.found
    }
}
