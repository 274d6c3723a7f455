use crate::core::matcher::SlotMatcher;
use crate::core::payment::{payment_required_message, FreeMethodPolicy};
use crate::core::window::{compute_search_window, count_week_reservations};
use crate::models::{
    AvailabilityEntry, Candidate, PaymentIntentRequest, Preferences, ReservationRecord,
    ReservationResult, Tenant,
};
use crate::services::{AccountSession, BookingClient, ClientError};
use chrono::{DateTime, Local, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Failed booking attempts after which a venue is abandoned for this run
pub const MAX_RESERVATION_FAILURES: u32 = 3;

const RECENT_RESERVATIONS_LIMIT: usize = 10;
const RECENT_RESERVATIONS_SORT: &str = "start_date,desc";

/// Why a single candidate could not be booked
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("{0}")]
    PaymentRequired(String),

    #[error("payment intent has no id")]
    MissingIntentId,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Progress of one booking transaction
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionState {
    NotStarted,
    Created { intent_id: String },
    MethodSelected { intent_id: String, method_id: Option<String> },
    Confirmed(ReservationRecord),
    Aborted(String),
}

/// create intent -> select a zero-cost method -> confirm
///
/// Any failure aborts the transaction. A created intent is left as is on the
/// platform; nothing is rolled back.
pub struct ReservationTransaction<'a, C: BookingClient + ?Sized> {
    client: &'a C,
    session: &'a AccountSession,
    policy: &'a FreeMethodPolicy,
    state: TransactionState,
}

impl<'a, C: BookingClient + ?Sized> ReservationTransaction<'a, C> {
    pub fn new(client: &'a C, session: &'a AccountSession, policy: &'a FreeMethodPolicy) -> Self {
        Self {
            client,
            session,
            policy,
            state: TransactionState::NotStarted,
        }
    }

    pub fn state(&self) -> &TransactionState {
        &self.state
    }

    pub async fn execute(&mut self, payload: &PaymentIntentRequest) -> Result<ReservationRecord, ReservationError> {
        match self.run(payload).await {
            Ok(record) => {
                self.state = TransactionState::Confirmed(record.clone());
                Ok(record)
            }
            Err(e) => {
                self.state = TransactionState::Aborted(e.to_string());
                Err(e)
            }
        }
    }

    async fn run(&mut self, payload: &PaymentIntentRequest) -> Result<ReservationRecord, ReservationError> {
        let intent = self.client.create_payment_intent(self.session, payload).await?;
        let intent_id = intent
            .payment_intent_id
            .clone()
            .ok_or(ReservationError::MissingIntentId)?;
        self.state = TransactionState::Created { intent_id: intent_id.clone() };

        let method = self
            .policy
            .select(&intent.available_payment_methods)
            .ok_or_else(|| ReservationError::PaymentRequired(payment_required_message(&intent)))?;
        info!("Using 0 EUR payment method: {}", method.display_name());

        let method_id = method.payment_method_id.clone();
        self.client
            .select_payment_method(self.session, &intent_id, method_id.as_deref())
            .await?;
        self.state = TransactionState::MethodSelected {
            intent_id: intent_id.clone(),
            method_id,
        };

        Ok(self.client.confirm_reservation(self.session, &intent_id).await?)
    }
}

/// Searches one account's venues and books the first suitable slot
///
/// Holds the run state for the account: once a reservation is confirmed (or,
/// in dry-run mode, a slot is found) every further call is a no-op.
pub struct Reserver<'a, C: BookingClient + ?Sized> {
    client: &'a C,
    matcher: SlotMatcher,
    policy: FreeMethodPolicy,
    dry_run: bool,
    result: ReservationResult,
    failures: u32,
}

impl<'a, C: BookingClient + ?Sized> Reserver<'a, C> {
    pub fn new(client: &'a C, preferences: Preferences, policy: FreeMethodPolicy, dry_run: bool) -> Self {
        Self {
            client,
            matcher: SlotMatcher::new(preferences),
            policy,
            dry_run,
            result: ReservationResult::default(),
            failures: 0,
        }
    }

    pub fn result(&self) -> ReservationResult {
        self.result
    }

    pub fn is_done(&self) -> bool {
        self.result.confirmed || (self.dry_run && self.result.found)
    }

    fn failure_budget_spent(&self) -> bool {
        self.failures >= MAX_RESERVATION_FAILURES
    }

    fn preferences(&self) -> &Preferences {
        self.matcher.preferences()
    }

    /// Pending reservations this week; a failed lookup counts as none
    async fn week_reservations(&self, session: &AccountSession, now: DateTime<Local>) -> u32 {
        match self
            .client
            .fetch_recent_reservations(session, RECENT_RESERVATIONS_LIMIT, RECENT_RESERVATIONS_SORT)
            .await
        {
            Ok(matches) => count_week_reservations(&matches, now),
            Err(e) => {
                warn!("Could not fetch matches: {}", e);
                0
            }
        }
    }

    /// Search one venue day by day and try to book
    pub async fn process_tenant(&mut self, session: &AccountSession, tenant: &Tenant) {
        if self.is_done() {
            return;
        }
        info!("Checking venue {} ({})...", tenant.label(), tenant.id);
        self.failures = 0;

        let now = Local::now();
        let week_reservations = self.week_reservations(session, now).await;
        let window = compute_search_window(now.date_naive(), week_reservations, self.preferences());
        debug!(
            "Search window for {}: {} (first day ends {}) until {}",
            tenant.id,
            window.start_day,
            window.end_of_start_day(),
            window.search_limit
        );

        for day in window.days() {
            if self.is_done() || self.failure_budget_spent() {
                break;
            }

            let entries = match self.client.fetch_availability(session, &tenant.id, day, day).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Availability fetch failed for {}: {}", day, e);
                    continue;
                }
            };

            info!("Checking availability for {}...", day.format("%Y-%m-%d"));
            for entry in &entries {
                if self.is_done() || self.failure_budget_spent() {
                    break;
                }
                self.process_entry(session, tenant, entry).await;
            }
        }

        if self.failure_budget_spent() && !self.result.confirmed {
            warn!(
                "Stopped trying more dates after {} failed reservation attempts for this venue.",
                MAX_RESERVATION_FAILURES
            );
        }
    }

    /// Try the entry's candidates in rank order
    async fn process_entry(&mut self, session: &AccountSession, tenant: &Tenant, entry: &AvailabilityEntry) {
        let candidates = self.matcher.find_candidates(entry).candidates;

        for candidate in &candidates {
            if self.is_done() || self.failure_budget_spent() {
                break;
            }
            info!("Found matching slot: {}", candidate.start.format("%Y %b %d - %H:%M"));

            self.reserve(session, tenant, candidate).await;
            if !self.result.confirmed && !self.dry_run {
                self.failures += 1;
            }
        }
    }

    async fn reserve(&mut self, session: &AccountSession, tenant: &Tenant, candidate: &Candidate) {
        if self.dry_run {
            self.result.found = true;
            info!(
                "[DRY RUN] Would book: {} at {} (tenant={}, resource={})",
                candidate.start.format("%Y-%m-%d"),
                candidate.start.format("%H:%M"),
                tenant.id,
                candidate.resource_id
            );
            return;
        }

        let prefs = self.preferences();
        let payload = PaymentIntentRequest::court_booking(
            session.user_id.as_deref(),
            &tenant.id,
            &candidate.resource_id,
            candidate.start.with_timezone(&Utc),
            prefs.duration_minutes,
            prefs.number_of_players,
        );

        let mut transaction = ReservationTransaction::new(self.client, session, &self.policy);
        match transaction.execute(&payload).await {
            Ok(record) => {
                info!(
                    "Reservation confirmed: {} ({})",
                    candidate.start.format("%Y %b %d - %H:%M"),
                    record.match_id.as_deref().or(record.reservation_id.as_deref()).unwrap_or("no id")
                );
                self.result.confirmed = true;
            }
            Err(e) => log_reservation_failure(&e, session),
        }
    }
}

fn log_reservation_failure(err: &ReservationError, session: &AccountSession) {
    match err {
        ReservationError::PaymentRequired(msg) => error!("SKIP (payment required): {}", msg),
        ReservationError::Client(ClientError::MalformedResponse { snippet }) => error!(
            "Reservation failed (payment API returned a web page instead of JSON, backend degraded): {}",
            snippet
        ),
        ReservationError::Client(ClientError::Transport(e)) => {
            warn!("Reservation failed: connection dropped or timed out ({}). Try again.", e)
        }
        ReservationError::Client(e) if e.is_forbidden() => error!(
            "Reservation failed: 403 Forbidden. The payment API rejected the request (auth/domain mismatch); \
             payments were sent via {} at {}.",
            session.payment_endpoint.kind, session.payment_endpoint.base_url
        ),
        ReservationError::Client(ClientError::HttpStatus { status, body }) => {
            error!("Reservation failed: {} {}", status, body)
        }
        other => warn!("Reservation failed: {}", other),
    }
}
