use crate::models::{AvailabilityEntry, PaymentIntent, PaymentIntentRequest, ReservationRecord, ReservationSummary};
use crate::services::endpoints::PaymentEndpoint;
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur when talking to the booking platform
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Login failed: {0}")]
    Auth(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Malformed response (expected JSON, got: {snippet})")]
    MalformedResponse { snippet: String },

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

impl ClientError {
    /// Build a malformed-response error from a raw body, keeping a short prefix for logs
    pub fn malformed(body: &str) -> Self {
        let snippet: String = body.trim().chars().take(120).collect();
        ClientError::MalformedResponse { snippet }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, ClientError::HttpStatus { status: 403, .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return ClientError::HttpStatus {
                status: status.as_u16(),
                body: String::new(),
            };
        }
        if err.is_decode() {
            return ClientError::MalformedResponse { snippet: err.to_string() };
        }
        ClientError::Transport(err.to_string())
    }
}

/// Credentials for one account, resolved by the configuration layer
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Authenticated state of one account for the current run
///
/// The cookie jar lives in the transport itself; this value records the
/// tokens each login produced and which payment endpoint was selected from them.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSession {
    pub user_id: Option<String>,
    pub primary_token: Option<String>,
    pub secondary_token: Option<String>,
    pub payment_endpoint: PaymentEndpoint,
}

/// Capability the booking engine needs from the platform
///
/// Every call is independent of the others; authentication state is passed
/// in through the [`AccountSession`] returned by [`BookingClient::login`].
#[async_trait]
pub trait BookingClient: Send + Sync {
    /// Authenticate and pick the payment endpoint for this session
    async fn login(&self) -> Result<AccountSession, ClientError>;

    /// Availability between `start` and `end` (inclusive), one request per day
    async fn fetch_availability(
        &self,
        session: &AccountSession,
        tenant_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AvailabilityEntry>, ClientError>;

    async fn fetch_recent_reservations(
        &self,
        session: &AccountSession,
        limit: usize,
        sort: &str,
    ) -> Result<Vec<ReservationSummary>, ClientError>;

    async fn create_payment_intent(
        &self,
        session: &AccountSession,
        payload: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, ClientError>;

    async fn select_payment_method(
        &self,
        session: &AccountSession,
        intent_id: &str,
        method_id: Option<&str>,
    ) -> Result<(), ClientError>;

    async fn confirm_reservation(
        &self,
        session: &AccountSession,
        intent_id: &str,
    ) -> Result<ReservationRecord, ClientError>;
}
