use crate::core::payment::FreeMethodPolicy;
use crate::core::reserver::Reserver;
use crate::core::window::release_wait;
use crate::models::{Preferences, Tenant};
use crate::services::{BookingClient, BookingEvent, ClientError, Credentials, Notifier};
use chrono::{Local, NaiveTime};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Conditions that end a run (or an account's part of it) early
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("No venues configured. Add at least one tenant id to the booking settings.")]
    NoVenues,

    #[error("Login failed: {0}")]
    Auth(ClientError),
}

/// Knobs for one booking run
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub max_attempts: u32,
    /// Fixed delay between unsuccessful attempts
    pub retry_delay: Duration,
    pub dry_run: bool,
    /// Local time at which new slots are released
    pub release_time: Option<NaiveTime>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay: Duration::from_secs(1),
            dry_run: false,
            release_time: None,
        }
    }
}

/// Sleep until the release time if it is at most five minutes away
pub async fn wait_until_release(release: Option<NaiveTime>) {
    let Some(release) = release else {
        return;
    };
    if let Some(wait) = release_wait(Local::now().naive_local(), release) {
        info!("Waiting {:.0}s until release time {}...", wait.as_secs_f64(), release.format("%H:%M"));
        tokio::time::sleep(wait).await;
    }
}

/// Search and book for one account, retrying the whole cycle
///
/// Every attempt logs in again and walks all venues. Returns `Ok(true)` once a
/// reservation is confirmed, or in dry-run mode once a qualifying slot is found.
pub async fn run_booking<C: BookingClient + ?Sized>(
    client: &C,
    preferences: &Preferences,
    tenants: &[Tenant],
    policy: &FreeMethodPolicy,
    options: &RunOptions,
    notifier: &dyn Notifier,
) -> Result<bool, BookingError> {
    if tenants.is_empty() {
        error!("{}", BookingError::NoVenues);
        return Err(BookingError::NoVenues);
    }

    wait_until_release(options.release_time).await;

    let mut reserver = Reserver::new(client, preferences.clone(), policy.clone(), options.dry_run);

    for attempt in 1..=options.max_attempts {
        let session = match client.login().await {
            Ok(session) => session,
            Err(e) if attempt == 1 => {
                error!("Login failed: {}", e);
                notifier
                    .notify(&BookingEvent::failure("Login failed", e.to_string()))
                    .await;
                return Err(BookingError::Auth(e));
            }
            Err(e) => {
                warn!("Re-login failed on attempt {}/{}: {}", attempt, options.max_attempts, e);
                if attempt < options.max_attempts {
                    tokio::time::sleep(options.retry_delay).await;
                }
                continue;
            }
        };

        info!("Attempt {}/{}", attempt, options.max_attempts);
        for tenant in tenants {
            if reserver.is_done() {
                break;
            }
            reserver.process_tenant(&session, tenant).await;
        }

        let result = reserver.result();
        if result.succeeded() {
            let event = if result.confirmed {
                BookingEvent::success("Court booked", "A court was successfully reserved.")
            } else {
                BookingEvent::success(
                    "Dry run: slot found",
                    "A matching slot is available; no reservation was made.",
                )
            };
            notifier.notify(&event).await;
            return Ok(true);
        }

        if attempt < options.max_attempts {
            tokio::time::sleep(options.retry_delay).await;
        }
    }

    notifier
        .notify(&BookingEvent::failure(
            "No court booked",
            format!(
                "Tried {} times; no matching slot was available or booking failed.",
                options.max_attempts
            ),
        ))
        .await;
    Ok(false)
}

/// One configured account with its effective preferences
#[derive(Debug, Clone)]
pub struct AccountPlan {
    pub label: String,
    /// Resolution error text when the credentials are missing
    pub credentials: Result<Credentials, String>,
    pub preferences: Preferences,
}

/// Runs accounts one after another until one of them books
pub struct Orchestrator<'a, F> {
    tenants: &'a [Tenant],
    policy: &'a FreeMethodPolicy,
    options: &'a RunOptions,
    notifier: &'a dyn Notifier,
    client_factory: F,
}

impl<'a, F, C> Orchestrator<'a, F>
where
    F: Fn(Credentials) -> Result<C, ClientError>,
    C: BookingClient,
{
    pub fn new(
        tenants: &'a [Tenant],
        policy: &'a FreeMethodPolicy,
        options: &'a RunOptions,
        notifier: &'a dyn Notifier,
        client_factory: F,
    ) -> Self {
        Self {
            tenants,
            policy,
            options,
            notifier,
            client_factory,
        }
    }

    /// Returns true once any account books (or, in dry-run mode, finds a slot)
    ///
    /// A real booking stops the run; a dry run reports every account.
    /// Account-level failures are logged and the next account is tried.
    pub async fn run(&self, accounts: &[AccountPlan]) -> Result<bool, BookingError> {
        if self.tenants.is_empty() {
            error!("{}", BookingError::NoVenues);
            return Err(BookingError::NoVenues);
        }

        let mut found_any = false;

        for account in accounts {
            info!("Account {}: weekdays {:?}", account.label, account.preferences.target_weekdays);

            let credentials = match &account.credentials {
                Ok(credentials) => credentials.clone(),
                Err(msg) => {
                    error!("Skipping account {}: {}", account.label, msg);
                    self.notifier
                        .notify(&BookingEvent::failure("Booking failed", msg.clone()))
                        .await;
                    continue;
                }
            };

            let client = match (self.client_factory)(credentials) {
                Ok(client) => client,
                Err(e) => {
                    error!("Skipping account {}: could not build client: {}", account.label, e);
                    continue;
                }
            };

            match run_booking(
                &client,
                &account.preferences,
                self.tenants,
                self.policy,
                self.options,
                self.notifier,
            )
            .await
            {
                Ok(true) if self.options.dry_run => found_any = true,
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(BookingError::Auth(e)) => {
                    error!("Skipping account {}: {}", account.label, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(found_any)
    }
}
