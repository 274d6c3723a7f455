use crate::core::{AccountPlan, FreeMethodPolicy, RunOptions};
use crate::models::{Preferences, Tenant};
use crate::services::endpoints::{EndpointSelector, EndpointTarget};
use crate::services::playtomic::{PlaytomicConfig, DEFAULT_USER_AGENT};
use crate::services::{Credentials, LogNotifier, Notifier, TelegramNotifier};
use chrono::NaiveTime;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("Invalid time '{0}': expected HH:MM")]
    InvalidTime(String),

    #[error("Invalid retry delay {0}s: expected a finite, non-negative number of seconds")]
    InvalidDelay(f64),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Set {email_env} and {password_env} in the environment or .env")]
    MissingCredentials { email_env: String, password_env: String },
}

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub booking: BookingSettings,
    #[serde(default)]
    pub credentials: CredentialSettings,
    #[serde(default)]
    pub run: RunSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub endpoints: EndpointSettings,
    #[serde(default)]
    pub payment: PaymentSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// What to book and where
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookingSettings {
    #[serde(default = "default_target_hours")]
    pub target_hours: Vec<String>,
    /// Tried first, in order
    #[serde(default)]
    pub preferred_hours: Vec<String>,
    #[serde(default = "default_true")]
    pub weekdays_only: bool,
    #[serde(default = "default_weekdays")]
    #[validate(custom(function = "validate_weekdays"))]
    pub target_weekdays: Vec<u8>,
    #[serde(default = "default_duration_hours")]
    #[validate(range(min = 1.0, max = 2.0))]
    pub duration_hours: f64,
    #[serde(default = "default_reservations_per_week")]
    #[validate(range(min = 1))]
    pub reservations_per_week: u32,
    #[serde(default)]
    pub accept_any_time: bool,
    #[serde(default = "default_days_ahead")]
    #[validate(range(min = 1, max = 30))]
    pub booking_days_ahead: i64,
    #[serde(default)]
    #[validate(range(min = 0, max = 30))]
    pub booking_start_days_ahead: Option<i64>,
    /// `HH:MM` local time at which slots open
    #[serde(default)]
    pub booking_release_time: Option<String>,
    #[serde(default = "default_number_of_players")]
    #[validate(range(min = 1, max = 4))]
    pub number_of_players: u8,
    #[serde(default = "default_sport_id")]
    pub sport_id: String,
    #[serde(default)]
    pub tenants: Vec<Tenant>,
    #[serde(default)]
    #[validate(nested)]
    pub accounts: Vec<AccountSettings>,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            target_hours: default_target_hours(),
            preferred_hours: vec![],
            weekdays_only: true,
            target_weekdays: default_weekdays(),
            duration_hours: default_duration_hours(),
            reservations_per_week: default_reservations_per_week(),
            accept_any_time: false,
            booking_days_ahead: default_days_ahead(),
            booking_start_days_ahead: None,
            booking_release_time: None,
            number_of_players: default_number_of_players(),
            sport_id: default_sport_id(),
            tenants: vec![],
            accounts: vec![],
        }
    }
}

/// One account with its own credentials and overrides
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AccountSettings {
    #[serde(default)]
    pub name: String,
    /// Name of the env var holding the email
    pub email_env: String,
    /// Name of the env var holding the password
    pub password_env: String,
    #[serde(default = "default_weekdays")]
    #[validate(custom(function = "validate_weekdays"))]
    pub target_weekdays: Vec<u8>,
    #[serde(default)]
    pub accept_any_time: Option<bool>,
    #[serde(default)]
    #[validate(range(min = 0, max = 30))]
    pub booking_start_days_ahead: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 1, max = 30))]
    pub booking_days_ahead: Option<i64>,
}

impl AccountSettings {
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.email_env
        } else {
            &self.name
        }
    }

    pub fn credentials(&self) -> Result<Credentials, SettingsError> {
        resolve_credentials(&self.email_env, &self.password_env, env_lookup)
    }
}

/// Env var names for the single default account
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialSettings {
    #[serde(default = "default_email_env")]
    pub email_env: String,
    #[serde(default = "default_password_env")]
    pub password_env: String,
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            email_env: default_email_env(),
            password_env: default_password_env(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RunSettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_secs")]
    #[validate(range(min = 0.0, max = 3600.0))]
    pub retry_delay_secs: f64,
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Base URLs of the platform; see `services::endpoints` for how they are chosen
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointSettings {
    #[serde(default = "default_primary_auth_url")]
    pub primary_auth_url: String,
    #[serde(default = "default_primary_api_url")]
    pub primary_api_url: String,
    /// Empty disables the secondary login
    #[serde(default = "default_secondary_auth_url")]
    pub secondary_auth_url: String,
    #[serde(default = "default_secondary_api_url")]
    pub secondary_api_url: String,
    #[serde(default = "default_app_origin")]
    pub secondary_origin: String,
    #[serde(default = "default_bearer_api_url")]
    pub bearer_api_url: String,
    #[serde(default = "default_app_origin")]
    pub bearer_origin: String,
    #[serde(default = "default_session_api_url")]
    pub session_api_url: String,
    #[serde(default = "default_web_origin")]
    pub session_origin: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            primary_auth_url: default_primary_auth_url(),
            primary_api_url: default_primary_api_url(),
            secondary_auth_url: default_secondary_auth_url(),
            secondary_api_url: default_secondary_api_url(),
            secondary_origin: default_app_origin(),
            bearer_api_url: default_bearer_api_url(),
            bearer_origin: default_app_origin(),
            session_api_url: default_session_api_url(),
            session_origin: default_web_origin(),
        }
    }
}

impl EndpointSettings {
    pub fn selector(&self) -> Result<EndpointSelector, SettingsError> {
        Ok(EndpointSelector::standard(
            EndpointTarget::new(&self.secondary_api_url, &self.secondary_origin)?,
            EndpointTarget::new(&self.bearer_api_url, &self.bearer_origin)?,
            EndpointTarget::new(&self.session_api_url, &self.session_origin)?,
        ))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentSettings {
    /// Added to the built-in zero-cost name indicators
    #[serde(default)]
    pub extra_free_indicators: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_telegram_token_env")]
    pub telegram_bot_token_env: String,
    #[serde(default = "default_telegram_chat_env")]
    pub telegram_chat_id_env: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            telegram_bot_token_env: default_telegram_token_env(),
            telegram_chat_id_env: default_telegram_chat_env(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_true() -> bool { true }
fn default_target_hours() -> Vec<String> {
    ["18:00", "18:30", "19:00", "19:30", "20:00", "20:30", "21:00", "21:30"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_weekdays() -> Vec<u8> { vec![0, 1, 2, 3, 4] }
fn default_duration_hours() -> f64 { 1.5 }
fn default_reservations_per_week() -> u32 { 1 }
fn default_days_ahead() -> i64 { 14 }
fn default_number_of_players() -> u8 { 4 }
fn default_sport_id() -> String { "PADEL".to_string() }
fn default_email_env() -> String { "PADEL_EMAIL".to_string() }
fn default_password_env() -> String { "PADEL_PASSWORD".to_string() }
fn default_max_attempts() -> u32 { 5 }
fn default_retry_delay_secs() -> f64 { 1.0 }
fn default_timeout_secs() -> u64 { 10 }
fn default_user_agent() -> String { DEFAULT_USER_AGENT.to_string() }
fn default_primary_auth_url() -> String { "https://playtomic.io/api/v3".to_string() }
fn default_primary_api_url() -> String { "https://playtomic.io/api/v1".to_string() }
fn default_secondary_auth_url() -> String { "https://api.playtomic.io/v3".to_string() }
fn default_secondary_api_url() -> String { "https://api.playtomic.io/v1".to_string() }
fn default_bearer_api_url() -> String { "https://app.playtomic.io/api/v1".to_string() }
fn default_session_api_url() -> String { "https://playtomic.io/api/v1".to_string() }
fn default_app_origin() -> String { "https://app.playtomic.io".to_string() }
fn default_web_origin() -> String { "https://playtomic.io".to_string() }
fn default_telegram_token_env() -> String { "TELEGRAM_BOT_TOKEN".to_string() }
fn default_telegram_chat_env() -> String { "TELEGRAM_CHAT_ID".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

fn validate_weekdays(days: &[u8]) -> Result<(), ValidationError> {
    if days.iter().all(|d| *d <= 6) {
        Ok(())
    } else {
        Err(ValidationError::new("weekday_out_of_range"))
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Read email/password from the variables named `email_env`/`password_env`
pub fn resolve_credentials<F>(email_env: &str, password_env: &str, lookup: F) -> Result<Credentials, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    match (lookup(email_env), lookup(password_env)) {
        (Some(email), Some(password)) => Ok(Credentials { email, password }),
        _ => Err(SettingsError::MissingCredentials {
            email_env: email_env.to_string(),
            password_env: password_env.to_string(),
        }),
    }
}

/// Seconds to a `Duration`; negative, NaN, infinite or oversized values are rejected
pub fn retry_delay(secs: f64) -> Result<Duration, SettingsError> {
    Duration::try_from_secs_f64(secs).map_err(|_| SettingsError::InvalidDelay(secs))
}

/// Parse `HH:MM` (seconds tolerated)
pub fn parse_hhmm(value: &str) -> Result<NaiveTime, SettingsError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| SettingsError::InvalidTime(value.to_string()))
}

fn parse_hours(values: &[String]) -> Result<Vec<NaiveTime>, SettingsError> {
    values.iter().map(|v| parse_hhmm(v)).collect()
}

impl BookingSettings {
    /// Preferences before any account override
    pub fn base_preferences(&self) -> Result<Preferences, SettingsError> {
        Ok(Preferences {
            target_weekdays: self.target_weekdays.clone(),
            target_hours: parse_hours(&self.target_hours)?,
            preferred_hours: parse_hours(&self.preferred_hours)?,
            duration_minutes: (self.duration_hours * 60.0).round() as u32,
            weekdays_only: self.weekdays_only,
            accept_any_time: self.accept_any_time,
            start_days_ahead: self.booking_start_days_ahead,
            days_ahead: self.booking_days_ahead,
            reservations_per_week: self.reservations_per_week,
            number_of_players: self.number_of_players,
        })
    }

    /// Base preferences with the account's overrides applied
    ///
    /// The weekday list always comes from the account; the other overrides
    /// apply only when set.
    pub fn preferences_for(&self, account: &AccountSettings) -> Result<Preferences, SettingsError> {
        let mut prefs = self.base_preferences()?;
        prefs.target_weekdays = account.target_weekdays.clone();
        if let Some(any_time) = account.accept_any_time {
            prefs.accept_any_time = any_time;
        }
        if let Some(start) = account.booking_start_days_ahead {
            prefs.start_days_ahead = Some(start);
        }
        if let Some(days) = account.booking_days_ahead {
            prefs.days_ahead = days;
        }
        Ok(prefs)
    }

    pub fn release_time(&self) -> Result<Option<NaiveTime>, SettingsError> {
        self.booking_release_time
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(parse_hhmm)
            .transpose()
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with PADEL__)
    pub fn load() -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., PADEL__RUN__MAX_ATTEMPTS -> run.max_attempts
            .add_source(
                Environment::with_prefix("PADEL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("PADEL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(settings)
    }

    fn finish(config: Config) -> Result<Self, SettingsError> {
        let settings: Settings = config.try_deserialize()?;
        settings.booking.validate()?;
        settings.run.validate()?;
        Ok(settings)
    }

    /// One plan per configured account, or the default account when none are listed
    ///
    /// Missing credentials do not fail here; the orchestrator skips that account.
    pub fn account_plans(&self) -> Result<Vec<AccountPlan>, SettingsError> {
        if self.booking.accounts.is_empty() {
            let credentials = resolve_credentials(
                &self.credentials.email_env,
                &self.credentials.password_env,
                env_lookup,
            );
            return Ok(vec![AccountPlan {
                label: "default".to_string(),
                credentials: credentials.map_err(|e| e.to_string()),
                preferences: self.booking.base_preferences()?,
            }]);
        }

        self.booking
            .accounts
            .iter()
            .map(|account| {
                Ok(AccountPlan {
                    label: account.label().to_string(),
                    credentials: account.credentials().map_err(|e| e.to_string()),
                    preferences: self.booking.preferences_for(account)?,
                })
            })
            .collect()
    }

    pub fn run_options(&self) -> Result<RunOptions, SettingsError> {
        Ok(RunOptions {
            max_attempts: self.run.max_attempts,
            retry_delay: retry_delay(self.run.retry_delay_secs)?,
            dry_run: self.run.dry_run,
            release_time: self.booking.release_time()?,
        })
    }

    pub fn free_method_policy(&self) -> FreeMethodPolicy {
        FreeMethodPolicy::with_extra_indicators(&self.payment.extra_free_indicators)
    }

    pub fn client_config(&self) -> Result<PlaytomicConfig, SettingsError> {
        let secondary = self.endpoints.secondary_auth_url.trim();

        Ok(PlaytomicConfig {
            primary_auth_url: self.endpoints.primary_auth_url.clone(),
            primary_api_url: self.endpoints.primary_api_url.clone(),
            secondary_auth_url: (!secondary.is_empty()).then(|| secondary.to_string()),
            selector: self.endpoints.selector()?,
            timeout: Duration::from_secs(self.http.timeout_secs),
            user_agent: self.http.user_agent.clone(),
            sport_id: self.booking.sport_id.clone(),
        })
    }

    /// Telegram when both env vars are set, log-only otherwise
    pub fn notifier(&self) -> Box<dyn Notifier> {
        let token = env_lookup(&self.notifications.telegram_bot_token_env);
        let chat = env_lookup(&self.notifications.telegram_chat_id_env);

        match (token, chat) {
            (Some(token), Some(chat)) => match TelegramNotifier::new(token, chat) {
                Ok(notifier) => Box::new(notifier),
                Err(e) => {
                    tracing::warn!("Telegram notifier unavailable ({}), logging only", e);
                    Box::new(LogNotifier)
                }
            },
            _ => Box::new(LogNotifier),
        }
    }
}
