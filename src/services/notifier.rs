use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Outcome event emitted by the booking engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingEvent {
    pub title: String,
    pub message: String,
    pub success: bool,
}

impl BookingEvent {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into(), success: true }
    }

    pub fn failure(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into(), success: false }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Telegram API returned {0}")]
    ApiError(u16),
}

/// Delivers booking events; the engine does not care how
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &BookingEvent);
}

/// Writes events to the log only
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &BookingEvent) {
        if event.success {
            tracing::info!("{}: {}", event.title, event.message);
        } else {
            tracing::warn!("{}: {}", event.title, event.message);
        }
    }
}

/// Logs every event and forwards it to a Telegram chat
pub struct TelegramNotifier {
    api_base: String,
    bot_token: String,
    chat_id: String,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String) -> Result<Self, NotifyError> {
        Self::with_api_base("https://api.telegram.org".to_string(), bot_token, chat_id)
    }

    pub fn with_api_base(api_base: String, bot_token: String, chat_id: String) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { api_base, bot_token, chat_id, client })
    }

    async fn send(&self, event: &BookingEvent) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base.trim_end_matches('/'), self.bot_token);
        let body = json!({
            "chat_id": self.chat_id,
            "text": format!("*{}*\n\n{}", event.title, event.message),
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(NotifyError::ApiError(response.status().as_u16()))
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, event: &BookingEvent) {
        LogNotifier.notify(event).await;
        if let Err(e) = self.send(event).await {
            tracing::warn!("Telegram notification failed: {}", e);
        }
    }
}
