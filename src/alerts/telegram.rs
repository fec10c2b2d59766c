use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

use super::{http_client, AlertSink, DELIVERY_TIMEOUT};
use crate::error::{Result, SentinelError};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Push notifications through a Telegram bot.
#[derive(Clone)]
pub struct TelegramAlertSink {
    client: Client,
    token: String,
    chat_id: String,
    api_base: String,
    timeout: Duration,
}

impl TelegramAlertSink {
    pub fn new(token: String, chat_id: String) -> Self {
        Self {
            client: http_client(DELIVERY_TIMEOUT),
            token,
            chat_id,
            api_base: TELEGRAM_API_BASE.to_string(),
            timeout: DELIVERY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self.timeout = timeout;
        self
    }

    /// Points the sink at a different Bot API host (self-hosted bot API server).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base.trim_end_matches('/'), self.token)
    }

    async fn send(&self, title: &str, body: &str) -> Result<()> {
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": format!("🔔 {}\n\n{}", title, body),
            "disable_web_page_preview": true
        });

        let response = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SentinelError::DeliveryError(format!(
                "Telegram API error: Status {} {}",
                status, text
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AlertSink for TelegramAlertSink {
    async fn deliver(&self, title: &str, body: &str) {
        match self.send(title, body).await {
            Ok(()) => debug!("Telegram notification sent successfully"),
            Err(e) => warn!("Failed to send Telegram notification: {}", e),
        }
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
