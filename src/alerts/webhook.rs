use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{http_client, AlertSink, DELIVERY_TIMEOUT};
use crate::error::{Result, SentinelError};

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    title: &'a str,
    body: &'a str,
    timestamp: i64,
}

/// POSTs every alert as JSON to a fixed URL.
pub struct WebhookAlertSink {
    client: Client,
    url: String,
    timeout: Duration,
}

impl WebhookAlertSink {
    pub fn new(url: String) -> Self {
        Self {
            client: http_client(DELIVERY_TIMEOUT),
            url,
            timeout: DELIVERY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self.timeout = timeout;
        self
    }

    async fn post(&self, title: &str, body: &str) -> Result<()> {
        let payload = WebhookPayload {
            title,
            body,
            timestamp: chrono::Utc::now().timestamp(),
        };
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SentinelError::DeliveryError(format!(
                "webhook {} answered {}",
                self.url,
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AlertSink for WebhookAlertSink {
    async fn deliver(&self, title: &str, body: &str) {
        match self.post(title, body).await {
            Ok(()) => debug!("Webhook alert delivered to {}", self.url),
            Err(e) => warn!("Failed to deliver webhook alert: {}", e),
        }
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::net::TcpListener;

    /// Accepts connections and never writes a byte back.
    async fn silent_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{}/alerts", addr)
    }

    #[test]
    fn test_payload_shape() {
        let payload = WebhookPayload {
            title: "Balance Update: SENT",
            body: "Asset: SOL ☀️",
            timestamp: 1_700_000_000,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["title"], "Balance Update: SENT");
        assert_eq!(json["body"], "Asset: SOL ☀️");
        assert_eq!(json["timestamp"], 1_700_000_000);
    }

    #[tokio::test]
    async fn test_unreachable_webhook_does_not_panic() {
        // Port 9 (discard) on localhost is closed in test environments.
        let sink = WebhookAlertSink::new("http://127.0.0.1:9/alerts".to_string());
        sink.deliver("Token Update: RECEIVED", "Old Balance: 1.0").await;
    }

    #[tokio::test]
    async fn test_silent_webhook_gives_up_after_timeout() {
        let url = silent_endpoint().await;
        let sink = WebhookAlertSink::new(url).with_timeout(Duration::from_millis(200));

        let started = Instant::now();
        let delivered = tokio::time::timeout(
            Duration::from_secs(5),
            sink.deliver("Balance Update: RECEIVED", "Change: +0.5000 SOL"),
        )
        .await;

        assert!(delivered.is_ok(), "delivery hung past its timeout");
        assert!(started.elapsed() >= Duration::from_millis(200));
    }
}
