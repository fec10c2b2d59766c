//! Alert delivery.
//!
//! Every sink implements [`AlertSink`]: one titled message in, nothing out. Sinks
//! report their own failures through the log and never hand them back to the
//! monitor loop.

pub mod composite;
pub mod console;
pub mod format;
pub mod telegram;
pub mod webhook;

use async_trait::async_trait;
use log::warn;
use std::time::Duration;

pub use composite::CompositeAlertSink;
pub use console::ConsoleAlertSink;
pub use format::{format_body, format_title, render};
pub use telegram::TelegramAlertSink;
pub use webhook::WebhookAlertSink;

/// Upper bound on a single HTTP delivery, connect through response.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client shared by the network sinks. Requests also carry `timeout`
/// individually, so the fallback client is bounded too.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder()
        .timeout(timeout)
        .user_agent("wallet-sentinel/0.1")
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!("Failed to build HTTP client, using defaults: {}", e);
            reqwest::Client::new()
        }
    }
}

#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, title: &str, body: &str);

    fn name(&self) -> &str;
}
