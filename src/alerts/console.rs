use async_trait::async_trait;
use log::info;

use super::AlertSink;

const SEPARATOR_WIDTH: usize = 30;

/// Writes alerts to the log, framed by separator lines.
pub struct ConsoleAlertSink;

impl ConsoleAlertSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleAlertSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlertSink for ConsoleAlertSink {
    async fn deliver(&self, title: &str, body: &str) {
        info!("{}", "=".repeat(SEPARATOR_WIDTH));
        info!("🔔 {} 🔔", title.to_uppercase());
        for line in body.lines() {
            info!("{}", line);
        }
        info!("{}", "=".repeat(SEPARATOR_WIDTH));
    }

    fn name(&self) -> &str {
        "console"
    }
}
