use std::sync::Arc;

use async_trait::async_trait;

use super::AlertSink;

/// Fans every alert out to each registered sink, in registration order.
pub struct CompositeAlertSink {
    sinks: Vec<Arc<dyn AlertSink>>,
}

impl CompositeAlertSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(&mut self, sink: Arc<dyn AlertSink>) {
        self.sinks.push(sink);
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|sink| sink.name()).collect()
    }
}

impl Default for CompositeAlertSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlertSink for CompositeAlertSink {
    async fn deliver(&self, title: &str, body: &str) {
        for sink in &self.sinks {
            sink.deliver(title, body).await;
        }
    }

    fn name(&self) -> &str {
        "composite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    struct RecordingSink {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl AlertSink for RecordingSink {
        async fn deliver(&self, title: &str, _body: &str) {
            self.log.lock().await.push(format!("{}:{}", self.label, title));
        }

        fn name(&self) -> &str {
            self.label
        }
    }

    #[tokio::test]
    async fn test_fans_out_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut composite = CompositeAlertSink::new();
        composite.add_sink(Arc::new(RecordingSink { label: "first", log: log.clone() }));
        composite.add_sink(Arc::new(RecordingSink { label: "second", log: log.clone() }));

        composite.deliver("Balance Update: SENT", "body").await;

        assert_eq!(composite.sink_names(), vec!["first", "second"]);
        assert_eq!(
            *log.lock().await,
            vec![
                "first:Balance Update: SENT".to_string(),
                "second:Balance Update: SENT".to_string()
            ]
        );
    }
}
