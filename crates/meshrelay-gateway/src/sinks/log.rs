use async_trait::async_trait;

use meshrelay_core::Event;

use crate::ingest::EventSink;
use crate::sinks::SinkError;

/// Writes every event as JSON on the `meshrelay::events` target.
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, event: &Event) -> Result<(), SinkError> {
        tracing::info!(target: "meshrelay::events", kind = event.kind(), event = %event.to_json());
        Ok(())
    }
}
