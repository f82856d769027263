use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use meshrelay_core::Event;

use crate::ingest::EventSink;
use crate::sinks::SinkError;

/// Publishes JSON events to WebSocket subscribers.
///
/// Having no subscribers is not a failure; events are simply not retained.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<Arc<str>>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<str>> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl EventSink for BroadcastSink {
    fn name(&self) -> &'static str {
        "broadcast"
    }

    async fn deliver(&self, event: &Event) -> Result<(), SinkError> {
        let _ = self.tx.send(Arc::from(event.to_json()));
        Ok(())
    }
}
