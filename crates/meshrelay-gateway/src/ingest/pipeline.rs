use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use meshrelay_core::crypto::ChannelKey;
use meshrelay_core::{Engine, Event};

use crate::ingest::policy::{IngestPolicy, PolicyDecision};
use crate::obs::RelayMetrics;
use crate::sinks::SinkError;

/// One message handed over by the pub/sub collaborator.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub topic: String,
    pub payload: Bytes,
}

impl Delivery {
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Consumer of decoded events.
#[async_trait]
pub trait EventSink: Send + Sync {
    fn name(&self) -> &'static str;
    async fn deliver(&self, event: &Event) -> Result<(), SinkError>;
}

#[derive(Debug, Clone)]
pub enum IngestOutcome {
    Dropped { reason: &'static str },
    Decoded(Arc<Event>),
}

/// Runs every delivery through policy and the engine, then fans the event
/// out to all registered sinks.
pub struct Ingestor {
    policy: IngestPolicy,
    engine: Engine<'static>,
    key: Option<ChannelKey>,
    metrics: Arc<RelayMetrics>,
    sinks: DashMap<&'static str, Arc<dyn EventSink>>,
}

impl Ingestor {
    pub fn new(policy: IngestPolicy, key: Option<ChannelKey>, metrics: Arc<RelayMetrics>) -> Self {
        Self {
            policy,
            engine: Engine::standard(),
            key,
            metrics,
            sinks: DashMap::new(),
        }
    }

    pub fn with_engine(mut self, engine: Engine<'static>) -> Self {
        self.engine = engine;
        self
    }

    /// Register a sink; a sink with the same name is replaced.
    pub fn register_sink(&self, sink: Arc<dyn EventSink>) {
        self.sinks.insert(sink.name(), sink);
    }

    pub fn registered_sinks(&self) -> Vec<&'static str> {
        let mut v: Vec<&'static str> = self.sinks.iter().map(|e| *e.key()).collect();
        v.sort_unstable();
        v
    }

    pub fn metrics(&self) -> &RelayMetrics {
        &self.metrics
    }

    pub async fn ingest(&self, delivery: Delivery) -> IngestOutcome {
        if let PolicyDecision::Drop { reason } =
            self.policy.check(&delivery.topic, delivery.payload.len())
        {
            self.metrics.policy_drops.inc(&[("reason", reason)]);
            tracing::debug!(topic = %delivery.topic, bytes = delivery.payload.len(), reason, "delivery dropped");
            return IngestOutcome::Dropped { reason };
        }

        let started = Instant::now();
        let event = self.engine.decode(&delivery.payload, self.key.as_ref());
        self.metrics.decode_duration.observe(&[], started.elapsed());

        self.observe(&delivery.topic, &event);

        let event = Arc::new(event);
        self.fan_out(&event).await;
        IngestOutcome::Decoded(event)
    }

    fn observe(&self, topic: &str, event: &Event) {
        let kind = event.kind();
        self.metrics.events.inc(&[("kind", kind)]);

        let from = event.header().map(|h| h.from).unwrap_or(0);
        let id = event.header().map(|h| h.id).unwrap_or(0);
        match event {
            Event::MalformedPayload {
                stage,
                portnum,
                reason,
                ..
            } => {
                self.metrics.malformed.inc(&[("stage", stage.as_str())]);
                tracing::warn!(%topic, from, id, stage = stage.as_str(), ?portnum, %reason, "malformed payload");
            }
            Event::UnrecognizedPort { portnum, raw, .. } => {
                let p = portnum.to_string();
                self.metrics.unrecognized.inc(&[("portnum", p.as_str())]);
                tracing::info!(%topic, from, id, portnum, bytes = raw.len(), "unrecognized port");
            }
            _ => {
                tracing::debug!(%topic, from, id, kind, "event decoded");
            }
        }
    }

    async fn fan_out(&self, event: &Event) {
        // Snapshot first so no map guard is held across an await.
        let sinks: Vec<Arc<dyn EventSink>> = self.sinks.iter().map(|e| Arc::clone(e.value())).collect();
        for sink in sinks {
            if let Err(e) = sink.deliver(event).await {
                self.metrics.sink_errors.inc(&[("sink", sink.name())]);
                tracing::warn!(sink = sink.name(), kind = event.kind(), error = %e, "sink delivery failed");
            }
        }
    }
}
