//! Shared application state.
//!
//! Startup errors (bad key, bad topic filter) are returned as `Result` so the
//! binary can report them instead of panicking.

use std::sync::Arc;

use tokio::sync::mpsc;

use meshrelay_core::error::Result;

use crate::config::RelayConfig;
use crate::ingest::{IngestPolicy, Ingestor};
use crate::obs::RelayMetrics;
use crate::sinks::{BroadcastSink, ChatRelaySink, LogSink};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: RelayConfig,
    ingestor: Ingestor,
    broadcast: BroadcastSink,
    metrics: Arc<RelayMetrics>,
}

impl AppState {
    pub fn new(cfg: RelayConfig) -> Result<Self> {
        let key = cfg.channel.channel_key()?;
        let policy = IngestPolicy::new(&cfg.mqtt.topic_filter, cfg.mqtt.max_envelope_bytes)?;
        let metrics = Arc::new(RelayMetrics::default());

        tracing::info!(
            channel = %cfg.channel.name,
            key = key.describe(),
            topic_filter = %cfg.mqtt.topic_filter,
            "channel configured"
        );

        let ingestor = Ingestor::new(policy, Some(key), Arc::clone(&metrics));
        let broadcast = BroadcastSink::new(cfg.gateway.event_buffer);
        ingestor.register_sink(Arc::new(LogSink::new()));
        ingestor.register_sink(Arc::new(broadcast.clone()));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                ingestor,
                broadcast,
                metrics,
            }),
        })
    }

    /// Register the chat relay sink when `relay.enabled` is set and hand back
    /// the line queue for the chat client to drain.
    pub fn attach_chat_relay(&self) -> Option<mpsc::Receiver<String>> {
        let relay = &self.inner.cfg.relay;
        if !relay.enabled {
            return None;
        }
        let (sink, rx) = ChatRelaySink::new(relay);
        self.inner.ingestor.register_sink(Arc::new(sink));
        tracing::info!(channel = %relay.channel, "chat relay attached");
        Some(rx)
    }

    pub fn cfg(&self) -> &RelayConfig {
        &self.inner.cfg
    }

    pub fn ingestor(&self) -> &Ingestor {
        &self.inner.ingestor
    }

    pub fn broadcast(&self) -> &BroadcastSink {
        &self.inner.broadcast
    }

    pub fn metrics(&self) -> &RelayMetrics {
        &self.inner.metrics
    }

    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![(
            "meshrelay_event_subscribers",
            self.inner.broadcast.subscriber_count() as u64,
        )]
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }
}
