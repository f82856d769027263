use serde::Deserialize;

use meshrelay_core::crypto::ChannelKey;
use meshrelay_core::error::{MeshRelayError, Result};

use crate::ingest::policy::TopicFilter;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    pub version: u32,

    #[serde(default)]
    pub channel: ChannelSection,

    #[serde(default)]
    pub mqtt: MqttSection,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub relay: RelaySection,
}

impl RelayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MeshRelayError::BadConfig(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.channel.validate()?;
        self.mqtt.validate()?;
        self.gateway.validate()?;
        self.relay.validate()?;

        Ok(())
    }
}

// --------------------
// channel
// --------------------
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelSection {
    #[serde(default = "default_channel_name")]
    pub name: String,

    /// Base64 key (standard or URL-safe, padding optional). `AQ==` is the
    /// public default; empty means the channel is unencrypted.
    #[serde(default = "default_channel_key")]
    pub key: String,
}

impl Default for ChannelSection {
    fn default() -> Self {
        Self {
            name: default_channel_name(),
            key: default_channel_key(),
        }
    }
}

impl ChannelSection {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(MeshRelayError::BadConfig("channel.name must not be empty".into()));
        }
        self.channel_key().map(|_| ())
    }

    /// Normalize the configured key. A bad key is fatal to startup.
    pub fn channel_key(&self) -> Result<ChannelKey> {
        ChannelKey::parse(&self.key)
    }
}

fn default_channel_name() -> String {
    "LongFast".into()
}
fn default_channel_key() -> String {
    meshrelay_core::crypto::DEFAULT_KEY_SENTINEL.into()
}

// --------------------
// mqtt (ingest side)
// --------------------
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MqttSection {
    #[serde(default = "default_topic_filter")]
    pub topic_filter: String,

    #[serde(default = "default_max_envelope_bytes")]
    pub max_envelope_bytes: usize,
}

impl Default for MqttSection {
    fn default() -> Self {
        Self {
            topic_filter: default_topic_filter(),
            max_envelope_bytes: default_max_envelope_bytes(),
        }
    }
}

impl MqttSection {
    pub fn validate(&self) -> Result<()> {
        TopicFilter::compile(&self.topic_filter)?;
        if !(64..=65536).contains(&self.max_envelope_bytes) {
            return Err(MeshRelayError::BadConfig(
                "mqtt.max_envelope_bytes must be between 64 and 65536".into(),
            ));
        }
        Ok(())
    }
}

fn default_topic_filter() -> String {
    "msh/#".into()
}
fn default_max_envelope_bytes() -> usize {
    4096
}

// --------------------
// gateway (HTTP / WS surface)
// --------------------
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(MeshRelayError::BadConfig(format!(
                "gateway.listen must be a socket address: {}",
                self.listen
            )));
        }
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(MeshRelayError::BadConfig(
                "gateway.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if !(10000..=600000).contains(&self.idle_timeout_ms) {
            return Err(MeshRelayError::BadConfig(
                "gateway.idle_timeout_ms must be between 10000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(MeshRelayError::BadConfig(
                "gateway.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if self.event_buffer == 0 {
            return Err(MeshRelayError::BadConfig("gateway.event_buffer must be > 0".into()));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}
fn default_event_buffer() -> usize {
    1024
}

// --------------------
// relay (chat protocol side)
// --------------------
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelaySection {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_relay_channel")]
    pub channel: String,

    /// Chat lines are cut to this many bytes (510 leaves room for CRLF).
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,

    #[serde(default)]
    pub include_diagnostics: bool,

    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            enabled: false,
            channel: default_relay_channel(),
            max_line_bytes: default_max_line_bytes(),
            include_diagnostics: false,
            queue_depth: default_queue_depth(),
        }
    }
}

impl RelaySection {
    pub fn validate(&self) -> Result<()> {
        if !self.channel.starts_with('#') {
            return Err(MeshRelayError::BadConfig(
                "relay.channel must start with '#'".into(),
            ));
        }
        if !(64..=510).contains(&self.max_line_bytes) {
            return Err(MeshRelayError::BadConfig(
                "relay.max_line_bytes must be between 64 and 510".into(),
            ));
        }
        if self.queue_depth == 0 {
            return Err(MeshRelayError::BadConfig("relay.queue_depth must be > 0".into()));
        }
        Ok(())
    }
}

fn default_relay_channel() -> String {
    "#meshtastic".into()
}
fn default_max_line_bytes() -> usize {
    510
}
fn default_queue_depth() -> usize {
    256
}
