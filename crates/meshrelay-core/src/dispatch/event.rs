//! Normalized dispatch outcomes.
//!
//! Every decode call yields exactly one `Event`: a typed record for a
//! recognized port, `UnrecognizedPort` for a tag the registry does not know,
//! or `MalformedPayload` naming the stage that failed.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::protocol::{MeshPacket, ServiceEnvelope, BROADCAST_ADDR};

/// Where in the pipeline a decode failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DecodeStage {
    /// Outer envelope or packet structure.
    #[serde(rename = "envelope")]
    Envelope,
    /// Encrypted packet could not be decrypted (no key configured).
    #[serde(rename = "decrypt")]
    Decrypt,
    /// Decrypted bytes are not a `Data` record.
    #[serde(rename = "payload-decode")]
    PayloadDecode,
    /// Port-specific bytes do not match the registered shape.
    #[serde(rename = "type-decode")]
    TypeDecode,
}

impl DecodeStage {
    pub fn as_str(self) -> &'static str {
        match self {
            DecodeStage::Envelope => "envelope",
            DecodeStage::Decrypt => "decrypt",
            DecodeStage::PayloadDecode => "payload-decode",
            DecodeStage::TypeDecode => "type-decode",
        }
    }
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Packet fields copied onto every record so sinks can correlate sender and
/// recipient without re-parsing the envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PacketHeader {
    pub from: u32,
    pub to: u32,
    pub id: u32,
    pub channel: u32,
    pub hop_limit: u32,
    pub hop_start: u32,
    pub want_ack: bool,
    pub rx_time: u32,
    pub rx_snr: f32,
    pub rx_rssi: i32,
    pub via_mqtt: bool,
    /// True when the packet arrived in the encrypted state.
    pub encrypted: bool,
    pub channel_id: String,
    pub gateway_id: String,
}

impl PacketHeader {
    pub fn new(envelope: &ServiceEnvelope, packet: &MeshPacket, encrypted: bool) -> Self {
        Self {
            from: packet.from,
            to: packet.to,
            id: packet.id,
            channel: packet.channel,
            hop_limit: packet.hop_limit,
            hop_start: packet.hop_start,
            want_ack: packet.want_ack,
            rx_time: packet.rx_time,
            rx_snr: packet.rx_snr,
            rx_rssi: packet.rx_rssi,
            via_mqtt: packet.via_mqtt,
            encrypted,
            channel_id: envelope.channel_id.clone(),
            gateway_id: envelope.gateway_id.clone(),
        }
    }

    pub fn is_broadcast(&self) -> bool {
        self.to == BROADCAST_ADDR
    }
}

/// Upstream node id spelling (`!33664b0c`).
pub fn node_id(num: u32) -> String {
    format!("!{num:08x}")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionFix {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<i32>,
    pub time: u32,
    pub ground_speed: Option<u32>,
    pub ground_track: Option<u32>,
    pub sats_in_view: u32,
    pub precision_bits: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeIdentity {
    pub user_id: String,
    pub long_name: String,
    pub short_name: String,
    pub macaddr: String,
    pub hw_model: i32,
    pub role: &'static str,
    pub is_licensed: bool,
    #[serde(with = "b64")]
    pub public_key: Vec<u8>,
}

/// Hop list with SNR in dB (upstream stores SNR * 4).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteTrace {
    pub route: Vec<u32>,
    pub snr_towards: Vec<f32>,
    pub route_back: Vec<u32>,
    pub snr_back: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum RoutingOutcome {
    RouteRequest(RouteTrace),
    RouteReply(RouteTrace),
    Error { code: i32, reason: &'static str },
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaypointRecord {
    pub waypoint_id: u32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub expire: u32,
    pub locked_to: u32,
    pub name: String,
    pub description: String,
    pub icon: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum StoreForwardDetail {
    Stats {
        messages_total: u32,
        messages_saved: u32,
        messages_max: u32,
        up_time: u32,
    },
    History {
        history_messages: u32,
        window: u32,
        last_request: u32,
    },
    Heartbeat { period: u32, secondary: u32 },
    Text { text: String },
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborLink {
    pub node_id: u32,
    pub snr: f32,
    pub last_rx_time: u32,
    pub node_broadcast_interval_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapReportRecord {
    pub long_name: String,
    pub short_name: String,
    pub role: &'static str,
    pub hw_model: i32,
    pub firmware_version: String,
    pub region: i32,
    pub modem_preset: i32,
    pub has_default_channel: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: i32,
    pub position_precision: u32,
    pub num_online_local_nodes: u32,
}

/// One dispatch outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    UnknownApp {
        #[serde(flatten)]
        header: PacketHeader,
        #[serde(with = "b64")]
        raw: Vec<u8>,
    },
    TextMessage {
        #[serde(flatten)]
        header: PacketHeader,
        text: String,
    },
    CompressedText {
        #[serde(flatten)]
        header: PacketHeader,
        #[serde(with = "b64")]
        raw: Vec<u8>,
    },
    RemoteHardware {
        #[serde(flatten)]
        header: PacketHeader,
        command: i32,
        gpio_mask: u64,
        gpio_value: u64,
    },
    Position {
        #[serde(flatten)]
        header: PacketHeader,
        position: PositionFix,
    },
    NodeInfo {
        #[serde(flatten)]
        header: PacketHeader,
        node: NodeIdentity,
    },
    Routing {
        #[serde(flatten)]
        header: PacketHeader,
        routing: RoutingOutcome,
    },
    Admin {
        #[serde(flatten)]
        header: PacketHeader,
        #[serde(with = "b64")]
        raw: Vec<u8>,
    },
    Waypoint {
        #[serde(flatten)]
        header: PacketHeader,
        waypoint: WaypointRecord,
    },
    Audio {
        #[serde(flatten)]
        header: PacketHeader,
        #[serde(with = "b64")]
        raw: Vec<u8>,
    },
    DetectionSensor {
        #[serde(flatten)]
        header: PacketHeader,
        text: String,
    },
    Reply {
        #[serde(flatten)]
        header: PacketHeader,
        text: String,
    },
    IpTunnel {
        #[serde(flatten)]
        header: PacketHeader,
        #[serde(with = "b64")]
        raw: Vec<u8>,
    },
    Paxcounter {
        #[serde(flatten)]
        header: PacketHeader,
        wifi: u32,
        ble: u32,
        uptime: u32,
    },
    Serial {
        #[serde(flatten)]
        header: PacketHeader,
        #[serde(with = "b64")]
        raw: Vec<u8>,
    },
    StoreForward {
        #[serde(flatten)]
        header: PacketHeader,
        rr: i32,
        detail: StoreForwardDetail,
    },
    RangeTest {
        #[serde(flatten)]
        header: PacketHeader,
        text: String,
    },
    Telemetry {
        #[serde(flatten)]
        header: PacketHeader,
        time: u32,
        metrics: &'static str,
        fields: BTreeMap<&'static str, f64>,
    },
    Zps {
        #[serde(flatten)]
        header: PacketHeader,
        #[serde(with = "b64")]
        raw: Vec<u8>,
    },
    Simulator {
        #[serde(flatten)]
        header: PacketHeader,
        #[serde(with = "b64")]
        raw: Vec<u8>,
    },
    Traceroute {
        #[serde(flatten)]
        header: PacketHeader,
        trace: RouteTrace,
    },
    NeighborInfo {
        #[serde(flatten)]
        header: PacketHeader,
        node_id: u32,
        last_sent_by_id: u32,
        node_broadcast_interval_secs: u32,
        neighbors: Vec<NeighborLink>,
    },
    AtakPlugin {
        #[serde(flatten)]
        header: PacketHeader,
        #[serde(with = "b64")]
        raw: Vec<u8>,
    },
    AtakForwarder {
        #[serde(flatten)]
        header: PacketHeader,
        #[serde(with = "b64")]
        raw: Vec<u8>,
    },
    Private {
        #[serde(flatten)]
        header: PacketHeader,
        #[serde(with = "b64")]
        raw: Vec<u8>,
    },
    MapReport {
        #[serde(flatten)]
        header: PacketHeader,
        report: MapReportRecord,
    },
    /// Tag not in the registry; bytes are passed through untouched.
    UnrecognizedPort {
        #[serde(flatten)]
        header: PacketHeader,
        portnum: i32,
        #[serde(with = "b64")]
        raw: Vec<u8>,
    },
    /// Diagnostic: the message was dropped at `stage`.
    MalformedPayload {
        #[serde(flatten)]
        header: Option<PacketHeader>,
        stage: DecodeStage,
        portnum: Option<i32>,
        reason: String,
    },
}

impl Event {
    /// Stable snake_case label (matches the serialized `kind`).
    pub fn kind(&self) -> &'static str {
        match self {
            Event::UnknownApp { .. } => "unknown_app",
            Event::TextMessage { .. } => "text_message",
            Event::CompressedText { .. } => "compressed_text",
            Event::RemoteHardware { .. } => "remote_hardware",
            Event::Position { .. } => "position",
            Event::NodeInfo { .. } => "node_info",
            Event::Routing { .. } => "routing",
            Event::Admin { .. } => "admin",
            Event::Waypoint { .. } => "waypoint",
            Event::Audio { .. } => "audio",
            Event::DetectionSensor { .. } => "detection_sensor",
            Event::Reply { .. } => "reply",
            Event::IpTunnel { .. } => "ip_tunnel",
            Event::Paxcounter { .. } => "paxcounter",
            Event::Serial { .. } => "serial",
            Event::StoreForward { .. } => "store_forward",
            Event::RangeTest { .. } => "range_test",
            Event::Telemetry { .. } => "telemetry",
            Event::Zps { .. } => "zps",
            Event::Simulator { .. } => "simulator",
            Event::Traceroute { .. } => "traceroute",
            Event::NeighborInfo { .. } => "neighbor_info",
            Event::AtakPlugin { .. } => "atak_plugin",
            Event::AtakForwarder { .. } => "atak_forwarder",
            Event::Private { .. } => "private",
            Event::MapReport { .. } => "map_report",
            Event::UnrecognizedPort { .. } => "unrecognized_port",
            Event::MalformedPayload { .. } => "malformed_payload",
        }
    }

    /// Packet header, absent only when the envelope itself failed to parse.
    pub fn header(&self) -> Option<&PacketHeader> {
        match self {
            Event::UnknownApp { header, .. }
            | Event::TextMessage { header, .. }
            | Event::CompressedText { header, .. }
            | Event::RemoteHardware { header, .. }
            | Event::Position { header, .. }
            | Event::NodeInfo { header, .. }
            | Event::Routing { header, .. }
            | Event::Admin { header, .. }
            | Event::Waypoint { header, .. }
            | Event::Audio { header, .. }
            | Event::DetectionSensor { header, .. }
            | Event::Reply { header, .. }
            | Event::IpTunnel { header, .. }
            | Event::Paxcounter { header, .. }
            | Event::Serial { header, .. }
            | Event::StoreForward { header, .. }
            | Event::RangeTest { header, .. }
            | Event::Telemetry { header, .. }
            | Event::Zps { header, .. }
            | Event::Simulator { header, .. }
            | Event::Traceroute { header, .. }
            | Event::NeighborInfo { header, .. }
            | Event::AtakPlugin { header, .. }
            | Event::AtakForwarder { header, .. }
            | Event::Private { header, .. }
            | Event::MapReport { header, .. }
            | Event::UnrecognizedPort { header, .. } => Some(header),
            Event::MalformedPayload { header, .. } => header.as_ref(),
        }
    }

    /// True for the two diagnostic outcomes.
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            Event::UnrecognizedPort { .. } | Event::MalformedPayload { .. }
        )
    }

    /// JSON rendering used by sinks and the HTTP surface.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"kind":"{}","encode_error":"{}"}}"#, self.kind(), e)
        })
    }
}

/// Serialize raw byte payloads as standard base64 strings.
mod b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }
}
