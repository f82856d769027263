//! Port-specific payload shapes.
//!
//! Each struct mirrors the upstream message carried in `Data.payload` for one
//! port. Enums the engine only passes through (hardware model, region, modem
//! preset) are declared as plain `int32` so unknown values never fail to parse.

/// `POSITION_APP`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Position {
    #[prost(sfixed32, optional, tag = "1")]
    pub latitude_i: Option<i32>,
    #[prost(sfixed32, optional, tag = "2")]
    pub longitude_i: Option<i32>,
    #[prost(int32, optional, tag = "3")]
    pub altitude: Option<i32>,
    #[prost(fixed32, tag = "4")]
    pub time: u32,
    #[prost(uint32, optional, tag = "15")]
    pub ground_speed: Option<u32>,
    #[prost(uint32, optional, tag = "16")]
    pub ground_track: Option<u32>,
    #[prost(uint32, tag = "19")]
    pub sats_in_view: u32,
    #[prost(uint32, tag = "23")]
    pub precision_bits: u32,
}

/// `NODEINFO_APP`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct User {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub long_name: String,
    #[prost(string, tag = "3")]
    pub short_name: String,
    #[prost(bytes = "vec", tag = "4")]
    pub macaddr: Vec<u8>,
    #[prost(int32, tag = "5")]
    pub hw_model: i32,
    #[prost(bool, tag = "6")]
    pub is_licensed: bool,
    #[prost(int32, tag = "7")]
    pub role: i32,
    #[prost(bytes = "vec", tag = "8")]
    pub public_key: Vec<u8>,
}

/// Hop list used by route discovery and traceroute.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RouteDiscovery {
    #[prost(fixed32, repeated, tag = "1")]
    pub route: Vec<u32>,
    #[prost(int32, repeated, tag = "2")]
    pub snr_towards: Vec<i32>,
    #[prost(fixed32, repeated, tag = "3")]
    pub route_back: Vec<u32>,
    #[prost(int32, repeated, tag = "4")]
    pub snr_back: Vec<i32>,
}

/// `ROUTING_APP`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Routing {
    #[prost(oneof = "routing::Variant", tags = "1, 2, 3")]
    pub variant: Option<routing::Variant>,
}

pub mod routing {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Variant {
        #[prost(message, tag = "1")]
        RouteRequest(super::RouteDiscovery),
        #[prost(message, tag = "2")]
        RouteReply(super::RouteDiscovery),
        #[prost(int32, tag = "3")]
        ErrorReason(i32),
    }

    /// Upstream `Routing.Error` name for a reason code.
    pub fn error_name(code: i32) -> &'static str {
        match code {
            0 => "NONE",
            1 => "NO_ROUTE",
            2 => "GOT_NAK",
            3 => "TIMEOUT",
            4 => "NO_INTERFACE",
            5 => "MAX_RETRANSMIT",
            6 => "NO_CHANNEL",
            7 => "TOO_LARGE",
            8 => "NO_RESPONSE",
            9 => "DUTY_CYCLE_LIMIT",
            32 => "BAD_REQUEST",
            33 => "NOT_AUTHORIZED",
            34 => "PKI_FAILED",
            35 => "PKI_UNKNOWN_PUBKEY",
            _ => "UNKNOWN",
        }
    }
}

/// `WAYPOINT_APP`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Waypoint {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(sfixed32, optional, tag = "2")]
    pub latitude_i: Option<i32>,
    #[prost(sfixed32, optional, tag = "3")]
    pub longitude_i: Option<i32>,
    #[prost(uint32, tag = "4")]
    pub expire: u32,
    #[prost(uint32, tag = "5")]
    pub locked_to: u32,
    #[prost(string, tag = "6")]
    pub name: String,
    #[prost(string, tag = "7")]
    pub description: String,
    #[prost(fixed32, tag = "8")]
    pub icon: u32,
}

/// `PAXCOUNTER_APP`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Paxcount {
    #[prost(uint32, tag = "1")]
    pub wifi: u32,
    #[prost(uint32, tag = "2")]
    pub ble: u32,
    #[prost(uint32, tag = "3")]
    pub uptime: u32,
}

/// `REMOTE_HARDWARE_APP`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HardwareMessage {
    #[prost(int32, tag = "1")]
    pub r#type: i32,
    #[prost(uint64, tag = "2")]
    pub gpio_mask: u64,
    #[prost(uint64, tag = "3")]
    pub gpio_value: u64,
}

/// `STORE_FORWARD_APP`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StoreAndForward {
    #[prost(int32, tag = "1")]
    pub rr: i32,
    #[prost(oneof = "store_and_forward::Variant", tags = "2, 3, 4, 5")]
    pub variant: Option<store_and_forward::Variant>,
}

pub mod store_and_forward {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Variant {
        #[prost(message, tag = "2")]
        Stats(Statistics),
        #[prost(message, tag = "3")]
        History(History),
        #[prost(message, tag = "4")]
        Heartbeat(Heartbeat),
        #[prost(bytes, tag = "5")]
        Text(Vec<u8>),
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Statistics {
        #[prost(uint32, tag = "1")]
        pub messages_total: u32,
        #[prost(uint32, tag = "2")]
        pub messages_saved: u32,
        #[prost(uint32, tag = "3")]
        pub messages_max: u32,
        #[prost(uint32, tag = "4")]
        pub up_time: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct History {
        #[prost(uint32, tag = "1")]
        pub history_messages: u32,
        #[prost(uint32, tag = "2")]
        pub window: u32,
        #[prost(uint32, tag = "3")]
        pub last_request: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Heartbeat {
        #[prost(uint32, tag = "1")]
        pub period: u32,
        #[prost(uint32, tag = "2")]
        pub secondary: u32,
    }
}

/// `TELEMETRY_APP`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Telemetry {
    #[prost(fixed32, tag = "1")]
    pub time: u32,
    #[prost(oneof = "telemetry::Variant", tags = "2, 3, 5")]
    pub variant: Option<telemetry::Variant>,
}

pub mod telemetry {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Variant {
        #[prost(message, tag = "2")]
        DeviceMetrics(DeviceMetrics),
        #[prost(message, tag = "3")]
        EnvironmentMetrics(EnvironmentMetrics),
        #[prost(message, tag = "5")]
        PowerMetrics(PowerMetrics),
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DeviceMetrics {
        #[prost(uint32, optional, tag = "1")]
        pub battery_level: Option<u32>,
        #[prost(float, optional, tag = "2")]
        pub voltage: Option<f32>,
        #[prost(float, optional, tag = "3")]
        pub channel_utilization: Option<f32>,
        #[prost(float, optional, tag = "4")]
        pub air_util_tx: Option<f32>,
        #[prost(uint32, optional, tag = "5")]
        pub uptime_seconds: Option<u32>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct EnvironmentMetrics {
        #[prost(float, optional, tag = "1")]
        pub temperature: Option<f32>,
        #[prost(float, optional, tag = "2")]
        pub relative_humidity: Option<f32>,
        #[prost(float, optional, tag = "3")]
        pub barometric_pressure: Option<f32>,
        #[prost(float, optional, tag = "4")]
        pub gas_resistance: Option<f32>,
        #[prost(float, optional, tag = "5")]
        pub voltage: Option<f32>,
        #[prost(float, optional, tag = "6")]
        pub current: Option<f32>,
        #[prost(uint32, optional, tag = "7")]
        pub iaq: Option<u32>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PowerMetrics {
        #[prost(float, optional, tag = "1")]
        pub ch1_voltage: Option<f32>,
        #[prost(float, optional, tag = "2")]
        pub ch1_current: Option<f32>,
        #[prost(float, optional, tag = "3")]
        pub ch2_voltage: Option<f32>,
        #[prost(float, optional, tag = "4")]
        pub ch2_current: Option<f32>,
        #[prost(float, optional, tag = "5")]
        pub ch3_voltage: Option<f32>,
        #[prost(float, optional, tag = "6")]
        pub ch3_current: Option<f32>,
    }
}

/// `NEIGHBORINFO_APP`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NeighborInfo {
    #[prost(uint32, tag = "1")]
    pub node_id: u32,
    #[prost(uint32, tag = "2")]
    pub last_sent_by_id: u32,
    #[prost(uint32, tag = "3")]
    pub node_broadcast_interval_secs: u32,
    #[prost(message, repeated, tag = "4")]
    pub neighbors: Vec<Neighbor>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Neighbor {
    #[prost(uint32, tag = "1")]
    pub node_id: u32,
    #[prost(float, tag = "2")]
    pub snr: f32,
    #[prost(fixed32, tag = "3")]
    pub last_rx_time: u32,
    #[prost(uint32, tag = "4")]
    pub node_broadcast_interval_secs: u32,
}

/// `MAP_REPORT_APP` (travels unencrypted on the bus).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MapReport {
    #[prost(string, tag = "1")]
    pub long_name: String,
    #[prost(string, tag = "2")]
    pub short_name: String,
    #[prost(int32, tag = "3")]
    pub role: i32,
    #[prost(int32, tag = "4")]
    pub hw_model: i32,
    #[prost(string, tag = "5")]
    pub firmware_version: String,
    #[prost(int32, tag = "6")]
    pub region: i32,
    #[prost(int32, tag = "7")]
    pub modem_preset: i32,
    #[prost(bool, tag = "8")]
    pub has_default_channel: bool,
    #[prost(sfixed32, tag = "9")]
    pub latitude_i: i32,
    #[prost(sfixed32, tag = "10")]
    pub longitude_i: i32,
    #[prost(int32, tag = "11")]
    pub altitude: i32,
    #[prost(uint32, tag = "12")]
    pub position_precision: u32,
    #[prost(uint32, tag = "13")]
    pub num_online_local_nodes: u32,
}

/// Upstream `Config.DeviceConfig.Role` name for a role code.
pub fn role_name(code: i32) -> &'static str {
    match code {
        0 => "CLIENT",
        1 => "CLIENT_MUTE",
        2 => "ROUTER",
        3 => "ROUTER_CLIENT",
        4 => "REPEATER",
        5 => "TRACKER",
        6 => "SENSOR",
        7 => "TAK",
        8 => "CLIENT_HIDDEN",
        9 => "LOST_AND_FOUND",
        10 => "TAK_TRACKER",
        11 => "ROUTER_LATE",
        _ => "UNKNOWN",
    }
}
