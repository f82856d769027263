//! Port-specific decoders.
//!
//! Each decoder takes the packet header and the inner `Data.payload` bytes
//! and produces one `Event` variant. Decoders for ports whose payload is
//! opaque upstream never fail; structured and text ports report a
//! `DecodeFailure` that the engine turns into a `type-decode` diagnostic.

use std::collections::BTreeMap;

use prost::Message;
use thiserror::Error;

use crate::protocol::payloads::{
    role_name, routing, store_and_forward, telemetry, HardwareMessage, MapReport, NeighborInfo,
    Paxcount, Position, RouteDiscovery, Routing, StoreAndForward, Telemetry, User, Waypoint,
};

use super::event::{
    Event, MapReportRecord, NeighborLink, NodeIdentity, PacketHeader, PositionFix, RouteTrace,
    RoutingOutcome, StoreForwardDetail, WaypointRecord,
};

/// Why a registered decoder rejected its payload.
#[derive(Debug, Error)]
pub enum DecodeFailure {
    #[error("protobuf: {0}")]
    Proto(#[from] prost::DecodeError),
    #[error("utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Signature every registry entry points at.
pub type DecodeFn = fn(PacketHeader, &[u8]) -> Result<Event, DecodeFailure>;

const COORD_SCALE: f64 = 1e-7;

fn coord(v: i32) -> f64 {
    f64::from(v) * COORD_SCALE
}

fn utf8(payload: &[u8]) -> Result<String, DecodeFailure> {
    Ok(std::str::from_utf8(payload)?.to_owned())
}

// --------------------
// Opaque ports
// --------------------
pub fn unknown_app(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    Ok(Event::UnknownApp { header, raw: payload.to_vec() })
}

pub fn compressed_text(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    Ok(Event::CompressedText { header, raw: payload.to_vec() })
}

pub fn admin(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    Ok(Event::Admin { header, raw: payload.to_vec() })
}

pub fn audio(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    Ok(Event::Audio { header, raw: payload.to_vec() })
}

pub fn ip_tunnel(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    Ok(Event::IpTunnel { header, raw: payload.to_vec() })
}

pub fn serial(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    Ok(Event::Serial { header, raw: payload.to_vec() })
}

pub fn zps(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    Ok(Event::Zps { header, raw: payload.to_vec() })
}

pub fn simulator(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    Ok(Event::Simulator { header, raw: payload.to_vec() })
}

pub fn atak_plugin(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    Ok(Event::AtakPlugin { header, raw: payload.to_vec() })
}

pub fn atak_forwarder(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    Ok(Event::AtakForwarder { header, raw: payload.to_vec() })
}

pub fn private_app(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    Ok(Event::Private { header, raw: payload.to_vec() })
}

// --------------------
// Text ports
// --------------------
pub fn text_message(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    Ok(Event::TextMessage { header, text: utf8(payload)? })
}

pub fn detection_sensor(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    Ok(Event::DetectionSensor { header, text: utf8(payload)? })
}

pub fn reply(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    Ok(Event::Reply { header, text: utf8(payload)? })
}

pub fn range_test(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    Ok(Event::RangeTest { header, text: utf8(payload)? })
}

// --------------------
// Structured ports
// --------------------
pub fn remote_hardware(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    let msg = HardwareMessage::decode(payload)?;
    Ok(Event::RemoteHardware {
        header,
        command: msg.r#type,
        gpio_mask: msg.gpio_mask,
        gpio_value: msg.gpio_value,
    })
}

pub fn position(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    let p = Position::decode(payload)?;
    Ok(Event::Position {
        header,
        position: PositionFix {
            latitude: p.latitude_i.map(coord),
            longitude: p.longitude_i.map(coord),
            altitude: p.altitude,
            time: p.time,
            ground_speed: p.ground_speed,
            ground_track: p.ground_track,
            sats_in_view: p.sats_in_view,
            precision_bits: p.precision_bits,
        },
    })
}

pub fn node_info(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    let u = User::decode(payload)?;
    let macaddr = u
        .macaddr
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":");
    Ok(Event::NodeInfo {
        header,
        node: NodeIdentity {
            user_id: u.id,
            long_name: u.long_name,
            short_name: u.short_name,
            macaddr,
            hw_model: u.hw_model,
            role: role_name(u.role),
            is_licensed: u.is_licensed,
            public_key: u.public_key,
        },
    })
}

fn route_trace(rd: RouteDiscovery) -> RouteTrace {
    // snr is transmitted as dB * 4
    let scale = |v: &i32| *v as f32 / 4.0;
    RouteTrace {
        snr_towards: rd.snr_towards.iter().map(scale).collect(),
        snr_back: rd.snr_back.iter().map(scale).collect(),
        route: rd.route,
        route_back: rd.route_back,
    }
}

pub fn routing(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    let r = Routing::decode(payload)?;
    let routing = match r.variant {
        Some(routing::Variant::RouteRequest(rd)) => RoutingOutcome::RouteRequest(route_trace(rd)),
        Some(routing::Variant::RouteReply(rd)) => RoutingOutcome::RouteReply(route_trace(rd)),
        Some(routing::Variant::ErrorReason(code)) => RoutingOutcome::Error {
            code,
            reason: routing::error_name(code),
        },
        None => RoutingOutcome::Empty,
    };
    Ok(Event::Routing { header, routing })
}

pub fn waypoint(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    let w = Waypoint::decode(payload)?;
    Ok(Event::Waypoint {
        header,
        waypoint: WaypointRecord {
            waypoint_id: w.id,
            latitude: w.latitude_i.map(coord),
            longitude: w.longitude_i.map(coord),
            expire: w.expire,
            locked_to: w.locked_to,
            name: w.name,
            description: w.description,
            icon: char::from_u32(w.icon).filter(|_| w.icon != 0),
        },
    })
}

pub fn paxcounter(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    let p = Paxcount::decode(payload)?;
    Ok(Event::Paxcounter {
        header,
        wifi: p.wifi,
        ble: p.ble,
        uptime: p.uptime,
    })
}

pub fn store_forward(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    let sf = StoreAndForward::decode(payload)?;
    let detail = match sf.variant {
        Some(store_and_forward::Variant::Stats(s)) => StoreForwardDetail::Stats {
            messages_total: s.messages_total,
            messages_saved: s.messages_saved,
            messages_max: s.messages_max,
            up_time: s.up_time,
        },
        Some(store_and_forward::Variant::History(h)) => StoreForwardDetail::History {
            history_messages: h.history_messages,
            window: h.window,
            last_request: h.last_request,
        },
        Some(store_and_forward::Variant::Heartbeat(h)) => StoreForwardDetail::Heartbeat {
            period: h.period,
            secondary: h.secondary,
        },
        Some(store_and_forward::Variant::Text(t)) => StoreForwardDetail::Text { text: utf8(&t)? },
        None => StoreForwardDetail::Empty,
    };
    Ok(Event::StoreForward {
        header,
        rr: sf.rr,
        detail,
    })
}

fn put_f32(fields: &mut BTreeMap<&'static str, f64>, name: &'static str, v: Option<f32>) {
    if let Some(v) = v {
        fields.insert(name, f64::from(v));
    }
}

fn put_u32(fields: &mut BTreeMap<&'static str, f64>, name: &'static str, v: Option<u32>) {
    if let Some(v) = v {
        fields.insert(name, f64::from(v));
    }
}

pub fn telemetry(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    let t = Telemetry::decode(payload)?;
    let mut fields = BTreeMap::new();
    let metrics = match t.variant {
        Some(telemetry::Variant::DeviceMetrics(m)) => {
            put_u32(&mut fields, "battery_level", m.battery_level);
            put_f32(&mut fields, "voltage", m.voltage);
            put_f32(&mut fields, "channel_utilization", m.channel_utilization);
            put_f32(&mut fields, "air_util_tx", m.air_util_tx);
            put_u32(&mut fields, "uptime_seconds", m.uptime_seconds);
            "device"
        }
        Some(telemetry::Variant::EnvironmentMetrics(m)) => {
            put_f32(&mut fields, "temperature", m.temperature);
            put_f32(&mut fields, "relative_humidity", m.relative_humidity);
            put_f32(&mut fields, "barometric_pressure", m.barometric_pressure);
            put_f32(&mut fields, "gas_resistance", m.gas_resistance);
            put_f32(&mut fields, "voltage", m.voltage);
            put_f32(&mut fields, "current", m.current);
            put_u32(&mut fields, "iaq", m.iaq);
            "environment"
        }
        Some(telemetry::Variant::PowerMetrics(m)) => {
            put_f32(&mut fields, "ch1_voltage", m.ch1_voltage);
            put_f32(&mut fields, "ch1_current", m.ch1_current);
            put_f32(&mut fields, "ch2_voltage", m.ch2_voltage);
            put_f32(&mut fields, "ch2_current", m.ch2_current);
            put_f32(&mut fields, "ch3_voltage", m.ch3_voltage);
            put_f32(&mut fields, "ch3_current", m.ch3_current);
            "power"
        }
        None => "other",
    };
    Ok(Event::Telemetry {
        header,
        time: t.time,
        metrics,
        fields,
    })
}

pub fn traceroute(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    let rd = RouteDiscovery::decode(payload)?;
    Ok(Event::Traceroute {
        header,
        trace: route_trace(rd),
    })
}

pub fn neighbor_info(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    let n = NeighborInfo::decode(payload)?;
    Ok(Event::NeighborInfo {
        header,
        node_id: n.node_id,
        last_sent_by_id: n.last_sent_by_id,
        node_broadcast_interval_secs: n.node_broadcast_interval_secs,
        neighbors: n
            .neighbors
            .into_iter()
            .map(|nb| NeighborLink {
                node_id: nb.node_id,
                snr: nb.snr,
                last_rx_time: nb.last_rx_time,
                node_broadcast_interval_secs: nb.node_broadcast_interval_secs,
            })
            .collect(),
    })
}

pub fn map_report(header: PacketHeader, payload: &[u8]) -> Result<Event, DecodeFailure> {
    let m = MapReport::decode(payload)?;
    Ok(Event::MapReport {
        header,
        report: MapReportRecord {
            long_name: m.long_name,
            short_name: m.short_name,
            role: role_name(m.role),
            hw_model: m.hw_model,
            firmware_version: m.firmware_version,
            region: m.region,
            modem_preset: m.modem_preset,
            has_default_channel: m.has_default_channel,
            latitude: coord(m.latitude_i),
            longitude: coord(m.longitude_i),
            altitude: m.altitude,
            position_precision: m.position_precision,
            num_online_local_nodes: m.num_online_local_nodes,
        },
    })
}
