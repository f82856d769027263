//! Port type registry: `portnum` tag -> label + decoder.
//!
//! Built once, then shared read-only. Tags missing from the table are not an
//! error; the engine reports them as `UnrecognizedPort`.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::protocol::PortNum;

use super::decoders::{self, DecodeFn};

/// One registered port.
#[derive(Clone, Copy)]
pub struct PortEntry {
    pub port: PortNum,
    pub label: &'static str,
    pub decode: DecodeFn,
}

impl std::fmt::Debug for PortEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortEntry")
            .field("port", &self.port)
            .field("label", &self.label)
            .finish()
    }
}

/// Registry keyed by the raw `i32` tag carried on the wire.
#[derive(Debug, Default, Clone)]
pub struct PortRegistry {
    entries: HashMap<i32, PortEntry>,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry covering every port the relay understands.
    pub fn standard() -> Self {
        let mut r = Self::new();
        r.register(PortNum::UnknownApp, "unknown", decoders::unknown_app);
        r.register(PortNum::TextMessageApp, "text message", decoders::text_message);
        r.register(PortNum::RemoteHardwareApp, "remote hardware", decoders::remote_hardware);
        r.register(PortNum::PositionApp, "position", decoders::position);
        r.register(PortNum::NodeinfoApp, "node info", decoders::node_info);
        r.register(PortNum::RoutingApp, "routing", decoders::routing);
        r.register(PortNum::AdminApp, "admin", decoders::admin);
        r.register(PortNum::TextMessageCompressedApp, "compressed text", decoders::compressed_text);
        r.register(PortNum::WaypointApp, "waypoint", decoders::waypoint);
        r.register(PortNum::AudioApp, "audio", decoders::audio);
        r.register(PortNum::DetectionSensorApp, "detection sensor", decoders::detection_sensor);
        r.register(PortNum::ReplyApp, "reply", decoders::reply);
        r.register(PortNum::IpTunnelApp, "ip tunnel", decoders::ip_tunnel);
        r.register(PortNum::PaxcounterApp, "paxcounter", decoders::paxcounter);
        r.register(PortNum::SerialApp, "serial", decoders::serial);
        r.register(PortNum::StoreForwardApp, "store and forward", decoders::store_forward);
        r.register(PortNum::RangeTestApp, "range test", decoders::range_test);
        r.register(PortNum::TelemetryApp, "telemetry", decoders::telemetry);
        r.register(PortNum::ZpsApp, "zps", decoders::zps);
        r.register(PortNum::SimulatorApp, "simulator", decoders::simulator);
        r.register(PortNum::TracerouteApp, "traceroute", decoders::traceroute);
        r.register(PortNum::NeighborinfoApp, "neighbor info", decoders::neighbor_info);
        r.register(PortNum::AtakPlugin, "atak plugin", decoders::atak_plugin);
        r.register(PortNum::AtakForwarder, "atak forwarder", decoders::atak_forwarder);
        r.register(PortNum::PrivateApp, "private", decoders::private_app);
        r.register(PortNum::MapReportApp, "map report", decoders::map_report);
        r
    }

    /// Add or replace a port. Only used while building the table.
    pub fn register(&mut self, port: PortNum, label: &'static str, decode: DecodeFn) {
        self.entries.insert(port as i32, PortEntry { port, label, decode });
    }

    pub fn lookup(&self, portnum: i32) -> Option<&PortEntry> {
        self.entries.get(&portnum)
    }

    pub fn contains(&self, portnum: i32) -> bool {
        self.entries.contains_key(&portnum)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered tags in ascending order.
    pub fn registered_ports(&self) -> Vec<i32> {
        let mut v: Vec<i32> = self.entries.keys().copied().collect();
        v.sort_unstable();
        v
    }
}

/// Process-wide standard registry.
pub fn standard_registry() -> &'static PortRegistry {
    static REGISTRY: OnceLock<PortRegistry> = OnceLock::new();
    REGISTRY.get_or_init(PortRegistry::standard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_covers_every_known_port() {
        let r = standard_registry();
        assert_eq!(r.len(), PortNum::ALL.len());
        for p in PortNum::ALL {
            assert!(r.contains(p as i32), "missing {}", p.wire_name());
        }
    }

    #[test]
    fn unlisted_tags_are_absent() {
        let r = standard_registry();
        assert!(r.lookup(74).is_none());
        assert!(r.lookup(-1).is_none());
        assert!(r.lookup(511).is_none());
    }
}
