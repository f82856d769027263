//! Wire-format records (prost).
//!
//! This module hosts the two decode layers the engine walks:
//! - Outer: `ServiceEnvelope` -> `MeshPacket` -> encrypted bytes or `Data`.
//! - Inner: one payload shape per port, selected by `Data.portnum`.
//!
//! Decoding never panics: malformed input is reported as `prost::DecodeError`
//! and turned into a diagnostic event by the engine.

pub mod envelope;
pub mod payloads;
pub mod portnum;

pub use envelope::{mesh_packet, Data, MeshPacket, ServiceEnvelope, BROADCAST_ADDR};
pub use portnum::PortNum;
