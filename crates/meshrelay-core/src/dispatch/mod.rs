//! Payload dispatch: registry, per-port decoders and the event model.

pub mod decoders;
pub mod event;
pub mod registry;

pub use event::{DecodeStage, Event, PacketHeader};
pub use registry::{standard_registry, PortEntry, PortRegistry};
