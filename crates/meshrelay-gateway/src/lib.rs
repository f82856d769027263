//! meshrelay gateway library entry.
//!
//! Wires ingest policy, the decode engine, sinks, and the HTTP/WebSocket
//! surface into one service. Used by the binary (`main.rs`) and by
//! integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod app_state;
pub mod config;
pub mod ingest;
pub mod obs;
pub mod ops;
pub mod router;
pub mod sinks;
pub mod transport;
