//! Transport layer: HTTP ingest and the WebSocket event stream.

pub mod codec;
pub mod http;
pub mod ws;
