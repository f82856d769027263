//! Built-in event sinks.
//!
//! - `log`: one structured tracing line per event
//! - `chat`: chat-protocol lines for the chat relay
//! - `broadcast`: JSON fan-out to WebSocket subscribers

pub mod broadcast;
pub mod chat;
pub mod log;

use thiserror::Error;

pub use broadcast::BroadcastSink;
pub use chat::ChatRelaySink;
pub use log::LogSink;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink queue full")]
    QueueFull,
    #[error("sink closed")]
    Closed,
}
