//! meshrelay core: envelope decode, channel decryption and payload dispatch.
//!
//! This crate turns one opaque pub/sub delivery into one normalized `Event`.
//! It carries no transport or runtime dependencies so the gateway, tooling and
//! tests can all drive it directly.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Per-message
//! failures become diagnostic events; only key loading returns a fatal error.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod crypto;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod protocol;

pub use crypto::ChannelKey;
pub use dispatch::{DecodeStage, Event, PacketHeader};
pub use engine::{decode, Engine};
/// Shared result type.
pub use error::{MeshRelayError, Result};
