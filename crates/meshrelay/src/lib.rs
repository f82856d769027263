//! Top-level facade crate for meshrelay.
//!
//! Re-exports the decode engine and the gateway library so users can depend on a single crate.

pub mod core {
    pub use meshrelay_core::*;
}

pub mod gateway {
    pub use meshrelay_gateway::*;
}
