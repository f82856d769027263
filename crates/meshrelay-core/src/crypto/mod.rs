//! Key normalization, nonce derivation and the stream cipher wrapper.

pub mod cipher;
pub mod key;
pub mod nonce;

pub use cipher::{decrypt, encrypt};
pub use key::{normalize_key, ChannelKey, DEFAULT_CHANNEL_KEY, DEFAULT_KEY_SENTINEL};
pub use nonce::{build_nonce, NONCE_LEN};
