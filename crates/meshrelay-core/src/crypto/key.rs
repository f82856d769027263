//! Channel key normalization.
//!
//! Keys are shared out of band as base64 text. Users paste standard or
//! URL-safe alphabets, with or without `=` padding; all spellings of the same
//! bytes normalize to the same key.

use std::fmt;
use std::str::FromStr;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use base64::Engine as _;

use crate::error::{MeshRelayError, Result};

/// Shorthand that selects the public default channel key.
pub const DEFAULT_KEY_SENTINEL: &str = "AQ==";

// Pasted keys sometimes carry non-zero bits past the last full byte; those
// bits are ignored rather than rejected.
const KEY_BASE64: GeneralPurpose =
    GeneralPurpose::new(&alphabet::STANDARD, PAD.with_decode_allow_trailing_bits(true));

/// Public default channel key published by the mesh firmware.
pub const DEFAULT_CHANNEL_KEY: [u8; 16] = [
    0xd4, 0xf1, 0xbb, 0x3a, 0x20, 0x29, 0x07, 0x59, 0xf0, 0xbc, 0xff, 0xab, 0xcf, 0x4e, 0x69, 0x01,
];

/// Normalized symmetric key for one mesh channel.
///
/// Loaded once per session and shared read-only by every decode call.
#[derive(Clone, PartialEq, Eq)]
pub enum ChannelKey {
    /// Empty key: the channel is unencrypted and payload bytes pass through.
    Open,
    Aes128([u8; 16]),
    Aes256([u8; 32]),
}

impl ChannelKey {
    /// The public default key (`AQ==`).
    pub fn default_key() -> Self {
        ChannelKey::Aes128(DEFAULT_CHANNEL_KEY)
    }

    /// Build a key from raw bytes. Accepts 0, 16 or 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            0 => Ok(ChannelKey::Open),
            16 => {
                let mut k = [0u8; 16];
                k.copy_from_slice(bytes);
                Ok(ChannelKey::Aes128(k))
            }
            32 => {
                let mut k = [0u8; 32];
                k.copy_from_slice(bytes);
                Ok(ChannelKey::Aes256(k))
            }
            n => Err(MeshRelayError::KeyFormat(format!(
                "decoded key is {n} bytes (expected 0, 16 or 32)"
            ))),
        }
    }

    /// Normalize a user-supplied key string.
    pub fn parse(input: &str) -> Result<Self> {
        Self::from_bytes(&normalize_key(input)?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ChannelKey::Open => &[],
            ChannelKey::Aes128(k) => k,
            ChannelKey::Aes256(k) => k,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, ChannelKey::Aes128(k) if *k == DEFAULT_CHANNEL_KEY)
    }

    /// Short label for logs; never includes key material.
    pub fn describe(&self) -> &'static str {
        match self {
            ChannelKey::Open => "open",
            ChannelKey::Aes128(_) if self.is_default() => "aes128(default)",
            ChannelKey::Aes128(_) => "aes128",
            ChannelKey::Aes256(_) => "aes256",
        }
    }
}

impl fmt::Debug for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelKey({})", self.describe())
    }
}

impl FromStr for ChannelKey {
    type Err = MeshRelayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Turn a base64-family key string into raw key bytes.
///
/// Steps: sentinel check, `=` padding to a multiple of 4, URL-safe to
/// standard alphabet, strict base64 decode, length check.
pub fn normalize_key(input: &str) -> Result<Vec<u8>> {
    if input == DEFAULT_KEY_SENTINEL {
        return Ok(DEFAULT_CHANNEL_KEY.to_vec());
    }

    let mut s: String = input
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while s.len() % 4 != 0 {
        s.push('=');
    }

    let bytes = KEY_BASE64
        .decode(s.as_bytes())
        .map_err(|e| MeshRelayError::KeyFormat(format!("invalid base64: {e}")))?;

    // unpadded spelling of the sentinel
    if bytes == [0x01] {
        return Ok(DEFAULT_CHANNEL_KEY.to_vec());
    }

    match bytes.len() {
        0 | 16 | 32 => Ok(bytes),
        n => Err(MeshRelayError::KeyFormat(format!(
            "decoded key is {n} bytes (expected 16 or 32)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn sentinel_expands_to_default_key() {
        assert_eq!(normalize_key("AQ==").unwrap(), DEFAULT_CHANNEL_KEY.to_vec());
        assert_eq!(normalize_key("AQ").unwrap(), DEFAULT_CHANNEL_KEY.to_vec());
        assert!(ChannelKey::parse("AQ==").unwrap().is_default());
    }

    #[test]
    fn default_key_spelled_out_matches_sentinel() {
        let spelled = normalize_key("1PG7OiApB1nwvP+rz05pAQ==").unwrap();
        assert_eq!(spelled, DEFAULT_CHANNEL_KEY.to_vec());
    }

    #[test]
    fn url_safe_and_unpadded_spellings_agree() {
        // 16 bytes containing 0xfb/0xff so the alphabets actually differ
        let standard = "+/+/AAAAAAAAAAAAAAAAAA==";
        let url_safe = "-_-_AAAAAAAAAAAAAAAAAA==";
        let unpadded = "-_-_AAAAAAAAAAAAAAAAAA";

        let a = normalize_key(standard).unwrap();
        assert_eq!(a.len(), 16);
        assert_eq!(normalize_key(url_safe).unwrap(), a);
        assert_eq!(normalize_key(unpadded).unwrap(), a);
    }

    #[test]
    fn normalization_is_idempotent_on_standard_input() {
        let key = "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=";
        let once = normalize_key(key).unwrap();
        assert_eq!(once.len(), 32);
        assert_eq!(normalize_key(key).unwrap(), once);
    }

    #[test]
    fn non_canonical_trailing_bits_are_ignored() {
        // last symbol differs from the canonical encoding only in unused bits
        assert_eq!(
            normalize_key("1PG7OiApB1nwvP+rz05pAR==").unwrap(),
            DEFAULT_CHANNEL_KEY.to_vec()
        );
        assert_eq!(normalize_key("1PG7OiApB1nwvP-rz05pAR").unwrap(), DEFAULT_CHANNEL_KEY.to_vec());
        assert_eq!(normalize_key("AR").unwrap(), DEFAULT_CHANNEL_KEY.to_vec());
    }

    #[test]
    fn empty_key_is_open_channel() {
        assert_eq!(ChannelKey::parse("").unwrap(), ChannelKey::Open);
    }

    #[test]
    fn rejects_wrong_length_and_bad_alphabet() {
        let short = normalize_key("AAAAAAAA").unwrap_err();
        assert_eq!(short.code().as_str(), "KEY_FORMAT");
        assert!(short.is_fatal());

        let bad = normalize_key("not*base64!").unwrap_err();
        assert_eq!(bad.code().as_str(), "KEY_FORMAT");
    }

    #[test]
    fn debug_output_redacts_key_material() {
        let k = ChannelKey::default_key();
        assert_eq!(format!("{k:?}"), "ChannelKey(aes128(default))");
    }
}
