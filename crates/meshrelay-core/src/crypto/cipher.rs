//! AES-CTR keystream application.
//!
//! Counter mode with a 128-bit big-endian counter seeded by the packet nonce.
//! No padding and no tag: output length always equals input length, and a
//! wrong key yields garbage rather than an error. Callers detect that only
//! through the structured decode that follows.

use aes::cipher::{KeyIvInit, StreamCipher};

use super::key::ChannelKey;
use super::nonce::NONCE_LEN;

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;
type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

/// Decrypt packet bytes. Identity for an open channel.
pub fn decrypt(key: &ChannelKey, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Vec<u8> {
    let mut out = ciphertext.to_vec();
    apply_keystream(key, nonce, &mut out);
    out
}

/// Encrypt packet bytes (same keystream as `decrypt`).
pub fn encrypt(key: &ChannelKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Vec<u8> {
    let mut out = plaintext.to_vec();
    apply_keystream(key, nonce, &mut out);
    out
}

fn apply_keystream(key: &ChannelKey, nonce: &[u8; NONCE_LEN], buf: &mut [u8]) {
    match key {
        ChannelKey::Open => {}
        ChannelKey::Aes128(k) => {
            let mut cipher = Aes128Ctr::new(&(*k).into(), &(*nonce).into());
            cipher.apply_keystream(buf);
        }
        ChannelKey::Aes256(k) => {
            let mut cipher = Aes256Ctr::new(&(*k).into(), &(*nonce).into());
            cipher.apply_keystream(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::nonce::build_nonce;

    fn plaintext(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[test]
    fn round_trip_preserves_bytes_for_boundary_lengths() {
        let key = ChannelKey::default_key();
        let nonce = build_nonce(1612906268, 862341900);
        for len in [0usize, 1, 16, 17, 255] {
            let pt = plaintext(len);
            let ct = encrypt(&key, &nonce, &pt);
            assert_eq!(ct.len(), len);
            if len > 0 {
                assert_ne!(ct, pt, "len={len}");
            }
            assert_eq!(decrypt(&key, &nonce, &ct), pt, "len={len}");
        }
    }

    #[test]
    fn aes256_round_trip() {
        let key = ChannelKey::Aes256([0x42; 32]);
        let nonce = build_nonce(1, 2);
        let pt = plaintext(40);
        assert_eq!(decrypt(&key, &nonce, &encrypt(&key, &nonce, &pt)), pt);
    }

    #[test]
    fn wrong_key_yields_same_length_garbage() {
        let nonce = build_nonce(99, 100);
        let pt = plaintext(32);
        let ct = encrypt(&ChannelKey::default_key(), &nonce, &pt);
        let garbage = decrypt(&ChannelKey::Aes128([0x11; 16]), &nonce, &ct);
        assert_eq!(garbage.len(), pt.len());
        assert_ne!(garbage, pt);
    }

    #[test]
    fn wrong_nonce_yields_garbage() {
        let key = ChannelKey::default_key();
        let pt = plaintext(32);
        let ct = encrypt(&key, &build_nonce(1, 2), &pt);
        assert_ne!(decrypt(&key, &build_nonce(2, 1), &ct), pt);
    }

    #[test]
    fn open_channel_is_identity() {
        let pt = plaintext(20);
        assert_eq!(decrypt(&ChannelKey::Open, &build_nonce(1, 1), &pt), pt);
    }
}
