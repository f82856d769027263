//! Per-packet nonce derivation.
//!
//! Layout (16 bytes): packet id as u64 LE, then sender node id as u64 LE.
//! The receiving side rebuilds the same nonce from the same two header
//! fields, so this layout is part of the wire contract.

pub const NONCE_LEN: usize = 16;

/// Build the cipher nonce for a packet.
pub fn build_nonce(packet_id: u32, from_node: u32) -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    nonce[0..8].copy_from_slice(&u64::from(packet_id).to_le_bytes());
    nonce[8..16].copy_from_slice(&u64::from(from_node).to_le_bytes());
    nonce
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_id_then_sender_little_endian() {
        let n = build_nonce(1612906268, 862341900);
        let mut expected = Vec::new();
        expected.extend_from_slice(&1612906268u64.to_le_bytes());
        expected.extend_from_slice(&862341900u64.to_le_bytes());
        assert_eq!(n.to_vec(), expected);
        assert_eq!(n[4..8], [0, 0, 0, 0]);
        assert_eq!(n[12..16], [0, 0, 0, 0]);
    }

    #[test]
    fn deterministic_and_sensitive_to_each_field() {
        assert_eq!(build_nonce(7, 9), build_nonce(7, 9));
        assert_ne!(build_nonce(7, 9), build_nonce(8, 9));
        assert_ne!(build_nonce(7, 9), build_nonce(7, 10));
        // swapping fields must not collide
        assert_ne!(build_nonce(7, 9), build_nonce(9, 7));
    }

    #[test]
    fn extremes() {
        let n = build_nonce(u32::MAX, 0);
        assert_eq!(n[0..4], [0xff; 4]);
        assert_eq!(n[4..16], [0u8; 12]);
    }
}
