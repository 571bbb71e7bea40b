use sha2::{Digest, Sha256};

/// Derive the per-draw random value from the entropy of a block.
///
/// `mixed = sha256( entropy || draw_id_u64_be )`
///
/// Draws revealed against the same block share `entropy`; folding in the
/// draw id gives each of them an independent value.
pub fn mix_entropy(entropy: &[u8], draw_id: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(entropy);
    hasher.update(draw_id.to_be_bytes());
    hasher.finalize().into()
}

/// Reduce mixed randomness to a ticket in `[0, total_weight)`.
///
/// Uses the first 16 bytes as a big-endian u128. Returns `None` when
/// `total_weight` is zero.
pub fn winning_ticket(mixed: &[u8; 32], total_weight: u128) -> Option<u128> {
    if total_weight == 0 {
        return None;
    }
    let mut ticket_bytes = [0u8; 16];
    ticket_bytes.copy_from_slice(&mixed[0..16]);
    Some(u128::from_be_bytes(ticket_bytes) % total_weight)
}
