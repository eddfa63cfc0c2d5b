//! Signed off-ledger share approvals.

use serde::{Deserialize, Serialize};

use crate::domain::{Account, Amount, Timestamp};

/// A 64-byte detached signature over an [`ApprovalMessage`].
///
/// The engine never interprets the bytes; only the host's
/// [`ApprovalVerifier`] does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "serde_bytes_64")] pub [u8; 64]);

/// The message a share owner signs to grant a spender an allowance
/// without submitting a transaction themselves.
///
/// `nonce` must equal the owner's current approval nonce; each accepted
/// approval increments it, so a message can never be replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalMessage {
    /// The share owner granting the allowance.
    pub owner: Account,
    /// The account allowed to spend the owner's shares.
    pub spender: Account,
    /// The allowance being granted.
    pub shares: Amount,
    /// The owner's current approval nonce.
    pub nonce: u64,
    /// Instant after which the approval is void.
    pub expiry: Timestamp,
}

/// Verifies that a signature was produced by the message's owner.
///
/// The concrete scheme (curve, domain separation, message encoding) is
/// the host's business; the engine only asks "did `message.owner` sign
/// this?".
pub trait ApprovalVerifier {
    /// Returns `true` when `signature` is a valid signature of
    /// `message` by `message.owner`.
    fn verify(&self, message: &ApprovalMessage, signature: &Signature) -> bool;
}

// serde's array support stops at 32 elements, so the 64-byte signature
// round-trips through a pair of halves.
mod serde_bytes_64 {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 64], serializer: S) -> Result<S::Ok, S::Error> {
        let mut lo = [0u8; 32];
        let mut hi = [0u8; 32];
        lo.copy_from_slice(&bytes[..32]);
        hi.copy_from_slice(&bytes[32..]);
        (lo, hi).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 64], D::Error> {
        let (lo, hi): ([u8; 32], [u8; 32]) = Deserialize::deserialize(deserializer)?;
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&lo);
        bytes[32..].copy_from_slice(&hi);
        Ok(bytes)
    }
}
