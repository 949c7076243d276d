//! Wire messages exchanged with the companion device.
//!
//! Every message is one bincode-encoded [`Envelope`]. A state push carries
//! the exact bytes the persistence layer writes, plus their SHA-256 digest.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Largest envelope accepted from the wire.
pub const MAX_ENVELOPE_SIZE: usize = 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("encode error: {0}")]
    Encode(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("envelope too large: {size} > {max}")]
    TooLarge { size: usize, max: usize },
    #[error("payload digest mismatch")]
    DigestMismatch,
    #[error("transport closed")]
    TransportClosed,
    #[error("transport error: {0}")]
    Transport(String),
}

/// Leaderboard window requested by the companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeScope {
    Today,
    Week,
    AllTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub player_id: String,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Envelope {
    StatePush {
        /// Monotonic per producer session. Breaks ties on equal timestamps.
        sequence: u64,
        /// Producer wall clock when the snapshot was taken, in milliseconds.
        sent_at_ms: i64,
        digest: [u8; 32],
        payload: Vec<u8>,
    },
    LeaderboardRequest {
        leaderboard_id: String,
        time_scope: TimeScope,
    },
    LeaderboardResponse {
        entries: Vec<LeaderboardEntry>,
    },
}

pub fn payload_digest(payload: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hasher.finalize().into()
}

impl Envelope {
    pub fn state_push(sequence: u64, sent_at_ms: i64, payload: Vec<u8>) -> Self {
        Envelope::StatePush {
            sequence,
            sent_at_ms,
            digest: payload_digest(&payload),
            payload,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, SyncError> {
        let bytes = bincode::serialize(self).map_err(|e| SyncError::Encode(e.to_string()))?;
        if bytes.len() > MAX_ENVELOPE_SIZE {
            return Err(SyncError::TooLarge {
                size: bytes.len(),
                max: MAX_ENVELOPE_SIZE,
            });
        }
        Ok(bytes)
    }

    /// Decodes an envelope and checks the payload digest of state pushes.
    pub fn decode(data: &[u8]) -> Result<Self, SyncError> {
        // Check the size before attempting deserialization
        if data.len() > MAX_ENVELOPE_SIZE {
            return Err(SyncError::TooLarge {
                size: data.len(),
                max: MAX_ENVELOPE_SIZE,
            });
        }
        let envelope: Envelope =
            bincode::deserialize(data).map_err(|e| SyncError::Decode(e.to_string()))?;
        envelope.verify()?;
        Ok(envelope)
    }

    pub fn verify(&self) -> Result<(), SyncError> {
        if let Envelope::StatePush {
            digest, payload, ..
        } = self
        {
            if payload_digest(payload) != *digest {
                return Err(SyncError::DigestMismatch);
            }
        }
        Ok(())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::StatePush { .. } => "state_push",
            Envelope::LeaderboardRequest { .. } => "leaderboard_request",
            Envelope::LeaderboardResponse { .. } => "leaderboard_response",
        }
    }
}
