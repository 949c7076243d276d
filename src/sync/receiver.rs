//! Companion-side consumer of replicated snapshots.

use super::protocol::{Envelope, LeaderboardEntry, SyncError};
use crate::achievements::{leaderboard_score, AchievementProgress};
use crate::core::game_state::{decode_snapshot, ProgressionState};
use tracing::debug;

/// Result of feeding one envelope to the receiver.
#[derive(Debug, Clone, PartialEq)]
pub enum Received {
    /// A newer snapshot replaced the local copy.
    Applied { sequence: u64 },
    /// Not newer than the last applied snapshot. Ignored.
    Stale { sequence: u64 },
    LeaderboardRequested { leaderboard_id: String },
    Leaderboard(Vec<LeaderboardEntry>),
}

/// Applies the newest snapshot wholesale and discards older ones.
///
/// Ordering is by `(sent_at_ms, sequence)`: the producer's wall clock
/// first, the per-session counter to break ties.
#[derive(Debug, Default)]
pub struct CompanionReceiver {
    state: Option<ProgressionState>,
    last_applied: Option<(i64, u64)>,
}

impl CompanionReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receive_bytes(&mut self, bytes: &[u8]) -> Result<Received, SyncError> {
        let envelope = Envelope::decode(bytes)?;
        self.receive(envelope)
    }

    pub fn receive(&mut self, envelope: Envelope) -> Result<Received, SyncError> {
        envelope.verify()?;
        match envelope {
            Envelope::StatePush {
                sequence,
                sent_at_ms,
                payload,
                ..
            } => {
                let key = (sent_at_ms, sequence);
                if self.last_applied.is_some_and(|last| key <= last) {
                    debug!(sequence, sent_at_ms, "discarding stale snapshot");
                    return Ok(Received::Stale { sequence });
                }
                let state =
                    decode_snapshot(&payload).map_err(|e| SyncError::Decode(e.to_string()))?;
                self.state = Some(state);
                self.last_applied = Some(key);
                Ok(Received::Applied { sequence })
            }
            Envelope::LeaderboardRequest { leaderboard_id, .. } => {
                Ok(Received::LeaderboardRequested { leaderboard_id })
            }
            Envelope::LeaderboardResponse { entries } => Ok(Received::Leaderboard(entries)),
        }
    }

    pub fn state(&self) -> Option<&ProgressionState> {
        self.state.as_ref()
    }

    /// Score this device would submit to the realm leaderboard.
    pub fn leaderboard_score(&self) -> Option<i64> {
        self.state
            .as_ref()
            .map(|s| leaderboard_score(s.level, s.prestige_count))
    }

    /// Achievement percentages this device would report.
    pub fn achievement_progress(&self) -> Vec<AchievementProgress> {
        self.state
            .as_ref()
            .map(crate::achievements::achievement_progress)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::game_state::encode_snapshot;

    fn push(level: u32, sent_at_ms: i64, sequence: u64) -> Envelope {
        let mut state = ProgressionState::new(0);
        state.level = level;
        Envelope::state_push(sequence, sent_at_ms, encode_snapshot(&state).unwrap())
    }

    #[test]
    fn test_applies_newer_and_discards_older() {
        let mut receiver = CompanionReceiver::new();
        assert_eq!(
            receiver.receive(push(5, 1_000, 1)).unwrap(),
            Received::Applied { sequence: 1 }
        );
        assert_eq!(
            receiver.receive(push(6, 2_000, 2)).unwrap(),
            Received::Applied { sequence: 2 }
        );
        // Arrives late
        assert_eq!(
            receiver.receive(push(4, 1_500, 3)).unwrap(),
            Received::Stale { sequence: 3 }
        );
        assert_eq!(receiver.state().unwrap().level, 6);
    }

    #[test]
    fn test_equal_timestamp_uses_sequence() {
        let mut receiver = CompanionReceiver::new();
        receiver.receive(push(5, 1_000, 1)).unwrap();
        assert!(matches!(
            receiver.receive(push(7, 1_000, 2)).unwrap(),
            Received::Applied { .. }
        ));
        assert!(matches!(
            receiver.receive(push(7, 1_000, 2)).unwrap(),
            Received::Stale { .. }
        ));
    }

    #[test]
    fn test_undecodable_payload_is_rejected() {
        let mut receiver = CompanionReceiver::new();
        let bad = Envelope::state_push(1, 1, b"not a snapshot".to_vec());
        assert!(matches!(receiver.receive(bad), Err(SyncError::Decode(_))));
        assert!(receiver.state().is_none());
    }

    #[test]
    fn test_scores_follow_applied_state() {
        let mut receiver = CompanionReceiver::new();
        assert_eq!(receiver.leaderboard_score(), None);
        let bytes = push(20, 10, 1).encode().unwrap();
        receiver.receive_bytes(&bytes).unwrap();
        assert_eq!(receiver.leaderboard_score(), Some(20));
        assert!(!receiver.achievement_progress().is_empty());
    }
}
