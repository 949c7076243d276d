use super::game_state::{Items, ProgressionState};
use super::effects::TemporalEffects;

/// Result of a prestige request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrestigeOutcome {
    /// The player has not ascended yet. Nothing changed.
    NotReady,
    Reborn { prestige_count: u32 },
}

/// Checks if the player may reincarnate: only after ascension.
pub fn can_prestige(state: &ProgressionState) -> bool {
    state.is_ascended()
}

/// Resets the life and keeps what survives rebirth.
///
/// Kept: player id, settings, tap count, total failures, last seen.
/// Reset: level, qi, charms, effects, reserved failure streak.
pub fn perform_prestige(state: &mut ProgressionState) -> PrestigeOutcome {
    // Only prestige if eligible
    if !can_prestige(state) {
        return PrestigeOutcome::NotReady;
    }

    state.level = 1;
    state.qi = 0.0;
    state.items = Items::default();
    state.effects = TemporalEffects::default();
    state.consecutive_failures = 0;

    state.prestige_count += 1;

    PrestigeOutcome::Reborn {
        prestige_count: state.prestige_count,
    }
}
