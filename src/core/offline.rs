//! Offline catch-up.
//!
//! Grants automatic gain for the wall-clock time since the last save,
//! capped by the entitlement tier and discounted. Short absences grant
//! nothing but still move `last_seen_at` forward.

use super::config::EngineConfig;
use super::formulas::auto_gain;
use super::game_state::ProgressionState;

/// Report of offline progression results
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OfflineReport {
    /// Raw wall-clock seconds since the last save (0 when negative).
    pub elapsed_seconds: i64,
    /// Seconds actually paid out after the cap.
    pub effective_seconds: i64,
    pub qi_gained: f64,
    /// The absence exceeded the cap; the caller may show a "capped" hint.
    pub capped: bool,
    /// Number of expired effects cleared while catching up.
    pub effects_pruned: usize,
}

/// Qi owed for `effective_seconds` of offline time at the current level.
pub fn calculate_offline_qi(
    level: u32,
    prestige_count: u32,
    effective_seconds: i64,
    config: &EngineConfig,
) -> f64 {
    auto_gain(level, prestige_count) * effective_seconds.max(0) as f64 * config.offline_discount
}

/// Applies offline catch-up to the state. The caller persists afterwards.
pub fn process_offline_progression(
    state: &mut ProgressionState,
    now: i64,
    has_extended_cap: bool,
    config: &EngineConfig,
) -> OfflineReport {
    let elapsed_seconds = (now - state.last_seen_at).max(0);

    if elapsed_seconds < config.offline_min_seconds {
        // Still advance the clock so rapid background/foreground cycling
        // cannot bank time toward the threshold.
        state.last_seen_at = now;
        return OfflineReport {
            elapsed_seconds,
            ..OfflineReport::default()
        };
    }

    let cap = config.offline_cap_seconds(has_extended_cap);
    let effective_seconds = elapsed_seconds.min(cap);
    let gain = calculate_offline_qi(state.level, state.prestige_count, effective_seconds, config);

    let qi_gained = if gain > 0.0 && !state.is_ascended() {
        state.qi += gain;
        gain
    } else {
        0.0
    };

    let effects_pruned = state.effects.prune_expired(now);
    state.last_seen_at = now;

    OfflineReport {
        elapsed_seconds,
        effective_seconds,
        qi_gained,
        capped: elapsed_seconds > cap,
        effects_pruned,
    }
}
