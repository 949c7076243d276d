//! Breakthrough state machine.
//!
//! `Idle -> Eligible -> (Attempting) -> {Success, FailureSaved, FailurePenalized}`.
//! Eligibility is a pure function of the state and is re-derived by the
//! engine after every mutation that touches qi or level.

use super::constants::*;
use super::formulas::{break_cost, break_fail_penalty, break_success_probability, is_major_floor};
use super::game_state::ProgressionState;
use rand::Rng;

/// Where the state machine rests between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreakthroughPhase {
    #[default]
    Idle,
    Eligible,
}

impl BreakthroughPhase {
    pub fn of(state: &ProgressionState) -> Self {
        if is_eligible(state) {
            Self::Eligible
        } else {
            Self::Idle
        }
    }
}

/// Result of one attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakthroughOutcome {
    /// Attempted while not eligible. Nothing changed.
    NotEligible,
    Success {
        new_level: u32,
        cost: f64,
        /// Reached `MAX_LEVEL` with this attempt.
        ascended: bool,
        /// Another attempt may be chained without user input.
        auto_continue: bool,
    },
    /// Failed, but a protection charm absorbed the penalty.
    FailureSaved { charms_left: u32 },
    FailurePenalized {
        qi_lost: f64,
        debuff_applied: bool,
    },
}

impl BreakthroughOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn was_attempted(&self) -> bool {
        !matches!(self, Self::NotEligible)
    }
}

pub fn is_eligible(state: &ProgressionState) -> bool {
    state.level < MAX_LEVEL && state.qi >= break_cost(state.level)
}

/// True when a success at the current level may be followed automatically:
/// the toggle is on, the player can afford the next floor and that floor
/// does not close a tier.
pub fn can_auto_break_next(state: &ProgressionState) -> bool {
    state.settings.auto_breakthrough_enabled && is_eligible(state) && !is_major_floor(state.level)
}

/// Draws a roll in `[0, 1)` and resolves the attempt.
pub fn attempt(state: &mut ProgressionState, now: i64, rng: &mut impl Rng) -> BreakthroughOutcome {
    if !is_eligible(state) {
        return BreakthroughOutcome::NotEligible;
    }
    let roll: f64 = rng.gen();
    attempt_with_roll(state, now, roll)
}

/// Resolves an attempt against a fixed roll. A roll equal to the success
/// probability counts as success.
pub fn attempt_with_roll(state: &mut ProgressionState, now: i64, roll: f64) -> BreakthroughOutcome {
    if !is_eligible(state) {
        return BreakthroughOutcome::NotEligible;
    }

    let previous_level = state.level;
    let success_rate = break_success_probability(previous_level);

    if roll <= success_rate {
        let cost = break_cost(previous_level);
        state.level += 1;
        state.spend_qi(cost);
        state.effects.clear_debuff();
        state.consecutive_failures = 0;

        return BreakthroughOutcome::Success {
            new_level: state.level,
            cost,
            ascended: state.level >= MAX_LEVEL,
            auto_continue: can_auto_break_next(state),
        };
    }

    state.total_failures += 1;
    // Tracked only; the odds do not read it
    state.consecutive_failures += 1;

    if state.items.protection_charm > 0 {
        state.items.protection_charm -= 1;
        return BreakthroughOutcome::FailureSaved {
            charms_left: state.items.protection_charm,
        };
    }

    // Penalty is a fraction of current qi, not of the break cost
    let qi_lost = state.qi * break_fail_penalty(previous_level);
    state.spend_qi(qi_lost);

    let debuff_applied =
        previous_level >= FAIL_DEBUFF_MIN_LEVEL && !state.effects.has_active_debuff(now);
    if debuff_applied {
        state
            .effects
            .set_debuff(FAIL_DEBUFF_MULTIPLIER, FAIL_DEBUFF_SECONDS, now);
    }

    BreakthroughOutcome::FailurePenalized {
        qi_lost,
        debuff_applied,
    }
}
