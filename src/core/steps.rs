//! Step refining: the day's walked steps convert into qi once each.
//!
//! The caller supplies today's step count from whatever health source it
//! has. The ledger remembers how many of those were already refined on the
//! current day and starts over when the day changes.

use super::constants::*;
use super::formulas::tap_gain;
use super::game_state::ProgressionState;
use serde::{Deserialize, Serialize};

/// Per-day refining progress, persisted with the state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepLedger {
    /// UTC day number (`now / SECONDS_PER_DAY`) the count belongs to.
    pub day: i64,
    pub refined_today: u32,
}

impl StepLedger {
    /// Starts a new count when `now` falls on a different day.
    /// Returns true when the count was reset.
    pub fn roll_over(&mut self, now: i64) -> bool {
        let today = day_of(now);
        if self.day == today {
            return false;
        }
        self.day = today;
        self.refined_today = 0;
        true
    }
}

/// Result of one refine request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepRefineReport {
    pub steps_refined: u32,
    pub qi_gained: f64,
    /// Today's budget is used up.
    pub limit_reached: bool,
}

pub fn day_of(now: i64) -> i64 {
    now.div_euclid(SECONDS_PER_DAY)
}

/// Steps per day that may be refined with or without the entitlement.
pub fn daily_step_cap(has_entitlement: bool) -> u32 {
    let tier_limit = if has_entitlement {
        PRO_STEPS_LIMIT
    } else {
        FREE_STEPS_LIMIT
    };
    tier_limit.min(MAX_DAILY_STEPS)
}

/// Steps that a refine at `now` would convert, without changing anything.
pub fn steps_available(
    ledger: &StepLedger,
    today_steps: u32,
    now: i64,
    has_entitlement: bool,
) -> u32 {
    let effective = today_steps.min(daily_step_cap(has_entitlement));
    if ledger.day != day_of(now) {
        return effective;
    }
    effective.saturating_sub(ledger.refined_today)
}

/// Converts every not-yet-refined step of today into qi at the base tap
/// gain (boosts do not apply).
pub fn refine_steps(
    state: &mut ProgressionState,
    today_steps: u32,
    now: i64,
    has_entitlement: bool,
) -> StepRefineReport {
    state.steps.roll_over(now);
    let cap = daily_step_cap(has_entitlement);
    let available = steps_available(&state.steps, today_steps, now, has_entitlement);

    let mut report = StepRefineReport::default();
    if available > 0 {
        state.steps.refined_today += available;
        let per_step = tap_gain(state.level, state.prestige_count) * WALKING_BONUS_RATIO;
        report.steps_refined = available;
        report.qi_gained = f64::from(available) * per_step;
        state.qi += report.qi_gained;
    }
    report.limit_reached = state.steps.refined_today >= cap;
    report
}
