//! Event selection and effect resolution.

use super::catalog::EventCatalog;
use super::types::{EffectDefinition, EventDefinition};
use crate::core::constants::*;
use crate::core::effects::Boost;
use crate::core::formulas::{tier, tier_index_of};
use crate::core::game_state::ProgressionState;
use rand::seq::SliceRandom;
use rand::Rng;

/// What a resolved effect did, for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectOutcome {
    /// Qi actually added (positive) or removed (negative) after clamping.
    QiChanged { delta: f64 },
    TapBoost { ratio: f64, duration_secs: i64 },
    AutoBoost { ratio: f64, duration_secs: i64 },
    CharmGranted { charms: u32 },
    Debuffed { multiplier: f64, duration_secs: i64 },
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedEffect {
    pub outcome: EffectOutcome,
    /// Result of the coin flip, for gamble effects only.
    pub gamble_won: Option<bool>,
}

impl ResolvedEffect {
    fn plain(outcome: EffectOutcome) -> Self {
        Self {
            outcome,
            gamble_won: None,
        }
    }

    fn gamble(outcome: EffectOutcome, won: bool) -> Self {
        Self {
            outcome,
            gamble_won: Some(won),
        }
    }
}

/// True when `event` may fire for a player in tier `tier_index`.
///
/// Bounds are inclusive. A bound naming an unknown tier does not restrict.
pub fn is_within_tier_bounds(event: &EventDefinition, tier_index: u32) -> bool {
    let min_ok = event
        .min_tier
        .as_deref()
        .and_then(tier_index_of)
        .map_or(true, |min| tier_index >= min);
    let max_ok = event
        .max_tier
        .as_deref()
        .and_then(tier_index_of)
        .map_or(true, |max| tier_index <= max);
    min_ok && max_ok
}

/// Picks an event for `level` uniformly among those whose tier bounds admit
/// it. When none match, falls back to events that declare no bound at all.
/// The returned copy has its choices shuffled.
pub fn select_event(
    catalog: &EventCatalog,
    level: u32,
    rng: &mut impl Rng,
) -> Option<EventDefinition> {
    let player_tier = tier(level);

    let eligible: Vec<&EventDefinition> = catalog
        .events()
        .iter()
        .filter(|e| is_within_tier_bounds(e, player_tier))
        .collect();

    let picked = if eligible.is_empty() {
        let fallback: Vec<&EventDefinition> =
            catalog.events().iter().filter(|e| e.is_unbounded()).collect();
        fallback.choose(rng).copied()
    } else {
        eligible.choose(rng).copied()
    };

    picked.map(|event| {
        let mut event = event.clone();
        event.choices.shuffle(rng);
        event
    })
}

/// Catalog durations are clamped to `[0, MAX_EFFECT_SECONDS]`.
fn seconds(duration: f64) -> i64 {
    if duration.is_finite() {
        (duration.max(0.0).round() as i64).min(MAX_EFFECT_SECONDS)
    } else {
        0
    }
}

/// Ratio held by a boost slot after a merge.
fn stored_ratio(slot: Option<Boost>, requested: f64) -> f64 {
    slot.map_or(requested, |b| b.bonus_ratio)
}

fn change_qi(state: &mut ProgressionState, delta: f64) -> f64 {
    let before = state.qi;
    state.qi = (state.qi + delta).max(0.0);
    state.qi - before
}

/// Applies an effect, flipping a fair coin for gambles.
pub fn resolve_effect(
    state: &mut ProgressionState,
    effect: &EffectDefinition,
    now: i64,
    rng: &mut impl Rng,
) -> ResolvedEffect {
    let win = rng.gen_bool(0.5);
    resolve_effect_with_coin(state, effect, now, win)
}

/// Applies an effect with a fixed gamble result. Non-gamble effects ignore
/// `win`.
pub fn resolve_effect_with_coin(
    state: &mut ProgressionState,
    effect: &EffectDefinition,
    now: i64,
    win: bool,
) -> ResolvedEffect {
    match *effect {
        EffectDefinition::GainQi { value } => ResolvedEffect::plain(EffectOutcome::QiChanged {
            delta: change_qi(state, value.max(0.0)),
        }),
        EffectDefinition::LoseQi { value } => ResolvedEffect::plain(EffectOutcome::QiChanged {
            delta: change_qi(state, -value.max(0.0)),
        }),
        EffectDefinition::GainTapBoost { value, duration } => {
            let duration_secs = seconds(duration);
            state.effects.set_tap_boost(value, duration_secs, now);
            ResolvedEffect::plain(EffectOutcome::TapBoost {
                ratio: stored_ratio(state.effects.tap_boost, value),
                duration_secs,
            })
        }
        EffectDefinition::GainAutoBoost { value, duration } => {
            let duration_secs = seconds(duration);
            state.effects.set_auto_boost(value, duration_secs, now);
            ResolvedEffect::plain(EffectOutcome::AutoBoost {
                ratio: stored_ratio(state.effects.auto_boost, value),
                duration_secs,
            })
        }
        EffectDefinition::GrantItem => {
            state.items.protection_charm += 1;
            ResolvedEffect::plain(EffectOutcome::CharmGranted {
                charms: state.items.protection_charm,
            })
        }
        EffectDefinition::Gamble { value } => {
            let stake = value.max(0.0);
            let delta = if win {
                change_qi(state, stake * GAMBLE_WIN_STAKE_MULTIPLIER)
            } else {
                change_qi(state, -stake * GAMBLE_LOSS_STAKE_MULTIPLIER)
            };
            ResolvedEffect::gamble(EffectOutcome::QiChanged { delta }, win)
        }
        EffectDefinition::GambleTap { value, duration } => {
            let duration_secs = seconds(duration);
            let outcome = if win {
                state.effects.set_tap_boost(value, duration_secs, now);
                EffectOutcome::TapBoost {
                    ratio: stored_ratio(state.effects.tap_boost, value),
                    duration_secs,
                }
            } else {
                // The penalty replaces whatever boost was there
                state
                    .effects
                    .overwrite_tap_boost(GAMBLE_TAP_LOSS_RATIO, duration_secs, now);
                EffectOutcome::TapBoost {
                    ratio: GAMBLE_TAP_LOSS_RATIO,
                    duration_secs,
                }
            };
            ResolvedEffect::gamble(outcome, win)
        }
        EffectDefinition::GambleAuto { value, duration } => {
            let duration_secs = seconds(duration);
            let outcome = if win {
                state.effects.set_auto_boost(value, duration_secs, now);
                EffectOutcome::AutoBoost {
                    ratio: stored_ratio(state.effects.auto_boost, value),
                    duration_secs,
                }
            } else {
                state
                    .effects
                    .set_debuff(GAMBLE_AUTO_LOSS_MULTIPLIER, duration_secs, now);
                EffectOutcome::Debuffed {
                    multiplier: GAMBLE_AUTO_LOSS_MULTIPLIER,
                    duration_secs,
                }
            };
            ResolvedEffect::gamble(outcome, win)
        }
        EffectDefinition::Nothing => ResolvedEffect::plain(EffectOutcome::Nothing),
    }
}
