//! Pure progression formulas.
//!
//! Every function here is total over its documented domain and has no side
//! effects. Levels run from 1 to [`MAX_LEVEL`]; a tier is a block of nine
//! floors, so level 1-9 is tier 0, 10-18 tier 1, and so on.

use super::constants::*;

/// Names of the sixteen major tiers, indexed by [`tier`].
pub const TIER_NAMES: [&str; TIER_COUNT as usize] = [
    "筑基", "开光", "胎息", "辟谷", "金丹", "元婴", "出窍", "分神", "合体", "大乘", "渡劫", "地仙",
    "天仙", "金仙", "大罗金仙", "九天玄仙",
];

/// Prefix added to the tier name for each rebirth, clamped at the last entry.
pub const REBIRTH_PREFIXES: [&str; 10] = ["", "真", "玄", "灵", "妙", "元", "太", "上", "至", "道"];

const FLOOR_NUMERALS: [&str; FLOORS_PER_TIER as usize] =
    ["一", "二", "三", "四", "五", "六", "七", "八", "九"];

const UNKNOWN_TIER_NAME: &str = "未知境界";

/// Major tier index for a level (0-based).
pub fn tier(level: u32) -> u32 {
    level.saturating_sub(1) / FLOORS_PER_TIER
}

/// Floor within the tier, always in `1..=9`.
pub fn tier_floor(level: u32) -> u32 {
    level.saturating_sub(1) % FLOORS_PER_TIER + 1
}

/// True when breaking through from `level` closes a tier (9, 18, 27, ...).
pub fn is_major_floor(level: u32) -> bool {
    level > 0 && level % FLOORS_PER_TIER == 0
}

/// Qi gained per tap.
pub fn tap_gain(level: u32, prestige_count: u32) -> f64 {
    let stage_multiplier = STAGE_POWER.powi(tier(level) as i32);
    let floor_multiplier = 1.0 + FLOOR_STEP_RATIO * f64::from(tier_floor(level) - 1);
    let prestige_multiplier = 1.0 + PRESTIGE_GAIN_PER_RANK * f64::from(prestige_count);
    BASE_GAIN * stage_multiplier * floor_multiplier * prestige_multiplier
}

/// Qi gained per second of automatic cultivation.
pub fn auto_gain(level: u32, prestige_count: u32) -> f64 {
    tap_gain(level, prestige_count) * AUTO_GAIN_RATIO
}

/// Qi consumed by a successful breakthrough from `level`.
pub fn break_cost(level: u32) -> f64 {
    BREAK_COST_BASE * BREAK_COST_FACTOR.powi(level as i32)
}

/// Chance that a breakthrough from `level` succeeds.
pub fn break_success_probability(level: u32) -> f64 {
    let v = BREAK_SUCCESS_CEILING - f64::from(level) * BREAK_SUCCESS_DECAY_PER_LEVEL;
    v.max(BREAK_SUCCESS_LOWER)
}

/// Fraction of current qi lost on an unprotected failed breakthrough.
///
/// The nominal penalty grows with level but is scaled down when the
/// success chance is already low.
pub fn break_fail_penalty(level: u32) -> f64 {
    let scaling = (f64::from(level) / f64::from(MAX_LEVEL)) * FAIL_PENALTY_SCALING;
    let raw = (FAIL_PENALTY_BASE + scaling).min(FAIL_PENALTY_CAP);
    let soften = 1.0 - FAIL_PENALTY_SOFTEN * (1.0 - break_success_probability(level));
    raw * soften
}

/// Chance that one event poll fires an event.
pub fn event_probability(level: u32, prestige_count: u32) -> f64 {
    let curved_progress = (f64::from(level) / f64::from(MAX_LEVEL)).sqrt();
    let mut prob = EVENT_PROB_BASE + (EVENT_PROB_MAX - EVENT_PROB_BASE) * curved_progress;
    prob += f64::from(tier(level)) * EVENT_PROB_TIER_STEP;
    prob += f64::from(prestige_count).sqrt() * EVENT_PROB_PRESTIGE_STEP;
    prob.min(EVENT_PROB_HARD_CAP)
}

/// Progress toward the next breakthrough, clamped to `[0, 1]`.
pub fn progress_fraction(qi: f64, level: u32) -> f64 {
    (qi / break_cost(level)).clamp(0.0, 1.0)
}

/// Tier name for a level, with the rebirth prefix once the player has prestiged.
pub fn tier_name(level: u32, prestige_count: u32) -> String {
    let base = TIER_NAMES
        .get(tier(level) as usize)
        .copied()
        .unwrap_or(UNKNOWN_TIER_NAME);

    if prestige_count == 0 {
        return base.to_string();
    }
    let idx = (prestige_count as usize).min(REBIRTH_PREFIXES.len() - 1);
    format!("{}·{}", REBIRTH_PREFIXES[idx], base)
}

/// Floor label such as `五层`.
pub fn floor_label(level: u32) -> String {
    if level == 0 {
        return String::new();
    }
    format!("{}层", FLOOR_NUMERALS[(tier_floor(level) - 1) as usize])
}

/// Full realm description, e.g. `真·金丹 三层`.
pub fn realm_description(level: u32, prestige_count: u32) -> String {
    format!("{} {}", tier_name(level, prestige_count), floor_label(level))
}

/// Resolves a tier name (as used in event catalogs) to its index.
pub fn tier_index_of(name: &str) -> Option<u32> {
    TIER_NAMES.iter().position(|n| *n == name).map(|i| i as u32)
}
