//! Temporal effect store: timed tap/auto boosts and the single debuff slot.
//!
//! Expired effects stay in storage until [`TemporalEffects::prune_expired`]
//! runs (once per scheduler tick and once on load); every query treats them
//! as absent in the meantime.

use serde::{Deserialize, Serialize};

/// A timed additive bonus on tap or automatic gain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boost {
    /// Added to 1.0 when computing the multiplier (0.5 means +50%).
    pub bonus_ratio: f64,
    /// Unix timestamp (seconds) at which the boost ends.
    pub expires_at: i64,
}

impl Boost {
    pub fn is_active(&self, now: i64) -> bool {
        now < self.expires_at
    }

    pub fn remaining_seconds(&self, now: i64) -> i64 {
        self.expires_at.saturating_sub(now).max(0)
    }
}

/// A timed multiplicative penalty on automatic gain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Debuff {
    /// Multiplier in `(0, 1]`.
    pub multiplier: f64,
    pub expires_at: i64,
}

impl Debuff {
    pub fn is_active(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

/// Which slot an effect occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectSlot {
    Tap,
    Auto,
    Debuff,
}

/// Read-only view of an active effect for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveEffect {
    pub slot: EffectSlot,
    /// Bonus ratio for boosts, multiplier for the debuff.
    pub value: f64,
    pub remaining_seconds: i64,
}

/// The three effect slots. Tap and auto boosts are independent of each
/// other and of the debuff.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalEffects {
    pub tap_boost: Option<Boost>,
    pub auto_boost: Option<Boost>,
    pub debuff: Option<Debuff>,
}

/// Merges a new boost into a slot.
///
/// An active boost keeps its remaining time and gains the new duration on
/// top; the ratio never downgrades. An absent or expired boost is replaced.
fn stack_boost(slot: &mut Option<Boost>, ratio: f64, duration_secs: i64, now: i64) {
    let merged = match *slot {
        Some(old) if old.is_active(now) => Boost {
            bonus_ratio: old.bonus_ratio.max(ratio),
            expires_at: old.expires_at.saturating_add(duration_secs),
        },
        _ => Boost {
            bonus_ratio: ratio,
            expires_at: now.saturating_add(duration_secs),
        },
    };
    *slot = Some(merged);
}

impl TemporalEffects {
    pub fn set_tap_boost(&mut self, ratio: f64, duration_secs: i64, now: i64) {
        stack_boost(&mut self.tap_boost, ratio, duration_secs, now);
    }

    pub fn set_auto_boost(&mut self, ratio: f64, duration_secs: i64, now: i64) {
        stack_boost(&mut self.auto_boost, ratio, duration_secs, now);
    }

    /// Overwrites the tap slot without stacking. Used for gamble losses.
    pub fn overwrite_tap_boost(&mut self, ratio: f64, duration_secs: i64, now: i64) {
        self.tap_boost = Some(Boost {
            bonus_ratio: ratio,
            expires_at: now.saturating_add(duration_secs),
        });
    }

    /// Overwrites any existing debuff.
    pub fn set_debuff(&mut self, multiplier: f64, duration_secs: i64, now: i64) {
        self.debuff = Some(Debuff {
            multiplier: multiplier.clamp(f64::MIN_POSITIVE, 1.0),
            expires_at: now.saturating_add(duration_secs),
        });
    }

    pub fn clear_debuff(&mut self) {
        self.debuff = None;
    }

    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    pub fn has_active_debuff(&self, now: i64) -> bool {
        self.debuff.is_some_and(|d| d.is_active(now))
    }

    /// Physically drops effects that are no longer active. Returns how many
    /// slots were cleared.
    pub fn prune_expired(&mut self, now: i64) -> usize {
        let mut cleared = 0;
        if self.tap_boost.is_some_and(|b| !b.is_active(now)) {
            self.tap_boost = None;
            cleared += 1;
        }
        if self.auto_boost.is_some_and(|b| !b.is_active(now)) {
            self.auto_boost = None;
            cleared += 1;
        }
        if self.debuff.is_some_and(|d| !d.is_active(now)) {
            self.debuff = None;
            cleared += 1;
        }
        cleared
    }

    pub fn effective_tap_multiplier(&self, now: i64) -> f64 {
        let ratio = self
            .tap_boost
            .filter(|b| b.is_active(now))
            .map_or(0.0, |b| b.bonus_ratio);
        1.0 + ratio
    }

    pub fn effective_auto_multiplier(&self, now: i64) -> f64 {
        let ratio = self
            .auto_boost
            .filter(|b| b.is_active(now))
            .map_or(0.0, |b| b.bonus_ratio);
        let debuff = self
            .debuff
            .filter(|d| d.is_active(now))
            .map_or(1.0, |d| d.multiplier);
        (1.0 + ratio) * debuff
    }

    pub fn active(&self, now: i64) -> Vec<ActiveEffect> {
        let mut out = Vec::with_capacity(3);
        if let Some(b) = self.tap_boost.filter(|b| b.is_active(now)) {
            out.push(ActiveEffect {
                slot: EffectSlot::Tap,
                value: b.bonus_ratio,
                remaining_seconds: b.remaining_seconds(now),
            });
        }
        if let Some(b) = self.auto_boost.filter(|b| b.is_active(now)) {
            out.push(ActiveEffect {
                slot: EffectSlot::Auto,
                value: b.bonus_ratio,
                remaining_seconds: b.remaining_seconds(now),
            });
        }
        if let Some(d) = self.debuff.filter(|d| d.is_active(now)) {
            out.push(ActiveEffect {
                slot: EffectSlot::Debuff,
                value: d.multiplier,
                remaining_seconds: d.expires_at.saturating_sub(now).max(0),
            });
        }
        out
    }
}
