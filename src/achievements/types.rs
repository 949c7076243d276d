//! Achievement identifiers and definitions.

use serde::{Deserialize, Serialize};

/// Achievement categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AchievementCategory {
    Realm,
    Taps,
    Failures,
    Rebirth,
}

impl AchievementCategory {
    pub const ALL: [AchievementCategory; 4] = [
        AchievementCategory::Realm,
        AchievementCategory::Taps,
        AchievementCategory::Failures,
        AchievementCategory::Rebirth,
    ];
}

/// Unique identifier for each achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AchievementId {
    // Realm achievements, unlocked on reaching a level
    RealmFoundation,    // 9
    RealmFasting,       // 36
    RealmGoldenCore,    // 45
    RealmNascentSoul,   // 54
    RealmSpiritSplit,   // 72
    RealmTribulation,   // 99
    RealmEarthImmortal, // 108
    Ascension,          // 144

    // Tap achievements, reported as a percentage
    Tap10k,
    Tap50k,
    Tap100k,
    Tap1m,

    // Failure achievements
    Fail10,
    Fail50,

    // Rebirth
    Rebirth1,
}

/// How an achievement reports progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// Unlocks outright once `level` is reached.
    Level(u32),
    /// Fraction of a tap count.
    Taps(u64),
    /// All or nothing on a failure count.
    FailuresReached(u64),
    /// Fraction of a failure count.
    Failures(u64),
    /// All or nothing on a prestige count.
    Prestige(u32),
}

#[derive(Debug, Clone)]
pub struct AchievementDef {
    pub id: AchievementId,
    /// Stable string id used by the platform service.
    pub key: &'static str,
    pub name: &'static str,
    pub category: AchievementCategory,
    pub measure: Measure,
}

/// One line of an achievement report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AchievementProgress {
    pub id: AchievementId,
    /// `0.0..=100.0`.
    pub percent: f64,
}

impl AchievementProgress {
    pub fn is_complete(&self) -> bool {
        self.percent >= 100.0
    }
}
