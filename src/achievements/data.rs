//! Static achievement definitions.

use super::types::{AchievementCategory, AchievementDef, AchievementId, Measure};
use crate::core::constants::MAX_LEVEL;

/// All achievement definitions in display order.
pub const ALL_ACHIEVEMENTS: &[AchievementDef] = &[
    // Realm
    AchievementDef {
        id: AchievementId::RealmFoundation,
        key: "realm_foundation",
        name: "入道",
        category: AchievementCategory::Realm,
        measure: Measure::Level(9),
    },
    AchievementDef {
        id: AchievementId::RealmFasting,
        key: "realm_pigu",
        name: "脱凡",
        category: AchievementCategory::Realm,
        measure: Measure::Level(36),
    },
    AchievementDef {
        id: AchievementId::RealmGoldenCore,
        key: "realm_core",
        name: "金丹大成",
        category: AchievementCategory::Realm,
        measure: Measure::Level(45),
    },
    AchievementDef {
        id: AchievementId::RealmNascentSoul,
        key: "realm_nascent",
        name: "元婴出世",
        category: AchievementCategory::Realm,
        measure: Measure::Level(54),
    },
    AchievementDef {
        id: AchievementId::RealmSpiritSplit,
        key: "realm_demigod",
        name: "道心外化",
        category: AchievementCategory::Realm,
        measure: Measure::Level(72),
    },
    AchievementDef {
        id: AchievementId::RealmTribulation,
        key: "realm_tribulation",
        name: "生死一线",
        category: AchievementCategory::Realm,
        measure: Measure::Level(99),
    },
    AchievementDef {
        id: AchievementId::RealmEarthImmortal,
        key: "realm_earth",
        name: "超脱凡界",
        category: AchievementCategory::Realm,
        measure: Measure::Level(108),
    },
    AchievementDef {
        id: AchievementId::Ascension,
        key: "ascension",
        name: "飞升",
        category: AchievementCategory::Realm,
        measure: Measure::Level(MAX_LEVEL),
    },
    // Taps
    AchievementDef {
        id: AchievementId::Tap10k,
        key: "tap_10k",
        name: "勤修不辍",
        category: AchievementCategory::Taps,
        measure: Measure::Taps(10_000),
    },
    AchievementDef {
        id: AchievementId::Tap50k,
        key: "tap_50k",
        name: "滴水穿石",
        category: AchievementCategory::Taps,
        measure: Measure::Taps(50_000),
    },
    AchievementDef {
        id: AchievementId::Tap100k,
        key: "tap_100k",
        name: "十万次吐纳",
        category: AchievementCategory::Taps,
        measure: Measure::Taps(100_000),
    },
    AchievementDef {
        id: AchievementId::Tap1m,
        key: "tap_1m",
        name: "百万次吐纳",
        category: AchievementCategory::Taps,
        measure: Measure::Taps(1_000_000),
    },
    // Failures
    AchievementDef {
        id: AchievementId::Fail10,
        key: "fail_10",
        name: "道心稳固",
        category: AchievementCategory::Failures,
        measure: Measure::FailuresReached(10),
    },
    AchievementDef {
        id: AchievementId::Fail50,
        key: "fail_50",
        name: "百折不挠",
        category: AchievementCategory::Failures,
        measure: Measure::Failures(50),
    },
    // Rebirth
    AchievementDef {
        id: AchievementId::Rebirth1,
        key: "reincarnation_1",
        name: "再活一世",
        category: AchievementCategory::Rebirth,
        measure: Measure::Prestige(1),
    },
];

pub fn get_achievement_def(id: AchievementId) -> Option<&'static AchievementDef> {
    ALL_ACHIEVEMENTS.iter().find(|def| def.id == id)
}

pub fn get_achievements_by_category(
    category: AchievementCategory,
) -> impl Iterator<Item = &'static AchievementDef> {
    ALL_ACHIEVEMENTS
        .iter()
        .filter(move |def| def.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_and_keys_are_unique() {
        let ids: HashSet<_> = ALL_ACHIEVEMENTS.iter().map(|d| d.id).collect();
        let keys: HashSet<_> = ALL_ACHIEVEMENTS.iter().map(|d| d.key).collect();
        assert_eq!(ids.len(), ALL_ACHIEVEMENTS.len());
        assert_eq!(keys.len(), ALL_ACHIEVEMENTS.len());
    }

    #[test]
    fn test_every_category_has_entries() {
        for category in AchievementCategory::ALL {
            assert!(get_achievements_by_category(category).next().is_some());
        }
    }

    #[test]
    fn test_lookup() {
        let def = get_achievement_def(AchievementId::Ascension).unwrap();
        assert_eq!(def.measure, Measure::Level(144));
    }
}
