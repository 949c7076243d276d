//! Achievement progress derived from the monotonic counters.
//!
//! Only computes percentages. Submission, and ignoring a report lower than
//! one already made, belong to the platform collaborator.

use super::data::ALL_ACHIEVEMENTS;
use super::types::{AchievementProgress, Measure};
use crate::core::game_state::ProgressionState;

fn binary(reached: bool) -> f64 {
    if reached {
        100.0
    } else {
        0.0
    }
}

fn ratio(count: u64, target: u64) -> f64 {
    if target == 0 {
        return 100.0;
    }
    (count as f64 / target as f64 * 100.0).min(100.0)
}

pub fn measure_percent(measure: Measure, state: &ProgressionState) -> f64 {
    match measure {
        Measure::Level(level) => binary(state.level >= level),
        Measure::Taps(target) => ratio(state.tap_count, target),
        Measure::FailuresReached(target) => binary(state.total_failures >= target),
        Measure::Failures(target) => ratio(state.total_failures, target),
        Measure::Prestige(target) => binary(state.prestige_count >= target),
    }
}

/// Percent complete for every achievement, in display order.
pub fn achievement_progress(state: &ProgressionState) -> Vec<AchievementProgress> {
    ALL_ACHIEVEMENTS
        .iter()
        .map(|def| AchievementProgress {
            id: def.id,
            percent: measure_percent(def.measure, state),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::types::AchievementId;

    fn percent_of(report: &[AchievementProgress], id: AchievementId) -> f64 {
        report.iter().find(|p| p.id == id).unwrap().percent
    }

    #[test]
    fn test_fresh_player_has_nothing() {
        let report = achievement_progress(&ProgressionState::new(0));
        assert_eq!(report.len(), ALL_ACHIEVEMENTS.len());
        assert!(report.iter().all(|p| p.percent == 0.0));
    }

    #[test]
    fn test_realm_achievements_are_binary() {
        let mut state = ProgressionState::new(0);
        state.level = 45;
        let report = achievement_progress(&state);
        assert_eq!(percent_of(&report, AchievementId::RealmFoundation), 100.0);
        assert_eq!(percent_of(&report, AchievementId::RealmGoldenCore), 100.0);
        assert_eq!(percent_of(&report, AchievementId::RealmNascentSoul), 0.0);
    }

    #[test]
    fn test_tap_achievements_report_fraction_capped_at_100() {
        let mut state = ProgressionState::new(0);
        state.tap_count = 25_000;
        let report = achievement_progress(&state);
        assert_eq!(percent_of(&report, AchievementId::Tap10k), 100.0);
        assert_eq!(percent_of(&report, AchievementId::Tap50k), 50.0);
        assert_eq!(percent_of(&report, AchievementId::Tap100k), 25.0);
    }

    #[test]
    fn test_failure_achievements() {
        let mut state = ProgressionState::new(0);
        state.total_failures = 5;
        let report = achievement_progress(&state);
        assert_eq!(percent_of(&report, AchievementId::Fail10), 0.0);
        assert_eq!(percent_of(&report, AchievementId::Fail50), 10.0);

        state.total_failures = 12;
        let report = achievement_progress(&state);
        assert!(report
            .iter()
            .find(|p| p.id == AchievementId::Fail10)
            .unwrap()
            .is_complete());
    }

    #[test]
    fn test_rebirth_achievement() {
        let mut state = ProgressionState::new(0);
        state.prestige_count = 1;
        let report = achievement_progress(&state);
        assert_eq!(percent_of(&report, AchievementId::Rebirth1), 100.0);
    }
}
