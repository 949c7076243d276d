//! Realm leaderboard scoring.
//!
//! One score encodes both rebirths and level: `prestige * 144 + level`.
//! Levels start at 1, so 144 is the last floor of the first life and 145
//! the first floor of the second.

use crate::core::constants::MAX_LEVEL;
use crate::core::formulas::realm_description;

pub fn leaderboard_score(level: u32, prestige_count: u32) -> i64 {
    i64::from(prestige_count) * i64::from(MAX_LEVEL) + i64::from(level)
}

/// Inverts a score back into `(level, prestige_count)`. Non-positive
/// scores have no meaning and yield `None`.
pub fn decode_score(score: i64) -> Option<(u32, u32)> {
    if score <= 0 {
        return None;
    }
    let max = i64::from(MAX_LEVEL);
    let prestige = u32::try_from((score - 1) / max).ok()?;
    let level = ((score - 1) % max + 1) as u32;
    Some((level, prestige))
}

/// Realm description for a leaderboard score.
pub fn rank_description(score: i64) -> String {
    match decode_score(score) {
        Some((level, prestige)) => realm_description(level, prestige),
        None => "筑基".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_and_decode_agree() {
        for (level, prestige) in [(1, 0), (9, 0), (144, 0), (1, 1), (77, 3)] {
            let score = leaderboard_score(level, prestige);
            assert_eq!(decode_score(score), Some((level, prestige)));
        }
    }

    #[test]
    fn test_boundary_scores() {
        assert_eq!(leaderboard_score(144, 0), 144);
        assert_eq!(leaderboard_score(1, 1), 145);
        assert_eq!(decode_score(144), Some((144, 0)));
    }

    #[test]
    fn test_rank_description() {
        assert_eq!(rank_description(0), "筑基");
        assert_eq!(rank_description(-5), "筑基");
        assert_eq!(rank_description(1), "筑基 一层");
        assert_eq!(rank_description(145), "真·筑基 一层");
    }
}
