//! Achievement progress and leaderboard scoring.
//!
//! Both are pure projections of the monotonic counters on the progression
//! state (level, tap count, total failures, prestige count).

pub mod data;
pub mod leaderboard;
pub mod progress;
pub mod types;

pub use data::{get_achievement_def, get_achievements_by_category, ALL_ACHIEVEMENTS};
pub use leaderboard::{decode_score, leaderboard_score, rank_description};
pub use progress::achievement_progress;
pub use types::{AchievementCategory, AchievementDef, AchievementId, AchievementProgress, Measure};
