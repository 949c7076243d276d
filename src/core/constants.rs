// Levels and tiers
pub const MAX_LEVEL: u32 = 144;
pub const FLOORS_PER_TIER: u32 = 9;
pub const TIER_COUNT: u32 = MAX_LEVEL / FLOORS_PER_TIER;
pub const FREE_MAX_LEVEL: u32 = 10;

// Gain curve
pub const BASE_GAIN: f64 = 10.0;
pub const AUTO_GAIN_RATIO: f64 = 0.5;
pub const STAGE_POWER: f64 = 1.6;
pub const FLOOR_STEP_RATIO: f64 = 0.05;
pub const PRESTIGE_GAIN_PER_RANK: f64 = 0.2;

// Breakthrough cost and odds
pub const BREAK_COST_BASE: f64 = 100.0;
pub const BREAK_COST_FACTOR: f64 = 1.18;
pub const BREAK_SUCCESS_CEILING: f64 = 0.95;
pub const BREAK_SUCCESS_LOWER: f64 = 0.6;
pub const BREAK_SUCCESS_DECAY_PER_LEVEL: f64 = 0.0023;

// Failure penalty: fraction of current qi, softened by low success odds
pub const FAIL_PENALTY_BASE: f64 = 0.10;
pub const FAIL_PENALTY_SCALING: f64 = 0.20;
pub const FAIL_PENALTY_CAP: f64 = 0.35;
pub const FAIL_PENALTY_SOFTEN: f64 = 0.3;

// Failure debuff on late floors
pub const FAIL_DEBUFF_MIN_LEVEL: u32 = 90;
pub const FAIL_DEBUFF_MULTIPLIER: f64 = 0.7;
pub const FAIL_DEBUFF_SECONDS: i64 = 60 * 60;

// Event frequency
pub const EVENT_PROB_BASE: f64 = 0.05;
pub const EVENT_PROB_MAX: f64 = 0.10;
pub const EVENT_PROB_TIER_STEP: f64 = 0.001;
pub const EVENT_PROB_PRESTIGE_STEP: f64 = 0.005;
pub const EVENT_PROB_HARD_CAP: f64 = 0.15;

// Gamble payouts
pub const GAMBLE_WIN_STAKE_MULTIPLIER: f64 = 1.5;
pub const GAMBLE_LOSS_STAKE_MULTIPLIER: f64 = 0.5;
pub const GAMBLE_TAP_LOSS_RATIO: f64 = -0.5;
pub const GAMBLE_AUTO_LOSS_MULTIPLIER: f64 = 0.5;

// Longest single effect a catalog entry may grant
pub const MAX_EFFECT_SECONDS: i64 = 30 * SECONDS_PER_DAY;

// Offline catch-up
pub const OFFLINE_MIN_SECONDS: i64 = 5 * 60;
pub const OFFLINE_DISCOUNT: f64 = 0.8;
pub const FREE_OFFLINE_CAP_SECONDS: i64 = 2 * 60 * 60;
pub const EXTENDED_OFFLINE_CAP_SECONDS: i64 = 12 * 60 * 60;

// Step refining: walked steps convert to qi at the base tap gain
pub const MAX_DAILY_STEPS: u32 = 30_000;
pub const FREE_STEPS_LIMIT: u32 = 5_000;
pub const PRO_STEPS_LIMIT: u32 = 40_000;
pub const WALKING_BONUS_RATIO: f64 = 1.0;

// Scheduler periods, in ticks of TICK_SECONDS
pub const TICK_SECONDS: f64 = 1.0;
pub const GAIN_PERIOD_TICKS: u64 = 1;
pub const EVENT_POLL_PERIOD_TICKS: u64 = 10;
pub const AUTOSAVE_PERIOD_TICKS: u64 = 60;

// Replication
pub const SYNC_DEBOUNCE_MS: u64 = 500;
pub const SYNC_FORCE_PUSH_SECONDS: u64 = 5 * 60;

// Persistence
pub const STATE_KEY: &str = "savedPlayer";
pub const CHRONICLE_FILE: &str = "chronicle.json";
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 3;
pub const SAVE_VERSION_MAGIC: u64 = 0x5041_4C4D_534B_5933; // "PALMSKY3"

// Chronicle personality thresholds
pub const RISKY_BREAK_THRESHOLD: f64 = 0.6;
pub const STEADY_BREAK_THRESHOLD: f64 = 0.9;

// Outbox
pub const EVENT_OUTBOX_CAPACITY: usize = 64;

pub const SECONDS_PER_DAY: i64 = 86_400;
