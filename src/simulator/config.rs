//! Simulation configuration.

use crate::core::constants::MAX_LEVEL;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of simulation runs to perform
    pub num_runs: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Simulated seconds per run before timeout
    pub max_seconds_per_run: u64,

    /// Taps the scripted player makes every second
    pub taps_per_second: u32,

    /// Level to reach (1-144)
    pub target_level: u32,

    /// Prestige count to reach. Only reachable with `simulate_prestige`.
    pub target_prestige: u32,

    /// Starting prestige count
    pub starting_prestige: u32,

    /// Reincarnate on ascension until `target_prestige` is met
    pub simulate_prestige: bool,

    /// Pick the first non-empty choice on events instead of declining
    pub accept_events: bool,

    /// Chain breakthroughs automatically within a tier
    pub auto_breakthrough: bool,

    /// Log verbosity (0 = silent, 1 = summary, 2 = per run)
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_runs: 100,
            seed: None,
            max_seconds_per_run: 7 * 24 * 60 * 60,
            taps_per_second: 2,
            target_level: MAX_LEVEL,
            target_prestige: 0,
            starting_prestige: 0,
            simulate_prestige: false,
            accept_events: true,
            auto_breakthrough: true,
            verbosity: 1,
        }
    }
}

impl SimConfig {
    /// Quick config for early tier pacing
    pub fn early_game_test() -> Self {
        Self {
            num_runs: 50,
            max_seconds_per_run: 24 * 60 * 60,
            target_level: 27,
            ..Default::default()
        }
    }

    /// Quick config for full ascension and rebirth cycles
    pub fn prestige_cycle_test(target_prestige: u32) -> Self {
        Self {
            num_runs: 20,
            max_seconds_per_run: 60 * 24 * 60 * 60,
            target_prestige,
            simulate_prestige: true,
            ..Default::default()
        }
    }

    /// A player who never taps and declines every event
    pub fn idle_only(num_runs: u32) -> Self {
        Self {
            num_runs,
            taps_per_second: 0,
            accept_events: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(SimConfig::default().target_level, MAX_LEVEL);
        assert_eq!(SimConfig::early_game_test().target_level, 27);
        assert!(SimConfig::prestige_cycle_test(2).simulate_prestige);
        assert_eq!(SimConfig::idle_only(5).taps_per_second, 0);
    }
}
