//! Main simulation runner driving the real progression engine.
//!
//! Statistics are tracked externally from the engine's event outbox, the
//! same way a presentation layer would observe it.

use super::config::SimConfig;
use super::report::{RunStats, SimReport};
use crate::core::breakthrough::{BreakthroughOutcome, BreakthroughPhase};
use crate::core::config::EngineConfig;
use crate::core::constants::TIER_COUNT;
use crate::core::engine::{EngineEvent, ProgressionEngine};
use crate::core::formulas::tier;
use crate::core::game_state::{encode_snapshot, ProgressionState};
use crate::core::store::MemoryStore;
use crate::events::{EffectDefinition, EffectOutcome, EventCatalog, EventDefinition};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

/// Run the full simulation and return a report.
pub fn run_simulation(config: &SimConfig) -> SimReport {
    let mut all_runs = Vec::with_capacity(config.num_runs as usize);

    for run_idx in 0..config.num_runs {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed + run_idx as u64),
            None => ChaCha8Rng::from_entropy(),
        };

        let stats = simulate_single_run(config, &mut rng);
        if config.verbosity >= 2 {
            println!(
                "Run {}/{} - Level {}, Prestige {}, {}s, Breaks {}/{}, Events {}",
                run_idx + 1,
                config.num_runs,
                stats.final_level,
                stats.final_prestige,
                stats.total_seconds,
                stats.break_successes,
                stats.break_attempts,
                stats.events_opened
            );
        }
        all_runs.push(stats);
    }

    SimReport::from_runs(all_runs, config.max_seconds_per_run)
}

/// Simulates one player from a fresh start until the target or the time
/// limit is reached.
pub fn simulate_single_run(config: &SimConfig, rng: &mut ChaCha8Rng) -> RunStats {
    let mut engine = ProgressionEngine::load(
        Box::new(starting_store(config.starting_prestige)),
        EventCatalog::builtin(),
        EngineConfig::default(),
        0,
    );

    let mut settings = engine.state().settings;
    settings.haptics_enabled = false;
    settings.auto_breakthrough_enabled = config.auto_breakthrough;
    engine.set_settings(settings, 0);
    engine.drain_events();

    let mut stats = RunStats::new(engine.state().prestige_count);

    for second in 1..=config.max_seconds_per_run {
        let now = second as i64;

        for _ in 0..config.taps_per_second {
            engine.tap(now);
        }
        stats.qi_from_auto += engine.tick(now, rng).qi_gained;

        if let Some(choice_id) = engine.pending_event().map(|e| pick_choice(e, config)) {
            engine.select_event_choice(&choice_id, now, rng);
        }

        if engine.phase() == BreakthroughPhase::Eligible {
            engine.attempt_breakthrough_chain(now, rng);
        }

        if engine.state().is_ascended()
            && config.simulate_prestige
            && engine.state().prestige_count < config.target_prestige
        {
            engine.prestige(now);
        }

        for event in engine.drain_events() {
            stats.record(&event, second);
        }
        stats.note_level(engine.state().level, second);

        if reached_target(engine.state(), config) {
            stats.reached_target = true;
            stats.total_seconds = second;
            break;
        }
        stats.total_seconds = second;
    }

    let state = engine.state();
    stats.final_level = state.level;
    stats.final_prestige = state.prestige_count;
    stats.final_qi = state.qi;
    stats.total_taps = state.tap_count;
    debug!(
        level = stats.final_level,
        seconds = stats.total_seconds,
        "simulated run finished"
    );
    stats
}

fn reached_target(state: &ProgressionState, config: &SimConfig) -> bool {
    state.level >= config.target_level && state.prestige_count >= config.target_prestige
}

fn starting_store(prestige_count: u32) -> MemoryStore {
    if prestige_count == 0 {
        return MemoryStore::new();
    }
    let mut state = ProgressionState::new(0);
    state.prestige_count = prestige_count;
    match encode_snapshot(&state) {
        Ok(bytes) => MemoryStore::with_snapshot(bytes),
        Err(e) => {
            warn!(error = %e, "could not seed starting prestige");
            MemoryStore::new()
        }
    }
}

/// Accepting players take the first choice that does something; others take
/// the first empty one. Falls back to the first choice.
fn pick_choice(event: &EventDefinition, config: &SimConfig) -> String {
    let wanted = |effect: &EffectDefinition| effect.is_noop() != config.accept_events;
    event
        .choices
        .iter()
        .find(|c| wanted(&c.effect))
        .or_else(|| event.choices.first())
        .map(|c| c.id.clone())
        .unwrap_or_default()
}

impl RunStats {
    fn new(starting_prestige: u32) -> Self {
        let mut tier_reached_at = vec![None; TIER_COUNT as usize];
        tier_reached_at[0] = Some(0);
        Self {
            starting_prestige,
            tier_reached_at,
            ..Default::default()
        }
    }

    fn note_level(&mut self, level: u32, second: u64) {
        if let Some(slot) = self.tier_reached_at.get_mut(tier(level) as usize) {
            slot.get_or_insert(second);
        }
    }

    fn record(&mut self, event: &EngineEvent, second: u64) {
        match event {
            EngineEvent::TapGained { amount } => self.qi_from_taps += amount,
            EngineEvent::Breakthrough(outcome) => {
                self.break_attempts += 1;
                match outcome {
                    BreakthroughOutcome::Success { .. } => self.break_successes += 1,
                    BreakthroughOutcome::FailureSaved { .. } => self.charms_consumed += 1,
                    BreakthroughOutcome::FailurePenalized { qi_lost, .. } => {
                        self.qi_lost_to_failures += qi_lost;
                    }
                    BreakthroughOutcome::NotEligible => {}
                }
            }
            EngineEvent::Ascended => {
                self.ascensions += 1;
                self.first_ascension_at.get_or_insert(second);
            }
            EngineEvent::EventOpened { .. } => self.events_opened += 1,
            EngineEvent::EffectResolved(resolved) => {
                if let EffectOutcome::QiChanged { delta } = resolved.outcome {
                    self.qi_from_events += delta;
                }
                if resolved.gamble_won == Some(true) {
                    self.gambles_won += 1;
                } else if resolved.gamble_won == Some(false) {
                    self.gambles_lost += 1;
                }
            }
            EngineEvent::Reborn { .. } => {
                self.rebirths += 1;
                for slot in self.tier_reached_at.iter_mut().skip(1) {
                    *slot = None;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> SimConfig {
        SimConfig {
            num_runs: 3,
            seed: Some(7),
            max_seconds_per_run: 2_000,
            target_level: 12,
            verbosity: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let config = quick_config();
        let a = simulate_single_run(&config, &mut ChaCha8Rng::seed_from_u64(1));
        let b = simulate_single_run(&config, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(a.final_level, b.final_level);
        assert_eq!(a.total_seconds, b.total_seconds);
        assert_eq!(a.break_attempts, b.break_attempts);
    }

    #[test]
    fn test_active_player_progresses() {
        let config = quick_config();
        let stats = simulate_single_run(&config, &mut ChaCha8Rng::seed_from_u64(3));
        assert!(stats.final_level > 1);
        assert!(stats.break_successes >= stats.final_level as u64 - 1);
        assert!(stats.total_taps > 0);
        assert_eq!(stats.tier_reached_at[0], Some(0));
    }

    #[test]
    fn test_idle_player_never_taps() {
        let config = SimConfig {
            max_seconds_per_run: 600,
            seed: Some(1),
            verbosity: 0,
            ..SimConfig::idle_only(1)
        };
        let stats = simulate_single_run(&config, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(stats.total_taps, 0);
        assert_eq!(stats.qi_from_taps, 0.0);
        assert_eq!(stats.total_seconds, 600);
    }

    #[test]
    fn test_starting_prestige_is_applied() {
        let config = SimConfig {
            starting_prestige: 3,
            max_seconds_per_run: 10,
            ..quick_config()
        };
        let stats = simulate_single_run(&config, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(stats.starting_prestige, 3);
        assert_eq!(stats.final_prestige, 3);
    }

    #[test]
    fn test_run_simulation_aggregates() {
        let report = run_simulation(&quick_config());
        assert_eq!(report.num_runs, 3);
        assert_eq!(report.run_stats.len(), 3);
        assert!(report.avg_final_level >= 1.0);
    }
}
