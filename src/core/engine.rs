//! The progression engine: one owner for the state and everything that
//! mutates it.
//!
//! Callers pass the current unix time into every operation, and a random
//! source into the ones that roll dice. The engine never reads the clock.
//! Presentation reads [`ProgressionEngine::view`] and drains
//! [`EngineEvent`]s; it never touches the state directly.

use super::breakthrough::{self, BreakthroughOutcome, BreakthroughPhase};
use super::config::EngineConfig;
use super::constants::{EVENT_OUTBOX_CAPACITY, MAX_LEVEL};
use super::effects::ActiveEffect;
use super::formulas::{
    auto_gain, break_cost, break_success_probability, event_probability, floor_label,
    progress_fraction, realm_description, tap_gain, tier_name,
};
use super::game_state::{ProgressionState, Settings};
use super::offline::{process_offline_progression, OfflineReport};
use super::prestige::{can_prestige, perform_prestige, PrestigeOutcome};
use super::scheduler::Scheduler;
use super::steps::{self, StepRefineReport};
use super::store::StateStore;
use crate::chronicle::Chronicle;
use crate::events::{resolve_effect, select_event, EventCatalog, EventDefinition, ResolvedEffect};
use crate::sync::ReplicationHandle;
use rand::Rng;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Feedback the presentation layer may play. Only emitted when haptics are
/// enabled in the settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticCue {
    Light,
    Success,
    Error,
}

/// Something that happened inside the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    TapGained { amount: f64 },
    EligibilityChanged { eligible: bool },
    Breakthrough(BreakthroughOutcome),
    Ascended,
    EventOpened { event_id: String },
    EffectResolved(ResolvedEffect),
    OfflineGain(OfflineReport),
    StepsRefined(StepRefineReport),
    Reborn { prestige_count: u32 },
    HardReset,
    Haptic(HapticCue),
}

/// Jobs run by the engine's scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    AccrueGain,
    PollEvent,
    Persist,
}

/// Read-only projection for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineView {
    pub level: u32,
    pub prestige_count: u32,
    pub tier_name: String,
    pub floor_label: String,
    pub realm: String,
    pub qi: f64,
    pub break_cost: f64,
    pub progress_fraction: f64,
    pub success_probability: f64,
    pub is_eligible_for_breakthrough: bool,
    pub is_ascended: bool,
    pub can_prestige: bool,
    /// The unlock prompt should be shown. Informational only.
    pub needs_paywall: bool,
    pub active_effects: Vec<ActiveEffect>,
    pub charms: u32,
    pub pending_event: Option<EventDefinition>,
}

/// Result of picking a choice on the open event.
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceOutcome {
    NoEventOpen,
    /// The open event has no such choice. It stays open.
    UnknownChoice,
    Resolved(ResolvedEffect),
}

/// What one scheduler tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    pub qi_gained: f64,
    pub event_opened: bool,
    pub saved: bool,
}

pub struct ProgressionEngine {
    state: ProgressionState,
    phase: BreakthroughPhase,
    chronicle: Chronicle,
    config: EngineConfig,
    catalog: EventCatalog,
    store: Box<dyn StateStore>,
    replication: Option<ReplicationHandle>,
    scheduler: Scheduler<Job>,
    pending_event: Option<EventDefinition>,
    foreground: bool,
    outbox: VecDeque<EngineEvent>,
}

impl ProgressionEngine {
    /// Loads the saved state, or starts a new player when there is none or
    /// it cannot be read.
    pub fn load(
        store: Box<dyn StateStore>,
        catalog: EventCatalog,
        config: EngineConfig,
        now: i64,
    ) -> Self {
        let mut state = match store.load_state() {
            Ok(Some(state)) => state,
            Ok(None) => {
                info!("no saved state, starting a new player");
                ProgressionState::new(now)
            }
            Err(e) => {
                warn!(error = %e, "saved state unreadable, starting a new player");
                ProgressionState::new(now)
            }
        };
        state.effects.prune_expired(now);

        let chronicle = match store.load_chronicle() {
            Ok(Some(chronicle)) => chronicle,
            Ok(None) => Chronicle::new(now),
            Err(e) => {
                warn!(error = %e, "chronicle unreadable, starting a new one");
                Chronicle::new(now)
            }
        };

        let mut scheduler = Scheduler::new();
        scheduler
            .on_tick(config.gain_period_ticks, Job::AccrueGain)
            .on_tick(config.event_poll_period_ticks, Job::PollEvent)
            .on_tick(config.autosave_period_ticks, Job::Persist);

        Self {
            phase: BreakthroughPhase::of(&state),
            state,
            chronicle,
            config,
            catalog,
            store,
            replication: None,
            scheduler,
            pending_event: None,
            foreground: true,
            outbox: VecDeque::new(),
        }
    }

    /// Pushes every user-visible save to the companion through `handle`.
    pub fn with_replication(mut self, handle: ReplicationHandle) -> Self {
        self.replication = Some(handle);
        self
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn chronicle(&self) -> &Chronicle {
        &self.chronicle
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> BreakthroughPhase {
        self.phase
    }

    pub fn pending_event(&self) -> Option<&EventDefinition> {
        self.pending_event.as_ref()
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground
    }

    pub fn view(&self, now: i64, has_entitlement: bool) -> EngineView {
        let level = self.state.level;
        let prestige = self.state.prestige_count;
        EngineView {
            level,
            prestige_count: prestige,
            tier_name: tier_name(level, prestige),
            floor_label: floor_label(level),
            realm: realm_description(level, prestige),
            qi: self.state.qi,
            break_cost: break_cost(level),
            progress_fraction: progress_fraction(self.state.qi, level),
            success_probability: break_success_probability(level),
            is_eligible_for_breakthrough: self.phase == BreakthroughPhase::Eligible,
            is_ascended: self.state.is_ascended(),
            can_prestige: can_prestige(&self.state),
            needs_paywall: self.needs_paywall(has_entitlement),
            active_effects: self.state.effects.active(now),
            charms: self.state.items.protection_charm,
            pending_event: self.pending_event.clone(),
        }
    }

    /// True when the player should be shown the unlock prompt. Never blocks
    /// any operation.
    pub fn needs_paywall(&self, has_entitlement: bool) -> bool {
        self.state.level >= self.config.free_max_level && !has_entitlement
    }

    /// Takes everything recorded since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.outbox.drain(..).collect()
    }

    fn emit(&mut self, event: EngineEvent) {
        if self.outbox.len() >= EVENT_OUTBOX_CAPACITY {
            self.outbox.pop_front();
        }
        self.outbox.push_back(event);
    }

    fn haptic(&mut self, cue: HapticCue) {
        if self.state.settings.haptics_enabled {
            self.emit(EngineEvent::Haptic(cue));
        }
    }

    fn refresh_phase(&mut self) {
        let phase = BreakthroughPhase::of(&self.state);
        if phase != self.phase {
            self.phase = phase;
            self.emit(EngineEvent::EligibilityChanged {
                eligible: phase == BreakthroughPhase::Eligible,
            });
        }
    }

    fn write_store(&mut self) {
        if let Err(e) = self.store.save_state(&self.state) {
            warn!(error = %e, "failed to save state");
        }
        if let Err(e) = self.store.save_chronicle(&self.chronicle) {
            warn!(error = %e, "failed to save chronicle");
        }
    }

    /// Saves and replicates.
    pub fn save(&mut self, now: i64) {
        self.state.last_seen_at = now;
        self.write_store();
        if let Some(handle) = &self.replication {
            handle.push(&self.state, now.saturating_mul(1000));
        }
    }

    /// Saves without replicating.
    fn autosave(&mut self, now: i64) {
        self.state.last_seen_at = now;
        self.write_store();
    }

    pub fn tap(&mut self, now: i64) -> f64 {
        let gain = tap_gain(self.state.level, self.state.prestige_count)
            * self.state.effects.effective_tap_multiplier(now);
        self.state.qi += gain;
        self.state.tap_count += 1;
        self.emit(EngineEvent::TapGained { amount: gain });
        self.haptic(HapticCue::Light);
        self.refresh_phase();
        gain
    }

    pub fn attempt_breakthrough(&mut self, now: i64, rng: &mut impl Rng) -> BreakthroughOutcome {
        let from_level = self.state.level;
        let success_rate = break_success_probability(from_level);
        let realm = tier_name(from_level, self.state.prestige_count);

        let outcome = breakthrough::attempt(&mut self.state, now, rng);
        if !outcome.was_attempted() {
            return outcome;
        }

        self.chronicle
            .current
            .track_break(now, outcome.is_success(), success_rate, &realm);

        match &outcome {
            BreakthroughOutcome::Success {
                new_level,
                ascended,
                ..
            } => {
                info!(from_level, new_level, "breakthrough succeeded");
                self.haptic(HapticCue::Success);
                if *ascended {
                    info!(prestige = self.state.prestige_count, "ascended");
                    self.chronicle.current.track_ascension(now);
                    self.pending_event = None;
                }
            }
            BreakthroughOutcome::FailureSaved { charms_left } => {
                info!(from_level, charms_left, "breakthrough failed, charm consumed");
                self.haptic(HapticCue::Error);
            }
            BreakthroughOutcome::FailurePenalized {
                qi_lost,
                debuff_applied,
            } => {
                info!(from_level, qi_lost, debuff_applied, "breakthrough failed");
                self.haptic(HapticCue::Error);
            }
            BreakthroughOutcome::NotEligible => {}
        }

        let ascended = matches!(outcome, BreakthroughOutcome::Success { ascended: true, .. });
        self.emit(EngineEvent::Breakthrough(outcome.clone()));
        if ascended {
            self.emit(EngineEvent::Ascended);
        }
        self.refresh_phase();
        self.save(now);
        outcome
    }

    /// Attempts a breakthrough, then keeps going while each success allows
    /// an automatic follow-up.
    pub fn attempt_breakthrough_chain(
        &mut self,
        now: i64,
        rng: &mut impl Rng,
    ) -> Vec<BreakthroughOutcome> {
        let mut outcomes = Vec::new();
        loop {
            let outcome = self.attempt_breakthrough(now, rng);
            let again = matches!(
                outcome,
                BreakthroughOutcome::Success {
                    auto_continue: true,
                    ..
                }
            );
            outcomes.push(outcome);
            if !again || self.state.level >= MAX_LEVEL {
                break;
            }
        }
        outcomes
    }

    /// Resolves the open event with the given choice.
    pub fn select_event_choice(
        &mut self,
        choice_id: &str,
        now: i64,
        rng: &mut impl Rng,
    ) -> ChoiceOutcome {
        let Some(event) = self.pending_event.as_ref() else {
            return ChoiceOutcome::NoEventOpen;
        };
        let Some(choice) = event.choice(choice_id) else {
            return ChoiceOutcome::UnknownChoice;
        };
        let effect = choice.effect.clone();
        self.pending_event = None;

        let resolved = resolve_effect(&mut self.state, &effect, now, rng);
        self.chronicle.current.track_event(!effect.is_noop());
        debug!(choice_id, outcome = ?resolved.outcome, "event resolved");

        self.emit(EngineEvent::EffectResolved(resolved));
        self.refresh_phase();
        self.save(now);
        ChoiceOutcome::Resolved(resolved)
    }

    /// Opens an event if the roll succeeds. Only while in the foreground,
    /// with no event already open and before ascension.
    pub fn poll_event(&mut self, rng: &mut impl Rng) -> bool {
        if self.pending_event.is_some() || !self.foreground || self.state.is_ascended() {
            return false;
        }
        let roll: f64 = rng.gen();
        if roll >= event_probability(self.state.level, self.state.prestige_count) {
            return false;
        }
        match select_event(&self.catalog, self.state.level, rng) {
            Some(event) => {
                debug!(event_id = %event.id, level = self.state.level, "event fired");
                self.emit(EngineEvent::EventOpened {
                    event_id: event.id.clone(),
                });
                self.pending_event = Some(event);
                true
            }
            None => false,
        }
    }

    /// Reincarnates an ascended player.
    pub fn prestige(&mut self, now: i64) -> PrestigeOutcome {
        let outcome = perform_prestige(&mut self.state);
        if let PrestigeOutcome::Reborn { prestige_count } = outcome {
            info!(prestige_count, "reborn");
            self.chronicle.reincarnate(now);
            self.pending_event = None;
            self.emit(EngineEvent::Reborn { prestige_count });
            self.refresh_phase();
            self.save(now);
        }
        outcome
    }

    /// Wipes the state, the chronicle and the store. A new player id is
    /// issued.
    pub fn hard_reset(&mut self, now: i64) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear store");
        }
        self.state = ProgressionState::new(now);
        self.chronicle.hard_reset(now);
        self.pending_event = None;
        self.scheduler.reset();
        self.emit(EngineEvent::HardReset);
        self.refresh_phase();
        self.save(now);
    }

    /// Grants capped, discounted automatic gain for the time since the last
    /// save.
    pub fn catch_up_offline(&mut self, now: i64, has_extended_cap: bool) -> OfflineReport {
        let report =
            process_offline_progression(&mut self.state, now, has_extended_cap, &self.config);
        let realm = tier_name(self.state.level, self.state.prestige_count);
        self.chronicle.current.track_login(now, &realm);

        if report.qi_gained > 0.0 {
            info!(
                elapsed = report.elapsed_seconds,
                effective = report.effective_seconds,
                qi = report.qi_gained,
                capped = report.capped,
                "offline gain granted"
            );
            self.emit(EngineEvent::OfflineGain(report.clone()));
        }
        self.refresh_phase();
        self.save(now);
        report
    }

    /// Refines today's walked steps into qi. `today_steps` is the day's
    /// total as reported by the health source, not a delta.
    pub fn refine_steps(
        &mut self,
        today_steps: u32,
        now: i64,
        has_entitlement: bool,
    ) -> StepRefineReport {
        let report = steps::refine_steps(&mut self.state, today_steps, now, has_entitlement);
        if report.steps_refined > 0 {
            info!(
                steps = report.steps_refined,
                qi = report.qi_gained,
                "steps refined"
            );
            self.emit(EngineEvent::StepsRefined(report));
            self.haptic(HapticCue::Success);
            self.refresh_phase();
            self.save(now);
        } else if report.limit_reached {
            self.haptic(HapticCue::Error);
        }
        report
    }

    /// Background pauses event polling and saves.
    pub fn set_foreground(&mut self, foreground: bool, now: i64) {
        self.foreground = foreground;
        if !foreground {
            self.save(now);
        }
    }

    pub fn set_settings(&mut self, settings: Settings, now: i64) {
        self.state.settings = settings;
        self.save(now);
    }

    /// Runs one scheduler tick.
    pub fn tick(&mut self, now: i64, rng: &mut impl Rng) -> TickReport {
        let mut report = TickReport::default();
        for job in self.scheduler.tick() {
            match job {
                Job::AccrueGain => report.qi_gained = self.accrue_gain(now),
                Job::PollEvent => report.event_opened = self.poll_event(rng),
                Job::Persist => {
                    self.autosave(now);
                    report.saved = true;
                }
            }
        }
        report
    }

    fn accrue_gain(&mut self, now: i64) -> f64 {
        let mut gained = 0.0;
        if self.state.settings.auto_gain_enabled {
            let seconds = self.config.tick_seconds * self.config.gain_period_ticks as f64;
            gained = auto_gain(self.state.level, self.state.prestige_count)
                * self.state.effects.effective_auto_multiplier(now)
                * seconds;
            self.state.qi += gained;
        }
        self.state.effects.prune_expired(now);
        self.refresh_phase();
        gained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::game_state::encode_snapshot;
    use crate::core::store::MemoryStore;
    use crate::events::{ChoiceDefinition, EffectDefinition};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn engine_with(store: MemoryStore, catalog: EventCatalog) -> ProgressionEngine {
        ProgressionEngine::load(Box::new(store), catalog, EngineConfig::default(), 1_000)
    }

    fn engine() -> (ProgressionEngine, MemoryStore) {
        let store = MemoryStore::new();
        (engine_with(store.clone(), EventCatalog::empty()), store)
    }

    fn single_event_catalog() -> EventCatalog {
        EventCatalog::new(vec![EventDefinition {
            id: "ev".into(),
            title: String::new(),
            description: String::new(),
            choices: vec![
                ChoiceDefinition {
                    id: "take".into(),
                    text: String::new(),
                    effect: EffectDefinition::GainQi { value: 500.0 },
                },
                ChoiceDefinition {
                    id: "leave".into(),
                    text: String::new(),
                    effect: EffectDefinition::Nothing,
                },
            ],
            rarity: None,
            min_tier: None,
            max_tier: None,
        }])
    }

    #[test]
    fn test_fresh_engine_starts_new_player() {
        let (engine, _) = engine();
        assert_eq!(engine.state().level, 1);
        assert_eq!(engine.phase(), BreakthroughPhase::Idle);
        assert!(engine.pending_event().is_none());
    }

    #[test]
    fn test_corrupt_save_falls_back_to_new_player() {
        let store = MemoryStore::with_snapshot(b"\x00\x01garbage".to_vec());
        let engine = engine_with(store, EventCatalog::empty());
        assert_eq!(engine.state().level, 1);
        assert_eq!(engine.state().qi, 0.0);
    }

    #[test]
    fn test_loads_existing_snapshot() {
        let mut saved = ProgressionState::new(0);
        saved.level = 20;
        saved.qi = break_cost(20) * 2.0;
        let store = MemoryStore::with_snapshot(encode_snapshot(&saved).unwrap());
        let engine = engine_with(store, EventCatalog::empty());
        assert_eq!(engine.state().level, 20);
        assert_eq!(engine.phase(), BreakthroughPhase::Eligible);
    }

    #[test]
    fn test_tap_gains_and_counts() {
        let (mut engine, _) = engine();
        let gain = engine.tap(1_000);
        assert_eq!(gain, tap_gain(1, 0));
        assert_eq!(engine.state().tap_count, 1);
        let events = engine.drain_events();
        assert!(events.contains(&EngineEvent::Haptic(HapticCue::Light)));
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_haptics_only_when_enabled() {
        let (mut engine, _) = engine();
        let mut settings = engine.state().settings;
        settings.haptics_enabled = false;
        engine.set_settings(settings, 1_000);
        engine.tap(1_000);
        assert!(!engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, EngineEvent::Haptic(_))));
    }

    #[test]
    fn test_tapping_to_eligibility_emits_change() {
        let (mut engine, _) = engine();
        while engine.phase() != BreakthroughPhase::Eligible {
            engine.tap(1_000);
        }
        assert!(engine
            .drain_events()
            .contains(&EngineEvent::EligibilityChanged { eligible: true }));
        assert!(engine.view(1_000, false).is_eligible_for_breakthrough);
    }

    #[test]
    fn test_breakthrough_persists_and_records() {
        let (mut engine, store) = engine();
        while engine.phase() != BreakthroughPhase::Eligible {
            engine.tap(1_000);
        }
        let saves_before = store.save_count();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let outcome = engine.attempt_breakthrough(1_010, &mut rng);

        assert!(outcome.was_attempted());
        assert_eq!(store.save_count(), saves_before + 1);
        assert_eq!(engine.chronicle().current.break_attempts, 1);
        assert_eq!(engine.state().last_seen_at, 1_010);
    }

    #[test]
    fn test_ineligible_breakthrough_changes_nothing() {
        let (mut engine, store) = engine();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            engine.attempt_breakthrough(1_000, &mut rng),
            BreakthroughOutcome::NotEligible
        );
        assert_eq!(store.save_count(), 0);
        assert_eq!(engine.chronicle().current.break_attempts, 0);
    }

    #[test]
    fn test_scheduler_accrues_and_autosaves() {
        let (mut engine, store) = engine();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut total = 0.0;
        for i in 0..60 {
            let report = engine.tick(1_000 + i, &mut rng);
            total += report.qi_gained;
            assert_eq!(report.saved, i == 59);
        }
        assert!((total - auto_gain(1, 0) * 60.0).abs() < 1e-9);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_auto_gain_toggle() {
        let (mut engine, _) = engine();
        let mut settings = engine.state().settings;
        settings.auto_gain_enabled = false;
        engine.set_settings(settings, 1_000);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(engine.tick(1_001, &mut rng).qi_gained, 0.0);
        assert_eq!(engine.state().qi, 0.0);
    }

    #[test]
    fn test_background_never_opens_events() {
        let store = MemoryStore::new();
        let mut engine = engine_with(store, single_event_catalog());
        engine.set_foreground(false, 1_000);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for _ in 0..1_000 {
            assert!(!engine.poll_event(&mut rng));
        }
    }

    #[test]
    fn test_event_choice_flow() {
        let store = MemoryStore::new();
        let mut engine = engine_with(store.clone(), single_event_catalog());
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        while !engine.poll_event(&mut rng) {}
        assert!(engine.pending_event().is_some());
        // Only one event at a time
        assert!(!engine.poll_event(&mut rng));

        assert_eq!(
            engine.select_event_choice("missing", 1_000, &mut rng),
            ChoiceOutcome::UnknownChoice
        );
        assert!(engine.pending_event().is_some());

        let outcome = engine.select_event_choice("take", 1_000, &mut rng);
        assert!(matches!(outcome, ChoiceOutcome::Resolved(_)));
        assert_eq!(engine.state().qi, 500.0);
        assert!(engine.pending_event().is_none());
        assert_eq!(engine.chronicle().current.events_accepted, 1);
        assert_eq!(store.save_count(), 1);

        assert_eq!(
            engine.select_event_choice("take", 1_000, &mut rng),
            ChoiceOutcome::NoEventOpen
        );
    }

    #[test]
    fn test_declining_counts_as_rejected() {
        let mut engine = engine_with(MemoryStore::new(), single_event_catalog());
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        while !engine.poll_event(&mut rng) {}
        engine.select_event_choice("leave", 1_000, &mut rng);
        assert_eq!(engine.chronicle().current.events_rejected, 1);
        assert_eq!(engine.state().qi, 0.0);
    }

    #[test]
    fn test_prestige_requires_ascension_then_archives_life() {
        let mut saved = ProgressionState::new(0);
        saved.level = MAX_LEVEL;
        saved.tap_count = 77;
        let store = MemoryStore::with_snapshot(encode_snapshot(&saved).unwrap());
        let mut engine = engine_with(store, EventCatalog::empty());

        assert_eq!(
            engine.prestige(2_000),
            PrestigeOutcome::Reborn { prestige_count: 1 }
        );
        assert_eq!(engine.state().level, 1);
        assert_eq!(engine.state().tap_count, 77);
        assert_eq!(engine.chronicle().past_lives.len(), 1);
        assert_eq!(engine.view(2_000, false).tier_name, "真·筑基");

        assert_eq!(engine.prestige(2_001), PrestigeOutcome::NotReady);
    }

    #[test]
    fn test_hard_reset_issues_new_player() {
        let (mut engine, store) = engine();
        let old_id = engine.state().player_id.clone();
        engine.tap(1_000);
        engine.hard_reset(1_100);

        assert_ne!(engine.state().player_id, old_id);
        assert_eq!(engine.state().tap_count, 0);
        assert!(engine.chronicle().past_lives.is_empty());
        assert_eq!(store.load_state().unwrap().unwrap().tap_count, 0);
    }

    #[test]
    fn test_offline_catch_up_through_engine() {
        let (mut engine, store) = engine();
        let report = engine.catch_up_offline(1_000 + 3_600, false);
        assert!(report.qi_gained > 0.0);
        assert_eq!(engine.state().last_seen_at, 4_600);
        assert_eq!(store.save_count(), 1);
        assert!(engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, EngineEvent::OfflineGain(_))));
    }

    #[test]
    fn test_refine_steps_grants_qi_once_per_day() {
        let (mut engine, store) = engine();
        engine.drain_events();
        let day = crate::core::constants::SECONDS_PER_DAY;
        let now = 20 * day;

        let report = engine.refine_steps(2_000, now, false);
        assert_eq!(report.steps_refined, 2_000);
        assert!((engine.state().qi - 2_000.0 * tap_gain(1, 0)).abs() < 1e-9);
        assert!(engine
            .drain_events()
            .contains(&EngineEvent::StepsRefined(report)));
        let saved = store.load_state().unwrap().unwrap();
        assert_eq!(saved.steps.refined_today, 2_000);

        let saves = store.save_count();
        let repeat = engine.refine_steps(2_000, now + 30, false);
        assert_eq!(repeat.steps_refined, 0);
        assert_eq!(store.save_count(), saves);

        // Over the free cap: the rest of today's steps are refused
        let capped = engine.refine_steps(9_000, now + 60, false);
        assert_eq!(capped.steps_refined, 3_000);
        assert!(capped.limit_reached);
        assert!(engine
            .drain_events()
            .contains(&EngineEvent::Haptic(HapticCue::Success)));
        engine.refine_steps(9_000, now + 90, false);
        assert!(engine
            .drain_events()
            .contains(&EngineEvent::Haptic(HapticCue::Error)));

        let tomorrow = engine.refine_steps(1_000, now + day, false);
        assert_eq!(tomorrow.steps_refined, 1_000);
    }

    #[test]
    fn test_paywall_gate() {
        let mut saved = ProgressionState::new(0);
        saved.level = 10;
        let store = MemoryStore::with_snapshot(encode_snapshot(&saved).unwrap());
        let engine = engine_with(store, EventCatalog::empty());
        assert!(engine.needs_paywall(false));
        assert!(!engine.needs_paywall(true));
        assert!(engine.view(0, false).needs_paywall);
        assert!(!engine.view(0, true).needs_paywall);

        let (fresh, _) = self::engine();
        assert!(!fresh.needs_paywall(false));
        assert!(!fresh.view(0, false).needs_paywall);
    }

    #[test]
    fn test_outbox_is_bounded() {
        let (mut engine, _) = engine();
        for _ in 0..(EVENT_OUTBOX_CAPACITY * 3) {
            engine.tap(1_000);
        }
        assert_eq!(engine.drain_events().len(), EVENT_OUTBOX_CAPACITY);
    }

    #[test]
    fn test_chain_stops_on_major_floor() {
        let mut saved = ProgressionState::new(0);
        saved.level = 7;
        saved.qi = 1.0e9;
        saved.settings.auto_breakthrough_enabled = true;
        let store = MemoryStore::with_snapshot(encode_snapshot(&saved).unwrap());
        let mut engine = engine_with(store, EventCatalog::empty());

        // A roll of 0.0 always succeeds; StepRng yields zeros
        let mut rng = rand::rngs::mock::StepRng::new(0, 0);
        let outcomes = engine.attempt_breakthrough_chain(1_000, &mut rng);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(engine.state().level, 9);
    }
}
