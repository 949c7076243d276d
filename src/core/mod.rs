//! Core progression: state, formulas, the breakthrough machine, offline
//! catch-up, prestige and the engine that ties them together.

pub mod breakthrough;
pub mod config;
pub mod constants;
pub mod effects;
pub mod engine;
pub mod formulas;
pub mod game_state;
pub mod offline;
pub mod prestige;
pub mod scheduler;
pub mod steps;
pub mod store;

pub use breakthrough::{BreakthroughOutcome, BreakthroughPhase};
pub use config::{EngineConfig, ReplicationConfig};
pub use effects::{ActiveEffect, EffectSlot, TemporalEffects};
pub use engine::{
    ChoiceOutcome, EngineEvent, EngineView, HapticCue, Job, ProgressionEngine, TickReport,
};
pub use game_state::{ProgressionState, Settings};
pub use offline::OfflineReport;
pub use prestige::PrestigeOutcome;
pub use scheduler::Scheduler;
pub use steps::{StepLedger, StepRefineReport};
pub use store::{MemoryStore, StateStore};
