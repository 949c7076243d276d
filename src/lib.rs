//! Cultivation - Idle Progression Engine Library
//!
//! Deterministic, storage-backed progression for a tap-and-idle
//! cultivation game: qi accrual, probabilistic breakthroughs, timed
//! effects, random events, offline catch-up, rebirth, and replication to
//! a companion device.

pub mod achievements;
pub mod chronicle;
pub mod core;
pub mod events;
pub mod save_manager;
pub mod simulator;
pub mod sync;
pub mod utils;
