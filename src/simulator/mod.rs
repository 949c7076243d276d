//! Headless balance simulator.
//!
//! Drives a [`ProgressionEngine`](crate::core::ProgressionEngine) with a
//! scripted player over simulated seconds to analyze:
//! - Time to reach each major tier
//! - Breakthrough failure rates along the curve
//! - How often events fire and what they pay out
//! - Prestige pacing
//!
//! The simulator calls the same engine operations a real client does, so its
//! numbers follow the real formulas.

mod config;
mod report;
mod runner;

pub use config::SimConfig;
pub use report::{RunStats, SimReport};
pub use runner::{run_simulation, simulate_single_run};
