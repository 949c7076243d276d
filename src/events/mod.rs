//! Random events: catalog, tier-filtered selection and effect resolution.

pub mod catalog;
pub mod logic;
pub mod types;

pub use catalog::EventCatalog;
pub use logic::{
    is_within_tier_bounds, resolve_effect, resolve_effect_with_coin, select_event,
    EffectOutcome, ResolvedEffect,
};
pub use types::{ChoiceDefinition, EffectDefinition, EventDefinition};
