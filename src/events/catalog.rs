//! Event catalog loading.
//!
//! A catalog that cannot be read or parsed is treated as empty: the game
//! keeps running, it just never opens an event.

use super::types::EventDefinition;
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// Catalog shipped with the crate.
const BUILTIN_EVENTS: &str = include_str!("../../data/events.json");

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventCatalog {
    events: Vec<EventDefinition>,
}

impl EventCatalog {
    pub fn new(events: Vec<EventDefinition>) -> Self {
        Self { events }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> io::Result<Self> {
        let events: Vec<EventDefinition> = serde_json::from_str(json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Self { events })
    }

    /// The built-in catalog, or an empty one if it somehow fails to parse.
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_EVENTS).unwrap_or_else(|e| {
            warn!(error = %e, "built-in event catalog is invalid, events disabled");
            Self::empty()
        })
    }

    /// Loads a catalog file. Failures are logged and yield an empty catalog.
    pub fn load(path: &Path) -> Self {
        let result = std::fs::read_to_string(path).and_then(|json| Self::from_json_str(&json));
        match result {
            Ok(catalog) => {
                info!(path = %path.display(), count = catalog.len(), "loaded event catalog");
                catalog
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "event catalog failed to load, events disabled");
                Self::empty()
            }
        }
    }

    pub fn events(&self) -> &[EventDefinition] {
        &self.events
    }

    pub fn get(&self, id: &str) -> Option<&EventDefinition> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formulas::tier_index_of;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = EventCatalog::builtin();
        assert!(!catalog.is_empty());
        assert!(catalog.get("ev_quiet_breeze").is_some());
        // The fallback pool is never empty
        assert!(catalog.events().iter().any(|e| e.is_unbounded()));
    }

    #[test]
    fn test_builtin_tier_names_are_known() {
        for event in EventCatalog::builtin().events() {
            for name in [&event.min_tier, &event.max_tier].into_iter().flatten() {
                assert!(tier_index_of(name).is_some(), "{}: {}", event.id, name);
            }
            assert!(!event.choices.is_empty(), "{} has no choices", event.id);
        }
    }

    #[test]
    fn test_missing_file_yields_empty_catalog() {
        let catalog = EventCatalog::load(Path::new("/nonexistent/events.json"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(EventCatalog::from_json_str("[{\"id\": 3}]").is_err());
        assert!(EventCatalog::from_json_str("not json").is_err());
    }
}
