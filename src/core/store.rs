//! Storage seam between the engine and wherever the snapshot lives.

use super::game_state::{decode_snapshot, encode_snapshot, ProgressionState};
use crate::chronicle::Chronicle;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

/// One state blob under one key, plus the chronicle.
///
/// `load_state` returns `Ok(None)` when nothing was ever saved and an error
/// when something was saved but cannot be read back.
pub trait StateStore: Send {
    fn load_state(&self) -> io::Result<Option<ProgressionState>>;
    /// Full overwrite.
    fn save_state(&mut self, state: &ProgressionState) -> io::Result<()>;
    fn load_chronicle(&self) -> io::Result<Option<Chronicle>>;
    fn save_chronicle(&mut self, chronicle: &Chronicle) -> io::Result<()>;
    /// Removes everything this store holds.
    fn clear(&mut self) -> io::Result<()>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    snapshot: Option<Vec<u8>>,
    chronicle: Option<Chronicle>,
    saves: u64,
}

/// In-memory store. Clones share the same storage, so a test can keep a
/// handle while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with raw snapshot bytes.
    pub fn with_snapshot(bytes: Vec<u8>) -> Self {
        let store = Self::default();
        store.lock().snapshot = Some(bytes);
        store
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of successful `save_state` calls.
    pub fn save_count(&self) -> u64 {
        self.lock().saves
    }

    pub fn raw_snapshot(&self) -> Option<Vec<u8>> {
        self.lock().snapshot.clone()
    }
}

impl StateStore for MemoryStore {
    fn load_state(&self) -> io::Result<Option<ProgressionState>> {
        match self.lock().snapshot.as_deref() {
            Some(bytes) => decode_snapshot(bytes).map(Some),
            None => Ok(None),
        }
    }

    fn save_state(&mut self, state: &ProgressionState) -> io::Result<()> {
        let bytes = encode_snapshot(state)?;
        let mut inner = self.lock();
        inner.snapshot = Some(bytes);
        inner.saves += 1;
        Ok(())
    }

    fn load_chronicle(&self) -> io::Result<Option<Chronicle>> {
        Ok(self.lock().chronicle.clone())
    }

    fn save_chronicle(&mut self, chronicle: &Chronicle) -> io::Result<()> {
        self.lock().chronicle = Some(chronicle.clone());
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        let mut inner = self.lock();
        inner.snapshot = None;
        inner.chronicle = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_has_no_state() {
        let store = MemoryStore::new();
        assert!(store.load_state().unwrap().is_none());
        assert!(store.load_chronicle().unwrap().is_none());
    }

    #[test]
    fn test_clones_share_storage() {
        let observer = MemoryStore::new();
        let mut store = observer.clone();
        let mut state = ProgressionState::new(5);
        state.level = 33;
        store.save_state(&state).unwrap();

        assert_eq!(observer.save_count(), 1);
        assert_eq!(observer.load_state().unwrap().unwrap().level, 33);
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let store = MemoryStore::with_snapshot(b"garbage".to_vec());
        assert!(store.load_state().is_err());
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut store = MemoryStore::new();
        store.save_state(&ProgressionState::new(0)).unwrap();
        store.save_chronicle(&Chronicle::new(0)).unwrap();
        store.clear().unwrap();
        assert!(store.load_state().unwrap().is_none());
        assert!(store.load_chronicle().unwrap().is_none());
    }
}
