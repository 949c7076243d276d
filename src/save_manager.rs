use crate::chronicle::Chronicle;
use crate::core::constants::{CHRONICLE_FILE, SAVE_VERSION_MAGIC, STATE_KEY};
use crate::core::game_state::{decode_snapshot, encode_snapshot, ProgressionState};
use crate::core::store::StateStore;
use crate::utils::persistence;
use directories::ProjectDirs;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Saves and loads the progression state as a checksummed file, with the
/// chronicle stored as JSON alongside.
pub struct SaveManager {
    dir: PathBuf,
    save_path: PathBuf,
}

impl SaveManager {
    /// Creates a new SaveManager instance
    ///
    /// Sets up the save directory at the appropriate location for the platform
    /// using the `directories` crate.
    pub fn new() -> io::Result<Self> {
        let project_dirs = ProjectDirs::from("", "", "cultivation").ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;

        Self::in_dir(project_dirs.config_dir())
    }

    /// A SaveManager rooted at `dir`, created if missing.
    pub fn in_dir(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            save_path: dir.join(format!("{}.dat", STATE_KEY)),
        })
    }

    /// A SaveManager in a fresh temp directory.
    pub fn new_for_test() -> io::Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "cultivation_test_{}_{}",
            std::process::id(),
            id
        ));
        Self::in_dir(&dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_path(&self) -> &Path {
        &self.save_path
    }

    /// Saves the state to disk with checksum verification
    ///
    /// File format:
    /// - Version magic (8 bytes)
    /// - Data length (4 bytes)
    /// - Snapshot (variable length)
    /// - SHA256 checksum (32 bytes)
    pub fn save(&self, state: &ProgressionState) -> io::Result<()> {
        let data = encode_snapshot(state)?;
        let data_len = u32::try_from(data.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "Snapshot too large"))?;

        // Compute checksum over version + length + data
        let mut hasher = Sha256::new();
        hasher.update(SAVE_VERSION_MAGIC.to_le_bytes());
        hasher.update(data_len.to_le_bytes());
        hasher.update(&data);
        let checksum = hasher.finalize();

        // Write next to the target, then rename over it
        let tmp_path = self.save_path.with_extension("dat.tmp");
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&SAVE_VERSION_MAGIC.to_le_bytes())?;
            file.write_all(&data_len.to_le_bytes())?;
            file.write_all(&data)?;
            file.write_all(&checksum)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.save_path)?;

        Ok(())
    }

    /// Loads the state from disk with checksum verification
    ///
    /// Returns an error if:
    /// - The file doesn't exist
    /// - The version magic is incorrect
    /// - The checksum verification fails
    /// - The snapshot cannot be decoded
    pub fn load(&self) -> io::Result<ProgressionState> {
        let mut file = fs::File::open(&self.save_path)?;

        // Read and verify version magic
        let mut version_bytes = [0u8; 8];
        file.read_exact(&mut version_bytes)?;
        let version = u64::from_le_bytes(version_bytes);

        if version != SAVE_VERSION_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Invalid save version: expected 0x{:016X}, got 0x{:016X}",
                    SAVE_VERSION_MAGIC, version
                ),
            ));
        }

        let mut length_bytes = [0u8; 4];
        file.read_exact(&mut length_bytes)?;
        let data_len = u32::from_le_bytes(length_bytes);

        let mut data = vec![0u8; data_len as usize];
        file.read_exact(&mut data)?;

        let mut stored_checksum = [0u8; 32];
        file.read_exact(&mut stored_checksum)?;

        let mut hasher = Sha256::new();
        hasher.update(version_bytes);
        hasher.update(length_bytes);
        hasher.update(&data);
        let computed_checksum = hasher.finalize();

        if stored_checksum != computed_checksum.as_slice() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Checksum verification failed",
            ));
        }

        decode_snapshot(&data)
    }

    /// Checks if a save file exists
    pub fn save_exists(&self) -> bool {
        self.save_path.exists()
    }
}

impl StateStore for SaveManager {
    fn load_state(&self) -> io::Result<Option<ProgressionState>> {
        match self.load() {
            Ok(state) => Ok(Some(state)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save_state(&mut self, state: &ProgressionState) -> io::Result<()> {
        self.save(state)
    }

    fn load_chronicle(&self) -> io::Result<Option<Chronicle>> {
        persistence::load_json(&self.dir, CHRONICLE_FILE)
    }

    fn save_chronicle(&mut self, chronicle: &Chronicle) -> io::Result<()> {
        persistence::save_json(&self.dir, CHRONICLE_FILE, chronicle)
    }

    fn clear(&mut self) -> io::Result<()> {
        match fs::remove_file(&self.save_path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
            _ => {}
        }
        persistence::remove_file(&self.dir, CHRONICLE_FILE)
    }
}
