use super::constants::{MAX_LEVEL, SNAPSHOT_SCHEMA_VERSION};
use super::effects::TemporalEffects;
use super::steps::StepLedger;
use serde::{Deserialize, Serialize};
use std::io;

/// Player-facing toggles. Survive prestige.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub haptics_enabled: bool,
    pub sound_enabled: bool,
    pub auto_gain_enabled: bool,
    pub auto_breakthrough_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            haptics_enabled: true,
            sound_enabled: true,
            auto_gain_enabled: true,
            auto_breakthrough_enabled: false,
        }
    }
}

/// Consumables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Items {
    /// Each charm negates the qi penalty of one failed breakthrough.
    pub protection_charm: u32,
}

fn default_level() -> u32 {
    1
}

/// The authoritative player record and the only persisted aggregate.
///
/// Every field other than `player_id` carries an explicit default so that
/// snapshots written by older schema versions load with safe values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionState {
    #[serde(default)]
    pub player_id: String,
    #[serde(default = "default_level")]
    pub level: u32,
    /// Accumulated qi. Never negative.
    #[serde(default)]
    pub qi: f64,
    #[serde(default)]
    pub tap_count: u64,
    #[serde(default)]
    pub total_failures: u64,
    #[serde(default)]
    pub prestige_count: u32,
    /// Failures since the last success. Tracked but not consulted by any rule.
    #[serde(default)]
    pub consecutive_failures: u32,
    #[serde(default)]
    pub items: Items,
    #[serde(default)]
    pub effects: TemporalEffects,
    #[serde(default)]
    pub settings: Settings,
    /// Steps already refined today.
    #[serde(default)]
    pub steps: StepLedger,
    /// Unix timestamp of the last save; drives offline catch-up.
    #[serde(default)]
    pub last_seen_at: i64,
}

impl ProgressionState {
    /// Creates a new-player state.
    pub fn new(current_time: i64) -> Self {
        use uuid::Uuid;

        Self {
            player_id: Uuid::new_v4().to_string(),
            level: 1,
            qi: 0.0,
            tap_count: 0,
            total_failures: 0,
            prestige_count: 0,
            consecutive_failures: 0,
            items: Items::default(),
            effects: TemporalEffects::default(),
            settings: Settings::default(),
            steps: StepLedger::default(),
            last_seen_at: current_time,
        }
    }

    pub fn is_ascended(&self) -> bool {
        self.level >= MAX_LEVEL
    }

    /// Deducts qi, clamping at zero.
    pub fn spend_qi(&mut self, amount: f64) {
        self.qi = (self.qi - amount).max(0.0);
    }

    /// Repairs values a hand-edited or older snapshot could carry.
    /// Returns the number of fields that needed fixing.
    pub fn sanitize(&mut self) -> usize {
        let mut fixed = 0;
        if self.player_id.is_empty() {
            self.player_id = uuid::Uuid::new_v4().to_string();
            fixed += 1;
        }
        if self.level == 0 || self.level > MAX_LEVEL {
            self.level = self.level.clamp(1, MAX_LEVEL);
            fixed += 1;
        }
        if !self.qi.is_finite() || self.qi < 0.0 {
            self.qi = 0.0;
            fixed += 1;
        }
        if let Some(d) = self.effects.debuff {
            if !(d.multiplier > 0.0 && d.multiplier <= 1.0) {
                self.effects.debuff = None;
                fixed += 1;
            }
        }
        for boost in [&mut self.effects.tap_boost, &mut self.effects.auto_boost] {
            if boost.is_some_and(|b| !b.bonus_ratio.is_finite()) {
                *boost = None;
                fixed += 1;
            }
        }
        fixed
    }
}

/// Versioned envelope written to storage and to the companion device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub version: u32,
    pub state: ProgressionState,
}

/// Serializes a state into the snapshot format shared by persistence and
/// replication.
pub fn encode_snapshot(state: &ProgressionState) -> io::Result<Vec<u8>> {
    let file = SnapshotFile {
        version: SNAPSHOT_SCHEMA_VERSION,
        state: state.clone(),
    };
    serde_json::to_vec(&file).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Decodes and validates a snapshot.
///
/// Snapshots from a newer schema are rejected; older ones are accepted and
/// missing fields take their defaults. A bare state without the version
/// envelope is treated as version 1.
pub fn decode_snapshot(bytes: &[u8]) -> io::Result<ProgressionState> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let (version, state_value) = match value {
        serde_json::Value::Object(mut map) if map.contains_key("state") => {
            let version = map
                .get("version")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(1) as u32;
            let state = map.remove("state").unwrap_or(serde_json::Value::Null);
            (version, state)
        }
        other => (1, other),
    };

    if version > SNAPSHOT_SCHEMA_VERSION {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Snapshot schema {} is newer than supported {}",
                version, SNAPSHOT_SCHEMA_VERSION
            ),
        ));
    }

    let mut state: ProgressionState = serde_json::from_value(state_value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    state.sanitize();
    Ok(state)
}
