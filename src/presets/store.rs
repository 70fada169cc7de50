//! Named queue templates persisted under a fixed storage key

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::kv::KeyValueStore;
use crate::queue::ItemFields;

/// Storage key holding the JSON array of presets
pub const STORAGE_KEY: &str = "workout-timer-presets";

/// A named, durable snapshot of queue content. Carries no item ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub items: Vec<ItemFields>,
}

/// Preset list with write-through persistence.
///
/// Storage problems never reach the caller: unreadable data loads as an empty
/// list and failed writes are logged while the in-memory list stays current.
pub struct PresetStore {
    backend: Box<dyn KeyValueStore>,
    presets: Vec<Preset>,
    next_id: u64,
}

impl PresetStore {
    /// Load presets from `backend`
    pub fn open(backend: Box<dyn KeyValueStore>) -> Self {
        let presets = load_presets(backend.as_ref());
        let seed = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let above_existing = presets
            .iter()
            .filter_map(|p| p.id.parse::<u64>().ok())
            .max()
            .map_or(0, |max| max.saturating_add(1));

        info!("Loaded {} presets", presets.len());
        Self {
            backend,
            presets,
            next_id: seed.max(above_existing),
        }
    }

    pub fn list(&self) -> &[Preset] {
        &self.presets
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Append a new preset and return it
    pub fn save(&mut self, name: &str, items: &[ItemFields]) -> Preset {
        let preset = Preset {
            id: self.fresh_id(),
            name: name.to_string(),
            items: items.to_vec(),
        };
        self.presets.push(preset.clone());
        self.persist();
        preset
    }

    /// Next counter value not already taken by a stored preset
    fn fresh_id(&mut self) -> String {
        loop {
            let id = self.next_id.to_string();
            self.next_id = self.next_id.wrapping_add(1);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Remove the preset with `id`. Returns false when it does not exist.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.presets.len();
        self.presets.retain(|p| p.id != id);
        let removed = self.presets.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Rename the preset with `id`, leaving its items untouched
    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        match self.presets.iter_mut().find(|p| p.id == id) {
            Some(preset) => {
                preset.name = name.to_string();
                self.persist();
                true
            }
            None => false,
        }
    }

    fn persist(&mut self) {
        let encoded = match serde_json::to_string(&self.presets) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode presets: {}", e);
                return;
            }
        };
        if let Err(e) = self.backend.set(STORAGE_KEY, &encoded) {
            warn!("Failed to persist presets: {}", e);
        }
    }
}

fn load_presets(backend: &dyn KeyValueStore) -> Vec<Preset> {
    let raw = match backend.get(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Preset storage unreadable, starting empty: {}", e);
            return Vec::new();
        }
    };
    let records: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!("Preset data corrupt, starting empty: {}", e);
            return Vec::new();
        }
    };

    // A bad record is dropped on its own; the rest still load
    records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| match serde_json::from_value(record) {
            Ok(preset) => Some(preset),
            Err(e) => {
                warn!("Skipping malformed preset record {}: {}", i, e);
                None
            }
        })
        .collect()
}
