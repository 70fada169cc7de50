//! Main application state management

use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::info;

use super::error::{Result, StateError};
use crate::{
    engine::{Engine, EngineSnapshot, RunStatus},
    notify::CompletionNotice,
    presets::{Preset, PresetStore},
    queue::{ItemId, ItemPatch, Queue},
};

/// Shared state behind every HTTP handler
pub struct AppState {
    /// Queue and countdown engine
    pub engine: Engine,
    /// Saved queue templates
    presets: Mutex<PresetStore>,
    /// Completion notices for event stream subscribers
    pub notice_tx: broadcast::Sender<CompletionNotice>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        engine: Engine,
        presets: PresetStore,
        notice_tx: broadcast::Sender<CompletionNotice>,
    ) -> Self {
        Self {
            engine,
            presets: Mutex::new(presets),
            notice_tx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    fn presets(&self) -> MutexGuard<'_, PresetStore> {
        self.presets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Run a queue edit if no workout is in progress
    fn edit_queue<R>(&self, action: &str, edit: impl FnOnce(&mut Queue) -> R) -> Result<R> {
        let result = self.engine.edit_queue(edit).ok_or_else(|| {
            info!("Refused {} while engine is {:?}", action, self.engine.status());
            StateError::QueueLocked
        })?;
        self.record_action(action);
        Ok(result)
    }

    // ── Queue ────────────────────────────────────────────────────────

    pub fn queue(&self) -> Queue {
        self.engine.queue()
    }

    /// True while the queue must not be edited
    pub fn is_running(&self) -> bool {
        matches!(self.engine.status(), RunStatus::Running | RunStatus::Paused)
    }

    pub fn add_item(&self) -> Result<ItemId> {
        let id = self.edit_queue("add-item", Queue::add)?;
        info!("Added item {}", id);
        Ok(id)
    }

    pub fn remove_item(&self, id: ItemId) -> Result<bool> {
        self.edit_queue("remove-item", |queue| queue.remove(id))
    }

    /// Clamp `patch` to the allowed field ranges and merge it into item `id`
    pub fn update_item(&self, id: ItemId, patch: ItemPatch) -> Result<bool> {
        let patch = patch.clamped();
        self.edit_queue("update-item", |queue| queue.update(id, &patch))
    }

    pub fn move_item(&self, index: usize, direction: isize) -> Result<bool> {
        self.edit_queue("move-item", |queue| queue.move_item(index, direction))
    }

    // ── Engine ───────────────────────────────────────────────────────

    pub fn start(&self, index: usize) -> EngineSnapshot {
        self.record_action("start");
        self.engine.start(index)
    }

    pub fn pause(&self) -> EngineSnapshot {
        self.record_action("pause");
        self.engine.pause()
    }

    pub fn resume(&self) -> EngineSnapshot {
        self.record_action("resume");
        self.engine.resume()
    }

    pub fn stop(&self) -> EngineSnapshot {
        self.record_action("stop");
        self.engine.stop()
    }

    // ── Presets ──────────────────────────────────────────────────────

    pub fn list_presets(&self) -> Vec<Preset> {
        self.presets().list().to_vec()
    }

    /// Save the current queue under `name`
    pub fn save_preset(&self, name: &str) -> Result<Preset> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StateError::EmptyName);
        }
        let items = self.engine.queue().fields();
        if items.is_empty() {
            return Err(StateError::EmptyQueue);
        }

        let preset = self.presets().save(name, &items);
        self.record_action("save-preset");
        info!("Saved preset '{}' ({} items)", preset.name, preset.items.len());
        Ok(preset)
    }

    pub fn rename_preset(&self, id: &str, name: &str) -> Result<Preset> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StateError::EmptyName);
        }

        let mut presets = self.presets();
        if !presets.rename(id, name) {
            return Err(StateError::PresetNotFound(id.to_string()));
        }
        let preset = presets
            .get(id)
            .cloned()
            .ok_or_else(|| StateError::PresetNotFound(id.to_string()))?;
        drop(presets);

        self.record_action("rename-preset");
        Ok(preset)
    }

    pub fn delete_preset(&self, id: &str) -> Result<()> {
        if !self.presets().delete(id) {
            return Err(StateError::PresetNotFound(id.to_string()));
        }
        self.record_action("delete-preset");
        info!("Deleted preset {}", id);
        Ok(())
    }

    /// Replace the queue with a preset's items. Refused during a workout.
    pub fn load_preset(&self, id: &str) -> Result<Queue> {
        let items = self
            .presets()
            .get(id)
            .map(|p| p.items.clone())
            .ok_or_else(|| StateError::PresetNotFound(id.to_string()))?;

        self.edit_queue("load-preset", |queue| {
            queue.load_all(&items);
            queue.clone()
        })
    }

    // ── Metadata ─────────────────────────────────────────────────────

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        notify::NotificationSink,
        presets::MemoryStore,
        queue::ItemFields,
    };
    use std::{sync::Arc, time::Duration};

    struct Silent;

    impl NotificationSink for Silent {
        fn notify(&self, _completed: &ItemFields, _next: Option<&ItemFields>) {}
    }

    fn state() -> AppState {
        let (notice_tx, _) = broadcast::channel(8);
        let engine = Engine::new(Queue::with_default_item(), Duration::from_secs(1), Arc::new(Silent));
        let presets = PresetStore::open(Box::new(MemoryStore::new()));
        AppState::new(0, "127.0.0.1".to_string(), engine, presets, notice_tx)
    }

    #[tokio::test(start_paused = true)]
    async fn queue_edits_refused_while_running() {
        let state = state();
        state.start(0);
        assert!(state.is_running());
        assert_eq!(state.add_item(), Err(StateError::QueueLocked));

        state.pause();
        let id = state.queue().items()[0].id;
        assert_eq!(state.remove_item(id), Err(StateError::QueueLocked));

        state.stop();
        assert_eq!(state.remove_item(id), Ok(true));
        assert_eq!(state.get_last_action().0.as_deref(), Some("remove-item"));
    }

    #[tokio::test]
    async fn update_clamps_fields() {
        let state = state();
        let id = state.queue().items()[0].id;
        let patch = ItemPatch {
            minutes: Some(500),
            seconds: Some(99),
            speed: Some(-1.0),
        };
        assert_eq!(state.update_item(id, patch), Ok(true));
        assert_eq!(state.queue().items()[0].fields, ItemFields::new(99, 59, 0.0));
    }

    #[tokio::test]
    async fn save_preset_validates_name_and_queue() {
        let state = state();
        assert_eq!(state.save_preset("   "), Err(StateError::EmptyName));

        let saved = state.save_preset("  Warmup ").unwrap();
        assert_eq!(saved.name, "Warmup");

        let id = state.queue().items()[0].id;
        state.remove_item(id).unwrap();
        assert_eq!(state.save_preset("Empty"), Err(StateError::EmptyQueue));
    }

    #[tokio::test(start_paused = true)]
    async fn load_preset_replaces_queue_with_fresh_ids() {
        let state = state();
        let preset = {
            let id = state.queue().items()[0].id;
            state
                .update_item(id, ItemPatch { minutes: Some(1), seconds: Some(30), speed: Some(6.0) })
                .unwrap();
            state.save_preset("One").unwrap()
        };
        let old_ids: Vec<ItemId> = state.queue().items().iter().map(|i| i.id).collect();
        state.add_item().unwrap();

        let queue = state.load_preset(&preset.id).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.items()[0].fields, ItemFields::new(1, 30, 6.0));
        assert!(!old_ids.contains(&queue.items()[0].id));

        state.start(0);
        assert_eq!(state.load_preset(&preset.id).unwrap_err(), StateError::QueueLocked);
        assert_eq!(
            state.load_preset("nope").unwrap_err(),
            StateError::PresetNotFound("nope".to_string())
        );
        state.stop();
    }

    #[tokio::test]
    async fn rename_and_delete_unknown_preset() {
        let state = state();
        let saved = state.save_preset("A").unwrap();

        let renamed = state.rename_preset(&saved.id, " B ").unwrap();
        assert_eq!(renamed.id, saved.id);
        assert_eq!(renamed.name, "B");
        assert_eq!(state.rename_preset(&saved.id, ""), Err(StateError::EmptyName));
        assert!(matches!(
            state.rename_preset("missing", "C"),
            Err(StateError::PresetNotFound(_))
        ));

        state.delete_preset(&saved.id).unwrap();
        assert!(state.list_presets().is_empty());
        assert!(state.delete_preset(&saved.id).is_err());
    }
}
