//! Task and theme slots on top of a [`KvStore`].

use std::path::PathBuf;

use crate::io::kv::{KvStore, StorageError};
use crate::io::recovery;
use crate::model::task::Task;
use crate::model::theme::Theme;

/// Slot holding the JSON array of task records
pub const TASKS_KEY: &str = "tasks_v2";
/// Slot holding the theme name
pub const THEME_KEY: &str = "theme_v2";

/// Everything read back from storage at startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedState {
    pub tasks: Vec<Task>,
    pub theme: Theme,
}

/// Serializes store state into named slots.
///
/// Loading never fails: a missing slot reads as empty, and a slot that does
/// not parse is copied to the recovery log (when `recovery_dir` is set) and
/// then treated as empty.
pub struct Persistence<K: KvStore> {
    kv: K,
    recovery_dir: Option<PathBuf>,
}

impl<K: KvStore> Persistence<K> {
    pub fn new(kv: K) -> Self {
        Persistence {
            kv,
            recovery_dir: None,
        }
    }

    /// Keep unreadable or unsaved payloads in the recovery log under `dir`
    pub fn with_recovery_dir(mut self, dir: PathBuf) -> Self {
        self.recovery_dir = Some(dir);
        self
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Read tasks and theme
    pub fn load(&self) -> LoadedState {
        LoadedState {
            tasks: self.load_tasks(),
            theme: self.load_theme(),
        }
    }

    pub fn load_tasks(&self) -> Vec<Task> {
        let raw = match self.kv.get(TASKS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::error!("event=load_tasks status=error error={}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Option<Vec<Task>>>(&raw) {
            Ok(tasks) => {
                let tasks = tasks.unwrap_or_default();
                log::debug!("event=load_tasks status=ok count={}", tasks.len());
                tasks
            }
            Err(e) => {
                log::warn!("event=load_tasks status=corrupt error={}", e);
                if let Some(dir) = &self.recovery_dir {
                    recovery::log_corrupt_slot(dir, TASKS_KEY, &e.to_string(), &raw);
                }
                Vec::new()
            }
        }
    }

    pub fn load_theme(&self) -> Theme {
        match self.kv.get(THEME_KEY) {
            // Older slots hold the bare name rather than a JSON string
            Ok(raw) => {
                let name = raw.map(|raw| serde_json::from_str::<String>(&raw).unwrap_or(raw));
                Theme::from_stored(name.as_deref())
            }
            Err(e) => {
                log::error!("event=load_theme status=error error={}", e);
                Theme::default()
            }
        }
    }

    /// Write the full task list
    pub fn save_tasks(&mut self, tasks: &[Task]) -> Result<(), StorageError> {
        let payload = serde_json::to_string(tasks)?;
        self.write_slot(TASKS_KEY, &payload)?;
        log::debug!("event=save_tasks status=ok count={}", tasks.len());
        Ok(())
    }

    pub fn save_theme(&mut self, theme: Theme) -> Result<(), StorageError> {
        let payload = serde_json::to_string(theme.name())?;
        self.write_slot(THEME_KEY, &payload)
    }

    fn write_slot(&mut self, key: &str, payload: &str) -> Result<(), StorageError> {
        self.kv.set(key, payload).inspect_err(|e| {
            log::error!("event=save status=error slot={} error={}", key, e);
            if let Some(dir) = &self.recovery_dir {
                recovery::log_failed_write(dir, key, &e.to_string(), payload);
            }
        })
    }
}
