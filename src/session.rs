//! The explicitly owned application state and its command dispatch.
//!
//! Collaborators (the CLI and the TUI) turn user input into [`Command`]s and
//! re-render from [`Session::projection`] after each [`Session::apply`].

use crate::io::kv::KvStore;
use crate::io::persistence::Persistence;
use crate::model::config::FilteredReorder;
use crate::model::task::today_iso;
use crate::model::theme::Theme;
use crate::ops::reorder::apply_reorder;
use crate::ops::task_store::{StoreError, TaskStore};
use crate::ops::view::{Projection, project};

/// A primitive user event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { text: String, date: Option<String> },
    ToggleDone(String),
    Remove(String),
    UpdateText { id: String, text: String },
    UpdateDate { id: String, date: String },
    /// Ids of the displayed tasks in their new visual order
    Reorder(Vec<String>),
    SetFilter(String),
    FilterToday,
    ClearFilter,
    BulkSort,
    CycleTheme,
}

/// What a command did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Store, filter or theme changed, so the view should be redrawn
    pub changed: bool,
    /// The change reached durable storage
    pub persisted: bool,
    /// Why the command was a no-op, when it was rejected
    pub rejected: Option<StoreError>,
    /// Id of the task created by `Add`
    pub created: Option<String>,
}

impl Outcome {
    fn rejected(err: StoreError) -> Self {
        Outcome {
            rejected: Some(err),
            ..Outcome::default()
        }
    }

    fn view_only(changed: bool) -> Self {
        Outcome {
            changed,
            ..Outcome::default()
        }
    }
}

/// What was mutated, so only the matching slot is rewritten
enum Dirty {
    Nothing,
    Tasks,
    Theme,
}

/// Single owner of the store, the active filter and the theme
pub struct Session<K: KvStore> {
    store: TaskStore,
    filter_date: String,
    theme: Theme,
    persistence: Persistence<K>,
    reorder_policy: FilteredReorder,
}

impl<K: KvStore> Session<K> {
    /// Load tasks and theme. The filter always starts cleared.
    pub fn open(persistence: Persistence<K>, reorder_policy: FilteredReorder) -> Self {
        let loaded = persistence.load();
        log::info!(
            "event=session_open tasks={} theme={}",
            loaded.tasks.len(),
            loaded.theme
        );
        Session {
            store: TaskStore::from_tasks(loaded.tasks),
            filter_date: String::new(),
            theme: loaded.theme,
            persistence,
            reorder_policy,
        }
    }

    /// Re-read both slots after another process rewrote them
    pub fn reload(&mut self) {
        let loaded = self.persistence.load();
        self.store.replace_tasks(loaded.tasks);
        self.theme = loaded.theme;
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Active filter date, empty when showing everything
    pub fn filter_date(&self) -> &str {
        &self.filter_date
    }

    pub fn persistence(&self) -> &Persistence<K> {
        &self.persistence
    }

    /// The tasks to display under the active filter
    pub fn projection(&self) -> Projection<'_> {
        project(self.store.tasks(), &self.filter_date)
    }

    pub fn apply(&mut self, command: Command) -> Outcome {
        log::debug!("event=command command={:?}", command);
        let result = match command {
            Command::Add { text, date } => self
                .store
                .add(&text, date.as_deref())
                .map(|task| (Dirty::Tasks, Some(task.id))),
            Command::ToggleDone(id) => self.store.toggle_done(&id).map(|_| (Dirty::Tasks, None)),
            Command::Remove(id) => self.store.remove(&id).map(|_| (Dirty::Tasks, None)),
            Command::UpdateText { id, text } => self
                .store
                .update_text(&id, &text)
                .map(|_| (Dirty::Tasks, None)),
            Command::UpdateDate { id, date } => self
                .store
                .update_date(&id, &date)
                .map(|_| (Dirty::Tasks, None)),
            Command::Reorder(ids) => {
                if apply_reorder(&mut self.store, &ids, self.reorder_policy) {
                    Ok((Dirty::Tasks, None))
                } else {
                    Ok((Dirty::Nothing, None))
                }
            }
            Command::BulkSort => {
                self.store.bulk_sort_by_date_then_order();
                Ok((Dirty::Tasks, None))
            }
            Command::CycleTheme => {
                self.theme = self.theme.next();
                Ok((Dirty::Theme, None))
            }
            Command::SetFilter(date) => return self.set_filter(date),
            Command::FilterToday => return self.set_filter(today_iso()),
            Command::ClearFilter => return self.set_filter(String::new()),
        };

        match result {
            Ok((dirty, created)) => {
                let (changed, persisted) = self.persist(dirty);
                Outcome {
                    changed,
                    persisted,
                    rejected: None,
                    created,
                }
            }
            Err(e) => {
                log::debug!("event=command status=ignored reason={}", e);
                Outcome::rejected(e)
            }
        }
    }

    fn set_filter(&mut self, date: String) -> Outcome {
        let changed = self.filter_date != date;
        self.filter_date = date;
        Outcome::view_only(changed)
    }

    /// Returns (changed, persisted)
    fn persist(&mut self, dirty: Dirty) -> (bool, bool) {
        let saved = match dirty {
            Dirty::Nothing => return (false, false),
            Dirty::Tasks => self.persistence.save_tasks(self.store.tasks()),
            Dirty::Theme => self.persistence.save_theme(self.theme),
        };
        (true, saved.is_ok())
    }
}
