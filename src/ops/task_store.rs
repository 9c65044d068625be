use std::cmp::Ordering;

use crate::model::task::{Task, today_iso};
use crate::ops::view::display_cmp;

/// Error type for store operations. Both variants are non-fatal: the store
/// is left untouched and callers may simply re-render.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("task text is empty")]
    EmptyInput,
    #[error("task not found: {0}")]
    NotFound(String),
}

/// The authoritative task collection.
///
/// Tasks keep insertion order in memory; display order is defined only by
/// each task's `order` key (see [`crate::ops::view`]).
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    ids: IdGen,
}

impl TaskStore {
    pub fn new() -> Self {
        TaskStore::default()
    }

    /// Build a store from previously persisted tasks
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        TaskStore {
            tasks,
            ids: IdGen::default(),
        }
    }

    /// Swap in freshly loaded tasks. The id generator carries over, so ids
    /// issued before the swap are not issued again.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Largest order key in the store, if any
    pub fn max_order(&self) -> Option<i64> {
        self.tasks.iter().map(|t| t.order).max()
    }

    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Append a new task after every existing one.
    ///
    /// An absent or empty `date` becomes today's date.
    pub fn add(&mut self, text: &str, date: Option<&str>) -> Result<Task, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyInput);
        }
        let date = match date {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => today_iso(),
        };
        let order = match self.max_order() {
            None => 1,
            Some(max) => match max.checked_add(1) {
                Some(order) => order,
                None => {
                    self.compact_orders();
                    self.tasks.len() as i64 + 1
                }
            },
        };
        let id = self.ids.next(&self.tasks);
        let task = Task::new(id, text.to_string(), date, order);
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Flip the done flag. Returns the new value.
    pub fn toggle_done(&mut self, id: &str) -> Result<bool, StoreError> {
        let task = self.find_mut(id)?;
        task.done = !task.done;
        Ok(task.done)
    }

    /// Delete a task, returning it
    pub fn remove(&mut self, id: &str) -> Result<Task, StoreError> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(self.tasks.remove(idx))
    }

    /// Replace a task's text with `new_text` trimmed. Blank text keeps the
    /// existing value and reports `EmptyInput`.
    pub fn update_text(&mut self, id: &str, new_text: &str) -> Result<(), StoreError> {
        let task = self.find_mut(id)?;
        let trimmed = new_text.trim();
        if trimmed.is_empty() {
            return Err(StoreError::EmptyInput);
        }
        task.text = trimmed.to_string();
        Ok(())
    }

    /// Set a task's date unconditionally; empty clears it.
    pub fn update_date(&mut self, id: &str, new_date: &str) -> Result<(), StoreError> {
        let task = self.find_mut(id)?;
        task.date = new_date.to_string();
        Ok(())
    }

    /// Overwrite one task's order key
    pub fn set_order(&mut self, id: &str, order: i64) -> Result<(), StoreError> {
        self.find_mut(id)?.order = order;
        Ok(())
    }

    /// Sort every task by (date, order) with undated tasks first, then
    /// renumber order keys 1..N in that sequence.
    pub fn bulk_sort_by_date_then_order(&mut self) {
        self.tasks.sort_by(date_then_order);
        for (i, task) in self.tasks.iter_mut().enumerate() {
            task.order = i as i64 + 1;
        }
    }

    /// Renumber order keys 1..N keeping the current display order.
    fn compact_orders(&mut self) {
        let mut ranked: Vec<usize> = (0..self.tasks.len()).collect();
        ranked.sort_by(|&a, &b| display_cmp(&self.tasks[a], &self.tasks[b]));
        for (rank, idx) in ranked.into_iter().enumerate() {
            self.tasks[idx].order = rank as i64 + 1;
        }
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Task, StoreError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

fn date_then_order(a: &Task, b: &Task) -> Ordering {
    a.date.cmp(&b.date).then(a.order.cmp(&b.order))
}

// ---------------------------------------------------------------------------
// Id generation
// ---------------------------------------------------------------------------

/// Issues short base36 ids from a clock-seeded counter that only moves
/// forward, so an id is never handed out twice while the process lives.
#[derive(Debug, Clone, Default)]
struct IdGen {
    last: u64,
}

impl IdGen {
    fn next(&mut self, existing: &[Task]) -> String {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let mut n = now.max(self.last + 1);
        loop {
            let id = to_base36(n);
            if !existing.iter().any(|t| t.id == id) {
                self.last = n;
                return id;
            }
            n += 1;
        }
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
