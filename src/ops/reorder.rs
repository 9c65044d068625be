//! Turns a rearranged visual sequence into order keys, and a stream of drag
//! pointer positions into that sequence.

use std::collections::HashSet;

use crate::model::config::FilteredReorder;
use crate::ops::task_store::TaskStore;
use crate::ops::view::project;

// ---------------------------------------------------------------------------
// Renumbering
// ---------------------------------------------------------------------------

/// Give the tasks in `ordered_ids` strictly increasing order keys in
/// sequence order. Unknown and repeated ids are skipped.
///
/// When the ids cover the whole store they become 1..N. When they are a
/// subset (a filtered view), `policy` decides what happens to the tasks the
/// filter hides. Returns whether any key changed.
pub fn apply_reorder(store: &mut TaskStore, ordered_ids: &[String], policy: FilteredReorder) -> bool {
    let mut seen = HashSet::new();
    let visible: Vec<String> = ordered_ids
        .iter()
        .filter(|id| store.contains(id) && seen.insert(id.as_str()))
        .cloned()
        .collect();
    if visible.is_empty() {
        return false;
    }

    let before: Vec<(String, i64)> = store
        .tasks()
        .iter()
        .map(|t| (t.id.clone(), t.order))
        .collect();

    if visible.len() == store.len() || policy == FilteredReorder::Compatible {
        renumber_from_one(store, &visible);
    } else {
        let mut keys: Vec<i64> = visible
            .iter()
            .filter_map(|id| store.get(id).map(|t| t.order))
            .collect();
        keys.sort_unstable();
        if keys.windows(2).all(|w| w[0] < w[1]) {
            for (id, key) in visible.iter().zip(keys) {
                let _ = store.set_order(id, key);
            }
        } else {
            renumber_with_hidden(store, &visible);
        }
    }

    store
        .tasks()
        .iter()
        .zip(&before)
        .any(|(t, (id, order))| &t.id != id || t.order != *order)
}

fn renumber_from_one(store: &mut TaskStore, ids: &[String]) {
    for (i, id) in ids.iter().enumerate() {
        let _ = store.set_order(id, i as i64 + 1);
    }
}

/// Lay the visible sequence into the slots the visible tasks occupy in the
/// unfiltered display order, then renumber everything 1..N.
fn renumber_with_hidden(store: &mut TaskStore, visible: &[String]) {
    let visible_set: HashSet<&str> = visible.iter().map(String::as_str).collect();
    let mut replacements = visible.iter();
    let merged: Vec<String> = project(store.tasks(), "")
        .ids()
        .into_iter()
        .map(|id| {
            if visible_set.contains(id.as_str()) {
                replacements.next().cloned().unwrap_or(id)
            } else {
                id
            }
        })
        .collect();
    renumber_from_one(store, &merged);
}

// ---------------------------------------------------------------------------
// Drag gesture
// ---------------------------------------------------------------------------

/// An in-progress drag of one displayed item.
///
/// The displayed sequence is reshuffled on every midpoint crossing; only
/// [`DragSession::drop`] hands a sequence back for renumbering.
#[derive(Debug, Clone)]
pub struct DragSession {
    dragged: String,
    origin: Vec<String>,
    current: Vec<String>,
}

impl DragSession {
    /// Begin dragging `dragged` within the `displayed` ids. Returns `None`
    /// if the item is not displayed.
    pub fn start(displayed: Vec<String>, dragged: &str) -> Option<Self> {
        if !displayed.iter().any(|id| id == dragged) {
            return None;
        }
        Some(DragSession {
            dragged: dragged.to_string(),
            origin: displayed.clone(),
            current: displayed,
        })
    }

    pub fn dragged(&self) -> &str {
        &self.dragged
    }

    /// The displayed sequence as currently rearranged
    pub fn sequence(&self) -> &[String] {
        &self.current
    }

    /// The pointer is over `target`, whose rendered box starts at
    /// `target_top` and is `target_height` tall. Moves the dragged item
    /// before the target when the pointer is in its upper half and after it
    /// when in the lower half. Returns whether the sequence changed.
    pub fn hover(&mut self, target: &str, pointer_y: f64, target_top: f64, target_height: f64) -> bool {
        if target == self.dragged || target_height <= 0.0 {
            return false;
        }
        if !self.current.iter().any(|id| id == target) {
            return false;
        }
        let after = (pointer_y - target_top) / target_height > 0.5;

        let previous = self.current.clone();
        self.current.retain(|id| id != &self.dragged);
        let Some(target_idx) = self.current.iter().position(|id| id == target) else {
            self.current = previous;
            return false;
        };
        let insert_at = if after { target_idx + 1 } else { target_idx };
        self.current.insert(insert_at, self.dragged.clone());
        self.current != previous
    }

    /// Finish the drag. Returns the final sequence, or `None` when the item
    /// ended where it started.
    pub fn drop(self) -> Option<Vec<String>> {
        if self.current == self.origin {
            None
        } else {
            Some(self.current)
        }
    }

    /// Abandon the drag (release outside any target). Nothing is reordered.
    pub fn cancel(self) -> Vec<String> {
        self.origin
    }
}
