//! Derives the displayed sequence from the store without mutating it.

use std::cmp::Ordering;

use crate::model::task::Task;

/// The filtered, sorted view of a task slice.
///
/// Holds borrowed tasks in display order; [`Projection::iter`] can be called
/// any number of times and always yields the same sequence.
#[derive(Debug, Clone)]
pub struct Projection<'a> {
    items: Vec<&'a Task>,
}

impl<'a> Projection<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a Task> + '_ {
        self.items.iter().copied()
    }

    /// Displayed ids, in order
    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|t| t.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a Task> {
        self.items.get(index).copied()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|t| t.id == id)
    }
}

/// Filter to tasks dated `filter_date` (all tasks when empty), then sort by
/// order key with text as the tie-break.
pub fn project<'a>(tasks: &'a [Task], filter_date: &str) -> Projection<'a> {
    let mut items: Vec<&Task> = tasks
        .iter()
        .filter(|t| filter_date.is_empty() || t.date == filter_date)
        .collect();
    items.sort_by(|a, b| display_cmp(a, b));
    Projection { items }
}

/// Display comparator. The text tie-break is for rendering only and is
/// never written back to order keys.
pub fn display_cmp(a: &Task, b: &Task) -> Ordering {
    a.order.cmp(&b.order).then_with(|| a.text.cmp(&b.text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, text: &str, date: &str, order: i64) -> Task {
        Task::new(id.into(), text.into(), date.into(), order)
    }

    #[test]
    fn test_filter_and_clear() {
        let tasks = vec![
            task("1", "A", "2024-01-01", 1),
            task("2", "B", "2024-01-02", 2),
        ];
        assert_eq!(project(&tasks, "2024-01-02").ids(), vec!["2"]);
        assert_eq!(project(&tasks, "").ids(), vec!["1", "2"]);
    }

    #[test]
    fn test_sorted_by_order_not_storage_position() {
        let tasks = vec![
            task("x", "X", "", 9),
            task("y", "Y", "", -1),
            task("z", "Z", "", 4),
        ];
        assert_eq!(project(&tasks, "").ids(), vec!["y", "z", "x"]);
    }

    #[test]
    fn test_equal_orders_fall_back_to_text() {
        let tasks = vec![
            task("1", "pears", "", 2),
            task("2", "apples", "", 2),
            task("3", "first", "", 1),
        ];
        assert_eq!(project(&tasks, "").ids(), vec!["3", "2", "1"]);
    }

    #[test]
    fn test_projection_is_restartable_and_idempotent() {
        let tasks = vec![
            task("1", "b", "d", 3),
            task("2", "a", "d", 3),
            task("3", "c", "e", 1),
        ];
        let p = project(&tasks, "d");
        let first: Vec<&str> = p.iter().map(|t| t.id.as_str()).collect();
        let second: Vec<&str> = p.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(first, second);
        assert_eq!(project(&tasks, "d").ids(), p.ids());
    }

    #[test]
    fn test_filter_matching_nothing() {
        let tasks = vec![task("1", "A", "2024-01-01", 1)];
        let p = project(&tasks, "1999-12-31");
        assert!(p.is_empty());
        assert_eq!(p.get(0), None);
    }

    #[test]
    fn test_position() {
        let tasks = vec![task("1", "A", "", 2), task("2", "B", "", 1)];
        let p = project(&tasks, "");
        assert_eq!(p.position("1"), Some(1));
        assert_eq!(p.position("3"), None);
    }
}
