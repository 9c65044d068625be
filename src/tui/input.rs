use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::io::kv::KvStore;
use crate::model::task::{is_iso_date, today_iso};
use crate::ops::task_store::StoreError;
use crate::session::Command;

use super::app::{App, InputKind, Mode};

/// Handle a key event in the current mode
pub fn handle_key<K: KvStore>(app: &mut App<K>, key: KeyEvent) {
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    app.status = None;

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.mode.clone() {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Input(kind) => handle_input(app, kind, key),
    }
    app.adjust_scroll();
}

fn handle_navigate<K: KvStore>(app: &mut App<K>, key: KeyEvent) {
    let len = app.session.projection().len();
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Down | KeyCode::Char('j') => {
            if app.cursor + 1 < len {
                app.cursor += 1;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.cursor = app.cursor.saturating_sub(1),
        KeyCode::Home | KeyCode::Char('g') => app.cursor = 0,
        KeyCode::End | KeyCode::Char('G') => app.cursor = len.saturating_sub(1),
        KeyCode::Char('a') => begin_input(app, InputKind::Add, String::new()),
        KeyCode::Char('A') => begin_input(app, InputKind::AddDated, String::new()),
        KeyCode::Char('e') | KeyCode::Enter => {
            let selected = app
                .session
                .projection()
                .get(app.cursor)
                .map(|t| (t.id.clone(), t.text.clone()));
            if let Some((id, text)) = selected {
                begin_input(app, InputKind::EditText(id), text);
            }
        }
        KeyCode::Char('D') => {
            let selected = app.session.projection().get(app.cursor).map(|t| {
                let date = if t.has_date() { t.date.clone() } else { today_iso() };
                (t.id.clone(), date)
            });
            if let Some((id, date)) = selected {
                begin_input(app, InputKind::EditDate(id), date);
            }
        }
        KeyCode::Char(' ') => {
            if let Some(id) = app.selected_id() {
                app.apply(Command::ToggleDone(id));
            }
        }
        KeyCode::Char('x') | KeyCode::Delete => {
            if let Some(id) = app.selected_id() {
                app.apply(Command::Remove(id));
            }
        }
        KeyCode::Char('s') => {
            let selected = app.selected_id();
            app.apply(Command::BulkSort);
            if let Some(id) = selected {
                app.select_id(&id);
            }
        }
        KeyCode::Char('f') => {
            let current = match app.session.filter_date() {
                "" => today_iso(),
                d => d.to_string(),
            };
            begin_input(app, InputKind::Filter, current);
        }
        KeyCode::Char('t') => {
            app.apply(Command::FilterToday);
            app.cursor = 0;
        }
        KeyCode::Char('c') => {
            let selected = app.selected_id();
            app.apply(Command::ClearFilter);
            if let Some(id) = selected {
                app.select_id(&id);
            }
        }
        KeyCode::Char('T') => {
            app.apply(Command::CycleTheme);
        }
        KeyCode::Char('J') => move_selected(app, 1),
        KeyCode::Char('K') => move_selected(app, -1),
        _ => {}
    }
}

/// Keyboard counterpart of a drag: swap the selected item with its
/// neighbour in the displayed sequence and reorder from that.
fn move_selected<K: KvStore>(app: &mut App<K>, delta: isize) {
    let mut ids = app.session.projection().ids();
    let from = app.cursor;
    let Some(to) = from.checked_add_signed(delta).filter(|&to| to < ids.len()) else {
        return;
    };
    ids.swap(from, to);
    let moved = ids[to].clone();
    app.apply(Command::Reorder(ids));
    app.select_id(&moved);
}

fn begin_input<K: KvStore>(app: &mut App<K>, kind: InputKind, initial: String) {
    app.input = initial;
    app.mode = Mode::Input(kind);
}

fn handle_input<K: KvStore>(app: &mut App<K>, kind: InputKind, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input.clear();
            app.mode = Mode::Navigate;
        }
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Enter => submit_input(app, kind),
        KeyCode::Char(c) => app.input.push(c),
        _ => {}
    }
}

/// Add a task and select it. False when the text was blank, so the prompt
/// stays open.
fn add_task<K: KvStore>(app: &mut App<K>, text: String, date: Option<String>) -> bool {
    let outcome = app.apply(Command::Add { text, date });
    if outcome.rejected == Some(StoreError::EmptyInput) {
        return false;
    }
    if let Some(id) = outcome.created {
        app.select_id(&id);
    }
    true
}

fn submit_input<K: KvStore>(app: &mut App<K>, kind: InputKind) {
    let value = app.input.trim().to_string();
    match kind {
        InputKind::Add => {
            // New tasks land on the filtered date so they stay visible
            let date = match app.session.filter_date() {
                "" => None,
                d => Some(d.to_string()),
            };
            if !add_task(app, value, date) {
                return;
            }
        }
        InputKind::AddDated => {
            if value.is_empty() {
                return;
            }
            let date = match app.session.filter_date() {
                "" => today_iso(),
                d => d.to_string(),
            };
            begin_input(app, InputKind::AddDate(value), date);
            return;
        }
        InputKind::AddDate(text) => {
            if !value.is_empty() && !is_iso_date(&value) {
                app.status = Some(format!("invalid date: {}", value));
                return;
            }
            let date = (!value.is_empty()).then_some(value);
            add_task(app, text, date);
        }
        InputKind::EditText(id) => {
            app.apply(Command::UpdateText {
                id,
                text: value,
            });
        }
        InputKind::EditDate(id) => {
            if !value.is_empty() && !is_iso_date(&value) {
                app.status = Some(format!("invalid date: {}", value));
                return;
            }
            app.apply(Command::UpdateDate { id, date: value });
        }
        InputKind::Filter => {
            if value.is_empty() {
                app.apply(Command::ClearFilter);
            } else if is_iso_date(&value) {
                app.apply(Command::SetFilter(value));
                app.cursor = 0;
            } else {
                app.status = Some(format!("invalid date: {}", value));
                return;
            }
        }
    }
    app.input.clear();
    app.mode = Mode::Navigate;
}
