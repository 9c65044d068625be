use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton, MouseEvent,
    MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;

use crate::cli::handlers::{Env, open_session};
use crate::io::kv::KvStore;
use crate::io::lock::FileLock;
use crate::io::watcher::SlotWatcher;
use crate::ops::reorder::DragSession;
use crate::session::{Command, Outcome, Session};

use super::input;
use super::render;
use super::theme::Palette;

/// Terminal rows per task: the text line and the date line
pub const ROW_HEIGHT: u16 = 2;

/// Current interaction mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    Input(InputKind),
}

/// What the single-line input box is collecting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Add,
    /// Text of a task whose date is asked for next
    AddDated,
    /// Date for a task whose text was already entered
    AddDate(String),
    EditText(String),
    EditDate(String),
    Filter,
}

/// Main application state
pub struct App<K: KvStore> {
    pub session: Session<K>,
    pub mode: Mode,
    pub input: String,
    pub should_quit: bool,
    pub palette: Palette,
    /// Index into the projected list
    pub cursor: usize,
    /// First visible item
    pub scroll: usize,
    /// Where the list was last drawn, for mouse hit testing
    pub list_area: Rect,
    pub drag: Option<DragSession>,
    /// One-line message shown in the footer until the next key
    pub status: Option<String>,
    /// Directory to lock while writing; `None` writes without locking
    pub lock_dir: Option<PathBuf>,
    watcher: Option<SlotWatcher>,
}

impl<K: KvStore> App<K> {
    pub fn new(session: Session<K>, lock_dir: Option<PathBuf>) -> Self {
        let palette = Palette::for_theme(session.theme());
        App {
            session,
            mode: Mode::Navigate,
            input: String::new(),
            should_quit: false,
            palette,
            cursor: 0,
            scroll: 0,
            list_area: Rect::default(),
            drag: None,
            status: None,
            lock_dir,
            watcher: None,
        }
    }

    /// Ids in the order they are currently drawn. During a drag this is the
    /// drag's working sequence rather than the stored order.
    pub fn displayed_ids(&self) -> Vec<String> {
        match &self.drag {
            Some(drag) => drag.sequence().to_vec(),
            None => self.session.projection().ids(),
        }
    }

    pub fn selected_id(&self) -> Option<String> {
        self.session.projection().get(self.cursor).map(|t| t.id.clone())
    }

    /// Run a command through the session, holding the data directory lock
    /// and picking up any changes another process made first.
    pub fn apply(&mut self, command: Command) -> Outcome {
        let _lock = match &self.lock_dir {
            Some(dir) => match FileLock::acquire_default(dir) {
                Ok(lock) => Some(lock),
                Err(e) => {
                    self.status = Some(e.to_string());
                    return Outcome::default();
                }
            },
            None => None,
        };
        self.poll_external();

        let outcome = self.session.apply(command);
        if outcome.changed && !outcome.persisted {
            self.status = Some("could not save (see `dl recovery`)".to_string());
        }
        self.palette = Palette::for_theme(self.session.theme());
        self.clamp_cursor();
        outcome
    }

    /// Reload if the slot files changed on disk
    pub fn poll_external(&mut self) {
        let changed = self.watcher.as_ref().is_some_and(|w| w.poll());
        if changed && self.drag.is_none() {
            self.session.reload();
            self.palette = Palette::for_theme(self.session.theme());
            self.clamp_cursor();
        }
    }

    /// Put the cursor on `id` if it is displayed
    pub fn select_id(&mut self, id: &str) {
        if let Some(pos) = self.session.projection().position(id) {
            self.cursor = pos;
        }
    }

    pub fn clamp_cursor(&mut self) {
        let len = self.session.projection().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Number of whole items that fit in the list area
    pub fn visible_items(&self) -> usize {
        (self.list_area.height / ROW_HEIGHT) as usize
    }

    /// Keep the cursor inside the visible window
    pub fn adjust_scroll(&mut self) {
        let visible = self.visible_items().max(1);
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + visible {
            self.scroll = self.cursor + 1 - visible;
        }
    }

    /// The displayed item under a screen cell, with the row its box starts on
    pub fn item_at(&self, column: u16, row: u16) -> Option<(usize, u16)> {
        let area = self.list_area;
        if column < area.x
            || column >= area.x + area.width
            || row < area.y
            || row >= area.y + area.height
        {
            return None;
        }
        let offset = ((row - area.y) / ROW_HEIGHT) as usize;
        let index = self.scroll + offset;
        if index >= self.displayed_ids().len() {
            return None;
        }
        let top = area.y + offset as u16 * ROW_HEIGHT;
        Some((index, top))
    }

    // -----------------------------------------------------------------------
    // Mouse drag
    // -----------------------------------------------------------------------

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.mode != Mode::Navigate {
                    return;
                }
                if let Some((index, _)) = self.item_at(mouse.column, mouse.row) {
                    self.cursor = index;
                    let ids = self.session.projection().ids();
                    if let Some(id) = ids.get(index).cloned() {
                        self.drag = DragSession::start(ids, &id);
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some((index, top)) = self.item_at(mouse.column, mouse.row) else {
                    return;
                };
                let Some(target) = self.displayed_ids().get(index).cloned() else {
                    return;
                };
                if let Some(drag) = &mut self.drag {
                    // Pointer sits at the vertical center of its cell
                    let pointer_y = f64::from(mouse.row) + 0.5;
                    drag.hover(&target, pointer_y, f64::from(top), f64::from(ROW_HEIGHT));
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(drag) = self.drag.take() else {
                    return;
                };
                if self.item_at(mouse.column, mouse.row).is_none() {
                    drag.cancel();
                    return;
                }
                let dragged = drag.dragged().to_string();
                if let Some(sequence) = drag.drop() {
                    self.apply(Command::Reorder(sequence));
                    self.select_id(&dragged);
                }
            }
            _ => {}
        }
    }
}

/// Run the TUI application
pub fn run(env: &Env) -> Result<(), Box<dyn Error>> {
    let session = open_session(env)?;
    let mut app = App::new(session, Some(env.data_dir.clone()));
    app.watcher = match SlotWatcher::start(&env.data_dir) {
        Ok(w) => Some(w),
        Err(e) => {
            log::warn!("event=watch status=error error={}", e);
            None
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal if anything panics
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop<K: KvStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<K>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        } else {
            app.poll_external();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
