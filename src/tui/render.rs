use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::io::kv::KvStore;

use super::app::{App, InputKind, Mode, ROW_HEIGHT};
use super::theme::Palette;

const HINTS: &str =
    "a add  A add dated  e edit  D date  space done  x del  s sort  f filter  t today  c clear  T theme  q quit";

/// Main render function: header, list, footer
pub fn render<K: KvStore>(frame: &mut Frame, app: &mut App<K>) {
    let area = frame.area();
    let bg = Style::default().bg(app.palette.background);
    frame.render_widget(Block::default().style(bg), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title + separator
            Constraint::Min(1),    // list
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    app.list_area = chunks[1];
    app.adjust_scroll();
    render_list(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

fn render_header<K: KvStore>(frame: &mut Frame, app: &App<K>, area: Rect) {
    let p = &app.palette;
    let width = area.width as usize;
    let title = " daylist";
    let filter = match app.session.filter_date() {
        "" => "all dates".to_string(),
        d => format!("filter {}", d),
    };
    let right = format!("{}  {} ", filter, Palette::mode_icon(app.session.theme()));
    let used = title.chars().count() + right.chars().count();
    let padding = width.saturating_sub(used);

    let title_line = Line::from(vec![
        Span::styled(
            title,
            Style::default()
                .fg(p.text_bright)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, Style::default().fg(p.date)),
    ]);
    let separator = Line::from(Span::styled(
        "\u{2500}".repeat(width),
        Style::default().fg(p.dim),
    ));
    frame.render_widget(
        Paragraph::new(vec![title_line, separator]).style(Style::default().bg(p.background)),
        area,
    );
}

fn render_list<K: KvStore>(frame: &mut Frame, app: &App<K>, area: Rect) {
    let p = &app.palette;
    let ids = app.displayed_ids();

    if ids.is_empty() {
        let message = match app.session.filter_date() {
            "" => "  No tasks yet. Press a to add one.".to_string(),
            d => format!("  No tasks on {}.", d),
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(p.dim))),
            area,
        );
        return;
    }

    let dragged = app.drag.as_ref().map(|d| d.dragged());
    let width = area.width as usize;

    for (slot, id) in ids.iter().skip(app.scroll).take(app.visible_items()).enumerate() {
        let Some(task) = app.session.store().get(id) else {
            continue;
        };
        let index = app.scroll + slot;
        let row_bg = if dragged == Some(id.as_str()) {
            p.drag_bg
        } else if dragged.is_none() && index == app.cursor {
            p.selection_bg
        } else {
            p.background
        };
        let base = Style::default().bg(row_bg);

        let text_style = if task.done {
            base.fg(p.dim).add_modifier(Modifier::CROSSED_OUT)
        } else {
            base.fg(p.text)
        };
        let check = if task.done { "[x] " } else { "[ ] " };
        let prefix = "\u{22EE}\u{22EE} ";
        let text_width = width.saturating_sub(prefix.chars().count() + check.len());

        let first = Line::from(vec![
            Span::styled(prefix, base.fg(p.dim)),
            Span::styled(check, base.fg(p.highlight)),
            Span::styled(truncate_to_width(&task.text, text_width), text_style),
        ]);
        let badge = if task.has_date() {
            task.date.as_str()
        } else {
            "No date"
        };
        let second = Line::from(vec![
            Span::styled("       ", base),
            Span::styled(badge.to_string(), base.fg(p.date)),
        ]);

        let rect = Rect {
            x: area.x,
            y: area.y + slot as u16 * ROW_HEIGHT,
            width: area.width,
            height: ROW_HEIGHT,
        };
        frame.render_widget(Paragraph::new(vec![first, second]).style(base), rect);
    }
}

fn render_footer<K: KvStore>(frame: &mut Frame, app: &App<K>, area: Rect) {
    let p = &app.palette;
    let line = match &app.mode {
        Mode::Input(kind) => {
            let label = match kind {
                InputKind::Add | InputKind::AddDated => "add: ",
                InputKind::AddDate(_) => "add on date (empty for today): ",
                InputKind::EditText(_) => "edit: ",
                InputKind::EditDate(_) => "date (empty clears): ",
                InputKind::Filter => "filter (empty clears): ",
            };
            let mut spans = vec![
                Span::styled(label, Style::default().fg(p.dim)),
                Span::styled(app.input.clone(), Style::default().fg(p.text_bright)),
                Span::styled("\u{258C}", Style::default().fg(p.highlight)),
            ];
            if let Some(status) = &app.status {
                spans.push(Span::styled(format!("  {}", status), Style::default().fg(p.red)));
            }
            Line::from(spans)
        }
        Mode::Navigate => match &app.status {
            Some(status) => Line::from(Span::styled(status.clone(), Style::default().fg(p.red))),
            None => Line::from(Span::styled(
                truncate_to_width(HINTS, area.width as usize),
                Style::default().fg(p.dim),
            )),
        },
    };
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(p.background)),
        area,
    );
}

/// Cut `s` to at most `max` display columns, ending with an ellipsis when
/// anything was dropped.
pub fn truncate_to_width(s: &str, max: usize) -> String {
    let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('\u{2026}');
    out
}
