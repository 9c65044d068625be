use serde::Serialize;

use crate::model::task::Task;
use crate::model::theme::Theme;

#[derive(Serialize)]
pub struct ListJson<'a> {
    /// Active filter date, absent when listing everything
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'a str>,
    pub tasks: Vec<&'a Task>,
}

#[derive(Serialize)]
pub struct ThemeJson {
    pub theme: Theme,
}

/// One-line rendering: `[x] id  date  text`
pub fn format_task_line(task: &Task) -> String {
    let check = if task.done { 'x' } else { ' ' };
    let date = if task.has_date() {
        task.date.as_str()
    } else {
        "no date"
    };
    format!("[{}] {}  {:<10}  {}", check, task.id, date, task.text)
}
