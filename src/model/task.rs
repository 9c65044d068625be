use serde::{Deserialize, Deserializer, Serialize};

/// A single entry in the list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque identifier, never reused while the store lives
    pub id: String,
    /// Display text (never empty after trimming)
    pub text: String,
    /// Completion flag
    #[serde(default, deserialize_with = "null_as_default")]
    pub done: bool,
    /// ISO calendar date (`YYYY-MM-DD`), empty meaning "no date"
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    /// Sparse ordering key; records written without one sort as 0
    #[serde(default, deserialize_with = "null_as_default")]
    pub order: i64,
}

/// Read an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Task {
    pub fn new(id: String, text: String, date: String, order: i64) -> Self {
        Task {
            id,
            text,
            done: false,
            date,
            order,
        }
    }

    /// Whether this task carries a date
    pub fn has_date(&self) -> bool {
        !self.date.is_empty()
    }
}

/// Check that `s` is a real `YYYY-MM-DD` calendar date.
///
/// The store accepts any string; this is applied at the CLI and TUI edges.
pub fn is_iso_date(s: &str) -> bool {
    s.len() == 10 && chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Today's local date as `YYYY-MM-DD`
pub fn today_iso() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
