use std::fmt;

use serde::{Deserialize, Serialize};

/// Color scheme selection, persisted independently of tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Colored,
}

impl Theme {
    /// Cycle: light → dark → colored → light
    pub fn next(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Colored,
            Theme::Colored => Theme::Light,
        }
    }

    /// The name stored in the theme slot
    pub fn name(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Colored => "colored",
        }
    }

    /// Parse a stored name. `blue` is the legacy name of the colored theme.
    pub fn parse_name(s: &str) -> Option<Theme> {
        match s.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            "colored" | "blue" => Some(Theme::Colored),
            _ => None,
        }
    }

    /// Parse a stored name, falling back to the first variant
    pub fn from_stored(s: Option<&str>) -> Theme {
        s.and_then(Theme::parse_name).unwrap_or_default()
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
