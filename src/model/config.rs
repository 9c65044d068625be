use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the task and theme slots (default: XDG data dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Log level for the file logger (`error`..`trace`)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub reorder: ReorderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: None,
            log_level: default_log_level(),
            reorder: ReorderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReorderConfig {
    /// How a reorder of a filtered view treats tasks hidden by the filter
    #[serde(default)]
    pub filtered: FilteredReorder,
}

/// Policy for reordering a view that shows only part of the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilteredReorder {
    /// Visible tasks trade the order keys they already hold; hidden tasks
    /// keep their keys and their position relative to each other.
    #[default]
    PreserveHidden,
    /// Visible tasks are renumbered 1..k and hidden tasks keep stale keys,
    /// which may collide once the filter is cleared.
    Compatible,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.data_dir.is_none());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.reorder.filtered, FilteredReorder::PreserveHidden);
        assert_eq!(Config::default().log_level, "info");
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"data_dir = "/tmp/lists"
log_level = "debug"

[reorder]
filtered = "compatible"
"#,
        )
        .unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/lists")));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.reorder.filtered, FilteredReorder::Compatible);
    }
}
