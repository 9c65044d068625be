//! File logging bootstrap.
//!
//! Logs go to rotating files under `<data_dir>/logs/` and never to the
//! terminal, which belongs to the TUI.

use std::path::Path;
use std::sync::OnceLock;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};

const LOG_FILE_BASENAME: &str = "daylist";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

/// Environment variable that overrides the configured level
pub const LOG_ENV: &str = "DAYLIST_LOG";

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

/// Start the file logger once per process. Later calls are no-ops.
pub fn init_logging(level: &str, data_dir: &Path) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let level = std::env::var(LOG_ENV).unwrap_or_else(|_| level.to_string());
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| format!("failed to create log directory {}: {}", log_dir.display(), e))?;

    let handle = Logger::try_with_str(&level)
        .map_err(|e| format!("invalid log level `{}`: {}", level, e))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|e| format!("failed to start logger: {}", e))?;

    log::info!(
        "event=start version={} data_dir={}",
        env!("CARGO_PKG_VERSION"),
        data_dir.display()
    );
    let _ = LOGGER.set(handle);
    Ok(())
}
