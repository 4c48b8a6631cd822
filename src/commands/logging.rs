use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use super::config::AppConfig;

/// Log file in use, `None` when file logging is disabled
static LOG_FILE: Lazy<Mutex<Option<PathBuf>>> = Lazy::new(|| Mutex::new(None));

/// Default log file path (in user's home directory)
pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tempo-scale")
        .join("logs")
        .join("tempo-scale.log")
}

/// Initialize logging - stderr via env_logger, plus an optional log file
pub fn init_logging(config: &AppConfig) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();

    if config.log_to_file {
        let log_path = config.log_path.clone().unwrap_or_else(default_log_path);
        set_log_file(Some(&log_path));
        log_message(log::Level::Info, "tempo-scale", "Application started");
    }
}

/// Point file logging at `path`, creating its directory if needed
pub fn set_log_file(path: Option<&Path>) {
    if let Some(parent) = path.and_then(Path::parent) {
        if let Err(e) = fs::create_dir_all(parent) {
            log::warn!("Cannot create log directory {}: {}", parent.display(), e);
        }
    }
    *LOG_FILE.lock() = path.map(Path::to_path_buf);
}

pub fn log_file_path() -> Option<PathBuf> {
    LOG_FILE.lock().clone()
}

/// Emit a message through `log` and append it to the log file
pub fn log_message(level: log::Level, module: &str, message: &str) {
    log::log!(target: module, level, "{}", message);

    let Some(log_path) = log_file_path() else {
        return;
    };

    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&log_path) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let _ = writeln!(file, "[{}] [{}] [{}] {}", timestamp, level, module, message);
    }
}
