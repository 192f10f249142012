/// Logger configuration shared across the process
///
/// The engine is a library, so configuration is programmatic: the host calls
/// `logger::set_logger_config` (or the convenience helpers in `mod.rs`)
/// instead of passing command-line flags.

use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Minimum level that gets printed (errors always pass)
    pub min_level: LogLevel,

    /// Tags with debug-level output enabled (empty = none)
    pub debug_tags: HashSet<String>,

    /// Disable ANSI colors for hosts that capture output
    pub use_colors: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            use_colors: true,
        }
    }
}

static CONFIG: Lazy<RwLock<LoggerConfig>> = Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *CONFIG.write() = config;
}

/// Mutate the current configuration in place
pub fn update_logger_config<F: FnOnce(&mut LoggerConfig)>(f: F) {
    f(&mut CONFIG.write());
}

pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = CONFIG.read();
    config.min_level >= LogLevel::Debug || config.debug_tags.contains(&tag.to_debug_key())
}
