//! Structured logging for the swap engine
//!
//! Tag + level based logging with per-tag debug gating and colored console
//! output. Hosts embedding the engine configure it programmatically:
//!
//! ```rust
//! use swaplet::logger::{self, LogTag};
//!
//! logger::enable_debug_for(LogTag::Quote);
//! logger::info(LogTag::Swap, "attempt started");
//! logger::debug(LogTag::Quote, "order request details: ...");
//! ```

mod config;
mod core;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, set_logger_config, update_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (gated per tag, see `enable_debug_for`)
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Enable debug output for one tag without lowering the global threshold
pub fn enable_debug_for(tag: LogTag) {
    update_logger_config(|config| {
        config.debug_tags.insert(tag.to_debug_key());
    });
}
