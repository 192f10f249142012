/// Central filtering logic deciding whether a message gets printed

use super::config::{get_logger_config, is_debug_enabled_for_tag};
use super::levels::LogLevel;
use super::tags::LogTag;

/// Filtering rules:
/// 1. Errors are always shown
/// 2. Check against the minimum level threshold
/// 3. Debug level additionally requires the tag to be debug-enabled
pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    let config = get_logger_config();
    if level > config.min_level && !(level == LogLevel::Debug && is_debug_enabled_for_tag(tag)) {
        return false;
    }

    true
}

pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(&tag, level) {
        return;
    }

    super::format::format_and_log(tag, level, message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::config::{set_logger_config, LoggerConfig};
    use std::collections::HashSet;

    // One test body: the config is process-global, so splitting these into
    // separate #[test] fns would race under the parallel test runner
    #[test]
    fn filtering_rules() {
        set_logger_config(LoggerConfig {
            min_level: LogLevel::Error,
            ..Default::default()
        });
        assert!(should_log(&LogTag::Swap, LogLevel::Error));
        assert!(!should_log(&LogTag::Swap, LogLevel::Info));

        let mut debug_tags = HashSet::new();
        debug_tags.insert("quote".to_string());
        set_logger_config(LoggerConfig {
            debug_tags,
            ..Default::default()
        });
        assert!(should_log(&LogTag::Quote, LogLevel::Debug));
        assert!(!should_log(&LogTag::Swap, LogLevel::Debug));
        set_logger_config(LoggerConfig::default());
    }
}
