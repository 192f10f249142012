/// Log formatting and console output with ANSI colors

use super::config::get_logger_config;
use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;

/// Tag column width for alignment
const TAG_WIDTH: usize = 8;

/// Format and print a log line: `HH:MM:SS [tag     ] [LEVEL  ] message`
pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str) {
    let config = get_logger_config();
    let time = Local::now().format("%H:%M:%S").to_string();
    let tag_padded = format!("{:<width$}", tag.as_str(), width = TAG_WIDTH);
    let level_padded = format!("{:<7}", level.as_str());

    if !config.use_colors {
        println!("{} [{}] [{}] {}", time, tag_padded, level_padded, message);
        return;
    }

    let level_colored = match level {
        LogLevel::Error => level_padded.red().bold(),
        LogLevel::Warning => level_padded.yellow(),
        LogLevel::Info => level_padded.normal(),
        LogLevel::Debug => level_padded.dimmed(),
        LogLevel::Verbose => level_padded.dimmed(),
    };

    println!(
        "{} [{}] [{}] {}",
        time.dimmed(),
        tag_padded.color(tag.color()),
        level_colored,
        message
    );
}
