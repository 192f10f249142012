/// Log tags identifying the engine subsystem a message came from

use colored::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    Engine,
    Quote,
    Fees,
    Swap,
    Settings,
    Api,
}

impl LogTag {
    /// Short name rendered in the log prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::Engine => "engine",
            LogTag::Quote => "quote",
            LogTag::Fees => "fees",
            LogTag::Swap => "swap",
            LogTag::Settings => "settings",
            LogTag::Api => "api",
        }
    }

    /// Key used when enabling per-tag debug output
    pub fn to_debug_key(&self) -> String {
        self.as_str().to_string()
    }

    /// Console color for the tag
    pub fn color(&self) -> Color {
        match self {
            LogTag::Engine => Color::Cyan,
            LogTag::Quote => Color::Blue,
            LogTag::Fees => Color::Yellow,
            LogTag::Swap => Color::Green,
            LogTag::Settings => Color::Magenta,
            LogTag::Api => Color::White,
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
