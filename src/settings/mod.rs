/// Persisted user settings
///
/// The widget's persisted state is a handful of independently-keyed JSON
/// scalars (slippage value, slippage mode, dynamic slippage cap, priority-fee
/// settings). The raw store is a string key/value interface; typed accessors
/// with defaults sit on top so the engine never deals with raw JSON.

use crate::errors::SwapletError;
use crate::logger::{self, LogTag};
use crate::types::{FeeSettings, PriorityLevel, PriorityMode, SlippageMode};
use anyhow::Context;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

// Storage keys, one scalar per key
pub const KEY_SLIPPAGE: &str = "slippage";
pub const KEY_SLIPPAGE_MODE: &str = "slippage_mode";
pub const KEY_DYNAMIC_SLIPPAGE: &str = "dynamic_slippage";
pub const KEY_PRIORITY_MODE: &str = "priority_mode";
pub const KEY_PRIORITY_LEVEL: &str = "priority_level";
pub const KEY_PRIORITY_FEE: &str = "priority_fee";

/// Raw key/value persistence. Each value is a serialized JSON scalar,
/// readable and writable independently of the others.
pub trait SettingsStore: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str) -> Result<(), SwapletError>;
}

// =============================================================================
// FILE-BACKED STORE
// =============================================================================

/// Stores each key as `<dir>/<key>.json`
pub struct FileSettingsStore {
    dir: PathBuf,
}

impl FileSettingsStore {
    pub fn new(dir: PathBuf) -> Result<Self, SwapletError> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating settings dir {}", dir.display()))
            .map_err(|e| SwapletError::internal_error(format!("{:#}", e)))?;
        Ok(Self { dir })
    }

    /// Default location under the platform data dir
    pub fn default_location() -> Result<Self, SwapletError> {
        let base = dirs::data_dir()
            .ok_or_else(|| SwapletError::internal_error("no platform data directory"))?;
        Self::new(base.join("swaplet"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn save(&self, key: &str, value: &str) -> Result<(), SwapletError> {
        std::fs::write(self.path_for(key), value)
            .with_context(|| format!("writing settings key {}", key))
            .map_err(|e| SwapletError::internal_error(format!("{:#}", e)))
    }
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Non-persistent store for tests and hosts without a filesystem
#[derive(Default)]
pub struct MemorySettingsStore {
    map: RwLock<HashMap<String, String>>,
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self, key: &str) -> Option<String> {
        self.map.read().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> Result<(), SwapletError> {
        self.map.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// =============================================================================
// TYPED ACCESSORS
// =============================================================================

/// Typed settings facade with defaults. Cheap to clone, shares the store.
#[derive(Clone)]
pub struct UserSettings {
    store: Arc<dyn SettingsStore>,
}

impl UserSettings {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySettingsStore::default()))
    }

    fn load_scalar<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.load(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                logger::warning(
                    LogTag::Settings,
                    &format!("Ignoring corrupt settings key '{}': {}", key, e),
                );
                None
            }
        }
    }

    fn save_scalar<T: serde::Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                logger::error(
                    LogTag::Settings,
                    &format!("Failed to serialize settings key '{}': {}", key, e),
                );
                return;
            }
        };
        if let Err(e) = self.store.save(key, &raw) {
            logger::error(
                LogTag::Settings,
                &format!("Failed to persist settings key '{}': {}", key, e),
            );
        }
    }

    /// Fixed slippage in percent, default 0.5
    pub fn slippage_pct(&self) -> f64 {
        self.load_scalar(KEY_SLIPPAGE).unwrap_or(0.5)
    }

    pub fn set_slippage_pct(&self, value: f64) {
        self.save_scalar(KEY_SLIPPAGE, &value);
    }

    pub fn slippage_mode(&self) -> SlippageMode {
        self.load_scalar::<String>(KEY_SLIPPAGE_MODE)
            .and_then(|s| SlippageMode::parse(&s))
            .unwrap_or(SlippageMode::Fixed)
    }

    pub fn set_slippage_mode(&self, mode: SlippageMode) {
        self.save_scalar(KEY_SLIPPAGE_MODE, &mode.as_str());
    }

    /// Dynamic slippage cap in percent, default 2.5
    pub fn dynamic_slippage_pct(&self) -> f64 {
        self.load_scalar(KEY_DYNAMIC_SLIPPAGE).unwrap_or(2.5)
    }

    pub fn set_dynamic_slippage_pct(&self, value: f64) {
        self.save_scalar(KEY_DYNAMIC_SLIPPAGE, &value);
    }

    pub fn fee_settings(&self) -> FeeSettings {
        let defaults = FeeSettings::default();
        FeeSettings {
            priority_mode: self
                .load_scalar::<String>(KEY_PRIORITY_MODE)
                .and_then(|s| PriorityMode::parse(&s))
                .unwrap_or(defaults.priority_mode),
            priority_level: self
                .load_scalar::<String>(KEY_PRIORITY_LEVEL)
                .and_then(|s| PriorityLevel::parse(&s))
                .unwrap_or(defaults.priority_level),
            priority_fee_sol: self
                .load_scalar(KEY_PRIORITY_FEE)
                .unwrap_or(defaults.priority_fee_sol),
        }
    }

    /// Explicit user save action from the settings screen
    pub fn save_fee_settings(&self, settings: &FeeSettings) {
        self.save_scalar(KEY_PRIORITY_MODE, &settings.priority_mode.as_str());
        self.save_scalar(KEY_PRIORITY_LEVEL, &settings.priority_level.as_str());
        self.save_scalar(KEY_PRIORITY_FEE, &settings.priority_fee_sol);
        logger::info(
            LogTag::Settings,
            &format!(
                "Saved fee settings: mode={}, level={}, fee={} SOL",
                settings.priority_mode.as_str(),
                settings.priority_level.as_str(),
                settings.priority_fee_sol
            ),
        );
    }
}
