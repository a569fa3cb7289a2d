//! Game settings and preferences
//!
//! Persisted in LocalStorage on the web; read from a JSON file on native.

use serde::{Deserialize, Serialize};

use crate::quote::QuoteSettings;
use crate::sim::Rules;

/// Game settings/preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Timing and lives
    pub rules: Rules,
    /// Level-up quote service
    pub quote: QuoteSettings,
    /// Fixed RNG seed; taken from the clock when unset
    pub seed: Option<u64>,
}

impl Settings {
    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "sparkle_maze_settings";

    /// Environment variable naming a settings file (native)
    pub const ENV_PATH: &'static str = "SPARKLE_MAZE_SETTINGS";

    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Seed to use for a new game
    pub fn seed_or(&self, clock_seed: u64) -> u64 {
        self.seed.unwrap_or(clock_seed)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from the file named by `SPARKLE_MAZE_SETTINGS` (native)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        match std::env::var(Self::ENV_PATH) {
            Ok(path) => Self::load_from(std::path::Path::new(&path)),
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Write settings back to the file named by `SPARKLE_MAZE_SETTINGS` (native)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        if let Ok(path) = std::env::var(Self::ENV_PATH) {
            self.save_to(std::path::Path::new(&path));
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn save_to(&self, path: &std::path::Path) {
        let written = self
            .to_json()
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => log::info!("Settings saved to {}", path.display()),
            Err(e) => log::warn!("Cannot save settings to {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICK_INTERVAL_MS;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            Settings::from_json(r#"{"seed": 7, "quote": {"enabled": false}}"#).unwrap();
        assert_eq!(settings.seed, Some(7));
        assert!(!settings.quote.enabled);
        assert_eq!(settings.quote.model, QuoteSettings::default().model);
        assert_eq!(settings.rules.tick_interval_ms, TICK_INTERVAL_MS);
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = Settings::default();
        settings.rules.initial_lives = 9;
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Settings::from_json("{ nope").is_err());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_save_then_load_file() {
        let path = std::env::temp_dir().join(format!(
            "sparkle_maze_settings_{}.json",
            std::process::id()
        ));
        let settings = Settings {
            seed: Some(42),
            rules: Rules {
                initial_lives: 5,
                ..Rules::default()
            },
            ..Settings::default()
        };

        settings.save_to(&path);
        let loaded = Settings::load_from(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);

        // Missing file falls back to defaults
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_seed_or() {
        assert_eq!(Settings::default().seed_or(5), 5);
        let settings = Settings {
            seed: Some(1),
            ..Settings::default()
        };
        assert_eq!(settings.seed_or(5), 1);
    }
}
