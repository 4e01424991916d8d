//! Game settings and preferences
//!
//! Persisted as a small JSON file next to the level folders.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How much of each display frame goes to physics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Pace {
    /// Integrate every frame
    #[default]
    Smooth,
    /// Integrate every other frame, interpolate in between
    Balanced,
    /// Integrate one frame in three
    Light,
}

impl Pace {
    pub const ALL: [Pace; 3] = [Pace::Smooth, Pace::Balanced, Pace::Light];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pace::Smooth => "Smooth",
            Pace::Balanced => "Balanced",
            Pace::Light => "Light",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "smooth" => Some(Pace::Smooth),
            "balanced" | "bal" => Some(Pace::Balanced),
            "light" => Some(Pace::Light),
            _ => None,
        }
    }

    /// Frames skipped between integrated ticks
    pub fn frame_skip(&self) -> u32 {
        match self {
            Pace::Smooth => 0,
            Pace::Balanced => 1,
            Pace::Light => 2,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pace: Pace,

    // === Presentation ===
    /// Read sign text aloud
    pub announce_signs: bool,
    /// Show unlock alerts
    pub show_alerts: bool,

    // === Levels ===
    /// Folder holding the level buckets
    pub levels_root: PathBuf,
    /// Offer admin-only kinds in the editor palette
    pub admin: bool,
    /// Fixed seed for sessions; random per session when absent
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pace: Pace::Smooth,

            announce_signs: true,
            show_alerts: true,

            levels_root: PathBuf::from("levels"),
            admin: false,
            seed: None,
        }
    }
}

impl Settings {
    /// File name used inside a profile folder
    pub const FILE_NAME: &'static str = "settings.json";

    /// Load settings from `path`, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Ignoring malformed settings in {}: {e}", path.display()),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not read {}: {e}", path.display()),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to `path`
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gravity-grid-settings-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_settings_round_trip() {
        let dir = scratch("round-trip");
        let path = dir.join(Settings::FILE_NAME);
        let settings = Settings {
            pace: Pace::Light,
            seed: Some(9),
            ..Default::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
        assert_eq!(Settings::load(&path).pace.frame_skip(), 2);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_or_partial_settings() {
        let dir = scratch("partial");
        assert_eq!(Settings::load(&dir.join("absent.json")), Settings::default());

        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(Settings::FILE_NAME);
        std::fs::write(&path, r#"{ "admin": true }"#).unwrap();
        let loaded = Settings::load(&path);
        assert!(loaded.admin);
        assert_eq!(loaded.pace, Pace::Smooth);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_pace_parse() {
        assert_eq!(Pace::parse("BAL"), Some(Pace::Balanced));
        assert_eq!(Pace::parse("fast"), None);
        for pace in Pace::ALL {
            assert_eq!(Pace::parse(pace.as_str()), Some(pace));
        }
    }
}
