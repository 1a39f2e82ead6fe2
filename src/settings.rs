//! Player preferences
//!
//! Persisted as JSON next to the high scores, shared by every game on the page.

use serde::{Deserialize, Serialize};

use crate::consts::MUSIC_VOLUME;
use crate::error::Result;
use crate::persistence::KeyValueStore;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Background music on/off
    pub music: bool,
    /// Background music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Procedural sound effects on/off
    pub sound_effects: bool,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Accessibility ===
    /// Skip the red game-over flash
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music: true,
            music_volume: MUSIC_VOLUME,
            sound_effects: true,
            sfx_volume: 0.8,
            show_fps: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "canvas_arcade_settings";

    /// Music volume actually applied to the audio element (0 when muted)
    pub fn effective_music_volume(&self) -> f32 {
        if self.music {
            self.music_volume.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Sound effect gain (0 when muted)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.sound_effects {
            self.sfx_volume.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Whether the game-over overlay flashes red
    pub fn game_over_flash(&self) -> bool {
        !self.reduced_motion
    }

    /// Load settings, falling back to defaults on any problem
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Discarding malformed settings: {e}"),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Settings unavailable: {e}"),
        }
        log::info!("Using default settings");
        Self::default()
    }

    /// Load, then write back so the stored JSON carries every current field
    pub fn open<S: KeyValueStore + ?Sized>(store: &mut S) -> Self {
        let settings = Self::load(&*store);
        if let Err(e) = settings.save(store) {
            log::warn!("Could not save settings: {e}");
        }
        settings
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.effective_music_volume(), 0.5);
        assert!(settings.game_over_flash());
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            music: false,
            reduced_motion: true,
            ..Settings::default()
        };
        settings.save(&mut store).unwrap();

        let loaded = Settings::load(&store);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.effective_music_volume(), 0.0);
        assert!(!loaded.game_over_flash());
    }

    #[test]
    fn test_partial_and_malformed_json() {
        let mut store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"sfx_volume": 0.25}"#)
            .unwrap();
        let loaded = Settings::load(&store);
        assert_eq!(loaded.sfx_volume, 0.25);
        assert!(loaded.music);

        store.set(Settings::STORAGE_KEY, "{oops").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_open_fills_missing_fields() {
        let mut store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"show_fps": true}"#)
            .unwrap();
        let opened = Settings::open(&mut store);
        assert!(opened.show_fps);

        let json = store.get(Settings::STORAGE_KEY).unwrap().unwrap();
        assert!(json.contains("\"sfx_volume\":0.8"));
        assert_eq!(Settings::load(&store), opened);

        let mut empty = MemoryStore::new();
        assert_eq!(Settings::open(&mut empty), Settings::default());
        assert!(empty.get(Settings::STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_volume_clamped() {
        let settings = Settings {
            sfx_volume: 3.0,
            ..Settings::default()
        };
        assert_eq!(settings.effective_sfx_volume(), 1.0);
    }
}
