//! Game settings and preferences
//!
//! Persisted as JSON in the data directory, separately from game saves.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_TICK_HZ, JUMP_FRAME_SAFE, MAX_TICK_HZ, MIN_TICK_HZ};
use crate::platform::Key;

/// Settings file name inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Tick rate presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TickPreset {
    Slow,
    Good,
    Safe,
    Medium,
    #[default]
    Stable,
    Smooth,
    High,
    Best,
    Custom(u32),
}

impl TickPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            TickPreset::Slow => "Slow",
            TickPreset::Good => "Good",
            TickPreset::Safe => "Safe",
            TickPreset::Medium => "Medium",
            TickPreset::Stable => "Stable",
            TickPreset::Smooth => "Smooth",
            TickPreset::High => "High",
            TickPreset::Best => "Best",
            TickPreset::Custom(_) => "Custom",
        }
    }

    /// Preset by name, or a bare number for a custom rate
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "slow" => Some(TickPreset::Slow),
            "good" => Some(TickPreset::Good),
            "safe" => Some(TickPreset::Safe),
            "medium" | "med" => Some(TickPreset::Medium),
            "stable" => Some(TickPreset::Stable),
            "smooth" => Some(TickPreset::Smooth),
            "high" => Some(TickPreset::High),
            "best" => Some(TickPreset::Best),
            other => other.parse().ok().map(TickPreset::Custom),
        }
    }

    /// Ticks per second
    pub fn hz(&self) -> u32 {
        match self {
            TickPreset::Slow => 32,
            TickPreset::Good => 48,
            TickPreset::Safe => 64,
            TickPreset::Medium => 80,
            TickPreset::Stable => DEFAULT_TICK_HZ,
            TickPreset::Smooth => 120,
            TickPreset::High => 240,
            TickPreset::Best => 360,
            TickPreset::Custom(hz) => (*hz).clamp(MIN_TICK_HZ, MAX_TICK_HZ),
        }
    }
}

/// Which keys move the frog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum KeyLayout {
    Arrows,
    Wasd,
    #[default]
    Both,
}

impl KeyLayout {
    /// Keys for left, right, up, down
    pub fn bindings(self) -> [&'static [Key]; 4] {
        match self {
            KeyLayout::Arrows => [&[Key::Left], &[Key::Right], &[Key::Up], &[Key::Down]],
            KeyLayout::Wasd => [&[Key::A], &[Key::D], &[Key::W], &[Key::S]],
            KeyLayout::Both => [
                &[Key::Left, Key::A],
                &[Key::Right, Key::D],
                &[Key::Up, Key::W],
                &[Key::Down, Key::S],
            ],
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tick_preset: TickPreset,
    /// Root for `maps/`, `save/` and the settings file
    pub data_dir: PathBuf,
    /// Summon RNG seed; random when unset
    pub seed: Option<u64>,
    pub key_layout: KeyLayout,
    /// Jump frames during which hazards are ignored
    pub jump_frame_safe: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_preset: TickPreset::default(),
            data_dir: PathBuf::from("data"),
            seed: None,
            key_layout: KeyLayout::default(),
            jump_frame_safe: JUMP_FRAME_SAFE as u32,
        }
    }
}

impl Settings {
    pub fn tick_hz(&self) -> u32 {
        self.tick_preset.hz()
    }

    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(SETTINGS_FILE)
    }

    /// Load from `data_dir`, falling back to defaults
    pub fn load(data_dir: &Path) -> Self {
        let path = Self::path_in(data_dir);
        let settings = std::fs::read_to_string(&path)
            .ok()
            .and_then(|json| match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => Some(settings),
                Err(err) => {
                    log::warn!("Ignoring corrupt settings {}: {err}", path.display());
                    None
                }
            });

        match settings {
            Some(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            None => {
                log::info!("Using default settings");
                Self {
                    data_dir: data_dir.to_path_buf(),
                    ..Self::default()
                }
            }
        }
    }

    /// Write to `data_dir`
    pub fn save(&self, data_dir: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::create_dir_all(data_dir)?;
        std::fs::write(Self::path_in(data_dir), json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Seed to use: the configured one, else random
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}
