use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use textlens_core::shared::constants::{DEFAULT_DETECTOR_QUEUE_CAPACITY, DEFAULT_FPS};
use textlens_core::shared::frame::{CameraFacing, Rotation};

/// Persisted defaults for the CLI. Command-line flags override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub fps: f64,
    pub rotation: Rotation,
    pub facing: CameraFacing,
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    pub view_width: u32,
    pub view_height: u32,
}

fn default_queue_capacity() -> usize {
    DEFAULT_DETECTOR_QUEUE_CAPACITY
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            rotation: Rotation::Deg0,
            facing: CameraFacing::Back,
            latency_ms: 0,
            queue_capacity: default_queue_capacity(),
            view_width: 1080,
            view_height: 1920,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("TextLens").join("settings.json"))
    }

    /// Loads the user's settings, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| match serde_json::from_str(&json) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    log::warn!("Ignoring invalid settings in {}: {e}", path.display());
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            self.save_to(&path);
        }
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string_pretty(self) {
            if let Err(e) = fs::write(path, json) {
                log::warn!("Failed to save settings to {}: {e}", path.display());
            }
        }
    }
}
