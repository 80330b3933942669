use crate::render::CameraParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "scenepad.json";
pub const CONFIG_ENV: &str = "SCENEPAD_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Editor start-up settings. Every field falls back to its default when
/// missing from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub side_panel_width: f32,
    pub camera_fov_deg: f32,
    pub camera_near: f32,
    pub camera_far: f32,
    pub ortho_half_height: f32,
    pub camera_position: [f32; 3],
    pub orbit_damping: f32,
    pub gizmo_size: f32,
    pub status_seconds: f32,
    pub background: u32,
    pub fog_density: f32,
    pub transform_enabled: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            window_width: 1600,
            window_height: 900,
            side_panel_width: 320.0,
            camera_fov_deg: 75.0,
            camera_near: 0.1,
            camera_far: 1000.0,
            ortho_half_height: 5.0,
            camera_position: [0.0, 2.0, 5.0],
            orbit_damping: 0.05,
            gizmo_size: 0.75,
            status_seconds: 3.0,
            background: 0x111111,
            fog_density: 0.05,
            transform_enabled: false,
        }
    }
}

impl EditorConfig {
    pub fn camera_params(&self) -> CameraParams {
        CameraParams {
            fov_deg: self.camera_fov_deg.clamp(1.0, 179.0),
            near: self.camera_near.max(1e-4),
            far: self.camera_far.max(self.camera_near.max(1e-4) * 2.0),
            ortho_half_height: self.ortho_half_height.max(1e-3),
        }
    }

    pub fn status_duration(&self) -> Duration {
        Duration::from_secs_f32(self.status_seconds.max(0.0))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// `SCENEPAD_CONFIG` if set, else `scenepad.json` in the working directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }

    /// Never fails: a missing file means defaults, a broken one is logged.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("Ignoring config {}: {err}", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("scenepad_{}_{name}", std::process::id()))
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = temp_path("partial.json");
        std::fs::write(&path, r#"{ "side_panel_width": 280.0, "gizmo_size": 1.0 }"#).unwrap();
        let config = EditorConfig::load_or_default(&path);
        assert_eq!(config.side_panel_width, 280.0);
        assert_eq!(config.gizmo_size, 1.0);
        assert_eq!(config.camera_fov_deg, 75.0);
        assert_eq!(config.status_duration(), Duration::from_secs(3));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = temp_path("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(EditorConfig::from_file(&path), Err(ConfigError::Json(_))));
        assert_eq!(EditorConfig::load_or_default(&path), EditorConfig::default());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_defaults() {
        let config = EditorConfig::load_or_default(&temp_path("absent.json"));
        assert_eq!(config, EditorConfig::default());
        let params = config.camera_params();
        assert_eq!(params.near, 0.1);
        assert_eq!(params.far, 1000.0);
    }
}
