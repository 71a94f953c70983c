//! Engine configuration

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default `env_logger` filter, e.g. `"info"` or `"scene_engine=trace"`
    pub log_level: String,

    /// Name of the scene created at startup
    pub default_scene_name: String,

    /// Render target width in pixels
    pub viewport_width: u32,

    /// Render target height in pixels
    pub viewport_height: u32,

    /// Seconds per frame for a deterministic clock; wall-clock time when unset
    pub fixed_time_step: Option<f32>,

    /// Settings for cameras created by the engine
    pub camera: CameraDefaults,
}

/// Settings for cameras created by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDefaults {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,

    /// Near plane distance
    pub near: f32,

    /// Far plane distance
    pub far: f32,

    /// Clear colour as RGBA
    pub clear_color: [f32; 4],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            default_scene_name: "Main".to_string(),
            viewport_width: 1280,
            viewport_height: 720,
            fixed_time_step: None,
            camera: CameraDefaults::default(),
        }
    }
}

impl Default for CameraDefaults {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 1000.0,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport_width, self.viewport_height
            )));
        }
        if let Some(step) = self.fixed_time_step {
            if !(step > 0.0 && step.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "fixed time step must be positive, got {}",
                    step
                )));
            }
        }
        self.camera.validate()
    }
}

impl CameraDefaults {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera field of view must be in (0, 180) degrees, got {}",
                self.fov_y_degrees
            )));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(ConfigError::Invalid(format!(
                "camera planes need 0 < near < far, got near {} far {}",
                self.near, self.far
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("scene_engine_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = EngineConfig::default();
        config.default_scene_name = "Level 1".to_string();
        config.viewport_width = 640;
        config.camera.fov_y_degrees = 75.0;
        config.camera.clear_color = [0.25, 0.5, 0.75, 1.0];

        let path = temp_path("round_trip.toml");
        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_round_trip() {
        let mut config = EngineConfig::default();
        config.log_level = "debug".to_string();
        config.fixed_time_step = Some(1.0 / 30.0);

        let path = temp_path("round_trip.ron");
        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: EngineConfig = toml::from_str("viewport_width = 320\n[camera]\nnear = 0.5\n").unwrap();
        assert_eq!(config.viewport_width, 320);
        assert_eq!(config.viewport_height, 720);
        assert_eq!(config.camera.near, 0.5);
        assert_eq!(config.camera.far, 1000.0);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = EngineConfig::default().save_to_file("engine.json").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.viewport_height = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = EngineConfig::default();
        config.camera.near = 10.0;
        config.camera.far = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = EngineConfig::default();
        config.fixed_time_step = Some(0.0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
