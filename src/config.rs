// src/config.rs - Tunables for the classifier, controller and session recorder
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub classifier: ClassifierConfig,
    pub control: ControlConfig,
    pub scene: SceneConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Thumb-tip to index-tip distance below which the hand is pinching
    pub pinch_threshold: f64,
    /// Index-tip to middle-tip distance above which two fingers form a V
    pub v_sign_separation: f64,
    pub fist_hold_ms: u64,
    pub three_fingers_hold_ms: u64,
    pub v_sign_hold_ms: u64,
    /// Majority vote over this many raw frames before hysteresis; 1 disables it
    pub vote_window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Moving-average window applied to palm translation deltas
    pub smoothing_window: usize,
    /// Multiplier from pinch-distance delta to zoom delta
    pub zoom_gain: f64,
    /// Exponential smoothing weight for palm deltas; replaces the window when set
    pub smoothing_alpha: Option<f64>,
    /// Palm and rotation deltas with |dx| and |dy| both below this are dropped
    pub deadzone: f64,
    /// Pinch-distance changes below this are dropped
    pub zoom_deadzone: f64,
    /// Minimum time between two firings of the same action
    pub action_cooldown_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub translate_gain_xy: f64,
    pub translate_gain_z: f64,
    /// Degrees of rotation per unit of normalized fingertip travel
    pub rotate_gain: f64,
    /// Degrees added to the y rotation per frame while auto-rotating
    pub auto_rotate_step: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub record: bool,
    pub output_directory: PathBuf,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: 0.05,
            v_sign_separation: 0.1,
            fist_hold_ms: 2000,
            three_fingers_hold_ms: 600,
            v_sign_hold_ms: 1000,
            vote_window: 1,
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 3,
            zoom_gain: 2.0,
            smoothing_alpha: None,
            deadzone: 0.0,
            zoom_deadzone: 0.0,
            action_cooldown_ms: 0,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            translate_gain_xy: 5.0,
            translate_gain_z: 10.0,
            rotate_gain: 180.0,
            auto_rotate_step: 2.0,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            record: true,
            output_directory: directories::UserDirs::new()
                .and_then(|dirs| dirs.document_dir().map(|p| p.join("GestureControl")))
                .unwrap_or_else(|| PathBuf::from("./output")),
        }
    }
}

impl ClassifierConfig {
    pub fn fist_hold(&self) -> Duration {
        Duration::from_millis(self.fist_hold_ms)
    }

    pub fn three_fingers_hold(&self) -> Duration {
        Duration::from_millis(self.three_fingers_hold_ms)
    }

    pub fn v_sign_hold(&self) -> Duration {
        Duration::from_millis(self.v_sign_hold_ms)
    }
}

impl ControlConfig {
    pub fn action_cooldown(&self) -> Duration {
        Duration::from_millis(self.action_cooldown_ms)
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.classifier.pinch_threshold > 0.0) {
            return Err(Error::Config(
                "Pinch threshold must be greater than 0".to_string(),
            ));
        }
        if !(self.classifier.v_sign_separation > 0.0) {
            return Err(Error::Config(
                "V-sign separation must be greater than 0".to_string(),
            ));
        }
        if self.control.smoothing_window == 0 {
            return Err(Error::Config(
                "Smoothing window must be greater than 0".to_string(),
            ));
        }
        if self.classifier.vote_window == 0 {
            return Err(Error::Config(
                "Vote window must be greater than 0".to_string(),
            ));
        }
        if !self.control.zoom_gain.is_finite() {
            return Err(Error::Config("Zoom gain must be finite".to_string()));
        }
        if let Some(alpha) = self.control.smoothing_alpha {
            if !(alpha > 0.0 && alpha < 1.0) {
                return Err(Error::Config(
                    "Smoothing alpha must be between 0 and 1".to_string(),
                ));
            }
        }
        let deadzones = [self.control.deadzone, self.control.zoom_deadzone];
        if deadzones.iter().any(|d| !(d.is_finite() && *d >= 0.0)) {
            return Err(Error::Config(
                "Deadzones must be finite and non-negative".to_string(),
            ));
        }

        let scene_gains = [
            self.scene.translate_gain_xy,
            self.scene.translate_gain_z,
            self.scene.rotate_gain,
            self.scene.auto_rotate_step,
        ];
        if scene_gains.iter().any(|g| !g.is_finite()) {
            return Err(Error::Config("Scene gains must be finite".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.classifier.pinch_threshold, 0.05);
        assert_eq!(config.classifier.fist_hold(), Duration::from_millis(2000));
        assert_eq!(config.classifier.three_fingers_hold(), Duration::from_millis(600));
        assert_eq!(config.classifier.v_sign_hold(), Duration::from_millis(1000));
        assert_eq!(config.control.smoothing_window, 3);
        assert_eq!(config.scene.rotate_gain, 180.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "classifier": { "fist_hold_ms": 500 }, "control": { "smoothing_window": 5 } }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.classifier.fist_hold_ms, 500);
        assert_eq!(config.classifier.v_sign_hold_ms, 1000);
        assert_eq!(config.control.smoothing_window, 5);
        assert_eq!(config.control.zoom_gain, 2.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.control.smoothing_window = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = EngineConfig::default();
        config.classifier.pinch_threshold = -0.1;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.scene.rotate_gain = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.classifier.vote_window = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.control.smoothing_alpha = Some(1.5);
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.control.deadzone = -0.01;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = std::env::temp_dir().join(format!("gesture_config_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let mut config = EngineConfig::default();
        config.classifier.three_fingers_hold_ms = 750;
        config.to_file(&path).unwrap();

        let loaded = EngineConfig::from_file(&path).unwrap();
        assert_eq!(loaded.classifier.three_fingers_hold_ms, 750);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
