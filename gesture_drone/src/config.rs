// config.rs

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

use drone_kinematics::{LatLng, TurnProfile, DEFAULT_SPEED_M, HOME};

const APP_NAME: &str = "gesture_drone";
const CONFIG_FILE_NAME: &str = "config.json";

/// `<config dir>/gesture_drone/config.json`
pub fn default_config_path() -> PathBuf {
    let mut dir = dirs_next::config_dir().unwrap_or_else(|| {
        dirs_next::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
    });
    dir.push(APP_NAME);
    dir.push(CONFIG_FILE_NAME);
    dir
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which of the two control variants to run.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// 5° turns.
    #[default]
    Refined,
    /// 10° turns.
    Baseline,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude:  f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where the drone starts and where return-home flies to.
    pub home:             Location,
    /// Meters per forward step.
    pub speed_m:          f64,
    pub variant:          Variant,
    /// Run the landmark predicates (Shaka → return home).
    pub custom_gestures:  bool,
    /// Minimum gap between discrete commands.
    pub cooldown_ms:      u64,
    /// Cadence of continuous-forward and return-home steps.
    pub tick_ms:          u64,
    /// Drone marker image; a drawn arrow is used if it can't be loaded.
    pub icon_path:        PathBuf,
    /// Map zoom.
    pub meters_per_pixel: f64,
    /// Frame cadence when replaying a recorded session.
    pub replay_frame_ms:  u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home: Location { latitude: HOME.lat, longitude: HOME.lng },
            speed_m:          DEFAULT_SPEED_M,
            variant:          Variant::Refined,
            custom_gestures:  true,
            cooldown_ms:      400,
            tick_ms:          120,
            icon_path:        PathBuf::from("drone.png"),
            meters_per_pixel: 4.0,
            replay_frame_ms:  33,
        }
    }
}

impl Config {
    /// Load from the default location, or return defaults if missing.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let cfg: Config = if path.exists() {
            let raw = fs::read_to_string(path)?;
            serde_json::from_str(&raw)?
        } else {
            Config::default()
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save to the default location, creating the directory if needed.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = default_config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.speed_m.is_finite() && self.speed_m > 0.0) {
            return Err(ConfigError::Invalid(format!("speed_m must be positive, got {}", self.speed_m)));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be at least 1".into()));
        }
        if self.replay_frame_ms == 0 {
            return Err(ConfigError::Invalid("replay_frame_ms must be at least 1".into()));
        }
        if !(self.meters_per_pixel.is_finite() && self.meters_per_pixel > 0.0) {
            return Err(ConfigError::Invalid("meters_per_pixel must be positive".into()));
        }
        if !(-90.0..=90.0).contains(&self.home.latitude) || !(-180.0..=180.0).contains(&self.home.longitude) {
            return Err(ConfigError::Invalid(format!(
                "home ({}, {}) is not a coordinate",
                self.home.latitude, self.home.longitude
            )));
        }
        Ok(())
    }

    /// Switch to the older control variant: coarse turns, recognizer only.
    pub fn baseline(mut self) -> Self {
        self.variant = Variant::Baseline;
        self.custom_gestures = false;
        self
    }

    pub fn home(&self)     -> LatLng   { LatLng::new(self.home.latitude, self.home.longitude) }
    pub fn cooldown(&self) -> Duration { Duration::from_millis(self.cooldown_ms) }
    pub fn tick(&self)     -> Duration { Duration::from_millis(self.tick_ms) }

    pub fn replay_frame(&self) -> Duration { Duration::from_millis(self.replay_frame_ms) }

    pub fn turn_profile(&self) -> TurnProfile {
        match self.variant {
            Variant::Refined  => TurnProfile::Refined,
            Variant::Baseline => TurnProfile::Baseline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gesture_drone_{}_{}", std::process::id(), name))
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.home(), HOME);
        assert_eq!(cfg.cooldown(), Duration::from_millis(400));
        assert_eq!(cfg.tick(), Duration::from_millis(120));
        assert_eq!(cfg.turn_profile(), TurnProfile::Refined);
    }

    #[test]
    fn save_then_load() {
        let path = temp_path("roundtrip/config.json");
        let mut cfg = Config::default();
        cfg.speed_m = 25.0;
        cfg.variant = Variant::Baseline;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = Config::load_from(&temp_path("does_not_exist.json")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let path = temp_path("partial.json");
        fs::write(&path, r#"{ "speed_m": 40.0, "variant": "baseline" }"#).unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.speed_m, 40.0);
        assert_eq!(cfg.turn_profile(), TurnProfile::Baseline);
        assert_eq!(cfg.cooldown_ms, 400);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn bad_json_is_an_error() {
        let path = temp_path("bad.json");
        fs::write(&path, "{ speed_m: ").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Json(_))));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn invalid_values_rejected() {
        let cfg = Config { speed_m: 0.0, ..Config::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let cfg = Config { tick_ms: 0, ..Config::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let cfg = Config { home: Location { latitude: 91.0, longitude: 0.0 }, ..Config::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn baseline_turns_off_custom_gestures() {
        let cfg = Config::default().baseline();
        assert_eq!(cfg.variant, Variant::Baseline);
        assert!(!cfg.custom_gestures);
    }
}
