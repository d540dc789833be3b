// src/config.rs

use crate::session::Mode;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_WORK_MINUTES: u64 = 25;
pub const DEFAULT_REST_MINUTES: u64 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("duration must be a positive number of minutes")]
    ZeroDuration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerSettings {
    pub work_duration: u64,
    pub rest_duration: u64,
    pub sound_file: String,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_duration: DEFAULT_WORK_MINUTES,
            rest_duration: DEFAULT_REST_MINUTES,
            sound_file: String::new(),
        }
    }
}

/**
 * Durations (in minutes) and the alert sound, stored under `[timer]`.
 */
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub timer: TimerSettings,
}

impl Settings {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("rest-reminder"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Reads settings from `path`. A missing or malformed file is replaced
    /// with the defaults, which are written back to disk.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(settings) => settings,
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                debug!("No settings at {}, writing defaults", path.display());
                Self::write_defaults(path)
            }
            Err(e) => {
                warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::write_defaults(path)
            }
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let data: String = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&data)?)
    }

    fn write_defaults(path: &Path) -> Self {
        let settings: Self = Self::default();
        if let Err(e) = settings.save(path) {
            warn!("Could not write default settings: {}", e);
        }
        settings
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let data: String = toml::to_string_pretty(self)?;
        fs::write(path, data).map_err(io_err)
    }

    pub fn set_work_minutes(&mut self, minutes: u64) -> Result<(), ConfigError> {
        if minutes == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        self.timer.work_duration = minutes;
        Ok(())
    }

    pub fn set_rest_minutes(&mut self, minutes: u64) -> Result<(), ConfigError> {
        if minutes == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        self.timer.rest_duration = minutes;
        Ok(())
    }

    pub fn set_sound_file(&mut self, path: &Path) {
        self.timer.sound_file = path.to_string_lossy().into_owned();
    }

    pub fn minutes_for(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Work => self.timer.work_duration,
            Mode::Rest => self.timer.rest_duration,
        }
    }

    pub fn seconds_for(&self, mode: Mode) -> u64 {
        self.minutes_for(mode).saturating_mul(60)
    }

    pub fn sound_file(&self) -> Option<&Path> {
        let file: &str = self.timer.sound_file.trim();
        if file.is_empty() {
            None
        } else {
            Some(Path::new(file))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_writes_defaults() {
        let dir: TempDir = TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("nested").join("config.toml");

        let settings: Settings = Settings::load(&path);

        assert_eq!(settings, Settings::default());
        assert!(path.exists());
        let written: String = fs::read_to_string(&path).unwrap();
        assert!(written.contains("[timer]"));
        assert!(written.contains("work_duration = 25"));
        assert!(written.contains("rest_duration = 5"));
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir: TempDir = TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("config.toml");
        let mut settings: Settings = Settings::default();
        settings.set_work_minutes(50).unwrap();
        settings.set_rest_minutes(10).unwrap();
        settings.set_sound_file(Path::new("/tmp/bell.wav"));

        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path), settings);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir: TempDir = TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("config.toml");
        fs::write(&path, "[timer]\nwork_duration = \"soon\"\n").unwrap();

        assert_eq!(Settings::load(&path), Settings::default());
        let rewritten: String = fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("work_duration = 25"));
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let dir: TempDir = TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("config.toml");
        fs::write(&path, "[timer]\nrest_duration = 15\n").unwrap();

        let settings: Settings = Settings::load(&path);

        assert_eq!(settings.timer.work_duration, DEFAULT_WORK_MINUTES);
        assert_eq!(settings.timer.rest_duration, 15);
        assert_eq!(settings.sound_file(), None);
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let mut settings: Settings = Settings::default();
        assert!(matches!(
            settings.set_work_minutes(0),
            Err(ConfigError::ZeroDuration)
        ));
        assert!(settings.set_rest_minutes(0).is_err());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_seconds_for_mode() {
        let settings: Settings = Settings::default();
        assert_eq!(settings.seconds_for(Mode::Work), 1500);
        assert_eq!(settings.seconds_for(Mode::Rest), 300);
    }

    #[test]
    fn test_blank_sound_file_is_unset() {
        let mut settings: Settings = Settings::default();
        settings.timer.sound_file = "   ".to_string();
        assert_eq!(settings.sound_file(), None);
        settings.set_sound_file(Path::new("alert.mp3"));
        assert_eq!(settings.sound_file(), Some(Path::new("alert.mp3")));
    }
}
