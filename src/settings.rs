// Copyright (c) 2026 rezky_nightky

//! Tuning parameters for the rain engine and their JSON persistence.
//!
//! The engine reads a [`RainConfig`] snapshot every frame and never keeps
//! its own copy, so the driver is free to change any field between frames.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::charset::CharsetPreset;
use crate::controls::Keymap;
use crate::palette::{background_set, Anchor, ColorScheme};
use crate::runtime::{ColorMode, VisibilityPriority};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to read settings at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write settings at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainConfig {
    pub rows: u16,
    pub columns: u16,
    /// Seconds between frames.
    pub frame_interval: f64,
    pub new_sequence_chance: f64,
    pub min_length: usize,
    pub max_length: usize,
    /// Rows per frame.
    pub min_speed: f64,
    pub max_speed: f64,
    pub mid_sequence_mutation_chance: f64,
    pub character_set: Vec<char>,
    pub shift_mode: bool,
    /// Brightest first.
    pub primary_colors: Vec<Anchor>,
    /// Brightness multipliers of the dimmed background color sets.
    pub background_levels: Vec<f64>,
    pub background_chance: f64,
    pub visibility_priority: VisibilityPriority,
    pub space_between_columns: bool,
    /// Follow the terminal size on resize.
    pub auto_size: bool,
    pub color_mode: ColorMode,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            rows: 32,
            columns: 150,
            frame_interval: 0.06,
            new_sequence_chance: 0.02,
            min_length: 5,
            max_length: 20,
            min_speed: 0.4,
            max_speed: 1.2,
            mid_sequence_mutation_chance: 0.01,
            character_set: CharsetPreset::Matrix.glyphs(),
            shift_mode: true,
            primary_colors: ColorScheme::Green.anchors(),
            background_levels: vec![0.6, 0.35],
            background_chance: 0.3,
            visibility_priority: VisibilityPriority::Higher,
            space_between_columns: false,
            auto_size: true,
            color_mode: ColorMode::TrueColor,
        }
    }
}

fn check_probability(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&v) {
        return Err(invalid(field, format!("{v} is outside 0..=1")));
    }
    Ok(())
}

fn check_positive(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if !v.is_finite() || v <= 0.0 {
        return Err(invalid(field, format!("{v} must be a positive finite number")));
    }
    Ok(())
}

impl RainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 {
            return Err(invalid("rows", "must be at least 1"));
        }
        if self.columns == 0 {
            return Err(invalid("columns", "must be at least 1"));
        }
        check_positive("frame_interval", self.frame_interval)?;
        check_probability("new_sequence_chance", self.new_sequence_chance)?;
        check_probability(
            "mid_sequence_mutation_chance",
            self.mid_sequence_mutation_chance,
        )?;
        check_probability("background_chance", self.background_chance)?;

        if self.min_length == 0 {
            return Err(invalid("min_length", "must be at least 1"));
        }
        if self.min_length > self.max_length {
            return Err(invalid(
                "max_length",
                format!("{} is below min_length {}", self.max_length, self.min_length),
            ));
        }
        check_positive("min_speed", self.min_speed)?;
        check_positive("max_speed", self.max_speed)?;
        if self.min_speed > self.max_speed {
            return Err(invalid(
                "max_speed",
                format!("{} is below min_speed {}", self.max_speed, self.min_speed),
            ));
        }

        if self.character_set.is_empty() {
            return Err(invalid("character_set", "must not be empty"));
        }
        if self.primary_colors.is_empty() {
            return Err(invalid("primary_colors", "must not be empty"));
        }
        if let Some(level) = self
            .background_levels
            .iter()
            .find(|l| !(l.is_finite() && **l > 0.0 && **l < 1.0))
        {
            return Err(invalid(
                "background_levels",
                format!("{level} is outside the open range 0..1"),
            ));
        }
        Ok(())
    }

    /// The dimmed color sets paired with their brightness level, derived
    /// from the current primary colors.
    pub fn background_color_sets(&self) -> Vec<(f64, Vec<Anchor>)> {
        self.background_levels
            .iter()
            .map(|&level| (level, background_set(&self.primary_colors, level)))
            .collect()
    }
}

/// Everything persisted between sessions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub rain: RainConfig,
    pub controls: Keymap,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.rain.validate()?;
        info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "saved settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        RainConfig::default().validate().unwrap();
    }

    #[test]
    fn validate_rejects_inverted_length_range() {
        let cfg = RainConfig {
            min_length: 10,
            max_length: 3,
            ..RainConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "max_length",
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_empty_glyphs_and_bad_speeds() {
        let cfg = RainConfig {
            character_set: Vec::new(),
            ..RainConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = RainConfig {
            min_speed: 0.0,
            ..RainConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = RainConfig {
            new_sequence_chance: 1.5,
            ..RainConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_background_level_of_one() {
        let cfg = RainConfig {
            background_levels: vec![0.5, 1.0],
            ..RainConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn background_sets_follow_primary_colors() {
        let cfg = RainConfig {
            primary_colors: vec![Anchor::bold(200, 100, 50)],
            background_levels: vec![0.5],
            ..RainConfig::default()
        };
        let sets = cfg.background_color_sets();
        assert_eq!(sets, vec![(0.5, vec![Anchor::rgb(100, 50, 25)])]);
    }

    #[test]
    fn settings_round_trip_through_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.rain.rows = 12;
        settings.rain.shift_mode = false;
        settings.rain.visibility_priority = VisibilityPriority::Lower;
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn partial_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "rain": { "rows": 7 } }"#).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.rain.rows, 7);
        assert_eq!(loaded.rain.columns, RainConfig::default().columns);
        assert_eq!(loaded.controls, Keymap::default());
    }

    #[test]
    fn load_reports_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "rain": { "min_speed": 3.0, "max_speed": 1.0 } }"#).unwrap();
        assert!(matches!(
            Settings::load(&path),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
