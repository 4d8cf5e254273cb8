//! Configuration management for pipeline parameter tuning
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling fast iteration without recompilation. Extraction thresholds,
//! rhythm tracking, personal adaptation limits, and palette rules can all be
//! adjusted via the config file. Every field has a default, so partial files
//! are accepted.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default config location for desktop tooling
pub const DEFAULT_CONFIG_PATH: &str = "assets/emotion_config.json";

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub extraction: ExtractionConfig,
    pub rhythm: RhythmConfig,
    pub classification: ClassificationConfig,
    pub adaptation: AdaptationConfig,
    pub palette: PaletteConfig,
}

/// Feature extraction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Cumulative intensity fraction used for spectral rolloff
    pub rolloff_threshold: f32,
    /// Peaks must exceed this fraction of the global max intensity
    pub peak_threshold: f32,
    /// Relative window (fraction of f0) for harmonic alignment and search
    pub harmonic_tolerance: f32,
    /// Maximum number of harmonics reported
    pub max_harmonics: usize,
    /// dB value mapped to byte 0 for decibel frames
    pub min_db: f32,
    /// dB value mapped to byte 255 for decibel frames
    pub max_db: f32,
    /// Upper edge of the bass region (Hz)
    pub bass_cutoff_hz: f32,
    /// Lower edge of the treble region (Hz)
    pub treble_cutoff_hz: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            rolloff_threshold: 0.85,
            peak_threshold: 0.1,
            harmonic_tolerance: 0.1,
            max_harmonics: 10,
            min_db: -100.0,
            max_db: -30.0,
            bass_cutoff_hz: 250.0,
            treble_cutoff_hz: 4000.0,
        }
    }
}

/// Cross-frame tempo tracking parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmConfig {
    /// Analysis ticks per second (converts frame intervals to seconds)
    pub frame_rate_hz: f32,
    /// Offset added to the median flux for adaptive thresholding
    pub threshold_offset: f32,
    /// Number of flux values kept for the median threshold
    pub flux_history: usize,
    /// Number of inter-onset intervals kept for tempo estimation
    pub interval_history: usize,
    pub min_bpm: f32,
    pub max_bpm: f32,
}

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: 60.0,
            threshold_offset: 0.05,
            flux_history: 64,
            interval_history: 16,
            min_bpm: 40.0,
            max_bpm: 240.0,
        }
    }
}

/// Category scoring parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Composite categories are scored only above this complexity
    pub composite_complexity_gate: f32,
    /// Alternatives must score strictly above this
    pub alternative_min_score: f32,
    pub max_alternatives: usize,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            composite_complexity_gate: 0.6,
            alternative_min_score: 0.5,
            max_alternatives: 3,
        }
    }
}

/// Personal history and correction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptationConfig {
    pub history_capacity: usize,
    pub corrections_capacity: usize,
    /// Default adaptation rate for new personal models
    pub adaptation_rate: f32,
    /// Persist the model every N observations (0 disables throttled writes)
    pub persist_every: u64,
    /// Upper bound of the novelty resonance for unseen categories
    pub novelty_max: u8,
    /// Entries newer than this earn the recency bonus
    pub recency_window_ms: u64,
    pub recency_bonus: u32,
    /// Corrections closer than this similarity boost confidence
    pub correction_similarity: f32,
    /// Seed for the novelty generator
    pub seed: u64,
}

impl Default for AdaptationConfig {
    fn default() -> Self {
        Self {
            history_capacity: 1000,
            corrections_capacity: 500,
            adaptation_rate: 0.1,
            persist_every: 10,
            novelty_max: 30,
            recency_window_ms: 24 * 60 * 60 * 1000,
            recency_bonus: 10,
            correction_similarity: 0.7,
            seed: 0x5EED_C0DE,
        }
    }
}

/// Color palette augmentation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Saturation/lightness multiplier applied for high arousal
    pub intensify_factor: f32,
    pub max_colors: usize,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            intensify_factor: 1.2,
            max_colors: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or defaults if the file is missing or the
    /// JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default desktop location
    pub fn load() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.extraction.rolloff_threshold, 0.85);
        assert_eq!(config.extraction.max_harmonics, 10);
        assert_eq!(config.adaptation.history_capacity, 1000);
        assert_eq!(config.adaptation.corrections_capacity, 500);
        assert_eq!(config.adaptation.persist_every, 10);
        assert_eq!(config.palette.max_colors, 5);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{"adaptation": {"adaptation_rate": 0.25}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.adaptation.adaptation_rate, 0.25);
        assert_eq!(config.adaptation.history_capacity, 1000);
        assert_eq!(config.extraction, ExtractionConfig::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load_from_file("/nonexistent/emotion_config.json");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/emotion_config.json");
        assert_eq!(AppConfig::load_from_file(path), AppConfig::default());
    }
}
