//! Configuration management for chart generation and judgement
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling tuning of the onset heuristic, chart layout and judgement
//! tolerances without recompilation. Every tolerance constant used by the
//! pipeline lives here with its reference value as the default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::ChartError;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub chart: ChartConfig,
    pub judgement: JudgementConfig,
}

/// Feature extraction and onset detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Analysis window length in seconds (hop is half of it)
    pub window_seconds: f64,
    /// Frames skipped at both ends of the feature sequence
    pub edge_frames: usize,
    /// Half-width of the local-maximum flux window (full window = 2 * this + 1)
    pub local_max_radius: usize,
    /// Energy threshold = mean + this * std
    pub energy_std_multiplier: f32,
    /// Lead added to accepted peak times to compensate detection lag
    pub onset_lead_seconds: f64,
    /// Denominator guard for the centroid proxy
    pub centroid_epsilon: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_seconds: 0.043,
            edge_frames: 8,
            local_max_radius: 4,
            energy_std_multiplier: 0.5,
            onset_lead_seconds: 0.05,
            centroid_epsilon: 1e-4,
        }
    }
}

/// Chart layout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Number of parallel input lanes
    pub lane_count: usize,
    /// Two notes in one lane must start at least this far apart
    pub lane_clearance_seconds: f64,
    /// Length of the sliding window the density cap applies to
    pub density_window_seconds: f64,
    /// Peaks louder than this multiple of the mean energy may become special notes
    pub special_energy_ratio: f32,
    /// Hold notes need at least this many peaks left after them
    pub hold_min_remaining_peaks: usize,
    pub hold_min_seconds: f64,
    pub hold_max_seconds: f64,
    /// Flick notes need a zero-crossing rate above this
    pub flick_min_zcr: f32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            lane_count: 4,
            lane_clearance_seconds: 0.2,
            density_window_seconds: 1.0,
            special_energy_ratio: 1.8,
            hold_min_remaining_peaks: 5,
            hold_min_seconds: 0.6,
            hold_max_seconds: 1.4,
            flick_min_zcr: 0.05,
        }
    }
}

impl ChartConfig {
    /// Validate lane count and hold duration range
    pub fn validate(&self) -> Result<(), ChartError> {
        if self.lane_count == 0 {
            return Err(ChartError::InvalidLaneCount {
                lane_count: self.lane_count,
            });
        }
        if !(self.hold_min_seconds > 0.0 && self.hold_min_seconds < self.hold_max_seconds) {
            return Err(ChartError::InvalidProfile {
                reason: format!(
                    "hold duration range [{}, {}) is empty",
                    self.hold_min_seconds, self.hold_max_seconds
                ),
            });
        }
        Ok(())
    }
}

/// Judgement timing windows in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgementConfig {
    pub perfect_window: f64,
    pub great_window: f64,
    pub good_window: f64,
    /// Unresolved notes this far behind the clock become misses
    pub miss_delay: f64,
}

impl Default for JudgementConfig {
    fn default() -> Self {
        Self {
            perfect_window: 0.04,
            great_window: 0.08,
            good_window: 0.12,
            miss_delay: 0.2,
        }
    }
}

/// Canonical difficulty names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile::EASY,
            Difficulty::Normal => DifficultyProfile::NORMAL,
            Difficulty::Hard => DifficultyProfile::HARD,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ChartError::InvalidProfile {
                reason: format!("unknown difficulty '{}'", other),
            }),
        }
    }
}

/// Difficulty profile selected once before chart generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyProfile {
    /// Flux threshold = mean + this * std
    pub flux_threshold_multiplier: f32,
    /// Minimum spacing between accepted onsets in seconds
    pub min_onset_interval: f64,
    /// Probability that a loud peak becomes a special note
    pub special_note_chance: f64,
    /// Density cap for any sliding window
    pub max_notes_per_second: usize,
}

impl DifficultyProfile {
    pub const EASY: Self = Self {
        flux_threshold_multiplier: 2.8,
        min_onset_interval: 0.5,
        special_note_chance: 0.08,
        max_notes_per_second: 2,
    };

    pub const NORMAL: Self = Self {
        flux_threshold_multiplier: 2.2,
        min_onset_interval: 0.35,
        special_note_chance: 0.18,
        max_notes_per_second: 3,
    };

    pub const HARD: Self = Self {
        flux_threshold_multiplier: 1.8,
        min_onset_interval: 0.25,
        special_note_chance: 0.32,
        max_notes_per_second: 4,
    };

    /// Check that a custom profile satisfies the same schema as the canonical ones
    pub fn validate(&self) -> Result<(), ChartError> {
        if !self.flux_threshold_multiplier.is_finite() || self.flux_threshold_multiplier < 0.0 {
            return Err(ChartError::InvalidProfile {
                reason: format!(
                    "flux threshold multiplier must be finite and >= 0 (got {})",
                    self.flux_threshold_multiplier
                ),
            });
        }
        if !self.min_onset_interval.is_finite() || self.min_onset_interval < 0.0 {
            return Err(ChartError::InvalidProfile {
                reason: format!(
                    "minimum onset interval must be finite and >= 0 (got {})",
                    self.min_onset_interval
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.special_note_chance) {
            return Err(ChartError::InvalidProfile {
                reason: format!(
                    "special note chance must be within [0, 1] (got {})",
                    self.special_note_chance
                ),
            });
        }
        Ok(())
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults if the file is missing or invalid
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
}
