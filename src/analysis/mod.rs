// Analysis module - DSP pipeline from raw samples to onset peaks
//
// This module orchestrates the one-shot analysis that runs before play starts.
//
// Architecture:
// - AudioInput: validated mono sample buffer handed over by the decoder
// - Pipeline: FeatureExtractor → OnsetDetector
// - Output: OnsetAnalysis (peaks + global feature statistics) for the chart generator

use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, DifficultyProfile};
use crate::error::ChartError;

pub mod features;
pub mod onset;

use features::FeatureExtractor;
use onset::{OnsetAnalysis, OnsetDetector};

/// Mono sample buffer in normalized floating-point range plus its sample rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioInput {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioInput {
    /// Validate and wrap a decoded sample buffer
    ///
    /// # Errors
    /// * `InvalidSampleRate` if `sample_rate` is zero
    /// * `NonFiniteSamples` if any sample is NaN or infinite
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, ChartError> {
        if sample_rate == 0 {
            return Err(ChartError::InvalidSampleRate { sample_rate });
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(ChartError::NonFiniteSamples { index });
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total duration in seconds
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Run feature extraction and onset detection over a whole recording
pub fn analyze(
    input: &AudioInput,
    profile: &DifficultyProfile,
    config: &AnalysisConfig,
) -> OnsetAnalysis {
    let extractor = FeatureExtractor::new(input.sample_rate(), config);
    let frames = extractor.extract(input.samples());

    tracing::debug!(
        "[Analysis] {} frames (window={} hop={}) from {:.2}s of audio",
        frames.len(),
        extractor.window_size(),
        extractor.hop_size(),
        input.duration()
    );

    let detector = OnsetDetector::new(*profile, config);
    let analysis = detector.detect(&frames);

    tracing::info!(
        "[Analysis] Detected {} peaks ({} candidates) in {:.2}s of audio",
        analysis.peaks.len(),
        analysis.candidate_count,
        input.duration()
    );

    analysis
}
