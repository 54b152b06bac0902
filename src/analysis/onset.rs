// OnsetDetector - energy flux onset detection with global adaptive thresholds
//
// This module picks sparse onset peaks out of a precomputed feature sequence.
// The whole song is available up front, so thresholds come from global
// statistics rather than a running median.
//
// Algorithm:
// 1. mean/std (population) of energy and flux over all frames
// 2. flux_threshold = mean_flux + std_flux * profile multiplier
//    energy_threshold = mean_energy + 0.5 * std_energy
// 3. Candidate at i (skipping edge frames): flux > flux_threshold,
//    energy > energy_threshold, flux > both neighbours, flux is the maximum of
//    the 9-frame window centred on i
// 4. Greedy left-to-right spacing filter with the profile's minimum interval
// 5. Peak time = frame time + fixed lead, intensity = flux / mean_flux

use serde::{Deserialize, Serialize};

use crate::analysis::features::AudioFrame;
use crate::config::{AnalysisConfig, DifficultyProfile};

/// Accepted onset handed to the chart generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Onset time in seconds, lead already applied
    pub time: f64,
    pub energy: f32,
    pub zcr: f32,
    /// Flux relative to the mean flux of the song
    pub intensity: f32,
}

/// Global statistics over a feature sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    pub mean_energy: f32,
    pub std_energy: f32,
    pub mean_flux: f32,
    pub std_flux: f32,
}

impl FeatureStats {
    /// Population mean and standard deviation of energy and flux
    pub fn from_frames(frames: &[AudioFrame]) -> Self {
        if frames.is_empty() {
            return Self::default();
        }

        let n = frames.len() as f64;
        let mean_energy = frames.iter().map(|f| f.energy as f64).sum::<f64>() / n;
        let mean_flux = frames.iter().map(|f| f.flux as f64).sum::<f64>() / n;
        let var_energy = frames
            .iter()
            .map(|f| (f.energy as f64 - mean_energy).powi(2))
            .sum::<f64>()
            / n;
        let var_flux = frames
            .iter()
            .map(|f| (f.flux as f64 - mean_flux).powi(2))
            .sum::<f64>()
            / n;

        Self {
            mean_energy: mean_energy as f32,
            std_energy: var_energy.sqrt() as f32,
            mean_flux: mean_flux as f32,
            std_flux: var_flux.sqrt() as f32,
        }
    }
}

/// Result of running the detector over a whole song
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnsetAnalysis {
    pub peaks: Vec<Peak>,
    pub stats: FeatureStats,
    /// Frames that passed thresholds and the local-maximum test
    pub candidate_count: usize,
}

/// OnsetDetector applies global thresholds and spacing to a frame sequence
pub struct OnsetDetector {
    profile: DifficultyProfile,
    edge_frames: usize,
    local_max_radius: usize,
    energy_std_multiplier: f32,
    onset_lead_seconds: f64,
}

impl OnsetDetector {
    pub fn new(profile: DifficultyProfile, config: &AnalysisConfig) -> Self {
        let local_max_radius = config.local_max_radius.max(1);
        Self {
            profile,
            // The local window must fit inside the frame sequence
            edge_frames: config.edge_frames.max(local_max_radius),
            local_max_radius,
            energy_std_multiplier: config.energy_std_multiplier,
            onset_lead_seconds: config.onset_lead_seconds,
        }
    }

    /// Detect onset peaks in a feature sequence
    ///
    /// Empty input, constant flux or a song with no energy increase at all
    /// yield an empty peak list.
    pub fn detect(&self, frames: &[AudioFrame]) -> OnsetAnalysis {
        let stats = FeatureStats::from_frames(frames);

        if frames.len() <= self.edge_frames * 2 || stats.mean_flux <= 0.0 || stats.std_flux <= 0.0
        {
            tracing::debug!(
                "[OnsetDetector] Nothing to detect (frames={}, mean_flux={}, std_flux={})",
                frames.len(),
                stats.mean_flux,
                stats.std_flux
            );
            return OnsetAnalysis {
                peaks: Vec::new(),
                stats,
                candidate_count: 0,
            };
        }

        let flux_threshold =
            stats.mean_flux + stats.std_flux * self.profile.flux_threshold_multiplier;
        let energy_threshold = stats.mean_energy + self.energy_std_multiplier * stats.std_energy;

        let candidates = self.pick_candidates(frames, flux_threshold, energy_threshold);
        let candidate_count = candidates.len();
        let peaks = self.enforce_spacing(frames, &candidates, stats.mean_flux);

        tracing::debug!(
            "[OnsetDetector] flux_threshold={:.5} energy_threshold={:.5} candidates={} peaks={}",
            flux_threshold,
            energy_threshold,
            candidate_count,
            peaks.len()
        );

        OnsetAnalysis {
            peaks,
            stats,
            candidate_count,
        }
    }

    /// Indices of frames passing the threshold and local-maximum tests
    fn pick_candidates(
        &self,
        frames: &[AudioFrame],
        flux_threshold: f32,
        energy_threshold: f32,
    ) -> Vec<usize> {
        let mut candidates = Vec::new();

        for i in self.edge_frames..frames.len() - self.edge_frames {
            let curr = &frames[i];

            let is_strong = curr.flux > flux_threshold
                && curr.energy > energy_threshold
                && curr.flux > frames[i - 1].flux
                && curr.flux > frames[i + 1].flux;

            if is_strong && self.is_local_max(frames, i) {
                candidates.push(i);
            }
        }

        candidates
    }

    fn is_local_max(&self, frames: &[AudioFrame], index: usize) -> bool {
        let flux = frames[index].flux;
        frames[index - self.local_max_radius..=index + self.local_max_radius]
            .iter()
            .all(|f| f.flux <= flux)
    }

    /// Greedy spacing filter, never backtracks
    fn enforce_spacing(
        &self,
        frames: &[AudioFrame],
        candidates: &[usize],
        mean_flux: f32,
    ) -> Vec<Peak> {
        let mut peaks = Vec::with_capacity(candidates.len());
        let mut last_accepted: Option<f64> = None;

        for &i in candidates {
            let frame = &frames[i];
            if let Some(last) = last_accepted {
                if frame.time - last <= self.profile.min_onset_interval {
                    continue;
                }
            }

            last_accepted = Some(frame.time);
            peaks.push(Peak {
                time: frame.time + self.onset_lead_seconds,
                energy: frame.energy,
                zcr: frame.zcr,
                intensity: frame.flux / mean_flux,
            });
        }

        peaks
    }
}
