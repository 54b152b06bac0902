// FeatureExtractor - sliding-window feature extraction for onset detection
//
// This module slides a fixed-size window over mono samples and produces one
// AudioFrame per hop. The window is about 43ms long with 50% overlap.
//
// Module organization:
// - types: Data structures (AudioFrame)
// - temporal: Time-domain features (RMS energy, ZCR, centroid proxy)
// - mod.rs: Coordinator (FeatureExtractor)
//
// Two passes:
// 1. Per-window energy, ZCR and centroid proxy (windows are independent)
// 2. Flux: flux_n = max(0, energy_n - energy_(n-1)), flux_0 = 0

mod temporal;
mod types;

pub use temporal::{TemporalFeatures, WindowFeatures};
pub use types::AudioFrame;

use crate::config::AnalysisConfig;

/// FeatureExtractor coordinates the per-window feature pipeline
pub struct FeatureExtractor {
    temporal_features: TemporalFeatures,
    sample_rate: u32,
    window_size: usize,
    hop_size: usize,
}

impl FeatureExtractor {
    /// Create a new FeatureExtractor with the specified sample rate
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz (e.g., 44100)
    /// * `config` - Window length and centroid guard
    pub fn new(sample_rate: u32, config: &AnalysisConfig) -> Self {
        let window_size = ((sample_rate as f64 * config.window_seconds).floor() as usize).max(2);
        let hop_size = (window_size / 2).max(1);

        Self {
            temporal_features: TemporalFeatures::new(config.centroid_epsilon),
            sample_rate,
            window_size,
            hop_size,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Extract the ordered frame sequence from a mono sample buffer
    ///
    /// Audio shorter than one window yields an empty sequence.
    pub fn extract(&self, audio: &[f32]) -> Vec<AudioFrame> {
        if audio.len() < self.window_size || self.sample_rate == 0 {
            return Vec::new();
        }

        let frame_count = (audio.len() - self.window_size) / self.hop_size + 1;
        let mut frames = Vec::with_capacity(frame_count);

        let mut pos = 0;
        while pos + self.window_size <= audio.len() {
            let window = self
                .temporal_features
                .compute(&audio[pos..pos + self.window_size]);
            frames.push(AudioFrame {
                time: pos as f64 / self.sample_rate as f64,
                energy: window.energy,
                zcr: window.zcr,
                centroid: window.centroid,
                flux: 0.0,
            });
            pos += self.hop_size;
        }

        // Flux needs every energy first
        for i in 1..frames.len() {
            frames[i].flux = (frames[i].energy - frames[i - 1].energy).max(0.0);
        }

        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generate pure sine wave for testing
    fn generate_sine_wave(sample_rate: u32, frequency: f32, duration_samples: usize) -> Vec<f32> {
        (0..duration_samples)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * frequency * t).sin()
            })
            .collect()
    }

    /// Generate white noise for testing
    fn generate_white_noise(duration_samples: usize) -> Vec<f32> {
        use rand::{rngs::StdRng, Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(7);
        (0..duration_samples)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect()
    }

    #[test]
    fn test_window_and_hop_size() {
        let extractor = FeatureExtractor::new(44100, &AnalysisConfig::default());
        // floor(44100 * 0.043) = 1896
        assert_eq!(extractor.window_size(), 1896);
        assert_eq!(extractor.hop_size(), 948);
    }

    #[test]
    fn test_frame_count_and_times() {
        let sample_rate = 48000;
        let extractor = FeatureExtractor::new(sample_rate, &AnalysisConfig::default());
        let signal = vec![0.1; sample_rate as usize];
        let frames = extractor.extract(&signal);

        let expected = (signal.len() - extractor.window_size()) / extractor.hop_size() + 1;
        assert_eq!(frames.len(), expected);
        assert_eq!(frames[0].time, 0.0);
        let hop_seconds = extractor.hop_size() as f64 / sample_rate as f64;
        assert!((frames[1].time - hop_seconds).abs() < 1e-12);
        assert!(frames.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn test_short_audio_yields_no_frames() {
        let extractor = FeatureExtractor::new(48000, &AnalysisConfig::default());
        assert!(extractor.extract(&[0.5; 100]).is_empty());
        assert!(extractor.extract(&[]).is_empty());
    }

    #[test]
    fn test_flux_is_positive_energy_increase() {
        let sample_rate = 48000;
        let extractor = FeatureExtractor::new(sample_rate, &AnalysisConfig::default());

        // Quiet first half, loud second half
        let mut signal = vec![0.01; sample_rate as usize / 2];
        signal.extend(vec![0.8; sample_rate as usize / 2]);
        let frames = extractor.extract(&signal);

        assert_eq!(frames[0].flux, 0.0, "First frame flux must be zero");
        assert!(
            frames.iter().all(|f| f.flux >= 0.0),
            "Flux must never be negative"
        );
        let max_flux = frames.iter().map(|f| f.flux).fold(0.0_f32, f32::max);
        assert!(
            max_flux > 0.3,
            "Expected a strong flux at the step, got {}",
            max_flux
        );
    }

    #[test]
    fn test_flux_zero_on_decay() {
        let extractor = FeatureExtractor::new(8000, &AnalysisConfig::default());
        let signal: Vec<f32> = (0..8000).map(|i| 1.0 - i as f32 / 8000.0).collect();
        let frames = extractor.extract(&signal);
        assert!(frames.iter().all(|f| f.flux == 0.0));
    }

    #[test]
    fn test_zcr_sine_vs_noise() {
        let sample_rate = 48000;
        let extractor = FeatureExtractor::new(sample_rate, &AnalysisConfig::default());

        let sine_frames = extractor.extract(&generate_sine_wave(sample_rate, 100.0, 8192));
        let noise_frames = extractor.extract(&generate_white_noise(8192));

        assert!(
            noise_frames[0].zcr > sine_frames[0].zcr * 5.0,
            "Noise ZCR ({}) should far exceed 100 Hz sine ZCR ({})",
            noise_frames[0].zcr,
            sine_frames[0].zcr
        );
    }
}
