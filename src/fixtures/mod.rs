//! Audio fixtures for the chart pipeline.
//!
//! The core performs no file I/O; this module is the thin boundary that
//! turns WAV files into an [`AudioInput`] (downmixed to mono, normalized to
//! [-1, 1]) and renders deterministic synthetic click tracks for tests and
//! the CLI.

use std::path::Path;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::analysis::AudioInput;
use crate::error::ChartError;

/// Deterministic percussive test signal: noise bursts on a fixed beat grid
/// over a quiet noise floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickTrack {
    pub bpm: f64,
    pub duration_seconds: f64,
    pub first_click_seconds: f64,
    pub sample_rate: u32,
    /// Peak amplitude of each burst
    pub amplitude: f32,
    /// Time each burst stays at full amplitude
    pub sustain_seconds: f64,
    /// Linear fade-out after the sustain
    pub decay_seconds: f64,
    /// Amplitude of the background noise
    pub noise_floor: f32,
    pub seed: u64,
}

impl Default for ClickTrack {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            duration_seconds: 10.0,
            first_click_seconds: 0.5,
            sample_rate: 44_100,
            amplitude: 0.8,
            sustain_seconds: 0.08,
            decay_seconds: 0.04,
            noise_floor: 0.01,
            seed: 42,
        }
    }
}

impl ClickTrack {
    /// Click start times in seconds
    pub fn click_times(&self) -> Vec<f64> {
        if self.bpm <= 0.0 {
            return Vec::new();
        }
        let period = 60.0 / self.bpm;
        let mut times = Vec::new();
        let mut t = self.first_click_seconds;
        while t < self.duration_seconds {
            times.push(t);
            t += period;
        }
        times
    }

    /// Render the track into a validated mono buffer
    pub fn render(&self) -> Result<AudioInput, ChartError> {
        if self.sample_rate == 0 {
            return Err(ChartError::InvalidSampleRate {
                sample_rate: self.sample_rate,
            });
        }

        let sr = self.sample_rate as f64;
        let total = (self.duration_seconds.max(0.0) * sr) as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut samples: Vec<f32> = (0..total)
            .map(|_| rng.gen_range(-1.0..1.0) * self.noise_floor)
            .collect();

        let sustain = (self.sustain_seconds * sr) as usize;
        let decay = (self.decay_seconds * sr) as usize;
        for click in self.click_times() {
            let start = (click * sr) as usize;
            for offset in 0..sustain + decay {
                let idx = start + offset;
                if idx >= total {
                    break;
                }
                let envelope = if offset < sustain {
                    1.0
                } else {
                    1.0 - (offset - sustain) as f32 / decay.max(1) as f32
                };
                samples[idx] = rng.gen_range(-1.0..1.0) * self.amplitude * envelope;
            }
        }

        AudioInput::new(samples, self.sample_rate)
    }
}

/// Decode a PCM WAV file into a mono [`AudioInput`]
///
/// Integer formats are normalized by their full-scale value; multichannel
/// audio is averaged down to mono.
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<AudioInput, ChartError> {
    let path = path.as_ref();
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(ChartError::WavDecode {
            reason: format!("{} has zero channels", path.display()),
        });
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()?,
        hound::SampleFormat::Int => match spec.bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|sample| sample.map(|v| v as f32 / i8::MAX as f32))
                .collect::<Result<Vec<f32>, _>>()?,
            16 => reader
                .samples::<i16>()
                .map(|sample| sample.map(|v| v as f32 / i16::MAX as f32))
                .collect::<Result<Vec<f32>, _>>()?,
            24 => reader
                .samples::<i32>()
                .map(|sample| sample.map(|v| v as f32 / 8_388_607.0))
                .collect::<Result<Vec<f32>, _>>()?,
            32 => reader
                .samples::<i32>()
                .map(|sample| sample.map(|v| v as f32 / i32::MAX as f32))
                .collect::<Result<Vec<f32>, _>>()?,
            bits => {
                return Err(ChartError::WavDecode {
                    reason: format!(
                        "unsupported bits_per_sample={} for {}",
                        bits,
                        path.display()
                    ),
                })
            }
        },
    };

    tracing::debug!(
        "[Fixtures] Loaded {} ({} Hz, {} channel(s), {} samples)",
        path.display(),
        spec.sample_rate,
        spec.channels,
        samples.len()
    );

    if spec.channels == 1 {
        return AudioInput::new(samples, spec.sample_rate);
    }

    let mut mono = Vec::with_capacity(samples.len() / spec.channels as usize);
    for chunk in samples.chunks(spec.channels as usize) {
        let sum: f32 = chunk.iter().copied().sum();
        mono.push(sum / spec.channels as f32);
    }

    AudioInput::new(mono, spec.sample_rate)
}

/// Write a mono buffer as a 32-bit float WAV file
pub fn write_wav<P: AsRef<Path>>(input: &AudioInput, path: P) -> Result<(), ChartError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: input.sample_rate(),
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in input.samples() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_wav(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("rhythm_chart_{}_{}.wav", name, std::process::id()))
    }

    #[test]
    fn test_click_times_follow_bpm() {
        let track = ClickTrack {
            bpm: 60.0,
            duration_seconds: 4.0,
            first_click_seconds: 0.5,
            ..ClickTrack::default()
        };
        assert_eq!(track.click_times(), vec![0.5, 1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let track = ClickTrack {
            duration_seconds: 1.0,
            ..ClickTrack::default()
        };
        let a = track.render().unwrap();
        let b = track.render().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.samples().len(), 44_100);
        assert!(a.samples().iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_render_rejects_zero_sample_rate() {
        let track = ClickTrack {
            sample_rate: 0,
            ..ClickTrack::default()
        };
        assert!(matches!(track.render(), Err(ChartError::InvalidSampleRate { .. })));
    }

    #[test]
    fn test_wav_roundtrip() {
        let track = ClickTrack {
            duration_seconds: 0.5,
            ..ClickTrack::default()
        };
        let input = track.render().unwrap();
        let path = temp_wav("roundtrip");

        write_wav(&input, &path).unwrap();
        let loaded = load_wav(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.sample_rate(), input.sample_rate());
        assert_eq!(loaded.samples(), input.samples());
    }

    #[test]
    fn test_load_stereo_int_wav_downmixes() {
        let path = temp_wav("stereo");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(i16::MAX).unwrap();
            writer.write_sample(0_i16).unwrap();
        }
        writer.finalize().unwrap();

        let loaded = load_wav(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.samples().len(), 100);
        assert!((loaded.samples()[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_wav("definitely/not/here.wav").unwrap_err();
        assert!(matches!(err, ChartError::Io { .. }), "got {:?}", err);
    }
}
