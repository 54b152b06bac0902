// Temporal module - Time-domain feature extraction
//
// This module computes the per-window features directly from time-domain
// samples: RMS energy, zero-crossing rate and a centroid proxy. Everything is
// a single pass over the window with no allocation.

/// Raw features of one window, before flux is known
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowFeatures {
    pub energy: f32,
    pub zcr: f32,
    pub centroid: f32,
}

/// Temporal feature computation functions
pub struct TemporalFeatures {
    centroid_epsilon: f32,
}

impl TemporalFeatures {
    pub fn new(centroid_epsilon: f32) -> Self {
        Self { centroid_epsilon }
    }

    /// Compute energy, ZCR and centroid proxy of a window in one pass
    ///
    /// # Arguments
    /// * `audio` - Time-domain samples of one window
    ///
    /// # Returns
    /// Zeroed features for an empty window
    pub fn compute(&self, audio: &[f32]) -> WindowFeatures {
        if audio.is_empty() {
            return WindowFeatures {
                energy: 0.0,
                zcr: 0.0,
                centroid: 0.0,
            };
        }

        let mut sum_squares = 0.0_f32;
        let mut crossings = 0_usize;
        let mut weighted = 0.0_f32;

        for (j, &sample) in audio.iter().enumerate() {
            sum_squares += sample * sample;
            // Strictly opposite signs only; exact zeros never cross
            if j > 0 && audio[j - 1] * sample < 0.0 {
                crossings += 1;
            }
            weighted += sample.abs() * j as f32;
        }

        let len = audio.len() as f32;
        WindowFeatures {
            energy: (sum_squares / len).sqrt(),
            zcr: crossings as f32 / len,
            centroid: weighted / (sum_squares + self.centroid_epsilon),
        }
    }
}
