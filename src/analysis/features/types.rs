// Types module - Data structures for audio features
//
// This module defines the per-window feature frame produced by the extractor
// and consumed by the onset detector.

use serde::{Deserialize, Serialize};

/// Features extracted from one analysis window
///
/// Frames are produced once, in time order, and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFrame {
    /// Window start in seconds
    pub time: f64,

    /// RMS energy over the window
    pub energy: f32,

    /// Zero crossings divided by window length
    ///
    /// Higher values indicate more noise-like or high-frequency content.
    pub zcr: f32,

    /// Centroid proxy: Σ(|x[j]| · j) / (Σx[j]² + ε)
    ///
    /// Cheap time-domain stand-in for spectral brightness.
    pub centroid: f32,

    /// Positive-only energy increase over the previous frame (0 for the first frame)
    pub flux: f32,
}
