use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Sample rate every decoded file is resampled to.
pub const DEFAULT_SAMPLE_RATE: u32 = 22_050;
pub const DEFAULT_FFT_SIZE: usize = 2048;
pub const DEFAULT_HOP_SIZE: usize = 512;
/// Magnitude floor applied before taking the logarithm.
pub const DEFAULT_AMIN: f32 = 1e-5;
/// Dynamic range kept below the peak.
pub const DEFAULT_TOP_DB: f32 = 80.0;

/// Engine parameters. Held constant for the lifetime of an engine so that
/// matrices computed from different files are comparable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sample_rate: u32,
    pub fft_size: usize,
    pub hop_size: usize,
    pub amin: f32,
    /// `None` keeps the full range down to `amin`.
    pub top_db: Option<f32>,
    /// TrueType/OpenType font for figure text. When unset, or when the file
    /// is not a usable font, the bundled DejaVu Sans is used.
    pub font_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            fft_size: DEFAULT_FFT_SIZE,
            hop_size: DEFAULT_HOP_SIZE,
            amin: DEFAULT_AMIN,
            top_db: Some(DEFAULT_TOP_DB),
            font_path: None,
        }
    }
}

impl EngineConfig {
    /// Frequency spacing between adjacent bins at the engine rate.
    pub fn freq_resolution(&self) -> f64 {
        self.sample_rate as f64 / self.fft_size as f64
    }
}
