use std::sync::Arc;

/// Decoded mono waveform at a fixed sample rate.
#[derive(Clone, Debug)]
pub struct AudioSignal {
    pub samples: Arc<Vec<f32>>,
    pub sample_rate: u32,
    /// Channel count of the source file before the mono mixdown.
    pub source_channels: u16,
    /// Sample rate of the source file before resampling.
    pub source_sample_rate: u32,
}

impl AudioSignal {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: Arc::new(samples),
            sample_rate,
            source_channels: 1,
            source_sample_rate: sample_rate,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// One STFT frame in decibels, bin 0 = DC.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectrogramColumn {
    pub db: Vec<f32>,
    /// Centre of the analysis window, in seconds.
    pub time_offset: f64,
}

/// Decibel-scaled STFT magnitudes referenced to the loudest point (0 dB).
#[derive(Clone, Debug, PartialEq)]
pub struct SpectrogramMatrix {
    pub columns: Arc<Vec<SpectrogramColumn>>,
    pub freq_resolution: f64,
    pub time_resolution: f64,
    pub max_freq: f64,
    pub sample_rate: u32,
    pub fft_size: usize,
    pub hop_size: usize,
}

impl SpectrogramMatrix {
    pub fn frame_count(&self) -> usize {
        self.columns.len()
    }

    pub fn bin_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.db.len())
    }

    /// Value at (frequency bin, time frame).
    pub fn value(&self, bin: usize, frame: usize) -> Option<f32> {
        self.columns.get(frame).and_then(|c| c.db.get(bin)).copied()
    }

    pub fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.freq_resolution
    }

    /// Time span covered by the frames: `frames * hop / sample_rate`.
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 * self.time_resolution
    }

    pub fn max_db(&self) -> f32 {
        self.iter_values().fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn min_db(&self) -> f32 {
        self.iter_values().fold(f32::INFINITY, f32::min)
    }

    pub fn iter_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.columns.iter().flat_map(|c| c.db.iter().copied())
    }

    /// Loudest bin of one frame.
    pub fn peak_bin(&self, frame: usize) -> Option<usize> {
        let col = self.columns.get(frame)?;
        col.db
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(bin, _)| bin)
    }

    /// Most frequent per-frame peak bin across the whole clip, in Hz.
    pub fn dominant_frequency(&self) -> Option<f64> {
        let bins = self.bin_count();
        if bins == 0 {
            return None;
        }
        let mut votes = vec![0usize; bins];
        for frame in 0..self.frame_count() {
            if let Some(bin) = self.peak_bin(frame) {
                votes[bin] += 1;
            }
        }
        votes
            .iter()
            .enumerate()
            .max_by_key(|(_, &n)| n)
            .map(|(bin, _)| self.bin_frequency(bin))
    }
}
