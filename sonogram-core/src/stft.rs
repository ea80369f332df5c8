use crate::config::EngineConfig;
use crate::error::TransformError;
use crate::types::{AudioSignal, SpectrogramColumn, SpectrogramMatrix};
use realfft::RealFftPlanner;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

thread_local! {
    static FFT_PLANNER: RefCell<RealFftPlanner<f32>> = RefCell::new(RealFftPlanner::new());
    static HANN_CACHE: RefCell<HashMap<usize, Arc<Vec<f32>>>> = RefCell::new(HashMap::new());
}

/// Periodic Hann window (`0.5 - 0.5 cos(2πi/N)`), the DFT-even form used for
/// spectral analysis.
fn hann_window(size: usize) -> Arc<Vec<f32>> {
    HANN_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .entry(size)
            .or_insert_with(|| {
                Arc::new(
                    (0..size)
                        .map(|i| {
                            0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / size as f64).cos())
                                as f32
                        })
                        .collect(),
                )
            })
            .clone()
    })
}

/// Number of centred frames for a signal of `len` samples.
pub fn frame_count(len: usize, hop_size: usize) -> usize {
    1 + len / hop_size
}

/// Magnitude STFT with centred, zero-padded frames.
///
/// Returns one `fft_size / 2 + 1` magnitude vector per frame. Frame `i` is
/// centred on sample `i * hop_size`.
pub fn stft_magnitudes(
    samples: &[f32],
    fft_size: usize,
    hop_size: usize,
) -> Result<Vec<Vec<f32>>, TransformError> {
    if fft_size < 2 || fft_size % 2 != 0 || hop_size == 0 {
        return Err(TransformError::InvalidParameters { fft_size, hop_size });
    }
    if samples.is_empty() {
        return Err(TransformError::EmptySignal);
    }

    let fft = FFT_PLANNER.with(|p| p.borrow_mut().plan_fft_forward(fft_size));
    let window = hann_window(fft_size);

    let pad = fft_size / 2;
    let mut padded = vec![0.0f32; samples.len() + 2 * pad];
    padded[pad..pad + samples.len()].copy_from_slice(samples);

    // Reused across frames
    let mut input = fft.make_input_vec();
    let mut spectrum = fft.make_output_vec();

    let n_frames = frame_count(samples.len(), hop_size);
    let mut frames = Vec::with_capacity(n_frames);
    for frame_i in 0..n_frames {
        let pos = frame_i * hop_size;
        for (inp, (&s, &w)) in input
            .iter_mut()
            .zip(padded[pos..pos + fft_size].iter().zip(window.iter()))
        {
            *inp = s * w;
        }
        fft.process(&mut input, &mut spectrum)
            .map_err(|e| TransformError::Fft(e.to_string()))?;
        frames.push(spectrum.iter().map(|c| c.norm()).collect());
    }

    Ok(frames)
}

/// Convert magnitudes to dB relative to their peak.
///
/// `20·log10(max(amin, m)) − 20·log10(max(amin, peak))`, floored at
/// `−top_db` when given. The peak maps to exactly 0 dB.
pub fn amplitude_to_db(frames: &[Vec<f32>], amin: f32, top_db: Option<f32>) -> Vec<Vec<f32>> {
    let to_db = |m: f32| 20.0 * m.max(amin).log10();

    let peak = frames
        .iter()
        .flat_map(|f| f.iter())
        .copied()
        .fold(0.0f32, f32::max);
    let ref_db = to_db(peak);
    let floor = top_db.map_or(f32::NEG_INFINITY, |t| -t.abs());

    frames
        .iter()
        .map(|f| f.iter().map(|&m| (to_db(m) - ref_db).max(floor)).collect())
        .collect()
}

/// Compute the dB spectrogram of `signal` with the engine's fixed parameters.
pub fn compute_spectrogram(
    signal: &AudioSignal,
    config: &EngineConfig,
) -> Result<SpectrogramMatrix, TransformError> {
    let started = std::time::Instant::now();
    let magnitudes = stft_magnitudes(&signal.samples, config.fft_size, config.hop_size)?;
    let db = amplitude_to_db(&magnitudes, config.amin, config.top_db);

    let time_resolution = config.hop_size as f64 / signal.sample_rate as f64;
    let columns: Vec<SpectrogramColumn> = db
        .into_iter()
        .enumerate()
        .map(|(i, db)| SpectrogramColumn {
            db,
            time_offset: i as f64 * time_resolution,
        })
        .collect();

    log::debug!(
        "stft: {} frames x {} bins in {:?}",
        columns.len(),
        config.fft_size / 2 + 1,
        started.elapsed()
    );

    Ok(SpectrogramMatrix {
        columns: Arc::new(columns),
        freq_resolution: signal.sample_rate as f64 / config.fft_size as f64,
        time_resolution,
        max_freq: signal.sample_rate as f64 / 2.0,
        sample_rate: signal.sample_rate,
        fft_size: config.fft_size,
        hop_size: config.hop_size,
    })
}
