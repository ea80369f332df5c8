use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::DecodeError;

const CHUNK_SIZE: usize = 1024;

/// Resample mono samples from `from_rate` to `to_rate` with sinc interpolation.
///
/// The output is trimmed to `round(len * to_rate / from_rate)` samples.
pub fn resample_mono(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, DecodeError> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let err = |reason: String| DecodeError::Resample {
        from: from_rate,
        to: to_rate,
        reason,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, CHUNK_SIZE, 1)
        .map_err(|e| err(e.to_string()))?;

    let expected_len = (samples.len() as f64 * ratio).round() as usize;
    let mut output = Vec::with_capacity(expected_len + CHUNK_SIZE);

    let mut pos = 0;
    while pos + CHUNK_SIZE <= samples.len() {
        let chunk = &samples[pos..pos + CHUNK_SIZE];
        let result = resampler
            .process(&[chunk], None)
            .map_err(|e| err(e.to_string()))?;
        output.extend_from_slice(&result[0]);
        pos += CHUNK_SIZE;
    }

    // Remaining tail, then flush the filter delay until the expected length is reached.
    if pos < samples.len() {
        let result = resampler
            .process_partial(Some(&[&samples[pos..]]), None)
            .map_err(|e| err(e.to_string()))?;
        output.extend_from_slice(&result[0]);
    }
    while output.len() < expected_len {
        let result = resampler
            .process_partial(None::<&[&[f32]]>, None)
            .map_err(|e| err(e.to_string()))?;
        if result[0].is_empty() {
            break;
        }
        output.extend_from_slice(&result[0]);
    }

    output.truncate(expected_len);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn same_rate_is_identity() {
        let input = vec![0.1, -0.2, 0.3];
        assert_eq!(resample_mono(&input, 22_050, 22_050).unwrap(), input);
    }

    #[test]
    fn halves_length_when_downsampling_by_two() {
        let input: Vec<f32> = (0..44_100)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / 44_100.0).sin())
            .collect();
        let out = resample_mono(&input, 44_100, 22_050).unwrap();
        assert_eq!(out.len(), 22_050);
        // Past the filter delay the tone keeps roughly unit amplitude.
        let peak = out[2_000..20_000].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.8 && peak < 1.2, "peak {peak}");
    }
}
