//! Constant-Q filter design.
//!
//! Each constant-Q channel is a Hann-windowed complex exponential whose
//! length is inversely proportional to its center frequency, so every
//! filter spans the same number of cycles.

use crate::window::{self, HANN_BANDWIDTH};
use num_complex::Complex32;

/// Relative bandwidth of a constant-Q bin.
///
/// `alpha = (2^(2/B) - 1) / (2^(2/B) + 1)` for `B` bins per octave.
pub fn constant_q_alpha(bins_per_octave: usize) -> f32 {
    let r = 2.0f32.powf(2.0 / bins_per_octave as f32);
    (r - 1.0) / (r + 1.0)
}

/// Compute constant-Q filter lengths (in samples) for each frequency.
///
/// # Arguments
/// * `sr` - Audio sampling rate
/// * `freqs` - Center frequency of each channel, ascending
/// * `bins_per_octave` - Number of bins per octave
/// * `filter_scale` - Resolution of filter windows (1.0 = one bin)
///
/// # Errors
/// Returns `InvalidSampleRate` if the upper band edge of the highest filter
/// lies above Nyquist, and `InvalidParameter` for non-positive frequencies
/// or filter scale.
///
/// # Example
/// ```
/// use raga::filters::constant_q_lengths;
///
/// let lengths = constant_q_lengths(22050, &[110.0, 220.0], 12, 1.0).unwrap();
/// assert!((lengths[0] / lengths[1] - 2.0).abs() < 1e-4);
/// ```
pub fn constant_q_lengths(
    sr: u32,
    freqs: &[f32],
    bins_per_octave: usize,
    filter_scale: f32,
) -> crate::Result<Vec<f32>> {
    crate::utils::valid_sample_rate(sr)?;
    if bins_per_octave == 0 {
        return Err(crate::Error::InvalidSize {
            name: "bins_per_octave",
            value: 0,
            reason: "must be > 0",
        });
    }
    if filter_scale <= 0.0 {
        return Err(crate::Error::InvalidParameter {
            name: "filter_scale",
            value: filter_scale.to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if let Some(&f) = freqs.iter().find(|&&f| f <= 0.0) {
        return Err(crate::Error::InvalidParameter {
            name: "fmin",
            value: f.to_string(),
            reason: "frequencies must be strictly positive".to_string(),
        });
    }

    let alpha = constant_q_alpha(bins_per_octave);
    let q = filter_scale / alpha;
    let nyquist = sr as f32 / 2.0;

    let max_freq = freqs.iter().copied().fold(0.0f32, f32::max);
    let upper_edge = max_freq * (1.0 + 0.5 * HANN_BANDWIDTH / q);
    if upper_edge > nyquist {
        return Err(crate::Error::InvalidSampleRate {
            sr,
            reason: format!(
                "constant-Q filter at {max_freq:.1} Hz reaches {upper_edge:.1} Hz, above Nyquist {nyquist:.1} Hz"
            ),
        });
    }

    Ok(freqs.iter().map(|&f| q * sr as f32 / f).collect())
}

/// Build one constant-Q filter: a complex exponential at `freq`, spanning
/// `length` samples centered on zero, Hann-windowed and L1-normalized.
pub fn constant_q_filter(freq: f32, length: f32, sr: u32) -> Vec<Complex32> {
    let half = (length / 2.0).floor() as i64;
    let n = (length.floor() as i64).max(1) as usize;
    let omega = 2.0 * std::f32::consts::PI * freq / sr as f32;
    let win = window::hann(n);

    let mut filter: Vec<Complex32> = (0..n)
        .zip(win.iter())
        .map(|(i, &w)| {
            let phase = (i as i64 - half) as f32 * omega;
            Complex32::from_polar(w, phase)
        })
        .collect();

    let l1: f32 = filter.iter().map(|c| c.norm()).sum();
    if l1 > 0.0 {
        for c in &mut filter {
            *c /= l1;
        }
    }
    filter
}
