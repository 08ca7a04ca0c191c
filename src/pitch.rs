//! Spectral peak picking and tuning estimation.

use crate::convert::{self, fft_frequencies};
use crate::spectrum::{StftConfig, stft};
use ndarray::Array2;

/// Pitch tracking on thresholded parabolically-interpolated STFT.
///
/// A bin is kept when it is a local maximum along frequency, lies in
/// `[fmin, fmax)`, and exceeds `threshold` times the loudest bin of its
/// frame.
///
/// # Arguments
/// * `y` - Audio signal
/// * `sr` - Sample rate
/// * `n_fft` - FFT size
/// * `hop_length` - Hop length
/// * `fmin` - Lowest frequency considered (Hz)
/// * `fmax` - Highest frequency considered (Hz)
/// * `threshold` - Relative magnitude threshold per frame
///
/// # Returns
/// `(pitches, magnitudes)`, both of shape (n_fft/2 + 1, n_frames); zero
/// where no peak was found.
pub fn piptrack(
    y: &[f32],
    sr: u32,
    n_fft: usize,
    hop_length: usize,
    fmin: f32,
    fmax: f32,
    threshold: f32,
) -> crate::Result<(Array2<f32>, Array2<f32>)> {
    let spec = stft(y, &StftConfig::new(n_fft, hop_length))?;
    let mag = spec.mapv(|v| v.norm());
    let (n_freq, n_frames) = mag.dim();

    let mut pitches = Array2::<f32>::zeros((n_freq, n_frames));
    let mut magnitudes = Array2::<f32>::zeros((n_freq, n_frames));
    if n_freq < 3 {
        return Ok((pitches, magnitudes));
    }

    let freqs = fft_frequencies(sr, n_fft);
    let bin_hz = sr as f32 / n_fft as f32;

    for t in 0..n_frames {
        let col = mag.column(t);
        let frame_max = col.iter().copied().fold(0.0f32, f32::max);
        let floor = threshold * frame_max;
        let gated = |f: usize| if col[f] > floor { col[f] } else { 0.0 };

        for f in 1..n_freq - 1 {
            if freqs[f] < fmin || freqs[f] >= fmax {
                continue;
            }
            let (prev, cur, next) = (gated(f - 1), gated(f), gated(f + 1));
            if !(cur > prev && cur >= next) {
                continue;
            }

            let (a, b, c) = (col[f - 1], col[f], col[f + 1]);
            let avg = 0.5 * (c - a);
            let curvature = 2.0 * b - c - a;
            let shift = if curvature.abs() < f32::MIN_POSITIVE {
                avg
            } else {
                avg / curvature
            };

            pitches[(f, t)] = (f as f32 + shift) * bin_hz;
            magnitudes[(f, t)] = b + 0.5 * avg * shift;
        }
    }

    Ok((pitches, magnitudes))
}

/// Estimate tuning offset from a collection of detected pitches.
///
/// Every frequency is mapped to its deviation from the nearest bin of a
/// `bins_per_octave` grid anchored at A440; the most populated cell of a
/// histogram with `resolution`-wide cells wins.
///
/// # Returns
/// Tuning deviation in fractions of a bin, in `[-0.5, 0.5)`
///
/// # Example
/// ```
/// use raga::pitch::pitch_tuning;
///
/// let tuning = pitch_tuning(&[440.0, 880.0, 220.0], 0.01, 12);
/// assert!(tuning.abs() < 0.02);
/// ```
pub fn pitch_tuning(frequencies: &[f32], resolution: f32, bins_per_octave: usize) -> f32 {
    let valid: Vec<f32> = frequencies.iter().copied().filter(|&f| f > 0.0).collect();
    if valid.is_empty() || resolution <= 0.0 {
        return 0.0;
    }

    let n_cells = (1.0 / resolution).ceil() as usize;
    let mut histogram = vec![0usize; n_cells];

    for oct in convert::hz_to_octs(&valid, 0.0, bins_per_octave) {
        let bin = oct * bins_per_octave as f32;
        let mut residual = bin - bin.floor();
        if residual >= 0.5 {
            residual -= 1.0;
        }
        let cell = (((residual + 0.5) / resolution).floor() as usize).min(n_cells - 1);
        histogram[cell] += 1;
    }

    // First maximum wins, matching a left-to-right argmax
    let mut best = 0;
    for (i, &count) in histogram.iter().enumerate() {
        if count > histogram[best] {
            best = i;
        }
    }

    best as f32 * resolution - 0.5
}

/// Estimate the tuning of an audio signal.
///
/// Peaks from [`piptrack`] (150 Hz - 4 kHz, 10 % relative threshold) whose
/// magnitude reaches the median peak magnitude vote in [`pitch_tuning`].
///
/// # Returns
/// Estimated tuning deviation in fractions of a bin, in `[-0.5, 0.5)`.
/// Signals without any spectral peak return `0.0`.
///
/// # Example
/// ```
/// use raga::pitch::estimate_tuning;
/// use raga::io;
///
/// let signal = io::tone(440.0, 22050, 1.0);
/// let tuning = estimate_tuning(&signal, 22050, 2048, 0.01, 12).unwrap();
/// assert!(tuning.abs() < 0.1);
/// ```
pub fn estimate_tuning(
    y: &[f32],
    sr: u32,
    n_fft: usize,
    resolution: f32,
    bins_per_octave: usize,
) -> crate::Result<f32> {
    let (pitches, magnitudes) = piptrack(y, sr, n_fft, n_fft / 4, 150.0, 4000.0, 0.1)?;

    let mut peak_mags: Vec<f32> = pitches
        .iter()
        .zip(magnitudes.iter())
        .filter(|&(&p, _)| p > 0.0)
        .map(|(_, &m)| m)
        .collect();
    if peak_mags.is_empty() {
        return Ok(0.0);
    }

    peak_mags.sort_by(f32::total_cmp);
    let mid = peak_mags.len() / 2;
    let median = if peak_mags.len() % 2 == 0 {
        0.5 * (peak_mags[mid - 1] + peak_mags[mid])
    } else {
        peak_mags[mid]
    };

    let selected: Vec<f32> = pitches
        .iter()
        .zip(magnitudes.iter())
        .filter(|&(&p, &m)| p > 0.0 && m >= median)
        .map(|(&p, _)| p)
        .collect();

    Ok(pitch_tuning(&selected, resolution, bins_per_octave))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io;

    #[test]
    fn piptrack_finds_tone() {
        let y = io::tone(1000.0, 22050, 0.5);
        let (pitches, mags) = piptrack(&y, 22050, 2048, 512, 150.0, 4000.0, 0.1).unwrap();
        let t = pitches.ncols() / 2;
        let (best, _) = mags
            .column(t)
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |acc, (i, &m)| if m > acc.1 { (i, m) } else { acc });
        assert!((pitches[(best, t)] - 1000.0).abs() < 5.0);
    }

    #[test]
    fn pitch_tuning_detects_sharp_offset() {
        // 20 cents sharp of A440
        let sharp = 440.0 * 2f32.powf(0.2 / 12.0);
        let tuning = pitch_tuning(&[sharp, sharp * 2.0, sharp / 2.0], 0.01, 12);
        assert!((tuning - 0.2).abs() < 0.015, "tuning {tuning}");
    }

    #[test]
    fn pitch_tuning_wraps_flat_offsets() {
        let flat = 440.0 * 2f32.powf(-0.3 / 12.0);
        let tuning = pitch_tuning(&[flat], 0.01, 12);
        assert!((tuning + 0.3).abs() < 0.015, "tuning {tuning}");
    }

    #[test]
    fn pitch_tuning_empty_input() {
        assert_eq!(pitch_tuning(&[], 0.01, 12), 0.0);
        assert_eq!(pitch_tuning(&[-1.0, 0.0], 0.01, 12), 0.0);
    }

    #[test]
    fn estimate_tuning_silence_is_zero() {
        let t = estimate_tuning(&vec![0.0; 8192], 22050, 2048, 0.01, 12).unwrap();
        assert_eq!(t, 0.0);
    }
}
