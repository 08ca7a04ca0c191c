use crate::convert::fft_frequencies;
use crate::spectrum::{StftConfig, power_spectrogram};
use ndarray::Array2;

const F_SP: f32 = 200.0 / 3.0;
const MIN_LOG_HZ: f32 = 1000.0;

fn logstep() -> f32 {
    (6.4f32).ln() / 27.0
}

/// Convert frequency in Hz to the Slaney mel scale.
///
/// Linear below 1 kHz, logarithmic above.
///
/// # Example
/// ```
/// use raga::feature::mel::hz_to_mel;
///
/// let mel = hz_to_mel(440.0);  // A4
/// assert!(mel > 6.0 && mel < 7.0);
/// ```
pub fn hz_to_mel(hz: f32) -> f32 {
    let min_log_mel = MIN_LOG_HZ / F_SP;
    if hz < MIN_LOG_HZ {
        hz / F_SP
    } else {
        min_log_mel + (hz / MIN_LOG_HZ).ln() / logstep()
    }
}

/// Convert frequency from the Slaney mel scale to Hz.
///
/// This is the inverse of `hz_to_mel`.
pub fn mel_to_hz(mel: f32) -> f32 {
    let min_log_mel = MIN_LOG_HZ / F_SP;
    if mel < min_log_mel {
        mel * F_SP
    } else {
        MIN_LOG_HZ * (logstep() * (mel - min_log_mel)).exp()
    }
}

/// Generate `n_mels` frequencies evenly spaced on the mel scale between
/// `fmin` and `fmax` (inclusive).
pub fn mel_frequencies(n_mels: usize, fmin: f32, fmax: f32) -> Vec<f32> {
    if n_mels == 0 {
        return Vec::new();
    }
    let mel_min = hz_to_mel(fmin.max(0.0));
    let mel_max = hz_to_mel(fmax.max(fmin));
    let step = (mel_max - mel_min) / (n_mels as f32 - 1.0).max(1.0);
    (0..n_mels)
        .map(|i| mel_to_hz(mel_min + step * i as f32))
        .collect()
}

/// Create a Slaney-normalized mel filterbank matrix.
///
/// Each row is a triangular filter scaled by `2 / (f_upper - f_lower)` so
/// that every band carries roughly equal energy.
///
/// # Arguments
/// * `sr` - Sample rate in Hz
/// * `n_fft` - FFT window size
/// * `n_mels` - Number of mel bands
/// * `fmin` - Minimum frequency in Hz
/// * `fmax` - Maximum frequency in Hz (clipped to Nyquist)
///
/// # Returns
/// Mel filterbank matrix of shape (n_mels, n_fft / 2 + 1)
///
/// # Example
/// ```
/// use raga::feature::mel::mel_filterbank;
///
/// let fb = mel_filterbank(22050, 2048, 128, 0.0, 11025.0);
/// assert_eq!(fb.shape(), &[128, 1025]);
/// ```
pub fn mel_filterbank(sr: u32, n_fft: usize, n_mels: usize, fmin: f32, fmax: f32) -> Array2<f32> {
    let n_freq = n_fft / 2 + 1;
    let mut fb = Array2::<f32>::zeros((n_mels, n_freq));
    if n_mels == 0 || n_fft == 0 {
        return fb;
    }

    let fmax = fmax.min(sr as f32 / 2.0).max(fmin);
    let mel_points = mel_frequencies(n_mels + 2, fmin, fmax);
    let fft_freqs = fft_frequencies(sr, n_fft);

    for m in 0..n_mels {
        let f_lower = mel_points[m] as f64;
        let f_center = mel_points[m + 1] as f64;
        let f_upper = mel_points[m + 2] as f64;
        let denom_left = (f_center - f_lower).max(1e-8);
        let denom_right = (f_upper - f_center).max(1e-8);
        let enorm = 2.0 / (f_upper - f_lower).max(1e-8);

        for (k, &freq) in fft_freqs.iter().enumerate() {
            let freq = freq as f64;
            let lower = (freq - f_lower) / denom_left;
            let upper = (f_upper - freq) / denom_right;
            fb[(m, k)] = (lower.min(upper).max(0.0) * enorm) as f32;
        }
    }

    fb
}

/// Project a power spectrogram (n_freq, n_frames) onto a mel filterbank.
pub fn apply_filterbank(power: &Array2<f32>, fb: &Array2<f32>) -> crate::Result<Array2<f32>> {
    if fb.ncols() != power.nrows() {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("{} frequency bins", fb.ncols()),
            got: format!("{} frequency bins", power.nrows()),
        });
    }
    Ok(fb.dot(power))
}

/// Compute a mel-scaled power spectrogram.
///
/// # Arguments
/// * `y` - Input audio signal (mono)
/// * `sr` - Sample rate in Hz
/// * `n_fft` - FFT window size
/// * `hop_length` - Number of samples between frames
/// * `n_mels` - Number of mel bands
///
/// # Returns
/// Mel spectrogram matrix of shape (n_mels, n_frames)
///
/// # Example
/// ```
/// use raga::feature::mel::melspectrogram;
///
/// let signal = vec![0.1f32; 22050];
/// let mel = melspectrogram(&signal, 22050, 2048, 512, 128).unwrap();
/// assert_eq!(mel.shape(), &[128, 44]);
/// ```
pub fn melspectrogram(
    y: &[f32],
    sr: u32,
    n_fft: usize,
    hop_length: usize,
    n_mels: usize,
) -> crate::Result<Array2<f32>> {
    let power = power_spectrogram(y, &StftConfig::new(n_fft, hop_length))?;
    let fb = mel_filterbank(sr, n_fft, n_mels, 0.0, sr as f32 / 2.0);
    apply_filterbank(&power, &fb)
}
