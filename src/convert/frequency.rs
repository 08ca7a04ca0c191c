/// Frequency of C1, the default lowest constant-Q bin.
pub const C1_HZ: f32 = 32.703_196;

/// Get FFT bin frequencies.
///
/// # Arguments
/// * `sr` - Sample rate in Hz
/// * `n_fft` - FFT size
///
/// # Returns
/// Vector of frequency values (Hz) for each FFT bin
///
/// # Example
/// ```
/// use raga::convert::fft_frequencies;
///
/// let freqs = fft_frequencies(22050, 2048);
/// assert_eq!(freqs.len(), 1025); // n_fft/2 + 1
/// assert_eq!(freqs[0], 0.0);
/// ```
pub fn fft_frequencies(sr: u32, n_fft: usize) -> Vec<f32> {
    let n_bins = n_fft / 2 + 1;
    (0..n_bins)
        .map(|i| i as f32 * sr as f32 / n_fft as f32)
        .collect()
}

/// Center frequencies of constant-Q bins.
///
/// `tuning` shifts every bin by a fraction of a bin.
///
/// # Example
/// ```
/// use raga::convert::cqt_frequencies;
///
/// let freqs = cqt_frequencies(24, 110.0, 12, 0.0);
/// assert!((freqs[12] - 220.0).abs() < 1e-3);
/// ```
pub fn cqt_frequencies(n_bins: usize, fmin: f32, bins_per_octave: usize, tuning: f32) -> Vec<f32> {
    let correction = 2.0_f32.powf(tuning / bins_per_octave as f32);

    (0..n_bins)
        .map(|i| correction * fmin * 2.0_f32.powf(i as f32 / bins_per_octave as f32))
        .collect()
}
