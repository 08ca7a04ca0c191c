/// Equivalent noise bandwidth of the Hann window, in FFT bins.
pub const HANN_BANDWIDTH: f32 = 1.500_183_1;

/// Compute a periodic Hann (raised cosine) window.
///
/// The periodic form (denominator `n`, not `n - 1`) is the one suited to
/// spectral analysis with overlapping frames.
///
/// # Arguments
/// * `n` - Window length
///
/// # Returns
/// Hann window of length `n`
///
/// # Example
/// ```
/// use raga::window::hann;
///
/// let w = hann(4);
/// assert_eq!(w.len(), 4);
/// assert!(w[0].abs() < 1e-7);
/// assert!((w[2] - 1.0).abs() < 1e-6);
/// ```
pub fn hann(n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let m = n as f32;
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / m).cos())
        .collect()
}

/// Center `window` inside a zero buffer of length `n_fft`.
///
/// Windows longer than `n_fft` are returned unchanged.
pub fn pad_window(window: &[f32], n_fft: usize) -> Vec<f32> {
    if window.len() >= n_fft {
        return window.to_vec();
    }
    let mut padded = vec![0.0f32; n_fft];
    let start = (n_fft - window.len()) / 2;
    padded[start..start + window.len()].copy_from_slice(window);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_is_symmetric_around_center() {
        let w = hann(16);
        for i in 1..8 {
            assert!((w[i] - w[16 - i]).abs() < 1e-6);
        }
    }

    #[test]
    fn hann_degenerate_lengths() {
        assert!(hann(0).is_empty());
        assert_eq!(hann(1), vec![1.0]);
    }

    #[test]
    fn pad_window_centers() {
        let padded = pad_window(&[1.0, 1.0], 6);
        assert_eq!(padded, vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
    }
}
