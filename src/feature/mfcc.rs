use crate::feature::mel::{apply_filterbank, mel_filterbank};
use crate::spectrum::{StftConfig, power_spectrogram, power_to_db};
use ndarray::Array2;

/// Configuration for MFCC computation.
///
/// This struct provides a builder pattern for configuring MFCC parameters
/// instead of using many positional arguments.
///
/// # Example
/// ```
/// use raga::feature::mfcc::MfccConfig;
///
/// let config = MfccConfig::new(22050)
///     .with_n_mfcc(13)
///     .with_n_mels(128);
/// assert_eq!(config.n_mfcc, 13);
/// ```
#[derive(Debug, Clone)]
pub struct MfccConfig {
    /// Sample rate
    pub sr: u32,
    /// FFT window size
    pub n_fft: usize,
    /// Number of samples between frames
    pub hop_length: usize,
    /// Number of MFCC coefficients to return
    pub n_mfcc: usize,
    /// Number of mel bands
    pub n_mels: usize,
    /// Lowest mel filter edge in Hz
    pub fmin: f32,
    /// Highest mel filter edge in Hz (None for Nyquist)
    pub fmax: Option<f32>,
    /// Dynamic range kept below the loudest mel bin, in dB
    pub top_db: Option<f32>,
}

impl MfccConfig {
    /// Create a new MFCC configuration with defaults.
    pub fn new(sr: u32) -> Self {
        Self {
            sr,
            ..Self::default()
        }
    }

    /// Set the FFT window size.
    pub fn with_n_fft(mut self, n_fft: usize) -> Self {
        self.n_fft = n_fft;
        self
    }

    /// Set the hop length.
    pub fn with_hop_length(mut self, hop_length: usize) -> Self {
        self.hop_length = hop_length;
        self
    }

    /// Set the number of MFCC coefficients.
    pub fn with_n_mfcc(mut self, n_mfcc: usize) -> Self {
        self.n_mfcc = n_mfcc;
        self
    }

    /// Set the number of mel bands.
    pub fn with_n_mels(mut self, n_mels: usize) -> Self {
        self.n_mels = n_mels;
        self
    }

    /// Set the dB floor relative to the peak (None disables it).
    pub fn with_top_db(mut self, top_db: Option<f32>) -> Self {
        self.top_db = top_db;
        self
    }

    /// Compute MFCC with this configuration.
    ///
    /// # Returns
    /// MFCC matrix of shape (n_mfcc, n_frames)
    pub fn compute(&self, y: &[f32]) -> crate::Result<Array2<f32>> {
        if self.n_mfcc == 0 || self.n_mels == 0 {
            return Err(crate::Error::InvalidSize {
                name: "n_mfcc",
                value: self.n_mfcc.min(self.n_mels),
                reason: "n_mfcc and n_mels must be > 0",
            });
        }
        let power = power_spectrogram(y, &StftConfig::new(self.n_fft, self.hop_length))?;
        let fmax = self.fmax.unwrap_or(self.sr as f32 / 2.0);
        let fb = mel_filterbank(self.sr, self.n_fft, self.n_mels, self.fmin, fmax);
        let mel = apply_filterbank(&power, &fb)?;
        let log_mel = power_to_db(&mel, 1.0, 1e-10, self.top_db);
        Ok(dct_matrix(self.n_mfcc, self.n_mels).dot(&log_mel))
    }
}

impl Default for MfccConfig {
    fn default() -> Self {
        Self {
            sr: 22050,
            n_fft: 2048,
            hop_length: 512,
            n_mfcc: 20,
            n_mels: 128,
            fmin: 0.0,
            fmax: None,
            top_db: Some(80.0),
        }
    }
}

/// Orthonormal DCT-II basis of shape (n_out, n).
///
/// Row `k` holds `scale_k * cos(pi / n * (i + 0.5) * k)` with
/// `scale_0 = sqrt(1/n)` and `scale_k = sqrt(2/n)` otherwise.
pub fn dct_matrix(n_out: usize, n: usize) -> Array2<f32> {
    let nf = n as f32;
    Array2::from_shape_fn((n_out, n), |(k, i)| {
        let angle = std::f32::consts::PI / nf * (i as f32 + 0.5) * k as f32;
        let scale = if k == 0 {
            (1.0 / nf).sqrt()
        } else {
            (2.0 / nf).sqrt()
        };
        scale * angle.cos()
    })
}

/// Compute Mel-Frequency Cepstral Coefficients (MFCCs).
///
/// The dB mel power spectrogram (80 dB dynamic range) is decorrelated with
/// an orthonormal DCT-II and the first `n_mfcc` coefficients are kept.
///
/// # Arguments
/// * `y` - Input audio signal (mono)
/// * `sr` - Sample rate in Hz
/// * `n_mfcc` - Number of MFCC coefficients to return
/// * `n_fft` - FFT window size
/// * `hop_length` - Number of samples between frames
/// * `n_mels` - Number of mel bands to use
///
/// # Returns
/// MFCC matrix of shape (n_mfcc, n_frames)
///
/// # Example
/// ```
/// use raga::feature::mfcc::mfcc;
///
/// let signal = vec![0.1f32; 22050];
/// let coeffs = mfcc(&signal, 22050, 13, 2048, 512, 128).unwrap();
/// assert_eq!(coeffs.shape(), &[13, 44]);
/// ```
pub fn mfcc(
    y: &[f32],
    sr: u32,
    n_mfcc: usize,
    n_fft: usize,
    hop_length: usize,
    n_mels: usize,
) -> crate::Result<Array2<f32>> {
    MfccConfig::new(sr)
        .with_n_mfcc(n_mfcc)
        .with_n_fft(n_fft)
        .with_hop_length(hop_length)
        .with_n_mels(n_mels)
        .compute(y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dct_basis_is_orthonormal() {
        let n = 16;
        let d = dct_matrix(n, n);
        let eye = d.dot(&d.t());
        for i in 0..n {
            for j in 0..n {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((eye[(i, j)] - expected).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_mfcc_of_silence_is_constant_per_row() {
        let y = vec![0.0f32; 8192];
        let m = mfcc(&y, 22050, 13, 2048, 512, 128).unwrap();
        assert_eq!(m.shape(), &[13, 17]);
        for k in 0..13 {
            let first = m[(k, 0)];
            assert!(m.row(k).iter().all(|&v| (v - first).abs() < 1e-3));
        }
        // every mel bin sits at -100 dB, so c0 = -100 * sqrt(128)
        assert!((m[(0, 0)] + 100.0 * 128f32.sqrt()).abs() < 0.1);
        for k in 1..13 {
            assert!(m[(k, 0)].abs() < 1e-2);
        }
    }

    #[test]
    fn test_mfcc_zero_coefficients_rejected() {
        let y = vec![0.1f32; 4096];
        assert!(mfcc(&y, 22050, 0, 2048, 512, 128).is_err());
    }

    #[test]
    fn test_mfcc_tone_varies_from_silence() {
        let tone = crate::io::tone(440.0, 22050, 0.5);
        let m = mfcc(&tone, 22050, 13, 2048, 512, 128).unwrap();
        assert!(m[(0, 5)] > -100.0 * 128f32.sqrt() + 1.0);
        assert!(m.iter().all(|v| v.is_finite()));
    }
}
