//! Constant-Q Transform (CQT).
//!
//! The transform is evaluated in the frequency domain: each analysis frame
//! is centered on `t * hop_length` (zero padding outside the signal, the
//! same framing as [`crate::spectrum::stft`]), transformed once with a
//! real FFT, and correlated with the sparse spectrum of every constant-Q
//! filter. All octaves share one FFT size, large enough for the lowest
//! filter.
use crate::convert::cqt_frequencies;
use crate::fft::{FftPlan, RealFftPlan};
use crate::filters::{constant_q_filter, constant_q_lengths};
use crate::spectrum::{fill_frame, n_frames};
use crate::utils::sparsify_indices;
use ndarray::Array2;
use num_complex::Complex32;

/// Configuration for Constant-Q Transform (CQT).
///
/// This struct provides a builder pattern for configuring CQT parameters
/// instead of using many positional arguments.
///
/// # Example
/// ```
/// use raga::cqt::CqtConfig;
///
/// let config = CqtConfig::new(22050, 512)
///     .with_fmin(110.0)
///     .with_n_bins(48)
///     .with_bins_per_octave(12);
/// assert_eq!(config.n_bins, 48);
/// ```
#[derive(Debug, Clone)]
pub struct CqtConfig {
    /// Sample rate
    pub sr: u32,
    /// Number of samples between successive CQT columns
    pub hop_length: usize,
    /// Minimum frequency (default: ~32.7 Hz, C1)
    pub fmin: f32,
    /// Number of frequency bins (default: 84, 7 octaves)
    pub n_bins: usize,
    /// Number of bins per octave (default: 12)
    pub bins_per_octave: usize,
    /// Tuning offset in fractions of a bin (default: 0.0)
    pub tuning: f32,
    /// Filter scale factor (default: 1.0)
    pub filter_scale: f32,
    /// Share of each filter's spectral magnitude discarded (default: 0.01)
    pub sparsity: f32,
}

impl CqtConfig {
    /// Create a new CQT configuration with defaults.
    pub fn new(sr: u32, hop_length: usize) -> Self {
        Self {
            sr,
            hop_length,
            ..Self::default()
        }
    }

    /// Set the minimum frequency.
    pub fn with_fmin(mut self, fmin: f32) -> Self {
        self.fmin = fmin;
        self
    }

    /// Set the number of frequency bins.
    pub fn with_n_bins(mut self, n_bins: usize) -> Self {
        self.n_bins = n_bins;
        self
    }

    /// Set the number of bins per octave.
    pub fn with_bins_per_octave(mut self, bins_per_octave: usize) -> Self {
        self.bins_per_octave = bins_per_octave;
        self
    }

    /// Set the tuning offset.
    pub fn with_tuning(mut self, tuning: f32) -> Self {
        self.tuning = tuning;
        self
    }

    /// Set the filter scale factor.
    pub fn with_filter_scale(mut self, filter_scale: f32) -> Self {
        self.filter_scale = filter_scale;
        self
    }

    /// Set the basis sparsity quantile.
    pub fn with_sparsity(mut self, sparsity: f32) -> Self {
        self.sparsity = sparsity;
        self
    }

    /// Center frequency of every bin, tuning applied.
    pub fn frequencies(&self) -> Vec<f32> {
        cqt_frequencies(self.n_bins, self.fmin, self.bins_per_octave, self.tuning)
    }

    /// Build the filter kernel for this configuration.
    pub fn kernel(&self) -> crate::Result<CqtKernel> {
        CqtKernel::new(self)
    }

    /// Compute the CQT with this configuration.
    pub fn compute(&self, y: &[f32]) -> crate::Result<Array2<Complex32>> {
        self.kernel()?.transform(y)
    }
}

impl Default for CqtConfig {
    fn default() -> Self {
        Self {
            sr: 22050,
            hop_length: 512,
            fmin: crate::convert::C1_HZ,
            n_bins: 84,
            bins_per_octave: 12,
            tuning: 0.0,
            filter_scale: 1.0,
            sparsity: 0.01,
        }
    }
}

/// Spectrum of one filter, restricted to the bins that carry its energy.
#[derive(Debug, Clone)]
struct SparseFilter {
    bins: Vec<usize>,
    /// Conjugated spectral weights, pre-scaled.
    weights: Vec<Complex32>,
}

/// Precomputed frequency-domain constant-Q filterbank.
///
/// Building the kernel dominates the cost of a short transform; keep it
/// around when transforming many signals at the same sample rate.
#[derive(Debug, Clone)]
pub struct CqtKernel {
    sr: u32,
    hop_length: usize,
    n_fft: usize,
    filters: Vec<SparseFilter>,
    lengths: Vec<f32>,
}

impl CqtKernel {
    /// Design the filterbank described by `config`.
    ///
    /// # Errors
    /// `InvalidSampleRate` when the sample rate is zero or too low for the
    /// highest bin; `InvalidSize`/`InvalidParameter` for degenerate sizes.
    pub fn new(config: &CqtConfig) -> crate::Result<Self> {
        crate::utils::valid_sample_rate(config.sr)?;
        if config.n_bins == 0 {
            return Err(crate::Error::InvalidSize {
                name: "n_bins",
                value: 0,
                reason: "must be greater than zero",
            });
        }
        if config.hop_length == 0 {
            return Err(crate::Error::InvalidSize {
                name: "hop_length",
                value: 0,
                reason: "must be greater than zero",
            });
        }
        if !(0.0..1.0).contains(&config.sparsity) {
            return Err(crate::Error::InvalidParameter {
                name: "sparsity",
                value: config.sparsity.to_string(),
                reason: "must lie in [0, 1)".to_string(),
            });
        }

        let freqs = config.frequencies();
        let lengths = constant_q_lengths(
            config.sr,
            &freqs,
            config.bins_per_octave,
            config.filter_scale,
        )?;

        let max_len = lengths.iter().copied().fold(0.0f32, f32::max).ceil() as usize;
        let min_fft = (2 * config.hop_length).next_power_of_two();
        let n_fft = max_len.next_power_of_two().max(min_fft);
        let n_freq = n_fft / 2 + 1;

        let plan = FftPlan::new(n_fft);
        let mut buffer = vec![Complex32::new(0.0, 0.0); n_fft];
        let mut filters = Vec::with_capacity(freqs.len());

        for (&freq, &length) in freqs.iter().zip(lengths.iter()) {
            let filter = constant_q_filter(freq, length, config.sr);
            let scale = length / n_fft as f32;

            buffer.fill(Complex32::new(0.0, 0.0));
            // Filter center (index len/2) lands on the frame center (n_fft/2)
            let start = n_fft / 2 - filter.len() / 2;
            for (slot, &c) in buffer[start..].iter_mut().zip(filter.iter()) {
                *slot = c * scale;
            }
            plan.forward(&mut buffer);

            let mags: Vec<f32> = buffer[..n_freq].iter().map(|c| c.norm()).collect();
            let bins = sparsify_indices(&mags, config.sparsity);
            let weights = bins.iter().map(|&b| buffer[b].conj()).collect();
            filters.push(SparseFilter { bins, weights });
        }

        log::debug!(
            "constant-Q kernel: {} bins, n_fft={}, {} nonzero weights",
            filters.len(),
            n_fft,
            filters.iter().map(|f| f.bins.len()).sum::<usize>()
        );

        Ok(Self {
            sr: config.sr,
            hop_length: config.hop_length,
            n_fft,
            filters,
            lengths,
        })
    }

    /// Sample rate the kernel was designed for.
    pub fn sample_rate(&self) -> u32 {
        self.sr
    }

    /// FFT size shared by all filters.
    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    /// Number of constant-Q bins.
    pub fn n_bins(&self) -> usize {
        self.filters.len()
    }

    /// Filter length of every bin, in samples.
    pub fn lengths(&self) -> &[f32] {
        &self.lengths
    }

    /// Number of frames produced for a signal of `len` samples.
    pub fn n_frames(&self, len: usize) -> usize {
        n_frames(len, self.n_fft, self.hop_length, true)
    }

    /// Transform a signal.
    ///
    /// # Returns
    /// Complex CQT of shape (n_bins, 1 + len / hop_length), each channel
    /// scaled by `1 / sqrt(filter length)`.
    ///
    /// # Errors
    /// Returns `EmptyAudio` for an empty signal.
    pub fn transform(&self, y: &[f32]) -> crate::Result<Array2<Complex32>> {
        crate::utils::valid_audio(y)?;

        let n_frames = self.n_frames(y.len());
        let plan = RealFftPlan::new(self.n_fft);
        let ones = vec![1.0f32; self.n_fft];
        let mut frame = vec![0.0f32; self.n_fft];
        let mut spectrum = vec![Complex32::new(0.0, 0.0); plan.n_freq()];
        let mut out = Array2::<Complex32>::zeros((self.filters.len(), n_frames));

        for t in 0..n_frames {
            fill_frame(y, t, self.hop_length, true, &ones, &mut frame);
            plan.process(&mut frame, &mut spectrum);

            for (k, filter) in self.filters.iter().enumerate() {
                let acc: Complex32 = filter
                    .bins
                    .iter()
                    .zip(filter.weights.iter())
                    .map(|(&b, &w)| w * spectrum[b])
                    .sum();
                out[(k, t)] = acc / self.lengths[k].sqrt();
            }
        }

        Ok(out)
    }
}

/// Compute the Constant-Q Transform of an audio signal.
///
/// # Arguments
/// * `y` - Audio signal
/// * `sr` - Sample rate
/// * `hop_length` - Number of samples between successive CQT columns
/// * `fmin` - Minimum frequency
/// * `n_bins` - Number of frequency bins
/// * `bins_per_octave` - Number of bins per octave
/// * `tuning` - Tuning offset in fractions of a bin
///
/// # Returns
/// CQT spectrogram as complex values (n_bins x n_frames)
///
/// # Example
/// ```
/// use raga::cqt::cqt;
/// use raga::io;
///
/// let signal = io::tone(440.0, 22050, 0.5);
/// let spec = cqt(&signal, 22050, 512, 110.0, 36, 12, 0.0).unwrap();
/// assert_eq!(spec.shape(), &[36, 1 + signal.len() / 512]);
/// ```
pub fn cqt(
    y: &[f32],
    sr: u32,
    hop_length: usize,
    fmin: f32,
    n_bins: usize,
    bins_per_octave: usize,
    tuning: f32,
) -> crate::Result<Array2<Complex32>> {
    CqtConfig::new(sr, hop_length)
        .with_fmin(fmin)
        .with_n_bins(n_bins)
        .with_bins_per_octave(bins_per_octave)
        .with_tuning(tuning)
        .compute(y)
}
