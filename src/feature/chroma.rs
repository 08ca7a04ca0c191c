use crate::convert::{C1_HZ, hz_to_midi};
use crate::cqt::{CqtConfig, CqtKernel};
use crate::pitch::estimate_tuning;
use crate::utils::{NormType, normalize_columns};
use ndarray::Array2;

/// Columns with a norm at or below this value are left unnormalized.
const NORM_FLOOR: f32 = f32::MIN_POSITIVE;

/// Configuration for constant-Q chroma.
///
/// # Example
/// ```
/// use raga::feature::chroma::ChromaCqtConfig;
///
/// let config = ChromaCqtConfig::default().with_tuning(Some(0.0));
/// assert_eq!(config.n_bins(), 7 * 36);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChromaCqtConfig {
    /// Frequency of the lowest constant-Q bin (default: C1)
    pub fmin: f32,
    /// Number of octaves analyzed (default: 7)
    pub n_octaves: usize,
    /// Constant-Q bins per octave, a multiple of `n_chroma` (default: 36)
    pub bins_per_octave: usize,
    /// Number of chroma bins (default: 12)
    pub n_chroma: usize,
    /// Tuning in fractions of a bin; `None` estimates it from the signal
    pub tuning: Option<f32>,
    /// Column norm applied after folding; `None` keeps raw energies
    pub norm: Option<NormType>,
    /// Chroma values below this are zeroed before normalization
    pub threshold: f32,
    /// Filter scale factor (default: 1.0)
    pub filter_scale: f32,
    /// Share of each filter's spectral magnitude discarded (default: 0.01)
    pub sparsity: f32,
}

impl ChromaCqtConfig {
    pub fn with_fmin(mut self, fmin: f32) -> Self {
        self.fmin = fmin;
        self
    }

    pub fn with_n_octaves(mut self, n_octaves: usize) -> Self {
        self.n_octaves = n_octaves;
        self
    }

    pub fn with_bins_per_octave(mut self, bins_per_octave: usize) -> Self {
        self.bins_per_octave = bins_per_octave;
        self
    }

    pub fn with_tuning(mut self, tuning: Option<f32>) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_norm(mut self, norm: Option<NormType>) -> Self {
        self.norm = norm;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Total number of constant-Q bins.
    pub fn n_bins(&self) -> usize {
        self.n_octaves * self.bins_per_octave
    }

    /// Check that the configuration describes a usable chroma.
    pub fn validate(&self) -> crate::Result<()> {
        for (name, value) in [
            ("n_octaves", self.n_octaves),
            ("bins_per_octave", self.bins_per_octave),
            ("n_chroma", self.n_chroma),
        ] {
            if value == 0 {
                return Err(crate::Error::InvalidSize {
                    name,
                    value,
                    reason: "must be greater than zero",
                });
            }
        }
        if !self.bins_per_octave.is_multiple_of(self.n_chroma) {
            return Err(crate::Error::InvalidParameter {
                name: "bins_per_octave",
                value: self.bins_per_octave.to_string(),
                reason: format!("must be a multiple of n_chroma = {}", self.n_chroma),
            });
        }
        if self.fmin.is_nan() || self.fmin <= 0.0 {
            return Err(crate::Error::InvalidParameter {
                name: "fmin",
                value: self.fmin.to_string(),
                reason: "must be strictly positive".to_string(),
            });
        }
        if let Some(t) = self.tuning
            && !(-0.5..=0.5).contains(&t)
        {
            return Err(crate::Error::InvalidParameter {
                name: "tuning",
                value: t.to_string(),
                reason: "must lie in [-0.5, 0.5]".to_string(),
            });
        }
        Ok(())
    }

    /// Constant-Q transform settings for a given sample rate and tuning.
    pub fn cqt_config(&self, sr: u32, hop_length: usize, tuning: f32) -> CqtConfig {
        CqtConfig::new(sr, hop_length)
            .with_fmin(self.fmin)
            .with_n_bins(self.n_bins())
            .with_bins_per_octave(self.bins_per_octave)
            .with_tuning(tuning)
            .with_filter_scale(self.filter_scale)
            .with_sparsity(self.sparsity)
    }

    /// The fixed tuning, or an estimate from `y` when none is set.
    pub fn resolve_tuning(&self, y: &[f32], sr: u32) -> crate::Result<f32> {
        match self.tuning {
            Some(t) => Ok(t),
            None => estimate_tuning(y, sr, 2048, 0.01, self.bins_per_octave),
        }
    }
}

impl Default for ChromaCqtConfig {
    fn default() -> Self {
        Self {
            fmin: C1_HZ,
            n_octaves: 7,
            bins_per_octave: 36,
            n_chroma: 12,
            tuning: None,
            norm: Some(NormType::Max),
            threshold: 0.0,
            filter_scale: 1.0,
            sparsity: 0.01,
        }
    }
}

/// Folding matrix from constant-Q bins to chroma bins.
///
/// Every chroma bin sums the `bins_per_octave / n_chroma` constant-Q bins
/// centered on its semitone, in every octave. Rows are rolled according to
/// the pitch class of `fmin` so that row 0 is C when `base_c` is set and
/// A otherwise.
///
/// # Returns
/// Matrix of shape (n_chroma, n_input)
///
/// # Errors
/// `InvalidParameter` if `bins_per_octave` is not a positive multiple of
/// `n_chroma`.
///
/// # Example
/// ```
/// use raga::feature::chroma::cq_to_chroma;
///
/// let m = cq_to_chroma(84, 12, 12, 32.703, true).unwrap();
/// assert_eq!(m.shape(), &[12, 84]);
/// assert_eq!(m[(0, 0)], 1.0);
/// assert_eq!(m[(0, 12)], 1.0);
/// ```
pub fn cq_to_chroma(
    n_input: usize,
    bins_per_octave: usize,
    n_chroma: usize,
    fmin: f32,
    base_c: bool,
) -> crate::Result<Array2<f32>> {
    if n_chroma == 0 || bins_per_octave == 0 || !bins_per_octave.is_multiple_of(n_chroma) {
        return Err(crate::Error::InvalidParameter {
            name: "bins_per_octave",
            value: bins_per_octave.to_string(),
            reason: format!("must be a positive multiple of n_chroma = {n_chroma}"),
        });
    }

    let n_merge = bins_per_octave / n_chroma;
    // Bin 0 of each octave sits at the center of its merge group
    let shift = n_merge / 2;

    let midi_0 = hz_to_midi(&[fmin])[0].rem_euclid(12.0);
    let roll = if base_c { midi_0 } else { midi_0 - 9.0 };
    let roll = (roll * (n_chroma as f32 / 12.0)).round() as i64;

    let mut result = Array2::<f32>::zeros((n_chroma, n_input));
    for col in 0..n_input {
        let within = (col % bins_per_octave + shift) % bins_per_octave;
        let chroma = within / n_merge;
        let row = (chroma as i64 + roll).rem_euclid(n_chroma as i64) as usize;
        result[(row, col)] = 1.0;
    }

    Ok(result)
}

/// Chromagram from a prebuilt constant-Q kernel.
///
/// The kernel must have been built from `config` (same `fmin`, bins per
/// octave and bin count); its sample rate, hop and tuning are used as-is.
pub fn chroma_cqt_with_kernel(
    y: &[f32],
    kernel: &CqtKernel,
    config: &ChromaCqtConfig,
) -> crate::Result<Array2<f32>> {
    if kernel.n_bins() != config.n_bins() {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("{} constant-Q bins", config.n_bins()),
            got: format!("{} constant-Q bins", kernel.n_bins()),
        });
    }

    let magnitude = kernel.transform(y)?.mapv(|c| c.norm());
    let folding = cq_to_chroma(
        kernel.n_bins(),
        config.bins_per_octave,
        config.n_chroma,
        config.fmin,
        true,
    )?;

    let mut chroma = folding.dot(&magnitude);
    if config.threshold > 0.0 {
        chroma.mapv_inplace(|v| if v < config.threshold { 0.0 } else { v });
    }
    if let Some(norm) = config.norm {
        normalize_columns(&mut chroma, norm, NORM_FLOOR);
    }

    Ok(chroma)
}

/// Compute a chromagram from a waveform using the constant-Q transform.
///
/// # Arguments
/// * `y` - Audio samples
/// * `sr` - Sample rate
/// * `hop_length` - Number of samples between successive chroma frames
/// * `config` - Chroma settings; an unset tuning is estimated from `y`
///
/// # Returns
/// Chromagram with shape (n_chroma, 1 + len / hop_length), row 0 = C
///
/// # Example
/// ```
/// use raga::feature::chroma::{chroma_cqt, ChromaCqtConfig};
/// use raga::io;
///
/// let signal = io::tone(440.0, 22050, 0.5);
/// let config = ChromaCqtConfig::default()
///     .with_fmin(130.81)
///     .with_n_octaves(4)
///     .with_tuning(Some(0.0));
/// let chroma = chroma_cqt(&signal, 22050, 512, &config).unwrap();
/// assert_eq!(chroma.shape()[0], 12);
/// ```
pub fn chroma_cqt(
    y: &[f32],
    sr: u32,
    hop_length: usize,
    config: &ChromaCqtConfig,
) -> crate::Result<Array2<f32>> {
    config.validate()?;
    crate::utils::valid_audio(y)?;

    let tuning = config.resolve_tuning(y, sr)?;
    log::debug!("chroma tuning: {tuning:+.2} bins");

    let kernel = config.cqt_config(sr, hop_length, tuning).kernel()?;
    chroma_cqt_with_kernel(y, &kernel, config)
}
