//! Fixed-size feature matrices for raga recognition.
//!
//! A waveform becomes a (frames × channels) matrix, 400 × 38 by default:
//! 12 tonic-aligned chroma rows, 13 MFCCs and their 13 deltas, stacked,
//! padded or truncated along time and transposed so that each row is one
//! time step.

use crate::convert::cqt_frequencies;
use crate::cqt::CqtKernel;
use crate::feature::chroma::{ChromaCqtConfig, chroma_cqt_with_kernel};
use crate::feature::delta::delta;
use crate::feature::mfcc::MfccConfig;
use crate::filters::constant_q_lengths;
use crate::tonic::align_to_tonic;
use crate::utils::{align_frames, fix_length_frames, valid_sample_rate, vstack};
use ndarray::{Array2, ArrayView2, s};

/// Mono audio samples at a known sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds; zero when the sample rate is zero.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Feature extraction settings.
///
/// # Example
/// ```
/// use raga::extractor::ExtractorConfig;
///
/// let config = ExtractorConfig::default();
/// assert_eq!((config.frames, config.n_channels()), (400, 38));
/// assert_eq!(config.min_samples(), 2048);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Rate the constant-Q kernel is precomputed for (default: 22050)
    pub sample_rate: u32,
    /// Output time steps (default: 400)
    pub frames: usize,
    /// Hop shared by chroma and MFCC (default: 512)
    pub hop_length: usize,
    /// MFCC window size, also the minimum input length (default: 2048)
    pub n_fft: usize,
    /// Number of cepstral coefficients (default: 13)
    pub n_mfcc: usize,
    /// Number of mel bands feeding the MFCC (default: 128)
    pub n_mels: usize,
    /// Delta regression window in frames (default: 9)
    pub delta_width: usize,
    /// Constant-Q chroma settings
    pub chroma: ChromaCqtConfig,
}

impl ExtractorConfig {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_hop_length(mut self, hop_length: usize) -> Self {
        self.hop_length = hop_length;
        self
    }

    pub fn with_n_fft(mut self, n_fft: usize) -> Self {
        self.n_fft = n_fft;
        self
    }

    pub fn with_n_mfcc(mut self, n_mfcc: usize) -> Self {
        self.n_mfcc = n_mfcc;
        self
    }

    pub fn with_n_mels(mut self, n_mels: usize) -> Self {
        self.n_mels = n_mels;
        self
    }

    pub fn with_delta_width(mut self, delta_width: usize) -> Self {
        self.delta_width = delta_width;
        self
    }

    pub fn with_chroma(mut self, chroma: ChromaCqtConfig) -> Self {
        self.chroma = chroma;
        self
    }

    /// Fix the tuning instead of estimating it per signal.
    pub fn with_tuning(mut self, tuning: Option<f32>) -> Self {
        self.chroma.tuning = tuning;
        self
    }

    /// Feature channels per time step.
    pub fn n_channels(&self) -> usize {
        self.chroma.n_chroma + 2 * self.n_mfcc
    }

    /// Shortest waveform accepted by [`FeatureExtractor::extract`].
    pub fn min_samples(&self) -> usize {
        self.n_fft
    }

    /// MFCC settings at sample rate `sr`.
    pub fn mfcc_config(&self, sr: u32) -> MfccConfig {
        MfccConfig::new(sr)
            .with_n_fft(self.n_fft)
            .with_hop_length(self.hop_length)
            .with_n_mfcc(self.n_mfcc)
            .with_n_mels(self.n_mels)
    }

    /// Reject configurations no waveform could satisfy.
    pub fn validate(&self) -> crate::Result<()> {
        valid_sample_rate(self.sample_rate)?;
        for (name, value) in [
            ("frames", self.frames),
            ("hop_length", self.hop_length),
            ("n_fft", self.n_fft),
            ("n_mfcc", self.n_mfcc),
            ("n_mels", self.n_mels),
        ] {
            if value == 0 {
                return Err(crate::Error::InvalidSize {
                    name,
                    value,
                    reason: "must be greater than zero",
                });
            }
        }
        if self.n_mfcc > self.n_mels {
            return Err(crate::Error::InvalidParameter {
                name: "n_mfcc",
                value: self.n_mfcc.to_string(),
                reason: format!("cannot exceed n_mels = {}", self.n_mels),
            });
        }
        if self.delta_width < 3 || self.delta_width.is_multiple_of(2) {
            return Err(crate::Error::InvalidParameter {
                name: "delta_width",
                value: self.delta_width.to_string(),
                reason: "must be an odd integer >= 3".to_string(),
            });
        }
        self.chroma.validate()
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            sample_rate: crate::io::DEFAULT_SAMPLE_RATE,
            frames: 400,
            hop_length: 512,
            n_fft: 2048,
            n_mfcc: 13,
            n_mels: 128,
            delta_width: 9,
            chroma: ChromaCqtConfig::default(),
        }
    }
}

/// Extracted features, one row per time step.
///
/// Columns are laid out as `[chroma | mfcc | delta]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Array2<f32>,
    n_chroma: usize,
    n_mfcc: usize,
    tonic: usize,
}

impl FeatureMatrix {
    /// Wrap a (time steps, channels) array laid out as `[chroma | mfcc | delta]`.
    pub fn new(
        data: Array2<f32>,
        n_chroma: usize,
        n_mfcc: usize,
        tonic: usize,
    ) -> crate::Result<Self> {
        let channels = n_chroma + 2 * n_mfcc;
        if data.ncols() != channels {
            return Err(crate::Error::ShapeMismatch {
                expected: format!("{channels} channels"),
                got: format!("{} channels", data.ncols()),
            });
        }
        Ok(Self {
            data,
            n_chroma,
            n_mfcc,
            tonic,
        })
    }

    /// (time steps, channels)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.data
    }

    pub fn into_inner(self) -> Array2<f32> {
        self.data
    }

    /// Tonic-aligned chroma: column 0 is the tonic.
    pub fn chroma(&self) -> ArrayView2<'_, f32> {
        self.data.slice(s![.., ..self.n_chroma])
    }

    pub fn mfcc(&self) -> ArrayView2<'_, f32> {
        let start = self.n_chroma;
        self.data.slice(s![.., start..start + self.n_mfcc])
    }

    pub fn delta(&self) -> ArrayView2<'_, f32> {
        let start = self.n_chroma + self.n_mfcc;
        self.data.slice(s![.., start..start + self.n_mfcc])
    }

    /// Estimated tonic as a pitch class, 0 = C.
    pub fn tonic(&self) -> usize {
        self.tonic
    }

    /// Name of the estimated tonic, e.g. `"D#"`.
    pub fn tonic_name(&self) -> &'static str {
        crate::convert::pitch_class_name(self.tonic)
    }
}

/// Turns waveforms into [`FeatureMatrix`] values.
///
/// With a fixed tuning the constant-Q kernel for the configured sample rate
/// is built once and reused; otherwise a kernel is designed per signal for
/// the estimated tuning.
///
/// # Example
/// ```no_run
/// use raga::extractor::{ExtractorConfig, FeatureExtractor, Waveform};
///
/// let extractor = FeatureExtractor::new(ExtractorConfig::default()).unwrap();
/// let features = extractor
///     .extract(&Waveform::new(raga::io::tone(220.0, 22050, 3.0), 22050))
///     .unwrap();
/// assert_eq!(features.shape(), (400, 38));
/// ```
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: ExtractorConfig,
    kernel: Option<CqtKernel>,
}

impl FeatureExtractor {
    /// Validate `config` and precompute what can be shared between calls.
    pub fn new(config: ExtractorConfig) -> crate::Result<Self> {
        config.validate()?;
        let kernel = match config.chroma.tuning {
            Some(tuning) => Some(
                config
                    .chroma
                    .cqt_config(config.sample_rate, config.hop_length, tuning)
                    .kernel()?,
            ),
            None => {
                check_constant_q_range(&config, config.sample_rate)?;
                None
            }
        };
        Ok(Self { config, kernel })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract the feature matrix of a mono waveform.
    ///
    /// # Errors
    /// `InvalidSampleRate` for a zero rate or one too low for the
    /// constant-Q range; `InsufficientAudioLength` for fewer than
    /// [`ExtractorConfig::min_samples`] samples. Both are reported before
    /// any transform runs.
    pub fn extract(&self, waveform: &Waveform) -> crate::Result<FeatureMatrix> {
        let sr = waveform.sample_rate;
        let y = waveform.samples.as_slice();

        valid_sample_rate(sr)?;
        let required = self.config.min_samples();
        if y.len() < required {
            return Err(crate::Error::InsufficientAudioLength {
                got: y.len(),
                required,
            });
        }
        check_constant_q_range(&self.config, sr)?;

        log::info!(
            "extracting features from {:.2} s of audio at {sr} Hz",
            waveform.duration()
        );

        let tuning = self.config.chroma.resolve_tuning(y, sr)?;
        let chroma = match &self.kernel {
            Some(kernel) if kernel.sample_rate() == sr => {
                chroma_cqt_with_kernel(y, kernel, &self.config.chroma)?
            }
            _ => {
                log::debug!("designing constant-Q kernel for {sr} Hz, tuning {tuning:+.2}");
                let kernel = self
                    .config
                    .chroma
                    .cqt_config(sr, self.config.hop_length, tuning)
                    .kernel()?;
                chroma_cqt_with_kernel(y, &kernel, &self.config.chroma)?
            }
        };
        let (chroma, tonic) = align_to_tonic(&chroma);
        log::debug!(
            "tonic estimate: {} ({tonic})",
            crate::convert::pitch_class_name(tonic)
        );

        let mfcc = self.config.mfcc_config(sr).compute(y)?;
        let mfcc_delta = delta(&mfcc, self.config.delta_width, 1)?;

        if chroma.ncols() != mfcc.ncols() {
            log::warn!(
                "chroma has {} frames, mfcc has {}; truncating to the shorter",
                chroma.ncols(),
                mfcc.ncols()
            );
        }
        let (chroma, mfcc) = align_frames(chroma, mfcc);
        let (mfcc, mfcc_delta) = align_frames(mfcc, mfcc_delta);
        let n_frames = mfcc.ncols();

        let stacked = vstack(&[&chroma, &mfcc, &mfcc_delta])?;
        let fixed = fix_length_frames(&stacked, self.config.frames);
        let data = fixed.t().as_standard_layout().into_owned();

        log::info!(
            "extracted {} frames into a {}x{} matrix, tonic {}",
            n_frames,
            data.nrows(),
            data.ncols(),
            crate::convert::pitch_class_name(tonic)
        );

        Ok(FeatureMatrix {
            data,
            n_chroma: self.config.chroma.n_chroma,
            n_mfcc: self.config.n_mfcc,
            tonic,
        })
    }

    /// Extract many waveforms; results keep the input order.
    pub fn extract_batch(&self, waveforms: &[Waveform]) -> Vec<crate::Result<FeatureMatrix>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            waveforms.par_iter().map(|w| self.extract(w)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            waveforms.iter().map(|w| self.extract(w)).collect()
        }
    }
}

/// Fail with `InvalidSampleRate` when the highest constant-Q filter cannot
/// be represented at `sr`. An unknown tuning is assumed maximally sharp.
fn check_constant_q_range(config: &ExtractorConfig, sr: u32) -> crate::Result<()> {
    let chroma = &config.chroma;
    let tuning = chroma.tuning.unwrap_or(0.5);
    let freqs = cqt_frequencies(chroma.n_bins(), chroma.fmin, chroma.bins_per_octave, tuning);
    let highest = &freqs[freqs.len().saturating_sub(1)..];
    constant_q_lengths(sr, highest, chroma.bins_per_octave, chroma.filter_scale)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light_config() -> ExtractorConfig {
        ExtractorConfig::default()
            .with_frames(32)
            .with_hop_length(256)
            .with_chroma(
                ChromaCqtConfig::default()
                    .with_fmin(130.812_78)
                    .with_n_octaves(4)
                    .with_tuning(Some(0.0)),
            )
    }

    #[test]
    fn default_config_shape() {
        let config = ExtractorConfig::default();
        assert_eq!(config.n_channels(), 38);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_degenerate_settings() {
        assert!(ExtractorConfig::default().with_frames(0).validate().is_err());
        assert!(ExtractorConfig::default().with_delta_width(8).validate().is_err());
        assert!(ExtractorConfig::default().with_n_mfcc(200).validate().is_err());
        assert!(ExtractorConfig::default().with_sample_rate(0).validate().is_err());
    }

    #[test]
    fn too_low_rate_for_constant_q_range() {
        let extractor = FeatureExtractor::new(light_config()).unwrap();
        // Top bin near 2 kHz needs more than 4 kHz sampling
        let w = Waveform::new(vec![0.0; 4096], 2000);
        assert!(matches!(
            extractor.extract(&w),
            Err(crate::Error::InvalidSampleRate { sr: 2000, .. })
        ));
    }

    #[test]
    fn block_views_partition_channels() {
        let extractor = FeatureExtractor::new(light_config()).unwrap();
        let y = crate::io::tone(293.66, 22050, 0.5);
        let features = extractor.extract(&Waveform::new(y, 22050)).unwrap();
        assert_eq!(features.shape(), (32, 38));
        assert_eq!(features.chroma().dim(), (32, 12));
        assert_eq!(features.mfcc().dim(), (32, 13));
        assert_eq!(features.delta().dim(), (32, 13));
        // D is the only pitch class present
        assert_eq!(features.tonic(), 2);
        assert_eq!(features.tonic_name(), "D");
        assert!((features.chroma()[(16, 0)] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn other_sample_rates_use_a_fresh_kernel() {
        let extractor = FeatureExtractor::new(light_config()).unwrap();
        let y = crate::io::tone(440.0, 16000, 0.5);
        let features = extractor.extract(&Waveform::new(y, 16000)).unwrap();
        assert_eq!(features.shape(), (32, 38));
        assert_eq!(features.tonic(), 9);
    }

    #[test]
    fn waveform_duration() {
        let w = Waveform::new(vec![0.0; 11025], 22050);
        assert!((w.duration() - 0.5).abs() < 1e-12);
        assert_eq!(Waveform::new(vec![0.0; 10], 0).duration(), 0.0);
    }
}
