use crate::fft::RealFftPlan;
use crate::window;
use ndarray::Array2;
use num_complex::Complex32;

/// Short-time Fourier transform parameters.
#[derive(Debug, Clone)]
pub struct StftConfig {
    pub n_fft: usize,
    pub hop_length: usize,
    pub center: bool,
    pub window: Vec<f32>,
}

impl StftConfig {
    /// Hann-windowed, centered STFT with the given frame and hop sizes.
    pub fn new(n_fft: usize, hop_length: usize) -> Self {
        Self {
            n_fft,
            hop_length,
            center: true,
            window: window::hann(n_fft),
        }
    }

    /// Replace the analysis window.
    pub fn with_window(mut self, window: Vec<f32>) -> Self {
        self.window = window;
        self
    }

    /// Number of frames produced for a signal of `len` samples.
    pub fn n_frames(&self, len: usize) -> usize {
        n_frames(len, self.n_fft, self.hop_length, self.center)
    }
}

impl Default for StftConfig {
    fn default() -> Self {
        Self::new(2048, 512)
    }
}

/// Number of frames for a signal of `len` samples.
///
/// Centered framing pads `n_fft / 2` zeros on each side, which yields
/// `1 + len / hop_length` frames independent of `n_fft`.
pub fn n_frames(len: usize, n_fft: usize, hop_length: usize, center: bool) -> usize {
    if hop_length == 0 {
        return 0;
    }
    let padded = if center { len + 2 * (n_fft / 2) } else { len };
    if padded < n_fft {
        0
    } else {
        (padded - n_fft) / hop_length + 1
    }
}

/// Copy the samples of frame `frame` into `out`, multiplied by `window`.
///
/// Samples outside the signal read as zero, which is equivalent to
/// constant padding of the centered signal.
pub(crate) fn fill_frame(
    y: &[f32],
    frame: usize,
    hop_length: usize,
    center: bool,
    window: &[f32],
    out: &mut [f32],
) {
    let n_fft = out.len();
    let offset = if center { (n_fft / 2) as isize } else { 0 };
    let start = (frame * hop_length) as isize - offset;
    for (i, slot) in out.iter_mut().enumerate() {
        let idx = start + i as isize;
        let sample = if idx >= 0 && (idx as usize) < y.len() {
            y[idx as usize]
        } else {
            0.0
        };
        *slot = sample * window[i];
    }
}

/// Compute the Short-Time Fourier Transform (STFT).
///
/// # Arguments
/// * `y` - Input audio signal
/// * `config` - STFT configuration (FFT size, hop length, window, centering)
///
/// # Returns
/// Complex STFT matrix of shape (n_fft/2 + 1, n_frames)
///
/// # Errors
/// Returns an error if the audio is empty or if n_fft/hop_length is zero.
pub fn stft(y: &[f32], config: &StftConfig) -> crate::Result<Array2<Complex32>> {
    crate::utils::valid_audio(y)?;
    if config.n_fft == 0 {
        return Err(crate::Error::InvalidSize {
            name: "n_fft",
            value: 0,
            reason: "must be > 0",
        });
    }
    if config.hop_length == 0 {
        return Err(crate::Error::InvalidSize {
            name: "hop_length",
            value: 0,
            reason: "must be > 0",
        });
    }

    let window = window::pad_window(&config.window, config.n_fft);
    if window.len() != config.n_fft {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("window of at most {} samples", config.n_fft),
            got: format!("{} samples", config.window.len()),
        });
    }

    let n_frames = config.n_frames(y.len());
    let plan = RealFftPlan::new(config.n_fft);
    let n_freq = plan.n_freq();

    let mut out = Array2::<Complex32>::zeros((n_freq, n_frames));
    let mut frame_buf = vec![0.0f32; config.n_fft];
    let mut spec_buf = vec![Complex32::new(0.0, 0.0); n_freq];
    for t in 0..n_frames {
        fill_frame(
            y,
            t,
            config.hop_length,
            config.center,
            &window,
            &mut frame_buf,
        );
        plan.process(&mut frame_buf, &mut spec_buf);
        for (f, &v) in spec_buf.iter().enumerate() {
            out[(f, t)] = v;
        }
    }

    Ok(out)
}

/// Power spectrogram `|STFT|^2`.
pub fn power_spectrogram(y: &[f32], config: &StftConfig) -> crate::Result<Array2<f32>> {
    let s = stft(y, config)?;
    Ok(s.mapv(|v| v.norm_sqr()))
}

/// Convert a power spectrogram to dB scale.
///
/// `S_db = 10 * log10(max(S, amin) / ref)`, then, when `top_db` is set,
/// floored at `max(S_db) - top_db` over the whole matrix.
pub fn power_to_db(
    power: &Array2<f32>,
    ref_power: f32,
    amin: f32,
    top_db: Option<f32>,
) -> Array2<f32> {
    let log_ref = 10.0 * ref_power.max(amin).log10();
    let mut db = power.mapv(|p| 10.0 * p.max(amin).log10() - log_ref);

    if let Some(top) = top_db {
        let max_db = db.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let threshold = max_db - top;
        db.mapv_inplace(|v| v.max(threshold));
    }

    db
}
