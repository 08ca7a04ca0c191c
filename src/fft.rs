use num_complex::Complex32;
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Forward complex FFT plan.
///
/// Used for transforming complex-valued filters (constant-Q basis) into the
/// frequency domain.
///
/// # Example
/// ```
/// use raga::fft::FftPlan;
/// use num_complex::Complex32;
///
/// let plan = FftPlan::new(512);
/// let mut buffer = vec![Complex32::new(1.0, 0.0); 512];
/// plan.forward(&mut buffer);
/// assert!((buffer[0].re - 512.0).abs() < 1e-3);
/// ```
pub struct FftPlan {
    forward: Arc<dyn Fft<f32>>,
    len: usize,
}

impl FftPlan {
    /// Create a new FFT plan for a given size.
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(len);
        Self { forward, len }
    }

    /// Transform length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the plan has zero length.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Perform forward FFT in-place.
    pub fn forward(&self, buffer: &mut [Complex32]) {
        self.forward.process(buffer);
    }
}

/// Real-to-complex FFT plan, reusable across frames.
///
/// The output holds the `len / 2 + 1` non-redundant bins.
pub struct RealFftPlan {
    r2c: Arc<dyn RealToComplex<f32>>,
    len: usize,
}

impl RealFftPlan {
    /// Create a new real FFT plan for a given size.
    pub fn new(len: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let r2c = planner.plan_fft_forward(len);
        Self { r2c, len }
    }

    /// Transform length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the plan has zero length.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of output bins (`len / 2 + 1`).
    pub fn n_freq(&self) -> usize {
        self.len / 2 + 1
    }

    /// Transform `input` (length `len`, clobbered) into `output`
    /// (length `len / 2 + 1`).
    pub fn process(&self, input: &mut [f32], output: &mut [Complex32]) {
        // Lengths come from this plan, so the only failure mode is a
        // non-zero imaginary DC/Nyquist on inverse transforms.
        let _ = self.r2c.process(input, output);
    }
}

/// Compute the real-to-complex FFT (rfft) of a real-valued input.
///
/// # Example
/// ```
/// use raga::fft::rfft;
///
/// let signal = vec![1.0f32; 1024];
/// let spectrum = rfft(&signal);
/// assert_eq!(spectrum.len(), 513); // 1024/2 + 1
/// ```
pub fn rfft(input: &[f32]) -> Vec<Complex32> {
    if input.is_empty() {
        return Vec::new();
    }
    let plan = RealFftPlan::new(input.len());
    let mut in_buf = input.to_vec();
    let mut out_buf = vec![Complex32::new(0.0, 0.0); plan.n_freq()];
    plan.process(&mut in_buf, &mut out_buf);
    out_buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfft_of_impulse_is_flat() {
        let mut x = vec![0.0f32; 64];
        x[0] = 1.0;
        let spec = rfft(&x);
        assert_eq!(spec.len(), 33);
        for v in spec {
            assert!((v.re - 1.0).abs() < 1e-6);
            assert!(v.im.abs() < 1e-6);
        }
    }

    #[test]
    fn real_plan_matches_complex_plan() {
        let n = 128;
        let x: Vec<f32> = (0..n).map(|i| (i as f32 * 0.3).sin()).collect();

        let real = rfft(&x);

        let plan = FftPlan::new(n);
        let mut buf: Vec<Complex32> = x.iter().map(|&v| Complex32::new(v, 0.0)).collect();
        plan.forward(&mut buf);

        for k in 0..real.len() {
            assert!((real[k] - buf[k]).norm() < 1e-3, "bin {k} differs");
        }
    }

    #[test]
    fn rfft_empty() {
        assert!(rfft(&[]).is_empty());
    }
}
