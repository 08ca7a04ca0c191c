use ndarray::{Array2, s};

/// Pad or trim the time axis (columns) of a feature matrix to `n_frames`.
///
/// Missing columns are appended on the right as zeros; surplus columns are
/// dropped from the right.
///
/// # Example
/// ```
/// use ndarray::Array2;
/// use raga::utils::fix_length_frames;
///
/// let x = Array2::<f32>::ones((3, 5));
/// assert_eq!(fix_length_frames(&x, 8).shape(), &[3, 8]);
/// assert_eq!(fix_length_frames(&x, 2).shape(), &[3, 2]);
/// ```
pub fn fix_length_frames(data: &Array2<f32>, n_frames: usize) -> Array2<f32> {
    let (rows, cols) = data.dim();
    let keep = cols.min(n_frames);
    let mut out = Array2::<f32>::zeros((rows, n_frames));
    out.slice_mut(s![.., ..keep])
        .assign(&data.slice(s![.., ..keep]));
    out
}
