//! Tonic estimation and chroma rotation.
//!
//! The tonic is taken as the pitch class with the greatest mean chroma
//! energy. Rotating the chroma so that this class becomes row 0 makes
//! features comparable across performances in different keys.

use ndarray::{Array2, Axis};

/// Index of the chroma row with the greatest mean over time.
///
/// Ties resolve to the lowest index. An empty matrix yields 0.
///
/// # Example
/// ```
/// use ndarray::array;
/// use raga::tonic::estimate_tonic;
///
/// let chroma = array![[0.1f32, 0.2], [0.9, 0.8], [0.3, 0.3]];
/// assert_eq!(estimate_tonic(&chroma), 1);
/// ```
pub fn estimate_tonic(chroma: &Array2<f32>) -> usize {
    if chroma.ncols() == 0 {
        return 0;
    }
    let means = chroma.sum_axis(Axis(1));
    let mut best = 0;
    for (i, &m) in means.iter().enumerate() {
        if m > means[best] {
            best = i;
        }
    }
    best
}

/// Cyclically shift chroma rows so that row `tonic` becomes row 0.
///
/// `out[i] = chroma[(i + tonic) % n]`, a rotation by `-tonic`.
///
/// # Example
/// ```
/// use ndarray::array;
/// use raga::tonic::rotate_to_tonic;
///
/// let chroma = array![[0.0f32], [1.0], [2.0]];
/// let rotated = rotate_to_tonic(&chroma, 2);
/// assert_eq!(rotated, array![[2.0f32], [0.0], [1.0]]);
/// ```
pub fn rotate_to_tonic(chroma: &Array2<f32>, tonic: usize) -> Array2<f32> {
    let n = chroma.nrows();
    if n == 0 {
        return chroma.clone();
    }
    let shift = tonic % n;
    let mut rotated = Array2::<f32>::zeros(chroma.dim());
    for (i, mut row) in rotated.rows_mut().into_iter().enumerate() {
        row.assign(&chroma.row((i + shift) % n));
    }
    rotated
}

/// Estimate the tonic and rotate it to row 0.
///
/// # Returns
/// The rotated chroma and the tonic index in the input's row order.
pub fn align_to_tonic(chroma: &Array2<f32>) -> (Array2<f32>, usize) {
    let tonic = estimate_tonic(chroma);
    (rotate_to_tonic(chroma, tonic), tonic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn ties_go_to_lowest_index() {
        let chroma = Array2::from_elem((12, 5), 0.5f32);
        assert_eq!(estimate_tonic(&chroma), 0);
        let chroma = array![[0.0f32], [1.0], [0.0], [1.0]];
        assert_eq!(estimate_tonic(&chroma), 1);
    }

    #[test]
    fn rotation_moves_tonic_to_row_zero() {
        let mut chroma = Array2::<f32>::zeros((12, 4));
        chroma.row_mut(7).fill(1.0);
        chroma.row_mut(9).fill(0.5);
        let (rotated, tonic) = align_to_tonic(&chroma);
        assert_eq!(tonic, 7);
        assert_eq!(rotated.row(0), chroma.row(7));
        assert_eq!(rotated.row(2), chroma.row(9));
        assert_eq!(estimate_tonic(&rotated), 0);
    }

    #[test]
    fn rotation_by_full_cycle_is_identity() {
        let chroma = Array2::from_shape_fn((12, 3), |(r, c)| (r * 3 + c) as f32);
        assert_eq!(rotate_to_tonic(&chroma, 0), chroma);
        assert_eq!(rotate_to_tonic(&chroma, 12), chroma);
    }

    #[test]
    fn empty_matrix() {
        let chroma = Array2::<f32>::zeros((12, 0));
        assert_eq!(estimate_tonic(&chroma), 0);
        assert_eq!(rotate_to_tonic(&chroma, 3).dim(), (12, 0));
    }
}
