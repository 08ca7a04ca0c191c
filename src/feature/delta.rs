use ndarray::{Array2, ArrayView1, ArrayViewMut1};

/// Compute delta features: a local estimate of the derivative along time.
///
/// Each frame's delta is the least-squares slope of a line fitted to the
/// `width` frames centered on it:
///
/// `d[t] = sum_{n=1..N} n * (x[t+n] - x[t-n]) / (2 * sum_{n=1..N} n^2)`
///
/// with `N = width / 2`. Frames beyond either end repeat the edge frame, so
/// the output has the same shape as the input. Orders above one apply the
/// estimator repeatedly.
///
/// # Arguments
/// * `data` - Feature matrix of shape (n_features, n_frames)
/// * `width` - Number of frames in the regression window; odd and >= 3
/// * `order` - Derivative order, >= 1
///
/// # Errors
/// `InvalidParameter` for an even or too-small width and `InvalidSize` for
/// order 0.
///
/// # Example
/// ```
/// use ndarray::array;
/// use raga::feature::delta::delta;
///
/// let ramp = array![[0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]];
/// let d = delta(&ramp, 3, 1).unwrap();
/// assert_eq!(d[(0, 5)], 1.0);
/// ```
pub fn delta(data: &Array2<f32>, width: usize, order: usize) -> crate::Result<Array2<f32>> {
    if width < 3 || width.is_multiple_of(2) {
        return Err(crate::Error::InvalidParameter {
            name: "width",
            value: width.to_string(),
            reason: "must be an odd integer >= 3".to_string(),
        });
    }
    if order == 0 {
        return Err(crate::Error::InvalidSize {
            name: "order",
            value: 0,
            reason: "must be >= 1",
        });
    }

    let half = width / 2;
    let denom = 2.0 * (1..=half).map(|n| (n * n) as f32).sum::<f32>();

    let mut current = data.clone();
    for _ in 0..order {
        let mut next = Array2::<f32>::zeros(current.dim());
        for (row, out) in current.rows().into_iter().zip(next.rows_mut()) {
            slope_row(row, out, half, denom);
        }
        current = next;
    }
    Ok(current)
}

fn slope_row(x: ArrayView1<f32>, mut out: ArrayViewMut1<f32>, half: usize, denom: f32) {
    let len = x.len();
    if len == 0 {
        return;
    }
    let last = len - 1;
    for t in 0..len {
        let mut acc = 0.0f32;
        for n in 1..=half {
            let ahead = x[(t + n).min(last)];
            let behind = x[t.saturating_sub(n)];
            acc += n as f32 * (ahead - behind);
        }
        out[t] = acc / denom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array1;

    #[test]
    fn constant_rows_have_zero_delta() {
        let data = Array2::from_elem((3, 20), -1234.5f32);
        let d = delta(&data, 9, 1).unwrap();
        assert!(d.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn interior_slope_of_ramp() {
        let ramp = Array1::linspace(0.0f32, 19.0, 20).insert_axis(ndarray::Axis(0));
        let d = delta(&ramp, 9, 1).unwrap();
        assert_eq!(d.dim(), (1, 20));
        for t in 4..16 {
            assert_abs_diff_eq!(d[(0, t)], 1.0, epsilon = 1e-5);
        }
        // Edge padding flattens the slope at the borders
        assert!(d[(0, 0)] < 1.0);
        assert!(d[(0, 19)] < 1.0);
    }

    #[test]
    fn second_order_of_ramp_vanishes_inside() {
        let ramp = Array1::linspace(0.0f32, 39.0, 40).insert_axis(ndarray::Axis(0));
        let d2 = delta(&ramp, 5, 2).unwrap();
        for t in 5..35 {
            assert_abs_diff_eq!(d2[(0, t)], 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn single_frame_input() {
        let data = Array2::from_elem((13, 1), 3.0f32);
        let d = delta(&data, 9, 1).unwrap();
        assert_eq!(d.dim(), (13, 1));
        assert!(d.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn rejects_bad_width_and_order() {
        let data = Array2::<f32>::zeros((2, 10));
        assert!(delta(&data, 4, 1).is_err());
        assert!(delta(&data, 1, 1).is_err());
        assert!(delta(&data, 9, 0).is_err());
    }
}
