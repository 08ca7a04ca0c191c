use ndarray::Array2;

/// Norm used for column normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormType {
    /// Sum of absolute values.
    L1,
    /// Euclidean norm.
    L2,
    /// Maximum absolute value.
    Max,
}

impl NormType {
    fn of(self, values: impl Iterator<Item = f32>) -> f32 {
        match self {
            NormType::L1 => values.map(f32::abs).sum(),
            NormType::L2 => values.map(|v| v * v).sum::<f32>().sqrt(),
            NormType::Max => values.map(f32::abs).fold(0.0f32, f32::max),
        }
    }
}

/// Normalize every column of `x` in place.
///
/// Columns whose norm is below `threshold` are left untouched, so silent
/// frames stay all-zero instead of becoming NaN.
pub fn normalize_columns(x: &mut Array2<f32>, norm: NormType, threshold: f32) {
    for mut col in x.columns_mut() {
        let n = norm.of(col.iter().copied());
        if n > threshold {
            col.mapv_inplace(|v| v / n);
        }
    }
}

/// Select the entries of a row that carry all but `quantile` of its
/// total magnitude.
///
/// Magnitudes are sorted ascending and accumulated; the smallest entries
/// whose cumulative share stays below `quantile` are discarded. Returns the
/// indices of the kept entries in ascending order. A zero row keeps nothing.
///
/// # Example
/// ```
/// use raga::utils::sparsify_indices;
///
/// let mags = [0.0, 0.1, 0.3, 0.5, 0.8, 0.5, 0.3, 0.1];
/// let kept = sparsify_indices(&mags, 0.1);
/// assert!(kept.len() < mags.len());
/// assert!(kept.contains(&4));
/// ```
pub fn sparsify_indices(mags: &[f32], quantile: f32) -> Vec<usize> {
    let total: f32 = mags.iter().sum();
    if mags.is_empty() || total <= 0.0 {
        return Vec::new();
    }
    if quantile <= 0.0 {
        return (0..mags.len()).collect();
    }

    let mut sorted = mags.to_vec();
    sorted.sort_by(f32::total_cmp);

    let mut cumsum = 0.0f32;
    let mut threshold = sorted[sorted.len() - 1];
    for &m in &sorted {
        cumsum += m / total;
        if cumsum >= quantile {
            threshold = m;
            break;
        }
    }

    mags.iter()
        .enumerate()
        .filter(|&(_, &m)| m >= threshold)
        .map(|(i, _)| i)
        .collect()
}
