use super::*;
use approx::assert_relative_eq;
use ndarray::Array2;

#[test]
fn test_valid_audio() {
    assert!(valid_audio(&[0.0, 0.5, -0.5, 0.0]).is_ok());
    assert!(matches!(valid_audio(&[]), Err(crate::Error::EmptyAudio)));
}

#[test]
fn test_valid_sample_rate() {
    assert!(valid_sample_rate(22050).is_ok());
    assert!(matches!(
        valid_sample_rate(0),
        Err(crate::Error::InvalidSampleRate { sr: 0, .. })
    ));
}

#[test]
fn test_fix_length_frames_pads_right_with_zeros() {
    let x = Array2::from_shape_fn((2, 3), |(r, c)| (r * 10 + c + 1) as f32);
    let fixed = fix_length_frames(&x, 5);
    assert_eq!(fixed.shape(), &[2, 5]);
    assert_eq!(fixed[(1, 2)], 13.0);
    assert_eq!(fixed[(0, 3)], 0.0);
    assert_eq!(fixed[(1, 4)], 0.0);
}

#[test]
fn test_fix_length_frames_keeps_leading_columns() {
    let x = Array2::from_shape_fn((2, 6), |(_, c)| c as f32);
    let fixed = fix_length_frames(&x, 4);
    assert_eq!(fixed.shape(), &[2, 4]);
    assert_eq!(fixed[(0, 3)], 3.0);
}

#[test]
fn test_vstack() {
    let a = Array2::<f32>::ones((2, 4));
    let b = Array2::<f32>::zeros((3, 4));
    let stacked = vstack(&[&a, &b]).unwrap();
    assert_eq!(stacked.shape(), &[5, 4]);
    assert_eq!(stacked[(1, 3)], 1.0);
    assert_eq!(stacked[(2, 0)], 0.0);
}

#[test]
fn test_vstack_column_mismatch() {
    let a = Array2::<f32>::ones((2, 4));
    let b = Array2::<f32>::ones((2, 5));
    assert!(matches!(
        vstack(&[&a, &b]),
        Err(crate::Error::ShapeMismatch { .. })
    ));
}

#[test]
fn test_align_frames_truncates_longer() {
    let a = Array2::<f32>::ones((12, 10));
    let b = Array2::<f32>::ones((13, 8));
    let (a, b) = align_frames(a, b);
    assert_eq!(a.shape(), &[12, 8]);
    assert_eq!(b.shape(), &[13, 8]);
}

#[test]
fn test_normalize_columns_max() {
    let mut x = Array2::from_shape_vec((2, 2), vec![2.0, 0.0, 4.0, 0.0]).unwrap();
    normalize_columns(&mut x, NormType::Max, 1e-10);
    assert_relative_eq!(x[(0, 0)], 0.5);
    assert_relative_eq!(x[(1, 0)], 1.0);
    // silent column stays zero
    assert_eq!(x[(0, 1)], 0.0);
    assert_eq!(x[(1, 1)], 0.0);
}

#[test]
fn test_normalize_columns_l1_l2() {
    let mut l1 = Array2::from_shape_vec((2, 1), vec![1.0, 3.0]).unwrap();
    normalize_columns(&mut l1, NormType::L1, 1e-10);
    assert_relative_eq!(l1[(0, 0)] + l1[(1, 0)], 1.0);

    let mut l2 = Array2::from_shape_vec((2, 1), vec![3.0, 4.0]).unwrap();
    normalize_columns(&mut l2, NormType::L2, 1e-10);
    assert_relative_eq!(l2[(0, 0)], 0.6);
    assert_relative_eq!(l2[(1, 0)], 0.8);
}

#[test]
fn test_sparsify_keeps_peak() {
    let mags = vec![0.01, 0.02, 5.0, 0.02, 0.01];
    let kept = sparsify_indices(&mags, 0.01);
    assert!(kept.contains(&2));
    assert!(!kept.contains(&0));
}

#[test]
fn test_sparsify_zero_quantile_keeps_all() {
    let mags = vec![0.5, 0.1, 0.2];
    assert_eq!(sparsify_indices(&mags, 0.0), vec![0, 1, 2]);
    assert!(sparsify_indices(&[0.0, 0.0], 0.1).is_empty());
}
