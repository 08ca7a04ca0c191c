use super::*;
use approx::assert_abs_diff_eq;

#[test]
fn test_hz_to_midi_reference_points() {
    let midi = hz_to_midi(&[440.0, 261.625_58, 0.0]);
    assert_abs_diff_eq!(midi[0], 69.0, epsilon = 1e-4);
    assert_abs_diff_eq!(midi[1], 60.0, epsilon = 1e-3);
    assert_eq!(midi[2], 0.0);
}

#[test]
fn test_c1_is_midi_24() {
    assert_abs_diff_eq!(hz_to_midi(&[C1_HZ])[0], 24.0, epsilon = 1e-3);
}

#[test]
fn test_hz_to_octs_tuning_shift() {
    // A quarter-tone sharp reference moves A440 a quarter bin down
    let octs = hz_to_octs(&[440.0], 0.5, 12);
    assert_abs_diff_eq!(octs[0] * 12.0, 48.0 - 0.5, epsilon = 1e-3);
    assert_eq!(hz_to_octs(&[0.0], 0.0, 12)[0], f32::NEG_INFINITY);
}

#[test]
fn test_cqt_frequencies_octave_spacing() {
    let freqs = cqt_frequencies(84, C1_HZ, 12, 0.0);
    assert_eq!(freqs.len(), 84);
    for i in 12..84 {
        assert_abs_diff_eq!(freqs[i] / freqs[i - 12], 2.0, epsilon = 1e-4);
    }
}

#[test]
fn test_note_names() {
    assert_eq!(hz_to_note(440.0), "A4");
    assert_eq!(hz_to_note(261.63), "C4");
    assert_eq!(hz_to_note(-1.0), "N/A");
    assert_eq!(pitch_class_name(2), "D");
    assert_eq!(pitch_class_name(14), "D");
}

#[test]
fn test_fft_frequencies_spacing() {
    let f = fft_frequencies(8000, 16);
    assert_eq!(f.len(), 9);
    assert_abs_diff_eq!(f[8], 4000.0);
}
