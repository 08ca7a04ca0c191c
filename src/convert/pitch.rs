use super::{A4_HZ, MIDI_A4};

/// Pitch-class names, starting at C.
pub const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Convert frequency (Hz) to MIDI note number.
pub fn hz_to_midi(frequencies: &[f32]) -> Vec<f32> {
    frequencies
        .iter()
        .map(|&f| {
            if f > 0.0 {
                12.0 * (f / A4_HZ).log2() + MIDI_A4
            } else {
                0.0
            }
        })
        .collect()
}

/// Convert frequencies (Hz) to fractional octave numbers, A0 (27.5 Hz) = 0.
///
/// # Arguments
/// * `frequencies` - Frequencies in Hz
/// * `tuning` - Tuning offset in fractional bins
/// * `bins_per_octave` - Number of bins per octave
///
/// # Example
/// ```
/// use raga::convert::hz_to_octs;
///
/// let octs = hz_to_octs(&[440.0, 880.0], 0.0, 12);
/// assert!((octs[0] - 4.0).abs() < 1e-4);
/// assert!((octs[1] - 5.0).abs() < 1e-4);
/// ```
pub fn hz_to_octs(frequencies: &[f32], tuning: f32, bins_per_octave: usize) -> Vec<f32> {
    let a440 = A4_HZ * 2.0_f32.powf(tuning / bins_per_octave as f32);
    let ref_freq = a440 / 16.0;

    frequencies
        .iter()
        .map(|&f| {
            if f > 0.0 {
                (f / ref_freq).log2()
            } else {
                f32::NEG_INFINITY
            }
        })
        .collect()
}

/// Name of a pitch class index, wrapping modulo 12.
pub fn pitch_class_name(index: usize) -> &'static str {
    PITCH_CLASSES[index % 12]
}

/// Convert frequency (Hz) to note name with octave, e.g. `A4`.
pub fn hz_to_note(frequency: f32) -> String {
    if frequency <= 0.0 {
        return "N/A".to_string();
    }
    let midi = (12.0 * (frequency / A4_HZ).log2() + MIDI_A4).round() as i32;
    let octave = midi.div_euclid(12) - 1;
    format!("{}{}", PITCH_CLASSES[midi.rem_euclid(12) as usize], octave)
}
