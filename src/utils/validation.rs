/// Validate that an audio buffer holds at least one sample.
///
/// # Example
/// ```
/// use raga::utils::valid_audio;
///
/// assert!(valid_audio(&[0.0, 0.5, -0.5]).is_ok());
/// assert!(valid_audio(&[]).is_err());
/// ```
pub fn valid_audio(y: &[f32]) -> crate::Result<()> {
    if y.is_empty() {
        return Err(crate::Error::EmptyAudio);
    }
    Ok(())
}

/// Validate that a sample rate is strictly positive.
pub fn valid_sample_rate(sr: u32) -> crate::Result<()> {
    if sr == 0 {
        return Err(crate::Error::InvalidSampleRate {
            sr,
            reason: "sample rate must be positive".to_string(),
        });
    }
    Ok(())
}
