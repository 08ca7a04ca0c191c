/// Crate-level error type for raga feature extraction and recognition.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Sample rate is zero or cannot support the configured analysis.
    #[error("invalid sample rate {sr} Hz: {reason}")]
    InvalidSampleRate { sr: u32, reason: String },

    /// Waveform is shorter than one analysis frame.
    #[error("insufficient audio length: got {got} samples, need at least {required}")]
    InsufficientAudioLength { got: usize, required: usize },

    /// Invalid parameter value.
    #[error("invalid parameter `{name}`: got {value}, {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A required dimension is zero or invalid.
    #[error("invalid size for `{name}`: {value} ({reason})")]
    InvalidSize {
        name: &'static str,
        value: usize,
        reason: &'static str,
    },

    /// Audio data is empty when a non-empty signal was required.
    #[error("audio data is empty")]
    EmptyAudio,

    /// Input array has incorrect shape for the operation.
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// Audio decoding and resampling errors.
    #[error(transparent)]
    Audio(#[from] crate::io::AudioError),

    /// File I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for raga operations.
pub type Result<T> = std::result::Result<T, Error>;
