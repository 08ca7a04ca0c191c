//! Tonic-aligned audio features for raga recognition.
//!
//! `raga` turns a recording into a fixed-size matrix describing its melodic
//! and timbral content, and hands that matrix to a classifier that names
//! one of a fixed list of ragas. Everything runs in-process: decoding
//! (symphonia/hound), resampling (rubato), spectral analysis (rustfft,
//! realfft) and classification.
//!
//! # Features
//!
//! - **Feature extraction** — constant-Q chroma rotated to the estimated
//!   tonic, 13 MFCCs and their deltas, fixed to 400 × 38
//! - **Spectral analysis** — STFT, constant-Q transform, mel filterbank,
//!   dB scaling, DCT
//! - **Pitch & tuning** — piptrack, tuning estimation, tonic estimation
//! - **Audio I/O** — MP4/M4A/WAV/FLAC/MP3/OGG decoding, mono mixdown,
//!   sinc resampling
//! - **Classification** — `Classifier` trait, random baseline
//!
//! # Quick Start
//!
//! ```rust
//! use raga::{ExtractorConfig, FeatureExtractor, Waveform, io};
//! use raga::feature::chroma::ChromaCqtConfig;
//!
//! // 2 seconds of D4 at 22050 Hz
//! let waveform = Waveform::new(io::tone(293.66, 22050, 2.0), 22050);
//!
//! let config = ExtractorConfig::default()
//!     .with_frames(64)
//!     .with_chroma(ChromaCqtConfig::default().with_fmin(130.81).with_n_octaves(4));
//! let extractor = FeatureExtractor::new(config).unwrap();
//!
//! let features = extractor.extract(&waveform).unwrap();
//! assert_eq!(features.shape(), (64, 38));
//! assert_eq!(features.tonic_name(), "D");
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`extractor`] | `FeatureExtractor`, `Waveform`, `FeatureMatrix` |
//! | [`pipeline`] | Load → extract → classify |
//! | [`classify`] | `Classifier` trait, raga labels, random baseline |
//! | [`io`] | Audio decoding, mono mixdown, resampling, test tones |
//! | [`spectrum`] | STFT, power spectrogram, dB conversion |
//! | [`cqt`] | Constant-Q transform |
//! | [`feature`] | Mel, MFCC, constant-Q chroma, delta |
//! | [`pitch`] | piptrack, tuning estimation |
//! | [`tonic`] | Tonic estimation and chroma rotation |
//! | [`filters`] | Constant-Q filter design |
//! | [`convert`] | Frequency and pitch conversions |
//! | [`utils`] | Validation, framing, stacking, normalization |
//! | [`window`] | Hann window |
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`], which is an alias for
//! `std::result::Result<T, Error>`. The [`Error`] enum covers invalid
//! sample rates, audio that is too short, invalid parameters, shape
//! mismatches, and decoding failures.
//!
//! # Safety
//!
//! This crate uses `#![deny(unsafe_code)]`, so there is no unsafe Rust
//! anywhere.
//!
//! # Feature Flags
//!
//! | Flag | Description |
//! |------|-------------|
//! | `parallel` | Extract batches of waveforms on the rayon thread pool |

#![deny(unsafe_code)]

pub mod error;
pub use error::{Error, Result};

pub mod classify;
pub mod convert;
pub mod cqt;
pub mod extractor;
pub mod feature;
pub mod fft;
pub mod filters;
pub mod io;
pub mod pipeline;
pub mod pitch;
pub mod spectrum;
pub mod tonic;
pub mod utils;
pub mod window;

pub use classify::{Classifier, Prediction, RAGA_CLASSES, RandomClassifier};
pub use extractor::{ExtractorConfig, FeatureExtractor, FeatureMatrix, Waveform};
pub use pipeline::{Pipeline, recognize};
pub use tonic::{estimate_tonic, rotate_to_tonic};
