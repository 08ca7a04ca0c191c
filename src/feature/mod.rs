//! Feature extraction: mel spectrogram, MFCC, constant-Q chroma, deltas.

pub mod chroma;
pub mod delta;
pub mod mel;
pub mod mfcc;

pub use chroma::{ChromaCqtConfig, chroma_cqt};
pub use delta::delta;
pub use mfcc::{MfccConfig, mfcc};
