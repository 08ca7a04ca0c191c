mod array;
mod framing;
mod matrix;
mod validation;

// Array operations: column normalization, row sparsification
pub use array::{NormType, normalize_columns, sparsify_indices};

// Framing operations
pub use framing::fix_length_frames;

// Matrix operations
pub use matrix::{align_frames, vstack};

// Validation operations
pub use validation::{valid_audio, valid_sample_rate};

#[cfg(test)]
mod tests;
