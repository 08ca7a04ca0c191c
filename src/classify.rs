//! Raga classification from extracted features.

use crate::extractor::FeatureMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Ragas the recognizer can report, in label-index order.
pub const RAGA_CLASSES: [&str; 12] = [
    "Bhairav",
    "Yaman",
    "Malkauns",
    "Bageshree",
    "Shankarabharanam",
    "Kafi",
    "Asavari",
    "Bhairavi",
    "Todi",
    "Purvi",
    "Marwa",
    "Khamaj",
];

/// A classifier decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    /// Position of the label in [`Classifier::classes`]
    pub index: usize,
    pub label: String,
}

/// Maps a feature matrix to one of a fixed set of labels.
pub trait Classifier: Send + Sync {
    /// Labels this classifier can return.
    fn classes(&self) -> &[&str];

    /// Pick a label for `features`.
    fn predict(&self, features: &FeatureMatrix) -> crate::Result<Prediction>;
}

/// Placeholder classifier choosing a label uniformly at random.
///
/// The features are only checked for a plausible shape; they do not
/// influence the choice. Seeded instances are reproducible.
///
/// # Example
/// ```
/// use raga::classify::{Classifier, RandomClassifier, RAGA_CLASSES};
///
/// let classifier = RandomClassifier::with_seed(7);
/// assert_eq!(classifier.classes(), &RAGA_CLASSES);
/// ```
#[derive(Debug)]
pub struct RandomClassifier {
    classes: Vec<&'static str>,
    rng: Mutex<StdRng>,
}

impl RandomClassifier {
    /// Classifier over [`RAGA_CLASSES`] seeded from system entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Classifier over [`RAGA_CLASSES`] with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            classes: RAGA_CLASSES.to_vec(),
            rng: Mutex::new(rng),
        }
    }
}

impl Default for RandomClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for RandomClassifier {
    fn classes(&self) -> &[&str] {
        &self.classes
    }

    fn predict(&self, features: &FeatureMatrix) -> crate::Result<Prediction> {
        let (steps, channels) = features.shape();
        if steps == 0 || channels == 0 {
            return Err(crate::Error::ShapeMismatch {
                expected: "a non-empty feature matrix".to_string(),
                got: format!("{steps}x{channels}"),
            });
        }

        let index = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.gen_range(0..self.classes.len())
        };
        let label = self.classes[index].to_string();
        log::info!("predicted raga: {label}");
        Ok(Prediction { index, label })
    }
}
