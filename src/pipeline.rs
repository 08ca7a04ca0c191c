//! End-to-end recognition: decode, preprocess, extract, classify.

use crate::classify::{Classifier, Prediction, RandomClassifier};
use crate::extractor::{ExtractorConfig, FeatureExtractor, FeatureMatrix, Waveform};
use crate::io::{self, LoadOptions};
use std::path::Path;

/// A feature extractor paired with a classifier.
///
/// # Example
/// ```no_run
/// use raga::pipeline::Pipeline;
///
/// let pipeline = Pipeline::with_defaults().unwrap();
/// let prediction = pipeline.recognize("performance.m4a").unwrap();
/// println!("Predicted raga: {}", prediction.label);
/// ```
pub struct Pipeline {
    extractor: FeatureExtractor,
    classifier: Box<dyn Classifier>,
    load: LoadOptions,
}

impl Pipeline {
    /// Files are resampled to the extractor's configured sample rate.
    pub fn new(extractor: FeatureExtractor, classifier: Box<dyn Classifier>) -> Self {
        let load = LoadOptions::default().with_sample_rate(Some(extractor.config().sample_rate));
        Self {
            extractor,
            classifier,
            load,
        }
    }

    /// Default extractor and an unseeded [`RandomClassifier`].
    pub fn with_defaults() -> crate::Result<Self> {
        Ok(Self::new(
            FeatureExtractor::new(ExtractorConfig::default())?,
            Box::new(RandomClassifier::new()),
        ))
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Decode and preprocess `path`, then extract its features.
    pub fn features<P: AsRef<Path>>(&self, path: P) -> crate::Result<FeatureMatrix> {
        let waveform = io::load_waveform(path, &self.load)?;
        self.extractor.extract(&waveform)
    }

    /// Recognize the raga of an audio or video file.
    pub fn recognize<P: AsRef<Path>>(&self, path: P) -> crate::Result<Prediction> {
        let features = self.features(path)?;
        self.classifier.predict(&features)
    }

    /// Recognize the raga of an already decoded mono waveform.
    pub fn recognize_waveform(&self, waveform: &Waveform) -> crate::Result<Prediction> {
        let features = self.extractor.extract(waveform)?;
        self.classifier.predict(&features)
    }
}

/// Recognize the raga of a file with the default pipeline.
pub fn recognize<P: AsRef<Path>>(path: P) -> crate::Result<Prediction> {
    Pipeline::with_defaults()?.recognize(path)
}
