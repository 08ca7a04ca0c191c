//! Feature Extraction Example
//!
//! This example builds a short drone-and-melody signal, extracts the
//! tonic-aligned feature matrix and classifies it.

use raga::{Classifier, ExtractorConfig, FeatureExtractor, RandomClassifier, Waveform, io};
use log::info;

fn main() {
    env_logger::init();
    info!("Feature Extraction Example");

    let sr = 22050;
    let duration = 4.0;

    // Drone on D with a melody walking D, E, F#, A
    info!("Generating drone (D3, A3) and melody...");
    let drone: Vec<f32> = io::tone(146.83, sr, duration)
        .iter()
        .zip(io::tone(220.0, sr, duration).iter())
        .map(|(d, a)| 0.4 * d + 0.2 * a)
        .collect();

    let notes = [293.66, 329.63, 369.99, 440.0];
    let note_len = drone.len() / notes.len();
    let melody: Vec<f32> = notes
        .iter()
        .flat_map(|&f| io::tone(f, sr, note_len as f32 / sr as f32))
        .collect();

    let signal: Vec<f32> = drone
        .iter()
        .zip(melody.iter().chain(std::iter::repeat(&0.0)))
        .map(|(d, m)| d + 0.3 * m)
        .collect();
    info!("Generated {} samples", signal.len());

    let extractor = FeatureExtractor::new(ExtractorConfig::default()).unwrap();
    let features = extractor.extract(&Waveform::new(signal, sr)).unwrap();
    info!("Feature matrix shape: {:?}", features.shape());
    info!("Estimated tonic: {}", features.tonic_name());

    info!("Average tonic-aligned chroma:");
    let chroma = features.chroma();
    for i in 0..chroma.ncols() {
        let avg = chroma.column(i).sum() / chroma.nrows() as f32;
        info!("  - +{:>2} semitones: {:.4}", i, avg);
    }

    let classifier = RandomClassifier::with_seed(0);
    let prediction = classifier.predict(&features).unwrap();
    info!("Predicted raga: {}", prediction.label);
}
