use ndarray::Array2;
use raga::feature::chroma::ChromaCqtConfig;
use raga::{
    Classifier, ExtractorConfig, FeatureExtractor, Pipeline, RAGA_CLASSES, RandomClassifier,
    Waveform, io,
};

fn pipeline(seed: u64) -> Pipeline {
    let config = ExtractorConfig::default().with_frames(64).with_chroma(
        ChromaCqtConfig::default()
            .with_fmin(130.812_78)
            .with_n_octaves(4)
            .with_tuning(Some(0.0)),
    );
    Pipeline::new(
        FeatureExtractor::new(config).unwrap(),
        Box::new(RandomClassifier::with_seed(seed)),
    )
}

#[test]
fn recognizes_a_file() {
    let path = std::env::temp_dir().join(format!("raga_pipeline_{}.wav", std::process::id()));
    let y = io::tone(261.63, 44100, 1.5);
    let frames = y.len();
    io::save_wav(&path, &Array2::from_shape_vec((1, frames), y).unwrap(), 44100).unwrap();

    let p = pipeline(3);
    let features = p.features(&path).unwrap();
    let prediction = p.recognize(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(features.shape(), (64, 38));
    assert_eq!(features.tonic_name(), "C");
    assert!(RAGA_CLASSES.contains(&prediction.label.as_str()));
    assert_eq!(RAGA_CLASSES[prediction.index], prediction.label);
}

#[test]
fn same_seed_same_prediction() {
    let w = Waveform::new(io::tone(220.0, 22050, 0.5), 22050);
    let a = pipeline(11).recognize_waveform(&w).unwrap();
    let b = pipeline(11).recognize_waveform(&w).unwrap();
    assert_eq!(a, b);
}

#[test]
fn extraction_errors_propagate() {
    let w = Waveform::new(vec![0.0; 512], 22050);
    assert!(matches!(
        pipeline(0).recognize_waveform(&w),
        Err(raga::Error::InsufficientAudioLength { .. })
    ));
}

#[test]
fn pipeline_exposes_its_parts() {
    let p = pipeline(0);
    assert_eq!(p.classifier().classes().len(), 12);
    assert_eq!(p.extractor().config().frames, 64);
}
