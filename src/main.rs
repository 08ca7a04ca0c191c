//! Command-line raga recognizer.

use clap::Parser;
use log::{error, info};
use raga::feature::chroma::ChromaCqtConfig;
use raga::{Classifier, ExtractorConfig, FeatureExtractor, FeatureMatrix, Pipeline, RandomClassifier};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "raga",
    version,
    about = "Recognize the raga of an audio or video recording"
)]
struct Cli {
    /// Audio or video file (m4a, mp4, wav, flac, mp3, ogg)
    input: PathBuf,

    /// Analysis sample rate; the input is resampled to it
    #[arg(long, default_value_t = raga::io::DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Time steps in the feature matrix
    #[arg(long, default_value_t = 400)]
    frames: usize,

    /// Samples between analysis frames
    #[arg(long, default_value_t = 512)]
    hop_length: usize,

    /// Seed for the classifier, for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Fixed tuning in fractions of a constant-Q bin (estimated if omitted)
    #[arg(long, allow_hyphen_values = true)]
    tuning: Option<f32>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Write the feature matrix as CSV
    #[arg(long, value_name = "PATH")]
    dump: Option<PathBuf>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // help and version go to stdout and are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> raga::Result<()> {
    let config = ExtractorConfig::default()
        .with_sample_rate(cli.sample_rate)
        .with_frames(cli.frames)
        .with_hop_length(cli.hop_length)
        .with_chroma(ChromaCqtConfig::default().with_tuning(cli.tuning));
    let extractor = FeatureExtractor::new(config)?;
    let classifier: Box<dyn Classifier> = match cli.seed {
        Some(seed) => Box::new(RandomClassifier::with_seed(seed)),
        None => Box::new(RandomClassifier::new()),
    };
    let pipeline = Pipeline::new(extractor, classifier);

    let features = pipeline.features(&cli.input)?;
    info!(
        "feature matrix {:?}, tonic {}",
        features.shape(),
        features.tonic_name()
    );
    if let Some(path) = &cli.dump {
        write_csv(path, &features)?;
        info!("wrote features to {}", path.display());
    }

    let prediction = pipeline.classifier().predict(&features)?;
    println!("Predicted raga: {}", prediction.label);
    Ok(())
}

fn write_csv(path: &Path, features: &FeatureMatrix) -> raga::Result<()> {
    let mut out = BufWriter::new(std::fs::File::create(path)?);

    let (_, n_chroma) = features.chroma().dim();
    let (_, n_mfcc) = features.mfcc().dim();
    let header: Vec<String> = (0..n_chroma)
        .map(|i| format!("chroma_{i}"))
        .chain((0..n_mfcc).map(|i| format!("mfcc_{i}")))
        .chain((0..n_mfcc).map(|i| format!("delta_{i}")))
        .collect();
    writeln!(out, "{}", header.join(","))?;

    for row in features.as_array().rows() {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writeln!(out, "{}", line.join(","))?;
    }
    out.flush()?;
    Ok(())
}
