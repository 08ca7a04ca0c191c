//! Audio decoding, mono mixdown, resampling and test signals.

use crate::extractor::Waveform;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use ndarray::Array2;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Sample rate everything is resampled to unless told otherwise.
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("hound error: {0}")]
    Hound(#[from] hound::Error),
    #[error("symphonia error: {0}")]
    Symphonia(SymphoniaError),
    #[error("no audio track found")]
    NoAudioTrack,
    #[error("unsupported number of channels")]
    UnsupportedChannels,
    #[error("resampling error: {0}")]
    Resample(String),
}

impl From<SymphoniaError> for AudioError {
    fn from(err: SymphoniaError) -> Self {
        Self::Symphonia(err)
    }
}

/// How a file is turned into an analysis waveform.
///
/// # Example
/// ```
/// use raga::io::LoadOptions;
///
/// let opts = LoadOptions::default().with_sample_rate(Some(16000));
/// assert!(opts.mono);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Resample to this rate; `None` keeps the file's rate
    pub sample_rate: Option<u32>,
    /// Average all channels into one
    pub mono: bool,
}

impl LoadOptions {
    pub fn with_sample_rate(mut self, sample_rate: Option<u32>) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_mono(mut self, mono: bool) -> Self {
        self.mono = mono;
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sample_rate: Some(DEFAULT_SAMPLE_RATE),
            mono: true,
        }
    }
}

/// Read a WAV file with hound.
///
/// Integer samples are scaled to [-1, 1).
///
/// # Returns
/// Audio of shape (channels, frames) and its spec
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<(Array2<f32>, AudioSpec), AudioError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(AudioError::UnsupportedChannels);
    }

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, _) => reader.samples::<f32>().collect::<Result<_, _>>()?,
        (SampleFormat::Int, bits) if bits <= 16 => {
            let scale = (1i32 << (bits - 1)) as f32;
            reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
        (SampleFormat::Int, bits) => {
            let scale = (1i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let data = deinterleave(&samples, spec.channels as usize);
    Ok((
        data,
        AudioSpec {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        },
    ))
}

/// Decode the first audio track of any container symphonia can probe.
pub fn decode<P: AsRef<Path>>(path: P) -> Result<(Array2<f32>, AudioSpec), AudioError> {
    let path_ref = path.as_ref();
    let mut hint = Hint::new();
    if let Some(ext) = path_ref.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let file = std::fs::File::open(path_ref).map_err(SymphoniaError::IoError)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.sample_rate.is_some())
        .ok_or(AudioError::NoAudioTrack)?
        .clone();

    let sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(0);

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track.id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(audio) => audio,
            Err(SymphoniaError::IoError(_)) => break,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::debug!("skipping undecodable packet: {msg}");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        // Some containers only reveal the layout once the first packet decodes
        if channels == 0 {
            channels = decoded.spec().channels.count();
        }
        let mut sb = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        sb.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sb.samples());
    }

    if channels == 0 {
        return Err(AudioError::UnsupportedChannels);
    }
    let channels = u16::try_from(channels).map_err(|_| AudioError::UnsupportedChannels)?;

    Ok((
        deinterleave(&samples, channels as usize),
        AudioSpec {
            sample_rate,
            channels,
        },
    ))
}

fn deinterleave(samples: &[f32], channels: usize) -> Array2<f32> {
    let frames = samples.len() / channels.max(1);
    Array2::from_shape_fn((channels, frames), |(ch, frame)| {
        samples[frame * channels + ch]
    })
}

/// Load audio from a file, mixing down and resampling per `options`.
///
/// WAV files are read with hound; everything else (MP4/M4A, FLAC, MP3,
/// OGG) goes through symphonia.
///
/// # Returns
/// Audio of shape (channels, frames) and the spec after conversion
///
/// # Example
/// ```no_run
/// use raga::io::{self, LoadOptions};
///
/// let (data, spec) = io::load("recording.m4a", &LoadOptions::default()).unwrap();
/// assert_eq!(spec.sample_rate, 22050);
/// assert_eq!(data.nrows(), 1);
/// ```
pub fn load<P: AsRef<Path>>(
    path: P,
    options: &LoadOptions,
) -> crate::Result<(Array2<f32>, AudioSpec)> {
    let path = path.as_ref();
    log::info!("decoding audio from {}", path.display());
    let is_wav = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
    let (mut data, mut spec) = if is_wav {
        load_wav(path)?
    } else {
        decode(path)?
    };
    log::info!(
        "decoded {} frames, {} channel(s) at {} Hz",
        data.ncols(),
        spec.channels,
        spec.sample_rate
    );

    log::info!("preprocessing audio");
    if options.mono && spec.channels > 1 {
        data = to_mono(&data);
        spec.channels = 1;
    }
    if let Some(target) = options.sample_rate
        && target != spec.sample_rate
    {
        crate::utils::valid_sample_rate(spec.sample_rate)?;
        crate::utils::valid_sample_rate(target)?;
        data = resample(&data, spec.sample_rate, target)?;
        spec.sample_rate = target;
    }
    log::info!(
        "preprocessed to {} frames, {} channel(s) at {} Hz",
        data.ncols(),
        spec.channels,
        spec.sample_rate
    );

    Ok((data, spec))
}

/// Load a file as a mono waveform ready for feature extraction.
pub fn load_waveform<P: AsRef<Path>>(path: P, options: &LoadOptions) -> crate::Result<Waveform> {
    let (data, spec) = load(path, &options.clone().with_mono(true))?;
    let mono = to_mono(&data);
    Ok(Waveform::new(mono.row(0).to_vec(), spec.sample_rate))
}

/// Resample every channel with a windowed-sinc interpolator.
///
/// The resampler's group delay is removed, so output sample `i` lines up
/// with input time `i / dst_sr`. The output has
/// `round(frames * dst_sr / src_sr)` frames.
pub fn resample(data: &Array2<f32>, src_sr: u32, dst_sr: u32) -> Result<Array2<f32>, AudioError> {
    if src_sr == dst_sr {
        return Ok(data.clone());
    }

    let (channels, frames) = data.dim();
    if channels == 0 || frames == 0 {
        return Ok(Array2::<f32>::zeros((channels, 0)));
    }

    let ratio = dst_sr as f64 / src_sr as f64;
    let expected = (frames as f64 * ratio).round() as usize;

    let chunk_size = 1024usize;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size, channels)
        .map_err(|e| AudioError::Resample(e.to_string()))?;
    let delay = resampler.output_delay();

    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(expected + delay); channels];
    let mut offset = 0usize;
    // Keep feeding (zeros past the end) until the delayed tail is flushed
    while output[0].len() < expected + delay {
        let chunk: Vec<Vec<f32>> = data
            .rows()
            .into_iter()
            .map(|row| {
                let mut buf = vec![0.0f32; chunk_size];
                if offset < frames {
                    let end = (offset + chunk_size).min(frames);
                    for (slot, &v) in buf.iter_mut().zip(row.slice(ndarray::s![offset..end])) {
                        *slot = v;
                    }
                }
                buf
            })
            .collect();

        let chunk_out = resampler
            .process(&chunk, None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        for (dst, src) in output.iter_mut().zip(chunk_out) {
            dst.extend_from_slice(&src);
        }
        offset += chunk_size;
    }

    Ok(Array2::from_shape_fn((channels, expected), |(ch, i)| {
        output[ch][delay + i]
    }))
}

/// Convert multi-channel audio to mono by averaging channels.
pub fn to_mono(data: &Array2<f32>) -> Array2<f32> {
    if data.nrows() <= 1 {
        return data.clone();
    }
    let channels = data.nrows() as f32;
    data.sum_axis(ndarray::Axis(0)).mapv(|v| v / channels).insert_axis(ndarray::Axis(0))
}

/// Generate a pure tone.
pub fn tone(frequency: f32, sr: u32, duration: f32) -> Vec<f32> {
    let n_samples = (duration * sr as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sr as f32;
    (0..n_samples)
        .map(|i| (angular_freq * i as f32).sin())
        .collect()
}

/// Save audio data to a 16-bit PCM WAV file.
///
/// Samples are clipped to [-1.0, 1.0] before quantization.
///
/// # Arguments
/// * `path` - Path to save the WAV file
/// * `data` - Audio data with shape (channels, frames)
/// * `sample_rate` - Sample rate in Hz
pub fn save_wav<P: AsRef<Path>>(
    path: P,
    data: &Array2<f32>,
    sample_rate: u32,
) -> crate::Result<()> {
    let channels = u16::try_from(data.nrows()).map_err(|_| AudioError::UnsupportedChannels)?;
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(AudioError::Hound)?;
    for frame in data.columns() {
        for &sample in frame.iter() {
            let s = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(s).map_err(AudioError::Hound)?;
        }
    }
    writer.finalize().map_err(AudioError::Hound)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn to_mono_averages_channels() {
        let stereo = array![[1.0f32, 0.0, 0.5], [0.0, 1.0, -0.5]];
        let mono = to_mono(&stereo);
        assert_eq!(mono, array![[0.5f32, 0.5, 0.0]]);
    }

    #[test]
    fn to_mono_keeps_single_channel() {
        let data = array![[0.25f32, -0.25]];
        assert_eq!(to_mono(&data), data);
    }

    #[test]
    fn resample_length_follows_ratio() {
        let y = Array2::from_shape_vec((1, 44100), tone(440.0, 44100, 1.0)).unwrap();
        let out = resample(&y, 44100, 22050).unwrap();
        assert_eq!(out.dim(), (1, 22050));
    }

    #[test]
    fn resample_same_rate_is_identity() {
        let y = array![[0.1f32, 0.2, 0.3]];
        assert_eq!(resample(&y, 8000, 8000).unwrap(), y);
    }

    #[test]
    fn resample_preserves_tone_frequency() {
        let y = Array2::from_shape_vec((1, 16000), tone(500.0, 16000, 1.0)).unwrap();
        let out = resample(&y, 16000, 22050).unwrap();
        let row = out.row(0);
        // Count zero crossings over the steady middle section
        let mid: Vec<f32> = row.iter().skip(2205).take(17640).copied().collect();
        let crossings = mid.windows(2).filter(|w| w[0] < 0.0 && w[1] >= 0.0).count();
        // 0.8 s at 500 Hz
        assert!((crossings as i64 - 400).abs() <= 2, "crossings {crossings}");
    }

    #[test]
    fn tone_length() {
        assert_eq!(tone(100.0, 8000, 0.5).len(), 4000);
    }
}
