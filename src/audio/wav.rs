use super::types::{AudioError, Signal, SynthesizedWaveform};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;
use std::path::Path;

/// Decodes a WAV byte stream, converting samples to normalized f32 values.
///
/// This function supports the following WAV formats:
/// - 32-bit float
/// - 8-bit integer
/// - 16-bit integer
/// - 24-bit integer
/// - 32-bit integer
///
/// All integer formats are normalized to the [-1, 1] range.
///
/// # Arguments
/// * `bytes` - The complete contents of a WAV file
///
/// # Returns
/// * `Result<Signal, AudioError>` - Decoded signal or an error
///
/// # Errors
/// * `Format` if the bytes are not a WAV container, the sample format is
///   unsupported, or a float sample is not finite
/// * `EmptySignal` if `bytes` is empty or the container holds no samples
/// * `InvalidParams` if the header declares a zero sample rate
pub fn load(bytes: &[u8]) -> Result<Signal, AudioError> {
    if bytes.is_empty() {
        return Err(AudioError::EmptySignal);
    }

    let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| AudioError::Format(e.to_string()))?;
    let spec = reader.spec();

    if reader.len() == 0 {
        return Err(AudioError::EmptySignal);
    }

    // Convert samples to f32, regardless of input format
    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .map(|s| s.map_err(|e| AudioError::Format(e.to_string())))
            .map(|s| {
                let s = s?;
                if s.is_finite() {
                    Ok(s)
                } else {
                    Err(AudioError::Format("Non-finite sample value".to_string()))
                }
            })
            .collect::<Result<Vec<f32>, AudioError>>()?,
        (SampleFormat::Int, 8) => reader
            .into_samples::<i8>()
            .map(|s| s.map_err(|e| AudioError::Format(e.to_string())))
            .map(|s| Ok(s? as f32 / 128.0))
            .collect::<Result<Vec<f32>, AudioError>>()?,
        (SampleFormat::Int, 16) => reader
            .into_samples::<i16>()
            .map(|s| s.map_err(|e| AudioError::Format(e.to_string())))
            .map(|s| Ok(s? as f32 / 32768.0))
            .collect::<Result<Vec<f32>, AudioError>>()?,
        (SampleFormat::Int, 24) => reader
            .into_samples::<i32>()
            .map(|s| s.map_err(|e| AudioError::Format(e.to_string())))
            .map(|s| Ok(s? as f32 / 8388608.0))
            .collect::<Result<Vec<f32>, AudioError>>()?,
        (SampleFormat::Int, 32) => reader
            .into_samples::<i32>()
            .map(|s| s.map_err(|e| AudioError::Format(e.to_string())))
            .map(|s| Ok(s? as f32 / 2147483648.0))
            .collect::<Result<Vec<f32>, AudioError>>()?,
        _ => {
            return Err(AudioError::Format(format!(
                "Unsupported WAV format: {:?} {}-bit",
                spec.sample_format, spec.bits_per_sample
            )))
        }
    };

    Signal::new(samples, spec.sample_rate, spec.channels)
}

/// Reads a WAV file from disk and decodes it with [`load`].
pub fn read_wav_file(path: &Path) -> Result<Signal, AudioError> {
    let bytes = std::fs::read(path)?;
    load(&bytes)
}

/// Encodes a synthesized waveform as a mono 16-bit PCM WAV byte stream.
pub fn encode_waveform(waveform: &SynthesizedWaveform) -> Result<Vec<u8>, AudioError> {
    encode_pcm16(waveform.samples.iter().copied(), waveform.sample_rate, 1)
}

/// Encodes a float signal as 16-bit PCM WAV, clamping samples to [-1, 1].
pub fn encode_signal(signal: &Signal) -> Result<Vec<u8>, AudioError> {
    let samples = signal
        .samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16);
    encode_pcm16(samples, signal.sample_rate, signal.channels)
}

/// Writes a synthesized waveform to `path` as a WAV file.
pub fn write_wav_file(path: &Path, waveform: &SynthesizedWaveform) -> Result<(), AudioError> {
    let bytes = encode_waveform(waveform)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Writes interleaved 16-bit samples into an in-memory WAV file.
///
/// # Arguments
/// * `samples` - Interleaved PCM samples
/// * `sample_rate` - Sample rate in Hz
/// * `channels` - Number of interleaved channels
///
/// # Returns
/// * `Result<Vec<u8>, AudioError>` - The complete WAV file
fn encode_pcm16<I>(samples: I, sample_rate: u32, channels: u16) -> Result<Vec<u8>, AudioError>
where
    I: IntoIterator<Item = i16>,
{
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer =
        WavWriter::new(&mut cursor, spec).map_err(|e| AudioError::Processing(e.to_string()))?;
    for sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| AudioError::Processing(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| AudioError::Processing(e.to_string()))?;

    Ok(cursor.into_inner())
}
