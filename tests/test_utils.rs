// Test utilities and common constants
//
// This file provides shared fixtures used across multiple test files.
// Every WAV fixture is generated in memory, so the tests need no sample files
// on disk.
//
// The utilities include:
// - Constants for the reference tone
// - Builders for WAV byte streams in several sample formats
// - Float comparison helpers

use hound::{SampleFormat, WavSpec, WavWriter};
use spectral_mix::audio::{self, tones};
use std::io::Cursor;

/// Constants for the reference tone
pub const SAMPLE_RATE: u32 = 44100;
pub const TONE_FREQ: f64 = 440.0;

/// Build a 16-bit WAV holding one second of a 440Hz sine at 44.1kHz.
///
/// One second at 44.1kHz gives 1Hz bins, so 440Hz falls exactly on a bin.
pub fn sine_440_wav() -> Vec<u8> {
    sine_wav(TONE_FREQ, 1.0, SAMPLE_RATE)
}

/// Build a 16-bit mono WAV holding a full scale sine wave.
pub fn sine_wav(frequency: f64, duration: f64, sample_rate: u32) -> Vec<u8> {
    let signal = tones::sine(frequency, 1.0, duration, sample_rate).expect("Failed to build sine");
    audio::encode_signal(&signal).expect("Failed to encode sine")
}

/// Build a WAV byte stream from interleaved samples with an arbitrary spec.
///
/// # Arguments
/// * `spec` - Header to write
/// * `samples` - Interleaved integer samples, written with `spec.bits_per_sample`
#[allow(dead_code)]
pub fn int_wav(spec: WavSpec, samples: &[i32]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).expect("Failed to create writer");
        for &sample in samples {
            match spec.bits_per_sample {
                8 => writer.write_sample(sample as i8),
                16 => writer.write_sample(sample as i16),
                _ => writer.write_sample(sample),
            }
            .expect("Failed to write sample");
        }
        writer.finalize().expect("Failed to finalize WAV");
    }
    cursor.into_inner()
}

/// Build a 32-bit float WAV byte stream from interleaved samples.
#[allow(dead_code)]
pub fn float_wav(samples: &[f32], sample_rate: u32, channels: u16) -> Vec<u8> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).expect("Failed to create writer");
        for &sample in samples {
            writer.write_sample(sample).expect("Failed to write sample");
        }
        writer.finalize().expect("Failed to finalize WAV");
    }
    cursor.into_inner()
}

/// Header for integer PCM
#[allow(dead_code)]
pub fn int_spec(bits: u16, sample_rate: u32, channels: u16) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: bits,
        sample_format: SampleFormat::Int,
    }
}

/// Assert that two floats differ by at most `tolerance`.
#[allow(dead_code)]
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "Expected {} to be within {} of {}",
        actual,
        tolerance,
        expected
    );
}

/// Test that verifies the generated fixtures decode.
///
/// This meta-test ensures the fixture builders produce valid WAV data
/// before other tests rely on them.
#[test]
fn test_validate_test_environment() {
    let signal = audio::load(&sine_440_wav()).expect("Reference tone should decode");
    assert_eq!(signal.sample_rate, SAMPLE_RATE);
    assert_eq!(signal.channels, 1);
    assert_eq!(signal.samples.len(), SAMPLE_RATE as usize);
}
