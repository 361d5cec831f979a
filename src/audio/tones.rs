//! Test tone generators.
//!
//! Handy for trying the analyzer without recording anything: each generator
//! returns a mono [`Signal`] that can be encoded with
//! [`encode_signal`](super::encode_signal).
use super::synthesis::render_length;
use super::types::{AudioError, Signal};
use std::f64::consts::{PI, TAU};

/// Plain sine wave with no envelope.
///
/// Sample `i` is taken at `t = i / sample_rate`, so a frequency that is a
/// multiple of `1 / duration` lands exactly on a DFT bin.
pub fn sine(
    frequency: f64,
    amplitude: f64,
    duration: f64,
    sample_rate: u32,
) -> Result<Signal, AudioError> {
    check_frequency(frequency)?;
    render(duration, sample_rate, |t| amplitude * (TAU * frequency * t).sin())
}

/// Sine wave shaped by a half-sine envelope so it starts and ends silent.
pub fn beep(frequency: f64, duration: f64, sample_rate: u32) -> Result<Signal, AudioError> {
    check_frequency(frequency)?;
    render(duration, sample_rate, |t| {
        (TAU * frequency * t).sin() * envelope(t, duration)
    })
}

/// Mean of several sine waves under a half-sine envelope.
pub fn chord(frequencies: &[f64], duration: f64, sample_rate: u32) -> Result<Signal, AudioError> {
    if frequencies.is_empty() {
        return Err(AudioError::InvalidParams(
            "A chord needs at least one frequency".to_string(),
        ));
    }
    for &frequency in frequencies {
        check_frequency(frequency)?;
    }

    let voices = frequencies.len() as f64;
    render(duration, sample_rate, |t| {
        let sum: f64 = frequencies.iter().map(|f| (TAU * f * t).sin()).sum();
        sum / voices * envelope(t, duration)
    })
}

/// Fundamental plus overtones with amplitude `1 / i`, peak-normalized and
/// shaped by a half-sine envelope.
pub fn harmonic_stack(
    fundamental: f64,
    harmonics: usize,
    duration: f64,
    sample_rate: u32,
) -> Result<Signal, AudioError> {
    check_frequency(fundamental)?;
    if harmonics == 0 {
        return Err(AudioError::InvalidParams(
            "Number of harmonics must be positive".to_string(),
        ));
    }

    let raw = render(duration, sample_rate, |t| {
        (1..=harmonics)
            .map(|i| (TAU * fundamental * i as f64 * t).sin() / i as f64)
            .sum()
    })?;

    let peak = raw.samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
    let samples = raw
        .samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let t = i as f64 / sample_rate as f64;
            let s = if peak > 0.0 { s / peak } else { s };
            s * envelope(t, duration) as f32
        })
        .collect();

    Signal::new(samples, sample_rate, 1)
}

fn envelope(t: f64, duration: f64) -> f64 {
    (PI * t / duration).sin()
}

fn check_frequency(frequency: f64) -> Result<(), AudioError> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(AudioError::InvalidParams(format!(
            "Frequency must be positive, got {}",
            frequency
        )));
    }
    Ok(())
}

fn render<F>(duration: f64, sample_rate: u32, wave: F) -> Result<Signal, AudioError>
where
    F: Fn(f64) -> f64,
{
    let len = render_length(sample_rate, duration)?;
    let samples = (0..len)
        .map(|i| wave(i as f64 / sample_rate as f64) as f32)
        .collect();

    Signal::new(samples, sample_rate, 1)
}
