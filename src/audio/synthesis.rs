use super::types::{AudioError, MixSelection, SpectralComponent, SpectrumResult, SynthesizedWaveform};
use std::f64::consts::TAU;

/// Length of a mix when the caller does not ask for one (seconds)
pub const DEFAULT_MIX_DURATION: f64 = 2.0;

/// Peak level of a normalized mix, as a fraction of full scale
pub const HEADROOM: f64 = 0.8;

/// Length of the fade-in and fade-out ramps (seconds)
pub const FADE_SECONDS: f64 = 0.01;

/// Largest buffer that can be rendered, the sample capacity of a 16-bit WAV data chunk
pub const MAX_RENDER_SAMPLES: usize = (u32::MAX / 2) as usize;

/// Resynthesizes the selected components of an analysis.
///
/// The mix uses the sample rate of the analyzed signal.
///
/// # Errors
/// * `EmptySelection` if `selection` is empty
/// * `IndexOutOfRange` if `selection` names a component `result` lacks
/// * `InvalidParams` if `duration` is not positive or too long to render
pub fn synthesize(
    result: &SpectrumResult,
    selection: &MixSelection,
    duration: f64,
) -> Result<SynthesizedWaveform, AudioError> {
    let components = result.select(selection)?;
    synthesize_components(&components, result.sample_rate, duration)
}

/// Builds a waveform as the sum of `components`.
///
/// This function performs the following steps:
/// 1. Samples every sinusoid on an evenly spaced time axis over `[0, duration]`
/// 2. Scales the sum so its peak sits at [`HEADROOM`]
/// 3. Applies linear fades of [`FADE_SECONDS`] at both ends
/// 4. Quantizes to 16-bit PCM
///
/// # Errors
/// * `EmptySelection` if `components` is empty
/// * `InvalidParams` if `sample_rate` or `duration` is not positive, or the
///   duration is shorter than one sample or longer than [`MAX_RENDER_SAMPLES`]
pub fn synthesize_components(
    components: &[SpectralComponent],
    sample_rate: u32,
    duration: f64,
) -> Result<SynthesizedWaveform, AudioError> {
    if components.is_empty() {
        return Err(AudioError::EmptySelection);
    }
    let len = render_length(sample_rate, duration)?;

    let mut mix = additive_mix(components, len, duration);
    normalize(&mut mix, HEADROOM);
    apply_fades(&mut mix, fade_length(sample_rate, len));

    tracing::debug!(
        components = components.len(),
        samples = len,
        sample_rate,
        "Synthesized mix"
    );

    Ok(SynthesizedWaveform {
        samples: quantize(&mix),
        sample_rate,
    })
}

/// Number of samples needed to render `duration` seconds at `sample_rate`.
///
/// # Arguments
/// * `sample_rate` - Output sample rate in Hz
/// * `duration` - Length of the output in seconds
///
/// # Returns
/// * `Result<usize, AudioError>` - `round(sample_rate * duration)`
///
/// # Errors
/// * `InvalidParams` if either argument is not positive, or the result is
///   zero or above [`MAX_RENDER_SAMPLES`]
pub(crate) fn render_length(sample_rate: u32, duration: f64) -> Result<usize, AudioError> {
    if sample_rate == 0 {
        return Err(AudioError::InvalidParams(
            "Sample rate must be positive".to_string(),
        ));
    }
    if !duration.is_finite() || duration <= 0.0 {
        return Err(AudioError::InvalidParams(format!(
            "Duration must be positive, got {}",
            duration
        )));
    }

    let max = MAX_RENDER_SAMPLES.min(isize::MAX as usize / std::mem::size_of::<f64>());
    let len = (sample_rate as f64 * duration).round();
    if len < 1.0 {
        return Err(AudioError::InvalidParams(format!(
            "Duration {}s is shorter than one sample at {}Hz",
            duration, sample_rate
        )));
    }
    if len > max as f64 {
        return Err(AudioError::InvalidParams(format!(
            "Duration {}s at {}Hz needs {} samples, the limit is {}",
            duration, sample_rate, len, max
        )));
    }

    Ok(len as usize)
}

/// Sums the components on an evenly spaced time axis over `[0, duration]`.
///
/// # Arguments
/// * `components` - Sinusoids to add together
/// * `len` - Number of output samples
/// * `duration` - Time of the last sample in seconds
///
/// # Returns
/// * `Vec<f64>` - Unnormalized mix
fn additive_mix(components: &[SpectralComponent], len: usize, duration: f64) -> Vec<f64> {
    let step = if len > 1 {
        duration / (len - 1) as f64
    } else {
        0.0
    };

    let mut mix = vec![0.0; len];
    for component in components {
        let omega = TAU * component.frequency;
        for (i, sample) in mix.iter_mut().enumerate() {
            let t = i as f64 * step;
            *sample += component.magnitude * (omega * t + component.phase).sin();
        }
    }
    mix
}

/// Scales `samples` so the largest absolute value equals `target`.
///
/// Silence is left untouched.
fn normalize(samples: &mut [f64], target: f64) {
    let peak = samples.iter().fold(0.0_f64, |acc, s| acc.max(s.abs()));
    if peak > 0.0 {
        let gain = target / peak;
        samples.iter_mut().for_each(|s| *s *= gain);
    }
}

/// Number of samples in each fade ramp.
///
/// # Arguments
/// * `sample_rate` - Output sample rate in Hz
/// * `len` - Length of the whole buffer
///
/// # Returns
/// * `usize` - [`FADE_SECONDS`] worth of samples, at most half the buffer
fn fade_length(sample_rate: u32, len: usize) -> usize {
    ((FADE_SECONDS * sample_rate as f64) as usize).min(len / 2)
}

/// Ramps the first `fade` samples from 0 to 1 and the last `fade` from 1 to 0.
fn apply_fades(samples: &mut [f64], fade: usize) {
    if fade == 0 {
        return;
    }

    let ramp = |i: usize| {
        if fade > 1 {
            i as f64 / (fade - 1) as f64
        } else {
            0.0
        }
    };

    let len = samples.len();
    for i in 0..fade {
        samples[i] *= ramp(i);
        samples[len - fade + i] *= 1.0 - ramp(i);
    }
}

/// Converts normalized samples to 16-bit PCM.
///
/// # Arguments
/// * `samples` - Samples in the [-1, 1] range, clamped if outside it
///
/// # Returns
/// * `Vec<i16>` - Samples scaled to `i16::MAX` and rounded
fn quantize(samples: &[f64]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f64).round() as i16)
        .collect()
}
