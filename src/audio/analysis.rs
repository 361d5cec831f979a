use super::types::{AnalysisConfig, AudioError, Signal, SpectralComponent, SpectrumResult};
use super::wav;
use rustfft::{num_complex::Complex, FftPlanner};
use std::cmp::Ordering;
use std::f64::consts::PI;

/// Positive-frequency half of a DFT, without the DC and Nyquist bins
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// Frequency of each retained bin in Hz
    pub frequencies: Vec<f64>,
    /// Complex DFT value of each retained bin
    pub bins: Vec<Complex<f64>>,
    /// Sample rate of the transformed signal
    pub sample_rate: u32,
    /// Length of the transformed buffer
    pub len: usize,
}

impl Spectrum {
    /// `|X[k]|` for every retained bin
    pub fn magnitudes(&self) -> Vec<f64> {
        self.bins.iter().map(|c| c.norm()).collect()
    }

    /// `atan2(Im, Re)` for every retained bin, 0 where the magnitude is 0
    pub fn phases(&self) -> Vec<f64> {
        self.bins.iter().map(|&c| phase_of(c)).collect()
    }
}

/// Analyzes a WAV byte stream with the default configuration.
///
/// See [`analyze_with`].
pub fn analyze(bytes: &[u8]) -> Result<SpectrumResult, AudioError> {
    analyze_with(bytes, &AnalysisConfig::default())
}

/// Decodes a WAV byte stream and extracts its strongest sine components.
///
/// # Arguments
/// * `bytes` - The complete contents of a WAV file
/// * `config` - Configuration parameters for the analysis
///
/// # Errors
/// * `Format` or `EmptySignal` if the bytes cannot be decoded
/// * `InvalidParams` if the configuration is invalid
pub fn analyze_with(bytes: &[u8], config: &AnalysisConfig) -> Result<SpectrumResult, AudioError> {
    let signal = wav::load(bytes)?;
    analyze_signal(signal, config)
}

/// Extracts the strongest sine components of an already decoded signal.
///
/// This function performs the following steps:
/// 1. Validates the analysis configuration
/// 2. Downmixes the signal to mono
/// 3. Performs an FFT over the whole buffer
/// 4. Selects the `top_k` bins of greatest magnitude
pub fn analyze_signal(signal: Signal, config: &AnalysisConfig) -> Result<SpectrumResult, AudioError> {
    config.validate()?;

    let mono = signal.to_mono();
    let spectrum = transform(&mono)?;
    if spectrum.bins.is_empty() {
        tracing::warn!(
            samples = mono.samples.len(),
            "Signal is too short to contain any usable frequency bin"
        );
    }

    let result = select_top(
        &spectrum.frequencies,
        &spectrum.magnitudes(),
        &spectrum.phases(),
        config.top_k,
        spectrum.sample_rate,
    )?;

    let result = SpectrumResult {
        sample_count: spectrum.len,
        ..result
    };

    if let Some(peak) = result.components.first() {
        tracing::debug!(
            components = result.len(),
            frequency = peak.frequency,
            magnitude = peak.magnitude,
            "Analysis complete"
        );
    }

    Ok(result)
}

/// Computes the discrete Fourier transform of a mono signal.
///
/// Only bins with `0 < k * sample_rate / N < sample_rate / 2` are kept.
///
/// # Errors
/// * `EmptySignal` if the signal has no samples
/// * `InvalidParams` if the signal is not mono or has a zero sample rate
pub fn transform(mono: &Signal) -> Result<Spectrum, AudioError> {
    if mono.channels != 1 {
        return Err(AudioError::InvalidParams(format!(
            "Transform expects a mono signal, got {} channels",
            mono.channels
        )));
    }
    if mono.sample_rate == 0 {
        return Err(AudioError::InvalidParams(
            "Sample rate must be positive".to_string(),
        ));
    }

    let n = mono.samples.len();
    if n == 0 {
        return Err(AudioError::EmptySignal);
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<Complex<f64>> = mono
        .samples
        .iter()
        .map(|&x| Complex::new(x as f64, 0.0))
        .collect();
    fft.process(&mut buffer);

    // Bins 1..=(N-1)/2 lie strictly between DC and Nyquist
    let last = (n - 1) / 2;
    let resolution = mono.sample_rate as f64 / n as f64;
    let frequencies = (1..=last).map(|k| k as f64 * resolution).collect();
    buffer.truncate(last + 1);
    buffer.remove(0);

    tracing::debug!(samples = n, bins = last, resolution, "Computed spectrum");

    Ok(Spectrum {
        frequencies,
        bins: buffer,
        sample_rate: mono.sample_rate,
        len: n,
    })
}

/// Selects the `k` bins of greatest magnitude.
///
/// `k` is clamped to the number of bins. Components come back ordered by
/// magnitude descending; equal magnitudes are ordered by frequency ascending.
/// Selection runs in O(N + k log k) rather than sorting every bin.
///
/// # Errors
/// * `InvalidParams` if `k` is zero or the input slices differ in length
pub fn select_top(
    frequencies: &[f64],
    magnitudes: &[f64],
    phases: &[f64],
    k: usize,
    sample_rate: u32,
) -> Result<SpectrumResult, AudioError> {
    if k == 0 {
        return Err(AudioError::InvalidParams(
            "Number of components must be positive".to_string(),
        ));
    }
    if frequencies.len() != magnitudes.len() || frequencies.len() != phases.len() {
        return Err(AudioError::InvalidParams(format!(
            "Mismatched bin data: {} frequencies, {} magnitudes, {} phases",
            frequencies.len(),
            magnitudes.len(),
            phases.len()
        )));
    }

    let rank = |a: &usize, b: &usize| -> Ordering {
        magnitudes[*b]
            .total_cmp(&magnitudes[*a])
            .then_with(|| frequencies[*a].total_cmp(&frequencies[*b]))
            .then_with(|| a.cmp(b))
    };

    let n = frequencies.len();
    let k = k.min(n);
    let mut order: Vec<usize> = (0..n).collect();
    if k < n {
        order.select_nth_unstable_by(k - 1, rank);
        order.truncate(k);
    }
    order.sort_unstable_by(rank);

    let components = order
        .into_iter()
        .map(|i| SpectralComponent {
            frequency: frequencies[i],
            magnitude: magnitudes[i],
            phase: phases[i],
        })
        .collect();

    Ok(SpectrumResult {
        components,
        sample_rate,
        sample_count: 0,
    })
}

/// Phase of a bin in radians.
///
/// # Arguments
/// * `c` - FFT bin
///
/// # Returns
/// * `f64` - Angle in (-π, π], or 0 for a zero bin
fn phase_of(c: Complex<f64>) -> f64 {
    if c.norm() == 0.0 {
        return 0.0;
    }
    let phase = c.im.atan2(c.re);
    // Keep phases in (-π, π]
    if phase <= -PI {
        PI
    } else {
        phase
    }
}
