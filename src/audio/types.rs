use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::f64::consts::TAU;
use std::fmt;

/// Number of components kept by an analysis unless configured otherwise
pub const DEFAULT_TOP_K: usize = 30;

/// A decoded PCM signal
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Interleaved samples normalized to [-1, 1] range
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of audio channels
    pub channels: u16,
}

/// One detected sinusoid, `magnitude * sin(2π * frequency * t + phase)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralComponent {
    /// Frequency in Hz, strictly between 0 and the Nyquist frequency
    pub frequency: f64,
    /// Magnitude of the DFT bin
    pub magnitude: f64,
    /// Phase in radians, in (-π, π]
    pub phase: f64,
}

/// The strongest components of a signal, ordered by magnitude descending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumResult {
    pub components: Vec<SpectralComponent>,
    /// Sample rate of the analyzed signal in Hz
    pub sample_rate: u32,
    /// Length of the analyzed mono buffer, 0 when unknown
    pub sample_count: usize,
}

/// Unique, ordered indices into a [`SpectrumResult`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MixSelection {
    indices: BTreeSet<usize>,
}

/// Quantized 16-bit mono PCM produced by the synthesizer
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedWaveform {
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

/// Configuration for spectral analysis
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Number of components to keep
    pub top_k: usize,
}

/// Errors that can occur during audio processing
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// IO errors when reading/writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input is not a recognized PCM container or is corrupt
    #[error("Unrecognized audio format: {0}")]
    Format(String),

    /// The input holds no samples
    #[error("Signal contains no samples")]
    EmptySignal,

    /// Invalid parameter values
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// A mix was requested without any components
    #[error("No components selected")]
    EmptySelection,

    /// A mix referenced a component the analysis does not have
    #[error("Component index {index} is out of range (analysis has {len} components)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Synthesis or export was requested before any analysis ran
    #[error("No analysis available, analyze a signal first")]
    NoAnalysisAvailable,

    /// General processing errors
    #[error("Processing error: {0}")]
    Processing(String),
}

impl Signal {
    /// Creates a signal from an already decoded buffer.
    ///
    /// # Errors
    /// * `InvalidParams` if the sample rate or channel count is zero
    /// * `EmptySignal` if there are no samples
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidParams(
                "Sample rate must be positive".to_string(),
            ));
        }
        if channels == 0 {
            return Err(AudioError::InvalidParams(
                "Channel count must be positive".to_string(),
            ));
        }
        if samples.is_empty() {
            return Err(AudioError::EmptySignal);
        }
        Ok(Signal {
            samples,
            sample_rate,
            channels,
        })
    }

    /// Number of sample frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Downmixes to a single channel by averaging every frame.
    ///
    /// A mono signal is returned unchanged. A trailing partial frame is dropped.
    pub fn to_mono(self) -> Signal {
        if self.channels <= 1 {
            return self;
        }

        let channels = self.channels as usize;
        let samples = self
            .samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        Signal {
            samples,
            sample_rate: self.sample_rate,
            channels: 1,
        }
    }
}

impl SpectralComponent {
    /// Evaluates the sinusoid at time `t` (seconds)
    pub fn value_at(&self, t: f64) -> f64 {
        self.magnitude * (TAU * self.frequency * t + self.phase).sin()
    }

    /// Human readable form of the sinusoid
    pub fn equation(&self) -> String {
        format!(
            "y(t) = {:.2} * sin(2π * {:.2} * t + {:.2})",
            self.magnitude, self.frequency, self.phase
        )
    }

    /// Samples the sinusoid at `points` evenly spaced times over `[0, duration]`.
    ///
    /// Returns `(t, y)` pairs suitable for plotting.
    pub fn preview(&self, duration: f64, points: usize) -> Vec<(f64, f64)> {
        let step = if points > 1 {
            duration / (points - 1) as f64
        } else {
            0.0
        };
        (0..points)
            .map(|i| {
                let t = i as f64 * step;
                (t, self.value_at(t))
            })
            .collect()
    }
}

impl fmt::Display for SpectralComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.equation())
    }
}

impl SpectrumResult {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SpectralComponent> {
        self.components.get(index)
    }

    /// Frequency spacing between adjacent DFT bins in Hz
    pub fn bin_resolution(&self) -> f64 {
        if self.sample_count == 0 {
            return 0.0;
        }
        self.sample_rate as f64 / self.sample_count as f64
    }

    /// Resolves a selection into the components it names.
    ///
    /// # Errors
    /// * `EmptySelection` if the selection is empty
    /// * `IndexOutOfRange` for the first index this result does not contain
    pub fn select(&self, selection: &MixSelection) -> Result<Vec<SpectralComponent>, AudioError> {
        if selection.is_empty() {
            return Err(AudioError::EmptySelection);
        }

        selection
            .iter()
            .map(|index| {
                self.get(index)
                    .copied()
                    .ok_or(AudioError::IndexOutOfRange {
                        index,
                        len: self.len(),
                    })
            })
            .collect()
    }
}

impl MixSelection {
    pub fn new<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        MixSelection {
            indices: indices.into_iter().collect(),
        }
    }

    /// Selects every component of `result`
    pub fn all(result: &SpectrumResult) -> Self {
        Self::new(0..result.len())
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }
}

impl FromIterator<usize> for MixSelection {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl SynthesizedWaveform {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> u16 {
        self.samples
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl AnalysisConfig {
    /// Validates the configuration
    ///
    /// # Returns
    /// * `Ok(())` if the configuration is valid
    /// * `Err(AudioError)` if the component count is zero
    pub fn validate(&self) -> Result<(), AudioError> {
        if self.top_k == 0 {
            return Err(AudioError::InvalidParams(
                "Number of components must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
