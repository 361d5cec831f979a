/// Audio processing module for decomposing signals into sine components.
///
/// This module provides functionality to:
/// - Read and validate WAV data and downmix it to mono
/// - Transform the signal and pick its strongest spectral components
/// - Resynthesize a waveform from a selection of those components
/// - Keep the latest analysis around for later mixing
mod analysis;
mod cache;
mod synthesis;
pub mod tones;
mod types;
mod wav;

pub use analysis::{analyze, analyze_signal, analyze_with, select_top, transform, Spectrum};
pub use cache::AnalysisCache;
pub use synthesis::{
    synthesize, synthesize_components, DEFAULT_MIX_DURATION, FADE_SECONDS, HEADROOM,
    MAX_RENDER_SAMPLES,
};
pub use types::{
    AnalysisConfig, AudioError, MixSelection, Signal, SpectralComponent, SpectrumResult,
    SynthesizedWaveform, DEFAULT_TOP_K,
};
pub use wav::{encode_signal, encode_waveform, load, read_wav_file, write_wav_file};
