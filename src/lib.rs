//! Spectral decomposition and additive resynthesis of audio signals.
//!
//! The [`audio`] module turns a PCM buffer into its dominant sine components
//! and rebuilds a waveform from any subset of them. [`config`] holds the
//! settings shared by the CLI and any other front end.
pub mod audio;
pub mod config;
