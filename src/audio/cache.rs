use super::analysis::analyze_with;
use super::synthesis::synthesize;
use super::types::{AnalysisConfig, AudioError, MixSelection, SpectrumResult, SynthesizedWaveform};
use std::sync::{Arc, PoisonError, RwLock};

/// Holds the most recent analysis so it can be remixed later.
///
/// The cache is an owned value: a front end keeps one per session and passes
/// it wherever mixing happens. Writers replace the whole result at once, so a
/// reader sees either a complete [`SpectrumResult`] or none. The last writer
/// wins.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    latest: RwLock<Option<Arc<SpectrumResult>>>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any previous result and returns a handle to the new one
    pub fn store(&self, result: SpectrumResult) -> Arc<SpectrumResult> {
        let result = Arc::new(result);
        // A poisoned lock still holds a whole Arc, never a partial write
        let mut latest = self.latest.write().unwrap_or_else(PoisonError::into_inner);
        *latest = Some(Arc::clone(&result));
        result
    }

    pub fn current(&self) -> Option<Arc<SpectrumResult>> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Like [`current`](Self::current), but treats an empty cache as an error.
    pub fn require(&self) -> Result<Arc<SpectrumResult>, AudioError> {
        self.current().ok_or(AudioError::NoAnalysisAvailable)
    }

    /// Drops the stored result, returning it if there was one
    pub fn release(&self) -> Option<Arc<SpectrumResult>> {
        self.latest
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Analyzes a WAV byte stream and stores the result.
    ///
    /// A failed analysis leaves the previous result in place.
    pub fn analyze(
        &self,
        bytes: &[u8],
        config: &AnalysisConfig,
    ) -> Result<Arc<SpectrumResult>, AudioError> {
        let result = analyze_with(bytes, config)?;
        tracing::info!(
            components = result.len(),
            sample_rate = result.sample_rate,
            "Stored new analysis"
        );
        Ok(self.store(result))
    }

    /// Resynthesizes components of the stored analysis.
    ///
    /// # Errors
    /// * `NoAnalysisAvailable` if nothing has been analyzed yet
    /// * Any error of [`synthesize`]
    pub fn synthesize(
        &self,
        selection: &MixSelection,
        duration: f64,
    ) -> Result<SynthesizedWaveform, AudioError> {
        let result = self.require()?;
        synthesize(&result, selection, duration)
    }
}
