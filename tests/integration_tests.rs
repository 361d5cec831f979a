// Integration tests for the spectral mixer
//
// These tests verify the end-to-end pipeline from WAV bytes to a remixed WAV,
// going through the analysis cache the way a front end would.
//
// The integration tests ensure:
// 1. Analysis results are cached, replaced and released correctly
// 2. A remix of the strongest component sounds like the original tone
// 3. Concurrent writers never expose a partial result
// 4. Configuration files are parsed with sensible defaults

use spectral_mix::audio::{
    self, AnalysisCache, AnalysisConfig, AudioError, MixSelection, SpectrumResult,
};
use spectral_mix::config::{self, Config};
use std::path::Path;
use std::sync::Arc;
use std::thread;

mod test_utils;
use test_utils::{sine_440_wav, sine_wav, SAMPLE_RATE, TONE_FREQ};

/// Test the cache lifecycle.
///
/// This test verifies:
/// - An empty cache reports that no analysis is available
/// - Analysis results are stored and replaced by newer ones
/// - A failed analysis keeps the previous result
/// - Releasing empties the cache
#[test]
fn test_cache_lifecycle() {
    let cache = AnalysisCache::new();
    assert!(cache.current().is_none());
    assert!(matches!(cache.require(), Err(AudioError::NoAnalysisAvailable)));
    assert!(matches!(
        cache.synthesize(&MixSelection::new([0]), 1.0),
        Err(AudioError::NoAnalysisAvailable)
    ));

    let first = cache
        .analyze(&sine_440_wav(), &AnalysisConfig::default())
        .expect("Failed to analyze tone");
    assert!(Arc::ptr_eq(&first, &cache.require().unwrap()));

    let second = cache
        .analyze(&sine_wav(1000.0, 0.5, 8000), &AnalysisConfig { top_k: 5 })
        .expect("Failed to analyze second tone");
    assert_eq!(cache.current().unwrap().sample_rate, 8000);
    assert_eq!(second.len(), 5);

    assert!(cache.analyze(b"garbage", &AnalysisConfig::default()).is_err());
    assert!(Arc::ptr_eq(&second, &cache.require().unwrap()));

    let released = cache.release().expect("Cache should hold a result");
    assert!(Arc::ptr_eq(&released, &second));
    assert!(cache.current().is_none());
    assert!(cache.release().is_none());
}

/// Test the complete pipeline from WAV bytes to a remixed WAV.
///
/// This comprehensive test verifies:
/// - Analysis of an uploaded tone through the cache
/// - Synthesis of its strongest component for two seconds
/// - Encoding the mix as 16-bit PCM WAV
/// - Re-analysis of the mix finds the same tone
#[test]
fn test_end_to_end_remix() {
    let cache = AnalysisCache::new();
    cache
        .analyze(&sine_440_wav(), &AnalysisConfig::default())
        .expect("Failed to analyze tone");

    let waveform = cache
        .synthesize(&MixSelection::new([0]), audio::DEFAULT_MIX_DURATION)
        .expect("Failed to synthesize");
    assert_eq!(waveform.sample_rate, SAMPLE_RATE);

    let bytes = audio::encode_waveform(&waveform).expect("Failed to encode mix");
    let decoded = audio::load(&bytes).expect("Mix should be a valid WAV");
    assert_eq!(decoded.channels, 1);
    assert_eq!(decoded.samples.len(), waveform.len());

    let remix = audio::analyze(&bytes).expect("Failed to analyze mix");
    let top = remix.components[0];
    assert!(
        (top.frequency - TONE_FREQ).abs() <= remix.bin_resolution(),
        "Remix peak at {} Hz",
        top.frequency
    );
}

/// Test writing a mix to disk and reading it back.
#[test]
fn test_write_wav_file() {
    let result = audio::analyze(&sine_440_wav()).unwrap();
    let waveform = audio::synthesize(&result, &MixSelection::new([0, 1, 2]), 0.25).unwrap();

    let path = std::env::temp_dir().join(format!("spectral_mix_test_{}.wav", std::process::id()));
    audio::write_wav_file(&path, &waveform).expect("Failed to write mix");
    let signal = audio::read_wav_file(&path).expect("Failed to read mix back");
    std::fs::remove_file(&path).ok();

    assert_eq!(signal.sample_rate, SAMPLE_RATE);
    assert_eq!(signal.samples.len(), waveform.len());
}

/// Test that concurrent writers never expose a partial result.
///
/// Each writer stores results whose component count is derived from the
/// sample rate, so a reader can detect a torn value.
#[test]
fn test_cache_concurrent_access() {
    let cache = AnalysisCache::new();
    let template = audio::analyze(&sine_440_wav()).unwrap();

    thread::scope(|scope| {
        for writer in 1..=4u32 {
            let cache = &cache;
            let template = &template;
            scope.spawn(move || {
                for round in 0..50u32 {
                    let count = ((writer * 7 + round) % 30 + 1) as usize;
                    cache.store(SpectrumResult {
                        components: template.components[..count].to_vec(),
                        sample_rate: count as u32 * 1000,
                        sample_count: template.sample_count,
                    });
                }
            });
        }

        for _ in 0..4 {
            let cache = &cache;
            scope.spawn(move || {
                for _ in 0..200 {
                    if let Some(result) = cache.current() {
                        assert_eq!(result.len() as u32 * 1000, result.sample_rate);
                    }
                }
            });
        }
    });

    assert!(cache.current().is_some());
}

/// Test serialization of analysis results for transport.
#[test]
fn test_result_serialization() {
    let result = audio::analyze(&sine_440_wav()).unwrap();
    let json = serde_json::to_string(&result).expect("Failed to serialize");
    let parsed: SpectrumResult = serde_json::from_str(&json).expect("Failed to deserialize");
    assert_eq!(parsed.len(), result.len());
    assert_eq!(parsed.sample_rate, result.sample_rate);
    assert_eq!(parsed.components[0].frequency, result.components[0].frequency);
}

/// Test configuration parsing.
///
/// This test verifies:
/// - Missing sections and fields fall back to defaults
/// - A missing config file yields the default config
/// - Limits reject out-of-range parameters
#[test]
fn test_config_loading() {
    let config = Config::from_toml_str("[common]\ntop_k = 10\n").expect("Failed to parse");
    assert_eq!(config.common.top_k, 10);
    assert_eq!(config.common.mix_duration, audio::DEFAULT_MIX_DURATION);
    assert_eq!(config.common.output_dir, "output");
    assert_eq!(config.limits.max_top_k, 512);

    let config = Config::from_toml_str("").expect("Empty config should parse");
    assert_eq!(config.common.top_k, audio::DEFAULT_TOP_K);

    assert!(Config::from_toml_str("[common]\ntop_k = \"many\"\n").is_err());

    let config = config::load_config_from(Path::new("no/such/config.toml"))
        .expect("Missing config should fall back to defaults");
    assert_eq!(config.common.top_k, audio::DEFAULT_TOP_K);

    let limits = &config.limits;
    assert!(limits.check_top_k(30).is_ok());
    assert!(matches!(limits.check_top_k(0), Err(AudioError::InvalidParams(_))));
    assert!(limits.check_top_k(513).is_err());
    assert!(limits.check_mix_duration(2.0).is_ok());
    assert!(limits.check_mix_duration(0.0).is_err());
    assert!(limits.check_mix_duration(61.0).is_err());
    assert!(limits.check_file_size(16 * 1024 * 1024).is_ok());
    assert!(limits.check_file_size(16 * 1024 * 1024 + 1).is_err());

    let unbounded = config::AnalysisLimits {
        max_file_size_mb: u64::MAX,
        ..Default::default()
    };
    assert!(unbounded.check_file_size(u64::MAX).is_ok());
}
