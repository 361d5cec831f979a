use crate::audio::{AudioError, DEFAULT_MIX_DURATION, DEFAULT_TOP_K};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Settings shared by every front end
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub limits: AnalysisLimits,
}

/// Common configuration settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommonConfig {
    /// Directory where mixes and generated tones are written
    pub output_dir: String,
    /// Number of components kept by an analysis
    pub top_k: usize,
    /// Length of a mix in seconds
    pub mix_duration: f64,
}

/// Bounds on user supplied analysis and mix parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisLimits {
    pub min_top_k: usize,
    pub max_top_k: usize,
    pub max_mix_duration: f64,
    pub max_file_size_mb: u64,
}

impl Default for CommonConfig {
    fn default() -> Self {
        CommonConfig {
            output_dir: "output".to_string(),
            top_k: DEFAULT_TOP_K,
            mix_duration: DEFAULT_MIX_DURATION,
        }
    }
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        AnalysisLimits {
            min_top_k: 1,
            max_top_k: 512,
            max_mix_duration: 60.0,
            max_file_size_mb: 16,
        }
    }
}

impl AnalysisLimits {
    pub fn check_top_k(&self, top_k: usize) -> Result<(), AudioError> {
        if top_k < self.min_top_k || top_k > self.max_top_k {
            return Err(AudioError::InvalidParams(format!(
                "Number of components must be between {} and {}, got {}",
                self.min_top_k, self.max_top_k, top_k
            )));
        }
        Ok(())
    }

    pub fn check_mix_duration(&self, duration: f64) -> Result<(), AudioError> {
        if !(duration > 0.0 && duration <= self.max_mix_duration) {
            return Err(AudioError::InvalidParams(format!(
                "Mix duration must be in (0, {}] seconds, got {}",
                self.max_mix_duration, duration
            )));
        }
        Ok(())
    }

    pub fn check_file_size(&self, bytes: u64) -> Result<(), AudioError> {
        let max_bytes = self.max_file_size_mb.saturating_mul(1024 * 1024);
        if bytes > max_bytes {
            return Err(AudioError::InvalidParams(format!(
                "File is {} bytes, the limit is {} MB",
                bytes, self.max_file_size_mb
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// Load configuration from config.toml
pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    load_config_from(Path::new("config.toml"))
}

/// Load configuration from `path`, falling back to defaults if it is missing
pub fn load_config_from(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    match File::open(path) {
        Ok(mut file) => {
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            Ok(Config::from_toml_str(&contents)?)
        }
        Err(_) => {
            // If file doesn't exist, return default config
            Ok(Config::default())
        }
    }
}

/// Ensure the configured output directory exists
pub fn ensure_output_dir(config: &Config) -> Result<PathBuf, std::io::Error> {
    let dir = PathBuf::from(&config.common.output_dir);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}
