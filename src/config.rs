//! Scoring configuration.
//!
//! Every knob has a stated default. Values come from a TOML file, from CLI
//! flags, or both; [`AnalysisConfig::validate`] runs before any analysis.
//!
//! ```toml
//! rolling_window = 7
//! similarity_cutoff = 0.9
//! beat_top_k = 5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, Result};
use crate::rolling::RollingWindow;

pub const MAX_ROLLING_WINDOW: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Sentences per rolling-average window.
    pub rolling_window: RollingWindow,
    /// Tokens per moving-TTR window.
    pub ttr_window: usize,
    pub mtld_threshold: f64,
    /// Minimum similarity for a probable name variant.
    pub similarity_cutoff: f64,
    pub variant_min_len: usize,
    pub beat_top_k: usize,
    /// Tokens per repetition window.
    pub repetition_window: usize,
    /// Occurrences within one window that flag a word.
    pub repetition_threshold: usize,
    pub words_per_minute: usize,
    /// Maximum input length in characters.
    pub max_text_length: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rolling_window: RollingWindow::default(),
            ttr_window: 200,
            mtld_threshold: 0.72,
            similarity_cutoff: 0.88,
            variant_min_len: 3,
            beat_top_k: 3,
            repetition_window: 80,
            repetition_threshold: 6,
            words_per_minute: 250,
            max_text_length: 100_000,
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rolling_window.get() > MAX_ROLLING_WINDOW {
            return Err(MetricsError::InvalidConfig(format!(
                "rolling_window must be at most {MAX_ROLLING_WINDOW}, got {}",
                self.rolling_window.get()
            )));
        }
        for (name, value) in [
            ("ttr_window", self.ttr_window),
            ("beat_top_k", self.beat_top_k),
            ("repetition_window", self.repetition_window),
            ("repetition_threshold", self.repetition_threshold),
            ("words_per_minute", self.words_per_minute),
            ("max_text_length", self.max_text_length),
        ] {
            if value == 0 {
                return Err(MetricsError::InvalidWindow { name, value: 0 });
            }
        }
        if !(self.mtld_threshold > 0.0 && self.mtld_threshold < 1.0) {
            return Err(MetricsError::InvalidConfig(format!(
                "mtld_threshold must be between 0 and 1 exclusive, got {}",
                self.mtld_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.similarity_cutoff) {
            return Err(MetricsError::InvalidConfig(format!(
                "similarity_cutoff must be between 0 and 1, got {}",
                self.similarity_cutoff
            )));
        }
        Ok(())
    }
}
