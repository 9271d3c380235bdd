// src/config/analysis_config.rs
//! Analysis stage configuration structures

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::constants::{compliance, detection, envelope, spectral};
use crate::channels::ChannelId;
use crate::scoring::ScoringWeights;

/// Contraction detection configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DetectionConfig {
    #[serde(default = "defaults::rms_window_ms")]
    pub rms_window_ms: f64,

    #[serde(default = "defaults::timing_threshold_fraction")]
    pub timing_threshold_fraction: f64,

    #[serde(default = "defaults::amplitude_threshold_fraction")]
    pub amplitude_threshold_fraction: f64,

    #[serde(default = "defaults::merge_threshold_ms")]
    pub merge_threshold_ms: f64,

    #[serde(default = "defaults::refractory_period_ms")]
    pub refractory_period_ms: f64,
}

/// Default compliance thresholds, overridable per channel
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ComplianceConfig {
    #[serde(default = "defaults::mvc_threshold_fraction")]
    pub mvc_threshold_fraction: f64,

    #[serde(default = "defaults::duration_threshold_ms")]
    pub duration_threshold_ms: f64,

    /// Prescribed contractions per channel, drives the completion rate
    #[serde(default)]
    pub expected_contractions: Option<u32>,
}

/// Amplitude/frequency analysis configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SpectralConfig {
    #[serde(default = "defaults::analysis_window_ms")]
    pub analysis_window_ms: f64,

    #[serde(default = "defaults::window_type")]
    pub window_type: WindowType,

    #[serde(default = "defaults::fatigue_band_low_hz")]
    pub fatigue_band_low_hz: f64,

    #[serde(default = "defaults::fatigue_band_high_hz")]
    pub fatigue_band_high_hz: f64,
}

/// Performance scoring configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ScoringConfig {
    /// Left/right channel pairs compared for bilateral symmetry
    #[serde(default)]
    pub symmetry_pairs: Vec<SymmetryPair>,

    /// Globally active weight set, level (d) of the resolution hierarchy
    #[serde(default)]
    pub global_weights: Option<ScoringWeights>,
}

/// A bilateral channel pair
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SymmetryPair {
    pub left: ChannelId,
    pub right: ChannelId,
}

/// Execution configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RuntimeConfig {
    #[serde(default = "defaults::parallel_channels")]
    pub parallel_channels: bool,
}

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    Rectangular,
    Hamming,
    Hanning,
    Blackman,
}

pub(crate) mod defaults {
    use super::*;

    pub fn rms_window_ms() -> f64 { envelope::DEFAULT_RMS_WINDOW_MS }
    pub fn timing_threshold_fraction() -> f64 { detection::DEFAULT_TIMING_THRESHOLD_FRACTION }
    pub fn amplitude_threshold_fraction() -> f64 { detection::DEFAULT_AMPLITUDE_THRESHOLD_FRACTION }
    pub fn merge_threshold_ms() -> f64 { detection::DEFAULT_MERGE_THRESHOLD_MS }
    pub fn refractory_period_ms() -> f64 { detection::DEFAULT_REFRACTORY_PERIOD_MS }

    pub fn mvc_threshold_fraction() -> f64 { compliance::DEFAULT_MVC_THRESHOLD_FRACTION }
    pub fn duration_threshold_ms() -> f64 { compliance::DEFAULT_DURATION_THRESHOLD_MS }

    pub fn analysis_window_ms() -> f64 { spectral::DEFAULT_ANALYSIS_WINDOW_MS }
    pub fn window_type() -> WindowType { WindowType::Hanning }
    pub fn fatigue_band_low_hz() -> f64 { spectral::DEFAULT_FATIGUE_BAND_LOW_HZ }
    pub fn fatigue_band_high_hz() -> f64 { spectral::DEFAULT_FATIGUE_BAND_HIGH_HZ }

    pub fn parallel_channels() -> bool { true }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            rms_window_ms: defaults::rms_window_ms(),
            timing_threshold_fraction: defaults::timing_threshold_fraction(),
            amplitude_threshold_fraction: defaults::amplitude_threshold_fraction(),
            merge_threshold_ms: defaults::merge_threshold_ms(),
            refractory_period_ms: defaults::refractory_period_ms(),
        }
    }
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            mvc_threshold_fraction: defaults::mvc_threshold_fraction(),
            duration_threshold_ms: defaults::duration_threshold_ms(),
            expected_contractions: None,
        }
    }
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            analysis_window_ms: defaults::analysis_window_ms(),
            window_type: defaults::window_type(),
            fatigue_band_low_hz: defaults::fatigue_band_low_hz(),
            fatigue_band_high_hz: defaults::fatigue_band_high_hz(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            parallel_channels: defaults::parallel_channels(),
        }
    }
}

fn is_fraction(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value <= 1.0
}

/// Validate detection configuration
pub fn validate_detection_config(config: &DetectionConfig) -> Result<(), String> {
    if !(envelope::MIN_RMS_WINDOW_MS..=envelope::MAX_RMS_WINDOW_MS).contains(&config.rms_window_ms) {
        return Err(format!(
            "RMS window must be between {} and {} ms",
            envelope::MIN_RMS_WINDOW_MS,
            envelope::MAX_RMS_WINDOW_MS
        ));
    }
    if !is_fraction(config.timing_threshold_fraction) {
        return Err("Timing threshold fraction must be in (0, 1]".to_string());
    }
    if !is_fraction(config.amplitude_threshold_fraction) {
        return Err("Amplitude threshold fraction must be in (0, 1]".to_string());
    }
    for (name, gap) in [
        ("Merge threshold", config.merge_threshold_ms),
        ("Refractory period", config.refractory_period_ms),
    ] {
        if !(0.0..=detection::MAX_GAP_MS).contains(&gap) {
            return Err(format!("{} must be between 0 and {} ms", name, detection::MAX_GAP_MS));
        }
    }
    Ok(())
}

/// Validate compliance configuration
pub fn validate_compliance_config(config: &ComplianceConfig) -> Result<(), String> {
    if !is_fraction(config.mvc_threshold_fraction) {
        return Err("MVC threshold fraction must be in (0, 1]".to_string());
    }
    if !(0.0..=compliance::MAX_DURATION_THRESHOLD_MS).contains(&config.duration_threshold_ms) {
        return Err(format!(
            "Duration threshold must be between 0 and {} ms",
            compliance::MAX_DURATION_THRESHOLD_MS
        ));
    }
    if config.expected_contractions == Some(0) {
        return Err("Expected contractions must be greater than 0 when set".to_string());
    }
    Ok(())
}

/// Validate spectral configuration
pub fn validate_spectral_config(config: &SpectralConfig) -> Result<(), String> {
    if !config.analysis_window_ms.is_finite() || config.analysis_window_ms < spectral::MIN_ANALYSIS_WINDOW_MS {
        return Err(format!(
            "Analysis window must be at least {} ms",
            spectral::MIN_ANALYSIS_WINDOW_MS
        ));
    }
    if config.fatigue_band_low_hz <= 0.0 {
        return Err("Fatigue band lower edge must be positive".to_string());
    }
    if config.fatigue_band_high_hz <= config.fatigue_band_low_hz {
        return Err("Fatigue band upper edge must be above the lower edge".to_string());
    }
    Ok(())
}

/// Validate scoring configuration
pub fn validate_scoring_config(config: &ScoringConfig) -> Result<(), String> {
    for pair in &config.symmetry_pairs {
        if pair.left == pair.right {
            return Err(format!("Symmetry pair uses '{}' on both sides", pair.left));
        }
    }
    // An unusable global weight set is skipped during weight resolution.
    if let Some(Err(reason)) = config.global_weights.as_ref().map(ScoringWeights::validate) {
        warn!(%reason, "global weights invalid, scoring will fall back to defaults");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sections_are_valid() {
        assert!(validate_detection_config(&DetectionConfig::default()).is_ok());
        assert!(validate_compliance_config(&ComplianceConfig::default()).is_ok());
        assert!(validate_spectral_config(&SpectralConfig::default()).is_ok());
        assert!(validate_scoring_config(&ScoringConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_detection_config() {
        let mut config = DetectionConfig::default();
        config.timing_threshold_fraction = 0.0;
        assert!(validate_detection_config(&config).is_err());

        config = DetectionConfig::default();
        config.merge_threshold_ms = -1.0;
        assert!(validate_detection_config(&config).is_err());

        config = DetectionConfig::default();
        config.rms_window_ms = f64::NAN;
        assert!(validate_detection_config(&config).is_err());
    }

    #[test]
    fn test_invalid_compliance_config() {
        let mut config = ComplianceConfig::default();
        config.mvc_threshold_fraction = 1.5;
        assert!(validate_compliance_config(&config).is_err());

        config = ComplianceConfig::default();
        config.expected_contractions = Some(0);
        assert!(validate_compliance_config(&config).is_err());
    }

    #[test]
    fn test_invalid_spectral_band() {
        let mut config = SpectralConfig::default();
        config.fatigue_band_high_hz = 5.0;
        assert!(validate_spectral_config(&config).is_err());
    }

    #[test]
    fn test_symmetry_pair_must_differ() {
        let config = ScoringConfig {
            symmetry_pairs: vec![SymmetryPair {
                left: ChannelId::from("CH1"),
                right: ChannelId::from("CH1"),
            }],
            global_weights: None,
        };
        assert!(validate_scoring_config(&config).is_err());
    }

    #[test]
    fn test_invalid_global_weights_do_not_reject_config() {
        let config = ScoringConfig {
            symmetry_pairs: Vec::new(),
            global_weights: Some(ScoringWeights {
                compliance: 0.9,
                ..ScoringWeights::default()
            }),
        };
        assert!(validate_scoring_config(&config).is_ok());
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let config: DetectionConfig = toml::from_str("merge_threshold_ms = 200.0").unwrap();
        assert_eq!(config.merge_threshold_ms, 200.0);
        assert_eq!(config.refractory_period_ms, detection::DEFAULT_REFRACTORY_PERIOD_MS);
    }
}
