// src/config/mod.rs
//! Analysis configuration management

pub mod analysis_config;
pub mod constants;
pub mod loader;

pub use analysis_config::*;
pub use constants::*;
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisErrorBuilder, AnalysisResult};

/// Complete analysis configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub compliance: ComplianceConfig,

    #[serde(default)]
    pub spectral: SpectralConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl AnalysisConfig {
    /// Validate every section, reporting the first failure
    pub fn validate(&self) -> AnalysisResult<()> {
        let checks: [(&str, Result<(), String>); 4] = [
            ("detection", validate_detection_config(&self.detection)),
            ("compliance", validate_compliance_config(&self.compliance)),
            ("spectral", validate_spectral_config(&self.spectral)),
            ("scoring", validate_scoring_config(&self.scoring)),
        ];

        for (section, result) in checks {
            if let Err(reason) = result {
                return Err(AnalysisErrorBuilder::new(section, "validate").configuration(&reason));
            }
        }

        self.validate_consistency().map_err(|errors| {
            AnalysisErrorBuilder::new("config", "validate_consistency").configuration(&errors.join("; "))
        })
    }

    /// Validate cross-section constraints
    pub fn validate_consistency(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.detection.rms_window_ms > self.compliance.duration_threshold_ms
            && self.compliance.duration_threshold_ms > 0.0
        {
            errors.push(format!(
                "RMS window ({} ms) is longer than the duration threshold ({} ms)",
                self.detection.rms_window_ms, self.compliance.duration_threshold_ms
            ));
        }

        if self.detection.rms_window_ms > self.spectral.analysis_window_ms {
            errors.push(format!(
                "RMS window ({} ms) must not exceed the analysis window ({} ms)",
                self.detection.rms_window_ms, self.spectral.analysis_window_ms
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Get configuration summary
    pub fn get_summary(&self) -> ConfigSummary {
        ConfigSummary {
            rms_window_ms: self.detection.rms_window_ms,
            merge_threshold_ms: self.detection.merge_threshold_ms,
            refractory_period_ms: self.detection.refractory_period_ms,
            mvc_threshold_fraction: self.compliance.mvc_threshold_fraction,
            duration_threshold_ms: self.compliance.duration_threshold_ms,
            analysis_window_ms: self.spectral.analysis_window_ms,
            symmetry_pairs: self.scoring.symmetry_pairs.len(),
            parallel_channels: self.runtime.parallel_channels,
        }
    }
}

/// Configuration summary for display/logging
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub rms_window_ms: f64,
    pub merge_threshold_ms: f64,
    pub refractory_period_ms: f64,
    pub mvc_threshold_fraction: f64,
    pub duration_threshold_ms: f64,
    pub analysis_window_ms: f64,
    pub symmetry_pairs: usize,
    pub parallel_channels: bool,
}
