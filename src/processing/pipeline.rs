// src/processing/pipeline.rs
//! Per-channel analysis pipeline
//!
//! detection -> compliance classification -> amplitude/frequency features.
//! A pipeline run owns all of its intermediate state, so channels can be
//! processed independently on separate threads.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::compliance::{
    ChannelCompliance, ComplianceClassifier, ComplianceThresholds, Contraction, ContractionSummary,
};
use super::detection::{ContractionDetector, DetectionConfidence, DetectionMode, DetectionOutcome};
use super::envelope::window_samples;
use super::features::{ChannelFeatureAnalyzer, MetricSummary};
use crate::channels::{ChannelId, ChannelSignal};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// Per-channel calibration supplied with a session
///
/// Unset fields fall back to the analysis configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelCalibration {
    /// Measured maximum voluntary contraction amplitude
    #[serde(default)]
    pub mvc_value: Option<f64>,
    #[serde(default)]
    pub mvc_threshold_fraction: Option<f64>,
    #[serde(default)]
    pub duration_threshold_ms: Option<f64>,
    #[serde(default)]
    pub expected_contractions: Option<u32>,
}

impl ChannelCalibration {
    pub fn with_mvc(mvc_value: f64) -> Self {
        Self {
            mvc_value: Some(mvc_value),
            ..Self::default()
        }
    }

    /// Compliance thresholds with calibration overrides applied
    pub fn thresholds(&self, config: &AnalysisConfig) -> ComplianceThresholds {
        let base = ComplianceThresholds::from(&config.compliance);
        ComplianceThresholds {
            mvc_threshold_fraction: self.mvc_threshold_fraction.unwrap_or(base.mvc_threshold_fraction),
            duration_threshold_ms: self.duration_threshold_ms.unwrap_or(base.duration_threshold_ms),
            expected_contractions: self.expected_contractions.or(base.expected_contractions),
        }
    }
}

/// How a channel's contractions were detected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionSummary {
    pub mode: DetectionMode,
    pub confidence: DetectionConfidence,
    pub insufficient_signal: bool,
    pub timing_threshold: Option<f64>,
    pub amplitude_threshold: Option<f64>,
    pub envelope_peak: Option<f64>,
}

impl From<&DetectionOutcome> for DetectionSummary {
    fn from(outcome: &DetectionOutcome) -> Self {
        Self {
            mode: outcome.mode,
            confidence: outcome.confidence,
            insufficient_signal: outcome.insufficient_signal,
            timing_threshold: outcome.timing_threshold,
            amplitude_threshold: outcome.amplitude_threshold,
            envelope_peak: outcome.envelope_peak,
        }
    }
}

/// Complete analytics of one logical channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelAnalytics {
    pub channel: ChannelId,
    pub source: ChannelId,
    pub activated_source: Option<ChannelId>,
    pub sampling_rate: f64,
    pub sample_count: usize,
    pub duration_ms: f64,
    pub detection: DetectionSummary,
    pub contractions: Vec<Contraction>,
    pub compliance: ChannelCompliance,
    pub summary: ContractionSummary,
    pub rms: MetricSummary,
    pub mav: MetricSummary,
    pub mpf: MetricSummary,
    pub mdf: MetricSummary,
    pub fatigue_index: MetricSummary,
    pub analysis_window_samples: usize,
    pub degenerate_windows: usize,
}

/// Channel identity carried through a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelLabel {
    pub logical: ChannelId,
    pub source: ChannelId,
    pub activated_source: Option<ChannelId>,
}

/// Per-channel analysis pipeline
#[derive(Debug, Clone)]
pub struct ChannelPipeline<'a> {
    config: &'a AnalysisConfig,
    detector: ContractionDetector,
    features: ChannelFeatureAnalyzer,
}

impl<'a> ChannelPipeline<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self {
            config,
            detector: ContractionDetector::new(&config.detection),
            features: ChannelFeatureAnalyzer::new(&config.spectral),
        }
    }

    /// Analyse one resolved channel
    pub fn run(
        &self,
        label: ChannelLabel,
        signal: &ChannelSignal,
        calibration: &ChannelCalibration,
    ) -> ChannelAnalytics {
        let start = Instant::now();
        let measured_mvc = calibration.mvc_value;

        let detection = self.detector.detect(signal, measured_mvc);

        let (contractions, compliance) = if detection.insufficient_signal {
            let err = AnalysisError::InsufficientSignal {
                channel: label.logical.clone(),
                operation: "contraction detection".to_string(),
                required: window_samples(self.config.detection.rms_window_ms, signal.sampling_rate()),
                actual: signal.len(),
            };
            (
                Vec::new(),
                ChannelCompliance::InsufficientData {
                    reason: err.to_string(),
                },
            )
        } else {
            let classifier = ComplianceClassifier::new(calibration.thresholds(self.config));
            let outcome = classifier.classify(&label.logical, &detection.intervals, measured_mvc);
            (outcome.contractions, outcome.compliance)
        };

        let metrics = self.features.analyze(signal);
        let summary = ContractionSummary::from_contractions(&contractions);

        debug!(
            contractions = contractions.len(),
            compliance_rate = ?compliance.compliance_rate(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "channel pipeline complete"
        );

        ChannelAnalytics {
            channel: label.logical,
            source: label.source,
            activated_source: label.activated_source,
            sampling_rate: signal.sampling_rate(),
            sample_count: signal.len(),
            duration_ms: signal.duration_ms(),
            detection: DetectionSummary::from(&detection),
            contractions,
            compliance,
            summary,
            rms: metrics.rms,
            mav: metrics.mav,
            mpf: metrics.mpf,
            mdf: metrics.mdf,
            fatigue_index: metrics.fatigue_index,
            analysis_window_samples: metrics.analysis_window_samples,
            degenerate_windows: metrics.degenerate_windows,
        }
    }
}
