// src/processing/compliance.rs
//! Contraction compliance classification
//!
//! Each detected interval is judged against an intensity threshold
//! (`mvc_reference * mvc_threshold_fraction`, compared with the mean
//! envelope amplitude) and a duration threshold. The MVC reference is the
//! measured value when the caller supplies one; otherwise it is
//! self-calibrated from the session's largest contraction peak. With neither
//! available the channel is reported as insufficient data.

use serde::Serialize;
use tracing::warn;

use super::detection::DetectedInterval;
use crate::channels::ChannelId;
use crate::config::ComplianceConfig;
use crate::error::{AnalysisError, AnalysisResult};

/// Where an MVC reference value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MvcOrigin {
    Measured,
    SelfCalibrated,
}

/// MVC reference amplitude used for a channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MvcReference {
    pub value: f64,
    pub origin: MvcOrigin,
}

/// Per-channel compliance thresholds after applying calibration overrides
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComplianceThresholds {
    pub mvc_threshold_fraction: f64,
    pub duration_threshold_ms: f64,
    pub expected_contractions: Option<u32>,
}

impl From<&ComplianceConfig> for ComplianceThresholds {
    fn from(config: &ComplianceConfig) -> Self {
        Self {
            mvc_threshold_fraction: config.mvc_threshold_fraction,
            duration_threshold_ms: config.duration_threshold_ms,
            expected_contractions: config.expected_contractions,
        }
    }
}

/// A classified contraction
///
/// `is_compliant` is always `is_mvc_compliant && is_duration_compliant`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contraction {
    channel: ChannelId,
    start_time_ms: f64,
    end_time_ms: f64,
    peak_amplitude: f64,
    mean_amplitude: f64,
    is_mvc_compliant: bool,
    is_duration_compliant: bool,
    is_compliant: bool,
}

impl Contraction {
    fn new(channel: ChannelId, interval: &DetectedInterval, is_mvc_compliant: bool, is_duration_compliant: bool) -> Self {
        Self {
            channel,
            start_time_ms: interval.start_time_ms,
            end_time_ms: interval.end_time_ms,
            peak_amplitude: interval.peak_amplitude,
            mean_amplitude: interval.mean_amplitude,
            is_mvc_compliant,
            is_duration_compliant,
            is_compliant: is_mvc_compliant && is_duration_compliant,
        }
    }

    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    pub fn start_time_ms(&self) -> f64 {
        self.start_time_ms
    }

    pub fn end_time_ms(&self) -> f64 {
        self.end_time_ms
    }

    pub fn duration_ms(&self) -> f64 {
        self.end_time_ms - self.start_time_ms
    }

    pub fn peak_amplitude(&self) -> f64 {
        self.peak_amplitude
    }

    pub fn mean_amplitude(&self) -> f64 {
        self.mean_amplitude
    }

    pub fn is_mvc_compliant(&self) -> bool {
        self.is_mvc_compliant
    }

    pub fn is_duration_compliant(&self) -> bool {
        self.is_duration_compliant
    }

    pub fn is_compliant(&self) -> bool {
        self.is_compliant
    }
}

/// Channel-level compliance rates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceRates {
    pub total_contractions: usize,
    pub compliant_contractions: usize,
    pub mvc_compliant_contractions: usize,
    pub duration_compliant_contractions: usize,
    /// Fully compliant / total, 0 when there are no contractions
    pub compliance_rate: f64,
    pub intensity_rate: f64,
    pub duration_rate: f64,
    /// `min(1, total / expected)`, null without a prescribed count
    pub completion_rate: Option<f64>,
    pub mvc_reference: MvcReference,
    pub mvc_threshold_value: f64,
    pub duration_threshold_ms: f64,
}

/// Channel compliance, or an explicit marker that it could not be rated
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelCompliance {
    Rated(ComplianceRates),
    InsufficientData { reason: String },
}

impl ChannelCompliance {
    pub fn rates(&self) -> Option<&ComplianceRates> {
        match self {
            ChannelCompliance::Rated(rates) => Some(rates),
            ChannelCompliance::InsufficientData { .. } => None,
        }
    }

    pub fn compliance_rate(&self) -> Option<f64> {
        self.rates().map(|rates| rates.compliance_rate)
    }
}

/// Classified contractions plus channel-level compliance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationOutcome {
    pub contractions: Vec<Contraction>,
    pub compliance: ChannelCompliance,
}

/// Compliance classifier for one channel
#[derive(Debug, Clone)]
pub struct ComplianceClassifier {
    thresholds: ComplianceThresholds,
}

impl ComplianceClassifier {
    pub fn new(thresholds: ComplianceThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ComplianceThresholds {
        &self.thresholds
    }

    /// Classify detected intervals for a channel
    pub fn classify(
        &self,
        channel: &ChannelId,
        intervals: &[DetectedInterval],
        measured_mvc: Option<f64>,
    ) -> ClassificationOutcome {
        let mvc_reference = match resolve_mvc_reference(channel, measured_mvc, intervals) {
            Ok(reference) => reference,
            Err(err) => {
                warn!(channel = %channel, error = %err, "channel compliance not rated");
                return ClassificationOutcome {
                    contractions: Vec::new(),
                    compliance: ChannelCompliance::InsufficientData {
                        reason: err.to_string(),
                    },
                };
            }
        };

        let mvc_threshold_value = mvc_reference.value * self.thresholds.mvc_threshold_fraction;
        let contractions: Vec<Contraction> = intervals
            .iter()
            .map(|interval| {
                Contraction::new(
                    channel.clone(),
                    interval,
                    interval.mean_amplitude >= mvc_threshold_value,
                    interval.duration_ms() >= self.thresholds.duration_threshold_ms,
                )
            })
            .collect();

        let total = contractions.len();
        let compliant = contractions.iter().filter(|c| c.is_compliant()).count();
        let mvc_compliant = contractions.iter().filter(|c| c.is_mvc_compliant()).count();
        let duration_compliant = contractions.iter().filter(|c| c.is_duration_compliant()).count();

        let rates = ComplianceRates {
            total_contractions: total,
            compliant_contractions: compliant,
            mvc_compliant_contractions: mvc_compliant,
            duration_compliant_contractions: duration_compliant,
            compliance_rate: rate(compliant, total),
            intensity_rate: rate(mvc_compliant, total),
            duration_rate: rate(duration_compliant, total),
            completion_rate: self
                .thresholds
                .expected_contractions
                .filter(|expected| *expected > 0)
                .map(|expected| (total as f64 / expected as f64).min(1.0)),
            mvc_reference,
            mvc_threshold_value,
            duration_threshold_ms: self.thresholds.duration_threshold_ms,
        };

        ClassificationOutcome {
            contractions,
            compliance: ChannelCompliance::Rated(rates),
        }
    }
}

/// Resolve the MVC reference for a channel
///
/// A finite, positive measured value wins. Otherwise the largest detected
/// contraction peak is used and a warning is emitted.
pub fn resolve_mvc_reference(
    channel: &ChannelId,
    measured_mvc: Option<f64>,
    intervals: &[DetectedInterval],
) -> AnalysisResult<MvcReference> {
    if let Some(value) = measured_mvc.filter(|v| v.is_finite() && *v > 0.0) {
        return Ok(MvcReference {
            value,
            origin: MvcOrigin::Measured,
        });
    }

    let session_peak = intervals
        .iter()
        .map(|interval| interval.peak_amplitude)
        .fold(0.0, f64::max);

    if session_peak > 0.0 {
        warn!(channel = %channel, mvc = session_peak, "no measured MVC, self-calibrating from session peak");
        Ok(MvcReference {
            value: session_peak,
            origin: MvcOrigin::SelfCalibrated,
        })
    } else {
        Err(AnalysisError::MissingCalibration {
            channel: channel.clone(),
            reason: "no measured MVC and no contractions to self-calibrate from".to_string(),
        })
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Descriptive statistics over a channel's contractions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractionSummary {
    pub count: usize,
    pub mean_duration_ms: Option<f64>,
    pub min_duration_ms: Option<f64>,
    pub max_duration_ms: Option<f64>,
    pub total_time_under_tension_ms: f64,
    pub mean_peak_amplitude: Option<f64>,
}

impl ContractionSummary {
    pub fn from_contractions(contractions: &[Contraction]) -> Self {
        let durations: Vec<f64> = contractions.iter().map(Contraction::duration_ms).collect();
        let total: f64 = durations.iter().sum();
        let count = contractions.len();
        let mean = |sum: f64| (count > 0).then(|| sum / count as f64);

        Self {
            count,
            mean_duration_ms: mean(total),
            min_duration_ms: durations.iter().copied().reduce(f64::min),
            max_duration_ms: durations.iter().copied().reduce(f64::max),
            total_time_under_tension_ms: total,
            mean_peak_amplitude: mean(contractions.iter().map(Contraction::peak_amplitude).sum()),
        }
    }
}
