// src/processing/mod.rs
//! Per-channel signal analysis stages

pub mod compliance;
pub mod detection;
pub mod envelope;
pub mod features;
pub mod pipeline;
pub mod windowing;

pub use compliance::{
    ChannelCompliance, ComplianceClassifier, ComplianceRates, ComplianceThresholds, Contraction,
    ContractionSummary, MvcOrigin, MvcReference,
};
pub use detection::{ContractionDetector, DetectedInterval, DetectionConfidence, DetectionMode, DetectionOutcome};
pub use envelope::moving_rms;
pub use features::{AmplitudeFrequencyMetrics, ChannelFeatureAnalyzer, MetricSummary};
pub use pipeline::{ChannelAnalytics, ChannelCalibration, ChannelPipeline};
pub use windowing::WindowPlan;
