// src/processing/detection.rs
//! Contraction detection
//!
//! Segments a channel into contraction intervals with a dual-signal
//! strategy. The timing signal (the rectified activated variant when one is
//! available) decides onset and offset; the RMS envelope of the raw signal
//! confirms each candidate and supplies its peak and mean amplitude. Without
//! an activated variant the RMS envelope serves both roles and the result is
//! flagged as reduced confidence.
//!
//! Interval post-processing:
//! 1. candidates separated by a gap `<= merge_threshold_ms` are merged
//!    (brief dropouts inside one voluntary contraction);
//! 2. candidates starting `< refractory_period_ms` after the previous
//!    accepted interval are folded into it;
//! 3. candidates whose envelope peak stays below the amplitude threshold are
//!    discarded.

use serde::Serialize;
use tracing::{debug, warn};

use super::envelope::{moving_rms, rectify, window_samples};
use crate::channels::{ms_to_samples, samples_to_ms, ChannelSignal};
use crate::config::DetectionConfig;

/// Which signals drove detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Activated signal for timing, RMS envelope for amplitude
    Hybrid,
    /// RMS envelope only
    SingleSignal,
}

/// Confidence attached to a detection result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionConfidence {
    Full,
    Reduced,
}

impl DetectionMode {
    pub fn confidence(self) -> DetectionConfidence {
        match self {
            DetectionMode::Hybrid => DetectionConfidence::Full,
            DetectionMode::SingleSignal => DetectionConfidence::Reduced,
        }
    }
}

/// Half-open sample interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleInterval {
    pub start: usize,
    pub end: usize,
}

impl SampleInterval {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// A confirmed contraction interval with its amplitude statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedInterval {
    pub start_sample: usize,
    pub end_sample: usize,
    pub start_time_ms: f64,
    pub end_time_ms: f64,
    pub peak_amplitude: f64,
    pub mean_amplitude: f64,
}

impl DetectedInterval {
    pub fn duration_ms(&self) -> f64 {
        self.end_time_ms - self.start_time_ms
    }
}

/// Result of running the detector on one channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionOutcome {
    pub intervals: Vec<DetectedInterval>,
    pub mode: DetectionMode,
    pub confidence: DetectionConfidence,
    /// Signal shorter than one envelope window; no detection was attempted
    pub insufficient_signal: bool,
    pub timing_threshold: Option<f64>,
    pub amplitude_threshold: Option<f64>,
    /// Peak of the raw RMS envelope over the whole channel
    pub envelope_peak: Option<f64>,
}

/// Per-channel detection parameters in samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    pub rms_window: usize,
    pub timing_threshold_fraction: f64,
    pub amplitude_threshold_fraction: f64,
    pub merge_gap: usize,
    pub refractory: usize,
}

impl DetectionParams {
    pub fn from_config(config: &DetectionConfig, sampling_rate: f64) -> Self {
        Self {
            rms_window: window_samples(config.rms_window_ms, sampling_rate),
            timing_threshold_fraction: config.timing_threshold_fraction,
            amplitude_threshold_fraction: config.amplitude_threshold_fraction,
            merge_gap: ms_to_samples(config.merge_threshold_ms, sampling_rate),
            refractory: ms_to_samples(config.refractory_period_ms, sampling_rate),
        }
    }
}

/// Hybrid dual-signal contraction detector
#[derive(Debug, Clone)]
pub struct ContractionDetector {
    config: DetectionConfig,
}

impl ContractionDetector {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect contractions on one channel
    ///
    /// A finite, positive `mvc_reference` scales both the timing and the
    /// amplitude threshold. Without one the timing threshold follows the
    /// activated signal's peak and the amplitude threshold the envelope's
    /// peak. Never fails: short or silent signals yield an empty interval
    /// list.
    pub fn detect(&self, signal: &ChannelSignal, mvc_reference: Option<f64>) -> DetectionOutcome {
        let params = DetectionParams::from_config(&self.config, signal.sampling_rate());
        let mode = if signal.activated_samples().is_some() {
            DetectionMode::Hybrid
        } else {
            warn!("no activated signal, falling back to single-signal detection");
            DetectionMode::SingleSignal
        };

        let mut outcome = DetectionOutcome {
            intervals: Vec::new(),
            mode,
            confidence: mode.confidence(),
            insufficient_signal: false,
            timing_threshold: None,
            amplitude_threshold: None,
            envelope_peak: None,
        };

        if signal.len() < params.rms_window {
            debug!(
                samples = signal.len(),
                window = params.rms_window,
                "signal shorter than one envelope window"
            );
            outcome.insufficient_signal = true;
            return outcome;
        }

        let envelope = moving_rms(signal.samples(), params.rms_window);
        let envelope_peak = peak(&envelope);
        outcome.envelope_peak = Some(envelope_peak);

        let measured_mvc = mvc_reference.filter(|mvc| mvc.is_finite() && *mvc > 0.0);
        let amplitude_reference = measured_mvc.unwrap_or(envelope_peak);
        let amplitude_threshold = params.amplitude_threshold_fraction * amplitude_reference;
        outcome.amplitude_threshold = Some(amplitude_threshold);

        let rectified;
        let (timing, timing_threshold) = match signal.activated_samples() {
            Some(activated) => {
                rectified = rectify(activated);
                let timing_reference = measured_mvc.unwrap_or_else(|| {
                    debug!("no measured MVC, timing threshold follows the activated peak");
                    peak(&rectified)
                });
                (rectified.as_slice(), params.timing_threshold_fraction * timing_reference)
            }
            None => (envelope.as_slice(), amplitude_threshold),
        };
        outcome.timing_threshold = Some(timing_threshold);

        if amplitude_reference <= 0.0 || timing_threshold <= 0.0 {
            debug!("silent channel, no contractions");
            return outcome;
        }

        let candidates = mask_to_intervals(&threshold_mask(timing, timing_threshold));
        let merged = merge_intervals(&candidates, params.merge_gap);
        let accepted = apply_refractory(&merged, params.refractory);

        outcome.intervals = accepted
            .iter()
            .filter_map(|interval| {
                let window = &envelope[interval.start..interval.end];
                let peak_amplitude = peak(window);
                if peak_amplitude < amplitude_threshold {
                    return None;
                }
                Some(DetectedInterval {
                    start_sample: interval.start,
                    end_sample: interval.end,
                    start_time_ms: samples_to_ms(interval.start, signal.sampling_rate()),
                    end_time_ms: samples_to_ms(interval.end, signal.sampling_rate()),
                    peak_amplitude,
                    mean_amplitude: window.iter().sum::<f64>() / window.len() as f64,
                })
            })
            .collect();

        debug!(
            candidates = candidates.len(),
            merged = merged.len(),
            accepted = outcome.intervals.len(),
            timing_threshold,
            amplitude_threshold,
            "contraction detection complete"
        );

        outcome
    }
}

/// Strictly-above-threshold mask
pub fn threshold_mask(signal: &[f64], threshold: f64) -> Vec<bool> {
    signal.iter().map(|&value| value > threshold).collect()
}

/// Convert mask transitions into half-open intervals
pub fn mask_to_intervals(mask: &[bool]) -> Vec<SampleInterval> {
    let mut intervals = Vec::new();
    let mut start = None;

    for (i, &active) in mask.iter().enumerate() {
        match (active, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                intervals.push(SampleInterval { start: s, end: i });
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        intervals.push(SampleInterval { start: s, end: mask.len() });
    }

    intervals
}

/// Merge intervals whose gap is at most `max_gap` samples
///
/// Input must be sorted and non-overlapping, as produced by
/// [`mask_to_intervals`]. Idempotent.
pub fn merge_intervals(intervals: &[SampleInterval], max_gap: usize) -> Vec<SampleInterval> {
    fold_intervals(intervals, |gap| gap <= max_gap)
}

/// Fold intervals starting less than `refractory` samples after the
/// previous accepted interval into it
pub fn apply_refractory(intervals: &[SampleInterval], refractory: usize) -> Vec<SampleInterval> {
    fold_intervals(intervals, |gap| gap < refractory)
}

fn fold_intervals<F>(intervals: &[SampleInterval], joins: F) -> Vec<SampleInterval>
where
    F: Fn(usize) -> bool,
{
    let mut folded: Vec<SampleInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match folded.last_mut() {
            Some(last) if joins(interval.start.saturating_sub(last.end)) => {
                last.end = last.end.max(interval.end);
            }
            _ => folded.push(*interval),
        }
    }
    folded
}

fn peak(signal: &[f64]) -> f64 {
    signal.iter().copied().fold(0.0, f64::max)
}
