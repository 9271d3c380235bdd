// tests/contraction_detection_tests.rs
//! Contraction detection scenarios through the public API
//!
//! Covers merge and refractory behaviour on hand-built signals in both
//! hybrid and single-signal mode, plus degenerate inputs.

use emg_analytics::channels::ChannelSignal;
use emg_analytics::config::DetectionConfig;
use emg_analytics::processing::detection::{
    ContractionDetector, DetectionConfidence, DetectionMode,
};
use emg_analytics::processing::envelope::moving_rms;

const FS: f64 = 1000.0;

fn is_active(ranges: &[(usize, usize)], i: usize) -> bool {
    ranges.iter().any(|&(s, e)| i >= s && i < e)
}

/// 70 Hz carrier at full amplitude inside the ranges, near-silent outside
fn raw_bursts(len: usize, ranges: &[(usize, usize)]) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let carrier = (2.0 * std::f64::consts::PI * 70.0 * i as f64 / FS).sin();
            if is_active(ranges, i) {
                carrier
            } else {
                0.002 * carrier
            }
        })
        .collect()
}

/// Raw carrier plus a clean activated envelope over the given sample ranges
fn bursts(len: usize, ranges: &[(usize, usize)]) -> ChannelSignal {
    let activated: Vec<f64> = (0..len)
        .map(|i| if is_active(ranges, i) { 1.0 } else { 0.0 })
        .collect();
    ChannelSignal::with_activated(FS, raw_bursts(len, ranges), Some(activated)).unwrap()
}

/// Raw carrier only, forcing single-signal detection
fn raw_only(len: usize, ranges: &[(usize, usize)]) -> ChannelSignal {
    ChannelSignal::new(FS, raw_bursts(len, ranges)).unwrap()
}

fn detector() -> ContractionDetector {
    ContractionDetector::new(&DetectionConfig::default())
}

#[test]
fn test_short_dip_is_merged_into_one_contraction() {
    // 2000 ms contraction with a 100 ms dip in the middle
    let signal = bursts(5000, &[(1000, 2000), (2100, 3100)]);
    let outcome = detector().detect(&signal, None);

    assert_eq!(outcome.intervals.len(), 1);
    assert!(outcome.intervals[0].duration_ms() >= 2000.0);
    assert_eq!(outcome.intervals[0].start_sample, 1000);
    assert_eq!(outcome.intervals[0].end_sample, 3100);
}

#[test]
fn test_gap_above_merge_threshold_keeps_contractions_apart() {
    let signal = bursts(6000, &[(1000, 2500), (2700, 4200)]);
    let outcome = detector().detect(&signal, None);

    assert_eq!(outcome.intervals.len(), 2);
    assert_eq!(outcome.intervals[0].end_sample, 2500);
    assert_eq!(outcome.intervals[1].start_sample, 2700);
}

#[test]
fn test_custom_merge_threshold() {
    let config = DetectionConfig {
        merge_threshold_ms: 250.0,
        ..DetectionConfig::default()
    };
    let signal = bursts(6000, &[(1000, 2500), (2700, 4200)]);
    let outcome = ContractionDetector::new(&config).detect(&signal, None);
    assert_eq!(outcome.intervals.len(), 1);
}

#[test]
fn test_refractory_folds_gap_longer_than_merge_threshold() {
    let config = DetectionConfig {
        merge_threshold_ms: 50.0,
        refractory_period_ms: 300.0,
        ..DetectionConfig::default()
    };
    let signal = bursts(6000, &[(1000, 2500), (2700, 4200)]);
    let outcome = ContractionDetector::new(&config).detect(&signal, None);

    assert_eq!(outcome.intervals.len(), 1);
    assert_eq!(outcome.intervals[0].start_sample, 1000);
    assert_eq!(outcome.intervals[0].end_sample, 4200);

    let without_refractory = DetectionConfig {
        refractory_period_ms: 0.0,
        ..config
    };
    let outcome = ContractionDetector::new(&without_refractory).detect(&signal, None);
    assert_eq!(outcome.intervals.len(), 2);
}

#[test]
fn test_single_signal_short_dip_is_merged() {
    let signal = raw_only(5000, &[(1000, 2000), (2100, 3100)]);
    let outcome = detector().detect(&signal, None);

    assert_eq!(outcome.mode, DetectionMode::SingleSignal);
    assert_eq!(outcome.intervals.len(), 1);
    let interval = &outcome.intervals[0];
    assert!((1000..1010).contains(&interval.start_sample));
    // Trailing envelope extends the offset by up to one window
    assert!((3100..3200).contains(&interval.end_sample));
}

#[test]
fn test_single_signal_gap_keeps_contractions_apart() {
    // Trailing envelope shortens a 400 ms gap to roughly 300 ms
    let signal = raw_only(6000, &[(1000, 2500), (2900, 4400)]);
    let outcome = detector().detect(&signal, None);

    assert_eq!(outcome.intervals.len(), 2);
    assert!(outcome.intervals[0].end_sample < 2600);
    assert!(outcome.intervals[1].start_sample >= 2900);
}

#[test]
fn test_single_signal_refractory_fold() {
    let config = DetectionConfig {
        merge_threshold_ms: 50.0,
        refractory_period_ms: 300.0,
        ..DetectionConfig::default()
    };
    let signal = raw_only(6000, &[(1000, 2500), (2700, 4200)]);

    let outcome = ContractionDetector::new(&config).detect(&signal, None);
    assert_eq!(outcome.intervals.len(), 1);
    assert!((4200..4300).contains(&outcome.intervals[0].end_sample));

    let strict = DetectionConfig {
        refractory_period_ms: 50.0,
        ..config
    };
    assert_eq!(ContractionDetector::new(&strict).detect(&signal, None).intervals.len(), 2);
}

#[test]
fn test_missing_activated_signal_falls_back() {
    let signal = raw_only(4000, &[(1000, 3000)]);
    let outcome = detector().detect(&signal, None);

    assert_eq!(outcome.mode, DetectionMode::SingleSignal);
    assert_eq!(outcome.confidence, DetectionConfidence::Reduced);
    assert_eq!(outcome.intervals.len(), 1);
}

#[test]
fn test_hybrid_detection_has_full_confidence() {
    let outcome = detector().detect(&bursts(4000, &[(1000, 3000)]), None);
    assert_eq!(outcome.mode, DetectionMode::Hybrid);
    assert_eq!(outcome.confidence, DetectionConfidence::Full);
    assert!(outcome.timing_threshold.unwrap() > 0.0);
}

#[test]
fn test_degenerate_inputs_never_fail() {
    let empty = ChannelSignal::new(FS, Vec::new()).unwrap();
    let outcome = detector().detect(&empty, None);
    assert!(outcome.intervals.is_empty());
    assert!(outcome.insufficient_signal);

    let silent = ChannelSignal::new(FS, vec![0.0; 3000]).unwrap();
    assert!(detector().detect(&silent, None).intervals.is_empty());

    let constant = ChannelSignal::new(FS, vec![0.3; 3000]).unwrap();
    let outcome = detector().detect(&constant, None);
    assert!(outcome.intervals.len() <= 1);
}

#[test]
fn test_interval_amplitudes_come_from_envelope() {
    let signal = bursts(5000, &[(1000, 3000)]);
    let outcome = detector().detect(&signal, None);
    let envelope = moving_rms(signal.samples(), 100);

    let interval = &outcome.intervals[0];
    let window = &envelope[interval.start_sample..interval.end_sample];
    let expected_peak = window.iter().copied().fold(0.0, f64::max);
    assert_eq!(interval.peak_amplitude, expected_peak);
    assert!(interval.mean_amplitude <= interval.peak_amplitude);
    assert!((interval.peak_amplitude - std::f64::consts::FRAC_1_SQRT_2).abs() < 0.05);
}
