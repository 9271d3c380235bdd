//! Amplitude and frequency feature analysis
//!
//! Each channel is segmented into non-overlapping analysis windows. Every
//! metric gets one representative value, temporal statistics over its valid
//! windows and a least-squares trend across window indices:
//! - RMS and MAV: representative value over the whole signal
//! - MPF, MDF and FI_nsm5: representative value is the mean over windows with
//!   a non-degenerate spectrum

pub mod frequency;
pub mod time_domain;

use serde::Serialize;
use tracing::debug;

use crate::channels::{ms_to_samples, ChannelSignal};
use crate::config::SpectralConfig;
use crate::processing::windowing::WindowPlan;
use crate::utils::stats::{linear_trend, mean, TemporalStats};

pub use frequency::{PowerSpectrum, SpectralFeatures, SpectrumAnalyzer};
pub use time_domain::{mav, rms};

/// Representative value of one metric with its within-session behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub value: Option<f64>,
    pub temporal: Option<TemporalStats>,
    /// Least-squares slope per analysis window
    pub trend_slope: Option<f64>,
}

impl MetricSummary {
    fn from_windows(value: Option<f64>, windows: &[(usize, f64)]) -> Self {
        let values: Vec<f64> = windows.iter().map(|(_, v)| *v).collect();
        let points: Vec<(f64, f64)> = windows.iter().map(|(i, v)| (*i as f64, *v)).collect();
        Self {
            value,
            temporal: TemporalStats::from_values(&values),
            trend_slope: linear_trend(&points),
        }
    }
}

/// Amplitude and frequency metrics of one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmplitudeFrequencyMetrics {
    pub rms: MetricSummary,
    pub mav: MetricSummary,
    pub mpf: MetricSummary,
    pub mdf: MetricSummary,
    pub fatigue_index: MetricSummary,
    pub analysis_window_samples: usize,
    /// Windows skipped because their spectrum held no power
    pub degenerate_windows: usize,
}

#[derive(Default)]
struct WindowSeries {
    rms: Vec<(usize, f64)>,
    mav: Vec<(usize, f64)>,
    mpf: Vec<(usize, f64)>,
    mdf: Vec<(usize, f64)>,
    fatigue_index: Vec<(usize, f64)>,
    degenerate: usize,
}

/// Per-channel amplitude and spectral analyzer
#[derive(Debug, Clone)]
pub struct ChannelFeatureAnalyzer {
    config: SpectralConfig,
}

impl ChannelFeatureAnalyzer {
    pub fn new(config: &SpectralConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn analyze(&self, signal: &ChannelSignal) -> AmplitudeFrequencyMetrics {
        let samples = signal.samples();
        let fs = signal.sampling_rate();
        let window = ms_to_samples(self.config.analysis_window_ms, fs);
        let plan = WindowPlan::new(samples.len(), window);
        let mut spectrum = SpectrumAnalyzer::new(&self.config, fs);

        let mut series = WindowSeries::default();
        for (index, range) in plan.ranges.iter().enumerate() {
            let segment = &samples[range.clone()];
            if let Some(value) = rms(segment) {
                series.rms.push((index, value));
            }
            if let Some(value) = mav(segment) {
                series.mav.push((index, value));
            }
            match spectrum.features(segment) {
                Some(features) => {
                    series.mpf.push((index, features.mean_frequency));
                    series.mdf.push((index, features.median_frequency));
                    if let Some(fi) = features.fatigue_index {
                        series.fatigue_index.push((index, fi));
                    }
                }
                None => series.degenerate += 1,
            }
        }

        debug!(
            window_samples = plan.window_samples,
            windows = plan.window_count(),
            degenerate = series.degenerate,
            "spectral analysis complete"
        );

        let window_mean = |values: &[(usize, f64)]| {
            mean(&values.iter().map(|(_, v)| *v).collect::<Vec<_>>())
        };

        AmplitudeFrequencyMetrics {
            rms: MetricSummary::from_windows(rms(samples), &series.rms),
            mav: MetricSummary::from_windows(mav(samples), &series.mav),
            mpf: MetricSummary::from_windows(window_mean(&series.mpf), &series.mpf),
            mdf: MetricSummary::from_windows(window_mean(&series.mdf), &series.mdf),
            fatigue_index: MetricSummary::from_windows(
                window_mean(&series.fatigue_index),
                &series.fatigue_index,
            ),
            analysis_window_samples: plan.window_samples,
            degenerate_windows: series.degenerate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn signal(samples: Vec<f64>, fs: f64) -> ChannelSignal {
        ChannelSignal::new(fs, samples).unwrap()
    }

    #[test]
    fn test_pure_tone_metrics() {
        let fs = 1000.0;
        let samples: Vec<f64> = (0..2000)
            .map(|i| (2.0 * PI * 100.0 * i as f64 / fs).sin())
            .collect();
        let metrics = ChannelFeatureAnalyzer::new(&SpectralConfig::default()).analyze(&signal(samples, fs));

        assert_eq!(metrics.analysis_window_samples, 500);
        assert_eq!(metrics.mpf.temporal.unwrap().window_count, 4);
        assert!((metrics.mpf.value.unwrap() - 100.0).abs() < 2.0);
        assert!((metrics.mdf.value.unwrap() - 100.0).abs() < 2.0);
        assert!((metrics.rms.value.unwrap() - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-3);
        assert!(metrics.fatigue_index.value.unwrap() > 0.0);
        assert_eq!(metrics.degenerate_windows, 0);
    }

    #[test]
    fn test_silent_signal_excludes_degenerate_windows() {
        let metrics =
            ChannelFeatureAnalyzer::new(&SpectralConfig::default()).analyze(&signal(vec![0.0; 2000], 1000.0));

        assert_eq!(metrics.rms.value, Some(0.0));
        assert!(metrics.mpf.value.is_none());
        assert!(metrics.mpf.temporal.is_none());
        assert!(metrics.mdf.value.is_none());
        assert!(metrics.fatigue_index.value.is_none());
        assert_eq!(metrics.degenerate_windows, 4);
    }

    #[test]
    fn test_decreasing_frequency_has_negative_mdf_trend() {
        let fs = 1000.0;
        let mut samples = Vec::new();
        for (block, freq) in [150.0, 120.0, 90.0, 60.0].iter().enumerate() {
            samples.extend((0..500).map(|i| {
                let t = (block * 500 + i) as f64 / fs;
                (2.0 * PI * freq * t).sin()
            }));
        }
        let metrics = ChannelFeatureAnalyzer::new(&SpectralConfig::default()).analyze(&signal(samples, fs));

        assert!(metrics.mdf.trend_slope.unwrap() < 0.0);
        assert!(metrics.fatigue_index.trend_slope.unwrap() > 0.0);
    }

    #[test]
    fn test_too_short_signal_has_no_spectral_windows() {
        let metrics =
            ChannelFeatureAnalyzer::new(&SpectralConfig::default()).analyze(&signal(vec![1.0, -1.0, 1.0], 1000.0));

        assert!(metrics.rms.value.is_some());
        assert!(metrics.rms.temporal.is_none());
        assert!(metrics.mpf.value.is_none());
        assert_eq!(metrics.degenerate_windows, 0);
    }
}
