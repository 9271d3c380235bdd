// src/processing/windowing.rs
//! Analysis window segmentation and window functions

use std::f64::consts::PI;
use std::ops::Range;

use crate::config::constants::spectral::MIN_SPECTRAL_SAMPLES;
use crate::config::WindowType;

/// Non-overlapping segmentation of one channel
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPlan {
    pub window_samples: usize,
    pub ranges: Vec<Range<usize>>,
}

impl WindowPlan {
    /// Split `len` samples into consecutive windows of `window_samples`
    ///
    /// A trailing partial window is dropped. A signal shorter than one
    /// window is analysed as a single window when it holds at least
    /// [`MIN_SPECTRAL_SAMPLES`] samples.
    pub fn new(len: usize, window_samples: usize) -> Self {
        let window_samples = window_samples.max(MIN_SPECTRAL_SAMPLES);
        let ranges = if len < window_samples {
            if len >= MIN_SPECTRAL_SAMPLES {
                vec![0..len]
            } else {
                Vec::new()
            }
        } else {
            (0..len / window_samples)
                .map(|i| i * window_samples..(i + 1) * window_samples)
                .collect()
        };

        Self {
            window_samples,
            ranges,
        }
    }

    pub fn window_count(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Window function coefficients of a given length
pub fn window_function(window_type: WindowType, size: usize) -> Vec<f64> {
    if size < 2 {
        return vec![1.0; size];
    }
    let denom = (size - 1) as f64;
    match window_type {
        WindowType::Rectangular => vec![1.0; size],
        WindowType::Hamming => (0..size)
            .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / denom).cos())
            .collect(),
        WindowType::Hanning => (0..size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos()))
            .collect(),
        WindowType::Blackman => (0..size)
            .map(|i| {
                let n = i as f64 / denom;
                0.42 - 0.5 * (2.0 * PI * n).cos() + 0.08 * (4.0 * PI * n).cos()
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_plan_drops_partial_tail() {
        let plan = WindowPlan::new(1050, 250);
        assert_eq!(plan.window_count(), 4);
        assert_eq!(plan.ranges[3], 750..1000);
    }

    #[test]
    fn test_short_signal_is_single_window() {
        let plan = WindowPlan::new(100, 500);
        assert_eq!(plan.ranges, vec![0..100]);
    }

    #[test]
    fn test_tiny_signal_has_no_windows() {
        assert!(WindowPlan::new(3, 500).is_empty());
        assert!(WindowPlan::new(0, 500).is_empty());
    }

    #[test]
    fn test_window_functions() {
        let hamming = window_function(WindowType::Hamming, 10);
        assert_eq!(hamming.len(), 10);
        assert!((hamming[0] - 0.08).abs() < 0.01);

        let hanning = window_function(WindowType::Hanning, 10);
        assert!(hanning[0] < 0.01);

        let rect = window_function(WindowType::Rectangular, 5);
        assert!(rect.iter().all(|&x| x == 1.0));

        let blackman = window_function(WindowType::Blackman, 9);
        assert!((blackman[4] - 1.0).abs() < 1e-9);
    }
}
