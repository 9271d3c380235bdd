// src/utils/stats.rs
//! Descriptive statistics over per-window metric values

use serde::Serialize;

/// Values with a magnitude at or below this are treated as zero divisors
const ZERO_EPSILON: f64 = 1e-12;

/// Within-session statistics of a windowed metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemporalStats {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub window_count: usize,
    /// `std / |mean|`, null when the mean is zero
    pub coefficient_of_variation: Option<f64>,
}

impl TemporalStats {
    /// Statistics over finite values; `None` when there are none
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }

        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;
        let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        Some(Self {
            mean,
            std,
            min: finite.iter().copied().fold(f64::INFINITY, f64::min),
            max: finite.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            window_count: finite.len(),
            coefficient_of_variation: (mean.abs() > ZERO_EPSILON).then(|| std / mean.abs()),
        })
    }
}

/// Least-squares slope of `y` against `x`; `None` with fewer than two
/// distinct `x` values
pub fn linear_trend(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (covariance, variance_x) = points.iter().fold((0.0, 0.0), |(cov, var), (x, y)| {
        (cov + (x - mean_x) * (y - mean_y), var + (x - mean_x).powi(2))
    });

    (variance_x > ZERO_EPSILON).then(|| covariance / variance_x)
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporal_stats() {
        let stats = TemporalStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.std, 2.0);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.window_count, 8);
        assert_eq!(stats.coefficient_of_variation, Some(0.4));
    }

    #[test]
    fn test_temporal_stats_skips_non_finite() {
        let stats = TemporalStats::from_values(&[1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(stats.window_count, 2);
        assert_eq!(stats.mean, 2.0);
        assert!(TemporalStats::from_values(&[f64::NAN]).is_none());
        assert!(TemporalStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_zero_mean_has_no_cv() {
        let stats = TemporalStats::from_values(&[-1.0, 1.0]).unwrap();
        assert!(stats.coefficient_of_variation.is_none());
    }

    #[test]
    fn test_linear_trend() {
        let points = [(0.0, 100.0), (1.0, 98.0), (2.0, 96.0), (3.0, 94.0)];
        assert!((linear_trend(&points).unwrap() + 2.0).abs() < 1e-12);
        assert!(linear_trend(&points[..1]).is_none());
        assert!(linear_trend(&[(1.0, 1.0), (1.0, 2.0)]).is_none());
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(mean(&[]), None);
    }
}
