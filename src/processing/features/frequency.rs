//! Frequency domain fatigue features
//!
//! Power spectra are one-sided periodograms of the mean-removed, tapered
//! segment. Mean power frequency (MPF) is the spectral centroid, median power
//! frequency (MDF) splits total power in half, and the Dimitrov fatigue index
//! FI_nsm5 is the ratio of spectral moments `M(-1) / M(5)` over a band.
//! FI_nsm5 is reported unscaled; its absolute magnitude depends on the band
//! and only its trend is clinically meaningful.

use std::sync::Arc;

use rustfft::{num_complex::Complex64, Fft, FftPlanner};

use crate::config::constants::spectral::{DEGENERATE_POWER_EPSILON, FATIGUE_INDEX_HIGH_ORDER};
use crate::config::{SpectralConfig, WindowType};
use crate::processing::windowing::window_function;

/// One-sided power spectrum
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSpectrum {
    pub frequencies: Vec<f64>,
    pub power: Vec<f64>,
    total_power: f64,
}

impl PowerSpectrum {
    pub fn total_power(&self) -> f64 {
        self.total_power
    }

    /// Mean power frequency in Hz
    pub fn mean_frequency(&self) -> f64 {
        let weighted: f64 = self
            .frequencies
            .iter()
            .zip(&self.power)
            .map(|(f, p)| f * p)
            .sum();
        weighted / self.total_power
    }

    /// Median power frequency in Hz
    pub fn median_frequency(&self) -> f64 {
        let half_power = self.total_power / 2.0;
        let mut cumulative = 0.0;
        for (frequency, power) in self.frequencies.iter().zip(&self.power) {
            cumulative += power;
            if cumulative >= half_power {
                return *frequency;
            }
        }
        self.frequencies.last().copied().unwrap_or(0.0)
    }

    /// Dimitrov FI_nsm5 over `[low_hz, high_hz]`; `None` when the band holds
    /// no power
    pub fn fatigue_index(&self, low_hz: f64, high_hz: f64) -> Option<f64> {
        let (inverse_moment, high_moment) = self
            .frequencies
            .iter()
            .zip(&self.power)
            .filter(|(f, _)| **f > 0.0 && **f >= low_hz && **f <= high_hz)
            .fold((0.0, 0.0), |(m_inv, m_high), (f, p)| {
                (m_inv + p / f, m_high + p * f.powi(FATIGUE_INDEX_HIGH_ORDER))
            });

        (high_moment > DEGENERATE_POWER_EPSILON).then(|| inverse_moment / high_moment)
    }
}

/// Spectral feature values for one segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralFeatures {
    pub mean_frequency: f64,
    pub median_frequency: f64,
    pub fatigue_index: Option<f64>,
}

/// FFT-based spectrum analyzer for one channel
pub struct SpectrumAnalyzer {
    sampling_rate: f64,
    window_type: WindowType,
    fatigue_band: (f64, f64),
    planner: FftPlanner<f64>,
    cached_plan: Option<(usize, Arc<dyn Fft<f64>>, Vec<f64>)>,
}

impl std::fmt::Debug for SpectrumAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumAnalyzer")
            .field("sampling_rate", &self.sampling_rate)
            .field("window_type", &self.window_type)
            .field("fatigue_band", &self.fatigue_band)
            .finish()
    }
}

impl SpectrumAnalyzer {
    pub fn new(config: &SpectralConfig, sampling_rate: f64) -> Self {
        let nyquist = sampling_rate / 2.0;
        Self {
            sampling_rate,
            window_type: config.window_type,
            fatigue_band: (config.fatigue_band_low_hz, config.fatigue_band_high_hz.min(nyquist)),
            planner: FftPlanner::new(),
            cached_plan: None,
        }
    }

    /// Power spectrum of a segment; `None` for degenerate input
    pub fn power_spectrum(&mut self, segment: &[f64]) -> Option<PowerSpectrum> {
        let n = segment.len();
        if n < 2 {
            return None;
        }

        let (fft, taper) = self.plan(n);
        let mean = segment.iter().sum::<f64>() / n as f64;
        let mut buffer: Vec<Complex64> = segment
            .iter()
            .zip(&taper)
            .map(|(&x, &w)| Complex64::new((x - mean) * w, 0.0))
            .collect();
        fft.process(&mut buffer);

        let bins = n / 2 + 1;
        let resolution = self.sampling_rate / n as f64;
        let frequencies: Vec<f64> = (0..bins).map(|k| k as f64 * resolution).collect();
        let power: Vec<f64> = buffer[..bins].iter().map(|c| c.norm_sqr()).collect();
        let total_power: f64 = power.iter().sum();

        if !total_power.is_finite() || total_power <= DEGENERATE_POWER_EPSILON {
            return None;
        }

        Some(PowerSpectrum {
            frequencies,
            power,
            total_power,
        })
    }

    /// MPF, MDF and FI_nsm5 of a segment; `None` for degenerate input
    pub fn features(&mut self, segment: &[f64]) -> Option<SpectralFeatures> {
        let spectrum = self.power_spectrum(segment)?;
        let (low, high) = self.fatigue_band;
        Some(SpectralFeatures {
            mean_frequency: spectrum.mean_frequency(),
            median_frequency: spectrum.median_frequency(),
            fatigue_index: spectrum.fatigue_index(low, high),
        })
    }

    fn plan(&mut self, n: usize) -> (Arc<dyn Fft<f64>>, Vec<f64>) {
        match &self.cached_plan {
            Some((size, fft, taper)) if *size == n => (Arc::clone(fft), taper.clone()),
            _ => {
                let fft = self.planner.plan_fft_forward(n);
                let taper = window_function(self.window_type, n);
                self.cached_plan = Some((n, Arc::clone(&fft), taper.clone()));
                (fft, taper)
            }
        }
    }
}
