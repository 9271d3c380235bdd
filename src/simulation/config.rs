// src/simulation/config.rs
//! Synthetic session configuration

use serde::{Deserialize, Serialize};

/// Full description of a synthetic session
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimulationConfig {
    pub seed: u64,
    pub sampling_rate_hz: f64,
    pub channels: Vec<SimulatedChannel>,
    pub protocol: ContractionProtocol,
    pub noise: NoiseConfig,
    pub fatigue: FatigueConfig,
}

/// One simulated electrode
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimulatedChannel {
    /// Raw channel identifier, e.g. `"CH1"`
    pub name: String,
    /// RMS envelope amplitude of a maximal contraction
    pub mvc_amplitude: f64,
    /// Scales every contraction's intensity on this channel
    pub activation_scale: f64,
    /// Also emit a `"<name> activated"` pre-processed variant
    pub include_activated: bool,
}

/// Timing of the prescribed contractions
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ContractionProtocol {
    pub count: usize,
    pub lead_in_ms: f64,
    pub contraction_ms: f64,
    pub rest_ms: f64,
    /// Target intensity as a fraction of MVC
    pub intensity: f64,
    /// Onset and offset ramp length
    pub ramp_ms: f64,
    /// Indices of prescribed contractions the patient skips
    pub skipped: Vec<usize>,
}

/// Additive measurement noise
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NoiseConfig {
    /// RMS of the Gaussian baseline noise
    pub baseline_rms: f64,
    pub powerline_frequency_hz: f64,
    pub powerline_amplitude: f64,
}

/// Spectral compression over the session
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FatigueConfig {
    /// Dominant firing frequency of a fresh muscle
    pub initial_frequency_hz: f64,
    /// Fraction by which the dominant frequency has dropped at session end
    pub frequency_drop: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            sampling_rate_hz: 1000.0,
            channels: vec![
                SimulatedChannel::new("CH1", 1.0),
                SimulatedChannel::new("CH2", 0.9),
            ],
            protocol: ContractionProtocol::default(),
            noise: NoiseConfig::default(),
            fatigue: FatigueConfig::default(),
        }
    }
}

impl SimulatedChannel {
    pub fn new(name: &str, activation_scale: f64) -> Self {
        Self {
            name: name.to_string(),
            mvc_amplitude: 1.0,
            activation_scale,
            include_activated: true,
        }
    }
}

impl Default for ContractionProtocol {
    fn default() -> Self {
        Self {
            count: 5,
            lead_in_ms: 1000.0,
            contraction_ms: 3000.0,
            rest_ms: 2000.0,
            intensity: 0.8,
            ramp_ms: 50.0,
            skipped: Vec::new(),
        }
    }
}

impl ContractionProtocol {
    /// Session length in milliseconds
    pub fn session_ms(&self) -> f64 {
        self.lead_in_ms + self.count as f64 * (self.contraction_ms + self.rest_ms)
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            baseline_rms: 0.005,
            powerline_frequency_hz: 50.0,
            powerline_amplitude: 0.002,
        }
    }
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            initial_frequency_hz: 90.0,
            frequency_drop: 0.25,
        }
    }
}
