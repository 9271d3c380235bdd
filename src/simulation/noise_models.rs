// src/simulation/noise_models.rs
//! Baseline and powerline noise

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::Rng;

use super::config::NoiseConfig;

pub struct NoiseModel {
    config: NoiseConfig,
    powerline_phase: f64,
}

impl NoiseModel {
    pub fn new(config: &NoiseConfig) -> Self {
        Self {
            config: config.clone(),
            powerline_phase: 0.0,
        }
    }

    pub fn next_sample(&mut self, sampling_rate: f64, rng: &mut StdRng) -> f64 {
        self.powerline_phase =
            (self.powerline_phase + 2.0 * PI * self.config.powerline_frequency_hz / sampling_rate) % (2.0 * PI);
        gaussian(rng) * self.config.baseline_rms + self.powerline_phase.sin() * self.config.powerline_amplitude
    }
}

/// Standard normal sample via the Box-Muller transform
fn gaussian(rng: &mut StdRng) -> f64 {
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
