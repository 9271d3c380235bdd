// src/simulation/muscle_model.rs
//! Muscle activation and motor unit firing model

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::Rng;

use super::config::{ContractionProtocol, FatigueConfig};

/// A prescribed contraction in session time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledContraction {
    pub index: usize,
    pub start_ms: f64,
    pub end_ms: f64,
    pub performed: bool,
}

/// Contraction schedule of a protocol
pub fn schedule(protocol: &ContractionProtocol) -> Vec<ScheduledContraction> {
    (0..protocol.count)
        .map(|index| {
            let start_ms = protocol.lead_in_ms + index as f64 * (protocol.contraction_ms + protocol.rest_ms);
            ScheduledContraction {
                index,
                start_ms,
                end_ms: start_ms + protocol.contraction_ms,
                performed: !protocol.skipped.contains(&index),
            }
        })
        .collect()
}

/// Activation level in `[0, 1]` at time `t_ms` with linear ramps
pub fn activation_at(t_ms: f64, contractions: &[ScheduledContraction], ramp_ms: f64) -> f64 {
    contractions
        .iter()
        .filter(|c| c.performed && t_ms >= c.start_ms && t_ms < c.end_ms)
        .map(|c| {
            if ramp_ms <= 0.0 {
                return 1.0;
            }
            let rise = (t_ms - c.start_ms) / ramp_ms;
            let fall = (c.end_ms - t_ms) / ramp_ms;
            rise.min(fall).clamp(0.0, 1.0)
        })
        .fold(0.0, f64::max)
}

// Relative frequency and weight of the spectral components of a MUAP train
const COMPONENTS: [(f64, f64); 3] = [(0.6, 0.5), (1.0, 1.0), (1.7, 0.4)];

/// Band-limited motor unit action potential train generator
///
/// The dominant frequency falls linearly with session progress to mimic
/// spectral compression under fatigue.
pub struct MuscleModel {
    fatigue: FatigueConfig,
    phases: [f64; 3],
}

impl MuscleModel {
    pub fn new(fatigue: &FatigueConfig, rng: &mut StdRng) -> Self {
        Self {
            fatigue: fatigue.clone(),
            phases: [
                rng.gen::<f64>() * 2.0 * PI,
                rng.gen::<f64>() * 2.0 * PI,
                rng.gen::<f64>() * 2.0 * PI,
            ],
        }
    }

    /// Dominant frequency at a point of the session (`progress` in `[0, 1]`)
    pub fn dominant_frequency(&self, progress: f64) -> f64 {
        self.fatigue.initial_frequency_hz * (1.0 - self.fatigue.frequency_drop * progress.clamp(0.0, 1.0))
    }

    /// Next unit-amplitude sample; advances the component phases
    pub fn next_sample(&mut self, progress: f64, sampling_rate: f64, rng: &mut StdRng) -> f64 {
        let dominant = self.dominant_frequency(progress);
        let norm: f64 = COMPONENTS.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        let mut value = 0.0;
        for ((multiplier, weight), phase) in COMPONENTS.iter().zip(self.phases.iter_mut()) {
            *phase = (*phase + 2.0 * PI * dominant * multiplier / sampling_rate) % (2.0 * PI);
            value += weight * phase.sin();
        }
        // Unit RMS carrier with mild amplitude jitter
        let jitter = 1.0 + (rng.gen::<f64>() - 0.5) * 0.1;
        value / norm * std::f64::consts::SQRT_2 * jitter
    }
}
