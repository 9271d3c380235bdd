// src/simulation/signal_generator.rs
//! Synthetic multi-channel session generation

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use super::config::{SimulatedChannel, SimulationConfig};
use super::muscle_model::{activation_at, schedule, MuscleModel, ScheduledContraction};
use super::noise_models::NoiseModel;
use crate::channels::{activated_name, ChannelId, RawChannel};
use crate::session::SessionInput;

/// Deterministic session generator
///
/// The same configuration (including its seed) always produces the same
/// samples. Each channel draws from its own seeded stream, so adding a
/// channel does not change the others.
#[derive(Debug, Clone)]
pub struct SessionSimulator {
    config: SimulationConfig,
}

impl SessionSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Prescribed contractions, including skipped ones
    pub fn schedule(&self) -> Vec<ScheduledContraction> {
        schedule(&self.config.protocol)
    }

    /// Generate raw channels plus their activated variants
    pub fn generate(&self) -> SessionInput {
        let fs = self.config.sampling_rate_hz;
        let sample_count = (self.config.protocol.session_ms() / 1000.0 * fs).round() as usize;
        let plan = self.schedule();

        let mut channels = BTreeMap::new();
        for (index, channel) in self.config.channels.iter().enumerate() {
            let (raw, activated) = self.generate_channel(index, channel, &plan, sample_count);
            let id = ChannelId::new(channel.name.as_str());
            if let Some(activated) = activated {
                channels.insert(activated_name(&id), RawChannel::new(fs, activated));
            }
            channels.insert(id, RawChannel::new(fs, raw));
        }

        debug!(
            channels = self.config.channels.len(),
            samples = sample_count,
            seed = self.config.seed,
            "generated synthetic session"
        );

        SessionInput::new(channels)
    }

    fn generate_channel(
        &self,
        index: usize,
        channel: &SimulatedChannel,
        plan: &[ScheduledContraction],
        sample_count: usize,
    ) -> (Vec<f64>, Option<Vec<f64>>) {
        let fs = self.config.sampling_rate_hz;
        let protocol = &self.config.protocol;
        let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(index as u64));
        let mut muscle = MuscleModel::new(&self.config.fatigue, &mut rng);
        let mut noise = NoiseModel::new(&self.config.noise);
        let amplitude = channel.mvc_amplitude * protocol.intensity * channel.activation_scale;

        let mut raw = Vec::with_capacity(sample_count);
        let mut activated = channel.include_activated.then(|| Vec::with_capacity(sample_count));

        for i in 0..sample_count {
            let t_ms = i as f64 * 1000.0 / fs;
            let progress = if sample_count > 1 {
                i as f64 / (sample_count - 1) as f64
            } else {
                0.0
            };
            let muscle_sample =
                amplitude * activation_at(t_ms, plan, protocol.ramp_ms) * muscle.next_sample(progress, fs, &mut rng);
            raw.push(muscle_sample + noise.next_sample(fs, &mut rng));
            if let Some(activated) = activated.as_mut() {
                activated.push(muscle_sample);
            }
        }

        (raw, activated)
    }
}
