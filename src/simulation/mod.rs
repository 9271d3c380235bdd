// src/simulation/mod.rs
//! Synthetic EMG session generation for tests, benchmarks and demos

pub mod config;
pub mod muscle_model;
pub mod noise_models;
pub mod signal_generator;

pub use config::{ContractionProtocol, FatigueConfig, NoiseConfig, SimulatedChannel, SimulationConfig};
pub use muscle_model::{MuscleModel, ScheduledContraction};
pub use noise_models::NoiseModel;
pub use signal_generator::SessionSimulator;
