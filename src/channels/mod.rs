// src/channels/mod.rs
//! Channel identifiers, ingested signals and logical-name resolution

pub mod resolver;

pub use resolver::{activated_name, ChannelMapping, ChannelResolver, ResolvedChannel};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisErrorBuilder, AnalysisResult};
use crate::error_context;

/// Identifier of a raw or logical EMG channel
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for ChannelId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// One channel as delivered by the ingestion collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawChannel {
    pub sampling_rate: f64,
    pub samples: Vec<f64>,
}

impl RawChannel {
    pub fn new(sampling_rate: f64, samples: Vec<f64>) -> Self {
        Self {
            sampling_rate,
            samples,
        }
    }

    /// Reject structurally invalid channels
    pub fn validate(&self, id: &ChannelId) -> AnalysisResult<()> {
        if !self.sampling_rate.is_finite() || self.sampling_rate <= 0.0 {
            return Err(AnalysisError::InvalidData {
                data_type: "sampling rate".to_string(),
                reason: format!("{} is not a positive frequency", self.sampling_rate),
                context: error_context!("ingestion", "validate_channel").add_info("channel", id.as_str()),
            });
        }
        if let Some(index) = self.samples.iter().position(|s| !s.is_finite()) {
            return Err(AnalysisError::InvalidData {
                data_type: "samples".to_string(),
                reason: format!("non-finite sample at index {}", index),
                context: error_context!("ingestion", "validate_channel").add_info("channel", id.as_str()),
            });
        }
        Ok(())
    }
}

/// A logical channel ready for analysis
///
/// Immutable once built. `activated_samples`, when present, has the same
/// length as `samples`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSignal {
    sampling_rate: f64,
    samples: Vec<f64>,
    activated_samples: Option<Vec<f64>>,
}

impl ChannelSignal {
    /// Build a signal without an activated variant
    pub fn new(sampling_rate: f64, samples: Vec<f64>) -> AnalysisResult<Self> {
        Self::with_activated(sampling_rate, samples, None)
    }

    /// Build a signal, optionally paired with its activated variant
    pub fn with_activated(
        sampling_rate: f64,
        samples: Vec<f64>,
        activated_samples: Option<Vec<f64>>,
    ) -> AnalysisResult<Self> {
        if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
            return Err(AnalysisErrorBuilder::new("channel_signal", "new")
                .invalid_data("sampling rate", "must be finite and positive"));
        }
        if let Some(activated) = &activated_samples {
            if activated.len() != samples.len() {
                return Err(AnalysisErrorBuilder::new("channel_signal", "new").invalid_data(
                    "activated samples",
                    &format!("length {} differs from raw length {}", activated.len(), samples.len()),
                ));
            }
        }
        Ok(Self {
            sampling_rate,
            samples,
            activated_samples,
        })
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn activated_samples(&self) -> Option<&[f64]> {
        self.activated_samples.as_deref()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Signal duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        samples_to_ms(self.samples.len(), self.sampling_rate)
    }
}

/// Convert a sample count to milliseconds
pub fn samples_to_ms(samples: usize, sampling_rate: f64) -> f64 {
    samples as f64 * 1000.0 / sampling_rate
}

/// Convert a duration in milliseconds to a sample count, rounding to nearest
pub fn ms_to_samples(ms: f64, sampling_rate: f64) -> usize {
    (ms / 1000.0 * sampling_rate).round().max(0.0) as usize
}
