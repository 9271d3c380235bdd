// src/utils/fingerprint.rs
//! Content fingerprint of an analysis request
//!
//! CRC-32 over channel identifiers, sampling rates, sample bit patterns, the
//! serialised configuration and the serialised session context. Identical requests always produce the same
//! fingerprint, which persistence layers use as a cache key.

use std::collections::BTreeMap;
use std::fmt;

use crc32fast::Hasher;
use serde::Serialize;

use crate::channels::{ChannelId, ChannelMapping, RawChannel};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisErrorBuilder, AnalysisResult};
use crate::session::SessionContext;

/// CRC-32 fingerprint of channels, configuration and session context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct SessionFingerprint(u32);

impl SessionFingerprint {
    pub fn compute(
        channels: &BTreeMap<ChannelId, RawChannel>,
        mapping: Option<&ChannelMapping>,
        config: &AnalysisConfig,
        context: &SessionContext,
    ) -> AnalysisResult<Self> {
        let mut hasher = Hasher::new();

        for (id, channel) in channels {
            hash_str(&mut hasher, id.as_str());
            hasher.update(&channel.sampling_rate.to_bits().to_le_bytes());
            hasher.update(&(channel.samples.len() as u64).to_le_bytes());
            for sample in &channel.samples {
                hasher.update(&sample.to_bits().to_le_bytes());
            }
        }

        if let Some(mapping) = mapping {
            for (logical, source) in mapping {
                hash_str(&mut hasher, logical.as_str());
                hash_str(&mut hasher, source.as_str());
            }
        }

        let config_bytes = serde_json::to_vec(config).map_err(|e| {
            AnalysisErrorBuilder::new("fingerprint", "serialize_config").configuration(&e.to_string())
        })?;
        hasher.update(&config_bytes);

        let context_bytes = serde_json::to_vec(context).map_err(|e| {
            AnalysisErrorBuilder::new("fingerprint", "serialize_context").configuration(&e.to_string())
        })?;
        hasher.update(&context_bytes);

        Ok(Self(hasher.finalize()))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

fn hash_str(hasher: &mut Hasher, value: &str) {
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

impl fmt::Display for SessionFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl From<SessionFingerprint> for String {
    fn from(fingerprint: SessionFingerprint) -> Self {
        fingerprint.to_string()
    }
}
