// src/channels/resolver.rs
//! Logical channel resolution
//!
//! Maps raw channel identifiers to logical muscle names and pairs each raw
//! channel with its `"<channel> activated"` variant. All name matching
//! happens here, once per request; downstream stages only see
//! [`ChannelSignal`] values keyed by [`ChannelId`].

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::{ChannelId, ChannelSignal, RawChannel};
use crate::error::{AnalysisError, AnalysisResult};

/// Logical name -> raw channel identifier
pub type ChannelMapping = BTreeMap<ChannelId, ChannelId>;

/// Suffix marking the pre-processed variant of a raw channel
pub const ACTIVATED_SUFFIX: &str = " activated";

/// Outcome of resolving one logical channel
#[derive(Debug, Clone)]
pub struct ResolvedChannel {
    pub logical: ChannelId,
    pub source: ChannelId,
    pub activated_source: Option<ChannelId>,
    pub signal: AnalysisResult<ChannelSignal>,
}

/// Channel resolution table built from the identifiers present in a file
#[derive(Debug, Clone)]
pub struct ChannelResolver {
    activated_of: BTreeMap<ChannelId, ChannelId>,
    primary: Vec<ChannelId>,
}

impl ChannelResolver {
    /// Build the resolution table for a set of raw channel identifiers
    pub fn new<'a, I>(raw_ids: I) -> Self
    where
        I: IntoIterator<Item = &'a ChannelId>,
    {
        let ids: Vec<&ChannelId> = raw_ids.into_iter().collect();
        let mut activated_of = BTreeMap::new();

        for id in &ids {
            let candidate = activated_name(id);
            if ids.iter().any(|other| **other == candidate) {
                activated_of.insert((*id).clone(), candidate);
            }
        }

        let primary = ids
            .iter()
            .filter(|id| !activated_of.values().any(|activated| activated == **id))
            .map(|id| (*id).clone())
            .collect();

        Self {
            activated_of,
            primary,
        }
    }

    /// Raw identifiers that are not activated variants of another channel
    pub fn primary_channels(&self) -> &[ChannelId] {
        &self.primary
    }

    /// Activated variant paired with a raw channel, if present
    pub fn activated_for(&self, raw: &ChannelId) -> Option<&ChannelId> {
        self.activated_of.get(raw)
    }

    /// Resolve logical channels against the raw data
    ///
    /// Without a mapping every primary raw channel is analysed under its own
    /// name. A mapped name with no raw match yields `ChannelNotFound` for that
    /// channel only.
    pub fn resolve(
        &self,
        raw: &BTreeMap<ChannelId, RawChannel>,
        mapping: Option<&ChannelMapping>,
    ) -> AnalysisResult<Vec<ResolvedChannel>> {
        let requests: Vec<(ChannelId, ChannelId)> = match mapping {
            Some(mapping) => mapping
                .iter()
                .map(|(logical, source)| (logical.clone(), source.clone()))
                .collect(),
            None => self.primary.iter().map(|id| (id.clone(), id.clone())).collect(),
        };

        // Only requested sources and their activated variants are validated;
        // unused channels in the file cannot reject the request.
        for (_, source) in &requests {
            let activated = self.activated_of.get(source);
            for id in std::iter::once(source).chain(activated) {
                if let Some(channel) = raw.get(id) {
                    channel.validate(id)?;
                }
            }
        }

        let resolved = requests
            .into_iter()
            .map(|(logical, source)| self.resolve_one(raw, logical, source))
            .collect();

        Ok(resolved)
    }

    fn resolve_one(
        &self,
        raw: &BTreeMap<ChannelId, RawChannel>,
        logical: ChannelId,
        source: ChannelId,
    ) -> ResolvedChannel {
        let Some(channel) = raw.get(&source) else {
            warn!(logical = %logical, source = %source, "mapped channel not present in input");
            return ResolvedChannel {
                signal: Err(AnalysisError::ChannelNotFound {
                    channel: source.clone(),
                    requested: logical.clone(),
                }),
                logical,
                source,
                activated_source: None,
            };
        };

        let activated = self
            .activated_of
            .get(&source)
            .and_then(|activated_id| raw.get(activated_id).map(|a| (activated_id, a)))
            .filter(|(activated_id, activated)| {
                let compatible = activated.samples.len() == channel.samples.len()
                    && activated.sampling_rate == channel.sampling_rate;
                if !compatible {
                    warn!(
                        channel = %source,
                        activated = %activated_id,
                        "activated variant does not match raw channel shape, ignoring it"
                    );
                }
                compatible
            });

        debug!(
            logical = %logical,
            source = %source,
            activated = activated.is_some(),
            samples = channel.samples.len(),
            "resolved channel"
        );

        let activated_source = activated.map(|(id, _)| id.clone());
        let signal = ChannelSignal::with_activated(
            channel.sampling_rate,
            channel.samples.clone(),
            activated.map(|(_, a)| a.samples.clone()),
        );

        ResolvedChannel {
            logical,
            source,
            activated_source,
            signal,
        }
    }
}

/// Name of the activated variant for a raw channel
pub fn activated_name(raw: &ChannelId) -> ChannelId {
    ChannelId::new(format!("{}{}", raw.as_str(), ACTIVATED_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_set(names: &[&str]) -> BTreeMap<ChannelId, RawChannel> {
        names
            .iter()
            .map(|name| (ChannelId::from(*name), RawChannel::new(1000.0, vec![0.0, 0.1, 0.2])))
            .collect()
    }

    #[test]
    fn test_pairs_activated_variants() {
        let raw = raw_set(&["CH1", "CH1 activated", "CH2"]);
        let resolver = ChannelResolver::new(raw.keys());

        assert_eq!(resolver.primary_channels(), &[ChannelId::from("CH1"), ChannelId::from("CH2")]);
        assert_eq!(
            resolver.activated_for(&ChannelId::from("CH1")),
            Some(&ChannelId::from("CH1 activated"))
        );
        assert!(resolver.activated_for(&ChannelId::from("CH2")).is_none());

        let resolved = resolver.resolve(&raw, None).unwrap();
        assert_eq!(resolved.len(), 2);
        let ch1 = resolved[0].signal.as_ref().unwrap();
        assert!(ch1.activated_samples().is_some());
        let ch2 = resolved[1].signal.as_ref().unwrap();
        assert!(ch2.activated_samples().is_none());
    }

    #[test]
    fn test_mapping_renames_channels() {
        let raw = raw_set(&["CH1", "CH2"]);
        let mapping: ChannelMapping = [
            (ChannelId::from("left_quadriceps"), ChannelId::from("CH1")),
            (ChannelId::from("right_quadriceps"), ChannelId::from("CH2")),
        ]
        .into_iter()
        .collect();

        let resolved = ChannelResolver::new(raw.keys()).resolve(&raw, Some(&mapping)).unwrap();
        assert_eq!(resolved[0].logical, ChannelId::from("left_quadriceps"));
        assert_eq!(resolved[0].source, ChannelId::from("CH1"));
        assert!(resolved.iter().all(|r| r.signal.is_ok()));
    }

    #[test]
    fn test_missing_mapped_channel_is_isolated() {
        let raw = raw_set(&["CH1"]);
        let mapping: ChannelMapping = [
            (ChannelId::from("left"), ChannelId::from("CH1")),
            (ChannelId::from("right"), ChannelId::from("CH9")),
        ]
        .into_iter()
        .collect();

        let resolved = ChannelResolver::new(raw.keys()).resolve(&raw, Some(&mapping)).unwrap();
        assert!(resolved[0].signal.is_ok());
        match &resolved[1].signal {
            Err(AnalysisError::ChannelNotFound { channel, requested }) => {
                assert_eq!(channel.as_str(), "CH9");
                assert_eq!(requested.as_str(), "right");
            }
            other => panic!("Expected ChannelNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_orphan_activated_channel_is_primary() {
        let raw = raw_set(&["CH3 activated"]);
        let resolver = ChannelResolver::new(raw.keys());
        assert_eq!(resolver.primary_channels(), &[ChannelId::from("CH3 activated")]);
    }

    #[test]
    fn test_mismatched_activated_is_dropped() {
        let mut raw = raw_set(&["CH1"]);
        raw.insert(ChannelId::from("CH1 activated"), RawChannel::new(1000.0, vec![0.0]));

        let resolved = ChannelResolver::new(raw.keys()).resolve(&raw, None).unwrap();
        assert!(resolved[0].activated_source.is_none());
        assert!(resolved[0].signal.as_ref().unwrap().activated_samples().is_none());
    }

    #[test]
    fn test_invalid_sampling_rate_rejects_request() {
        let mut raw = raw_set(&["CH1"]);
        raw.insert(ChannelId::from("CH2"), RawChannel::new(0.0, vec![0.0; 3]));
        let result = ChannelResolver::new(raw.keys()).resolve(&raw, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_unrequested_invalid_channel_is_ignored() {
        let mut raw = raw_set(&["CH1"]);
        raw.insert(ChannelId::from("CH2"), RawChannel::new(1000.0, vec![0.0, f64::NAN, 0.0]));
        raw.insert(ChannelId::from("CH3"), RawChannel::new(-1.0, vec![0.0; 3]));
        let mapping: ChannelMapping = [(ChannelId::from("left"), ChannelId::from("CH1"))]
            .into_iter()
            .collect();

        let resolved = ChannelResolver::new(raw.keys()).resolve(&raw, Some(&mapping)).unwrap();
        assert_eq!(resolved.len(), 1);
        assert!(resolved[0].signal.is_ok());
    }

    #[test]
    fn test_invalid_activated_variant_of_requested_channel_rejects_request() {
        let mut raw = raw_set(&["CH1"]);
        raw.insert(ChannelId::from("CH1 activated"), RawChannel::new(1000.0, vec![0.0, f64::INFINITY, 0.0]));
        let result = ChannelResolver::new(raw.keys()).resolve(&raw, None);
        assert!(matches!(result, Err(AnalysisError::InvalidData { .. })));
    }
}
