// src/session.rs
//! Session analysis orchestration
//!
//! Validates and resolves the input channels, runs the per-channel pipeline
//! for each logical channel (in parallel when enabled) and aggregates the
//! results into a performance score once every channel has finished.
//!
//! ```rust,no_run
//! use emg_analytics::config::AnalysisConfig;
//! use emg_analytics::session::{SessionAnalyzer, SessionContext};
//! use emg_analytics::simulation::{SessionSimulator, SimulationConfig};
//!
//! let input = SessionSimulator::new(SimulationConfig::default()).generate();
//! let analyzer = SessionAnalyzer::new(AnalysisConfig::default())?;
//! let analysis = analyzer.analyze(&input, &SessionContext::default())?;
//! println!("overall: {:?}", analysis.performance.overall);
//! # Ok::<(), emg_analytics::AnalysisError>(())
//! ```

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::channels::{ChannelId, ChannelMapping, ChannelResolver, RawChannel, ResolvedChannel};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisResult, ErrorKind};
use crate::processing::pipeline::{ChannelAnalytics, ChannelCalibration, ChannelLabel, ChannelPipeline};
use crate::scoring::{
    ChannelRates, PerformanceAggregator, PerformanceScore, RpeRating, ScoreInputs, WeightHierarchy,
};
use crate::utils::SessionFingerprint;

/// Parsed channel data for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionInput {
    pub channels: BTreeMap<ChannelId, RawChannel>,
    /// Logical name -> raw channel; without it every primary raw channel is
    /// analysed under its own name
    #[serde(default)]
    pub mapping: Option<ChannelMapping>,
}

impl SessionInput {
    pub fn new(channels: BTreeMap<ChannelId, RawChannel>) -> Self {
        Self {
            channels,
            mapping: None,
        }
    }

    pub fn with_mapping(mut self, mapping: ChannelMapping) -> Self {
        self.mapping = Some(mapping);
        self
    }
}

/// Per-session settings supplied by the configuration collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Keyed by logical channel name, falling back to the raw identifier
    #[serde(default)]
    pub calibrations: BTreeMap<ChannelId, ChannelCalibration>,
    /// Session, therapist+patient and therapist weight levels; the global
    /// level defaults to the configured `scoring.global_weights`
    #[serde(default)]
    pub weights: WeightHierarchy,
    #[serde(default)]
    pub rpe: Option<i32>,
    #[serde(default)]
    pub game_score: Option<f64>,
}

impl SessionContext {
    fn calibration_for(&self, label: &ChannelLabel) -> ChannelCalibration {
        self.calibrations
            .get(&label.logical)
            .or_else(|| self.calibrations.get(&label.source))
            .copied()
            .unwrap_or_default()
    }
}

/// Outcome for one logical channel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelReport {
    Analyzed(Box<ChannelAnalytics>),
    Failed {
        channel: ChannelId,
        source: ChannelId,
        kind: ErrorKind,
        message: String,
    },
}

impl ChannelReport {
    pub fn channel(&self) -> &ChannelId {
        match self {
            ChannelReport::Analyzed(analytics) => &analytics.channel,
            ChannelReport::Failed { channel, .. } => channel,
        }
    }

    pub fn analytics(&self) -> Option<&ChannelAnalytics> {
        match self {
            ChannelReport::Analyzed(analytics) => Some(analytics.as_ref()),
            ChannelReport::Failed { .. } => None,
        }
    }
}

/// Full result of analysing one session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionAnalysis {
    pub fingerprint: SessionFingerprint,
    pub channels: Vec<ChannelReport>,
    pub performance: PerformanceScore,
}

impl SessionAnalysis {
    pub fn channel(&self, id: &ChannelId) -> Option<&ChannelReport> {
        self.channels.iter().find(|report| report.channel() == id)
    }

    pub fn analyzed(&self) -> impl Iterator<Item = &ChannelAnalytics> {
        self.channels.iter().filter_map(ChannelReport::analytics)
    }
}

/// Session analysis engine
///
/// Stateless apart from its configuration; the same input and context
/// always produce the same [`SessionAnalysis`].
#[derive(Debug, Clone)]
pub struct SessionAnalyzer {
    config: AnalysisConfig,
}

impl SessionAnalyzer {
    /// Create an analyzer with a validated configuration
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyse a session
    ///
    /// Fails only for structurally invalid input. Per-channel problems are
    /// reported as [`ChannelReport::Failed`] entries or insufficient-data
    /// compliance without affecting sibling channels.
    pub fn analyze(&self, input: &SessionInput, context: &SessionContext) -> AnalysisResult<SessionAnalysis> {
        let fingerprint = SessionFingerprint::compute(
            &input.channels,
            input.mapping.as_ref(),
            &self.config,
            context,
        )?;
        let resolver = ChannelResolver::new(input.channels.keys());
        let resolved = resolver.resolve(&input.channels, input.mapping.as_ref())?;

        let pipeline = ChannelPipeline::new(&self.config);
        let run = |channel: &ResolvedChannel| analyze_channel(&pipeline, channel, context);
        let channels: Vec<ChannelReport> = if self.config.runtime.parallel_channels {
            resolved.par_iter().map(run).collect()
        } else {
            resolved.iter().map(run).collect()
        };

        let performance = self.score(&channels, context);

        info!(
            %fingerprint,
            channels = channels.len(),
            failed = channels.iter().filter(|c| c.analytics().is_none()).count(),
            overall = ?performance.overall,
            "session analysis complete"
        );

        Ok(SessionAnalysis {
            fingerprint,
            channels,
            performance,
        })
    }

    fn score(&self, channels: &[ChannelReport], context: &SessionContext) -> PerformanceScore {
        let channel_rates = channels
            .iter()
            .filter_map(ChannelReport::analytics)
            .filter_map(|analytics| {
                analytics
                    .compliance
                    .rates()
                    .map(|rates| (analytics.channel.clone(), ChannelRates::from(rates)))
            })
            .collect();

        let mut hierarchy = context.weights.clone();
        if hierarchy.global.is_none() {
            hierarchy.global = self.config.scoring.global_weights;
        }

        let inputs = ScoreInputs {
            channel_rates,
            symmetry_pairs: self.config.scoring.symmetry_pairs.clone(),
            rpe: RpeRating::from_value(context.rpe),
            game_score: context.game_score,
        };

        PerformanceAggregator::new().with_weights(&hierarchy).compute(&inputs)
    }
}

fn analyze_channel(
    pipeline: &ChannelPipeline<'_>,
    resolved: &ResolvedChannel,
    context: &SessionContext,
) -> ChannelReport {
    let span = info_span!("channel", channel = %resolved.logical);
    let _guard = span.enter();

    match &resolved.signal {
        Ok(signal) => {
            let label = ChannelLabel {
                logical: resolved.logical.clone(),
                source: resolved.source.clone(),
                activated_source: resolved.activated_source.clone(),
            };
            let calibration = context.calibration_for(&label);
            ChannelReport::Analyzed(Box::new(pipeline.run(label, signal, &calibration)))
        }
        Err(err) => {
            warn!(error = %err, "channel not analysed");
            ChannelReport::Failed {
                channel: resolved.logical.clone(),
                source: resolved.source.clone(),
                kind: err.kind(),
                message: err.to_string(),
            }
        }
    }
}
