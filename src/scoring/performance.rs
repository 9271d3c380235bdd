// src/scoring/performance.rs
//! Session performance score aggregation
//!
//! `overall = Σ wᵢ · scoreᵢ / Σ wᵢ` over the components that have data, so a
//! missing effort rating or game score does not deflate the result.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::effort::RpeRating;
use super::weights::{resolve_weights, ResolvedWeights, ScoringWeights, WeightHierarchy, WeightSource};
use crate::channels::ChannelId;
use crate::config::SymmetryPair;
use crate::processing::compliance::ComplianceRates;
use crate::utils::stats::mean;

/// Compliance rates of one rated channel as seen by the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelRates {
    pub compliance: f64,
    pub intensity: f64,
    pub duration: f64,
    pub completion: Option<f64>,
}

impl From<&ComplianceRates> for ChannelRates {
    fn from(rates: &ComplianceRates) -> Self {
        Self {
            compliance: rates.compliance_rate,
            intensity: rates.intensity_rate,
            duration: rates.duration_rate,
            completion: rates.completion_rate,
        }
    }
}

/// Everything the aggregator reads besides the weights
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreInputs {
    /// Rated channels only; channels with insufficient data are left out
    pub channel_rates: BTreeMap<ChannelId, ChannelRates>,
    pub symmetry_pairs: Vec<SymmetryPair>,
    pub rpe: RpeRating,
    /// Externally computed game score in `[0, 1]`
    pub game_score: Option<f64>,
}

/// Which score components had data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataCompleteness {
    pub has_emg: bool,
    pub has_symmetry: bool,
    pub has_effort: bool,
    pub has_game: bool,
}

/// Component weights after renormalising over available components
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentWeights {
    pub compliance: f64,
    pub symmetry: f64,
    pub effort: f64,
    pub game: f64,
}

/// Final session performance score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceScore {
    /// Null when no component had data
    pub overall: Option<f64>,
    pub compliance: Option<f64>,
    pub symmetry: Option<f64>,
    pub effort: Option<f64>,
    pub game: Option<f64>,
    pub weights_used: ScoringWeights,
    pub weight_source: WeightSource,
    pub effective_weights: ComponentWeights,
    pub data_completeness: DataCompleteness,
}

/// Aggregator state before weights are resolved
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

/// Aggregator state holding a resolved weight set
#[derive(Debug, Clone, Copy)]
pub struct WeightsResolved(ResolvedWeights);

/// Performance score aggregator
///
/// `PerformanceAggregator<Unconfigured>` must resolve weights before it can
/// compute; the produced [`PerformanceScore`] is the terminal state.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceAggregator<State = Unconfigured> {
    state: State,
}

impl PerformanceAggregator<Unconfigured> {
    pub fn new() -> Self {
        Self { state: Unconfigured }
    }

    /// Resolve weights from the hierarchy
    pub fn with_weights(self, hierarchy: &WeightHierarchy) -> PerformanceAggregator<WeightsResolved> {
        PerformanceAggregator {
            state: WeightsResolved(resolve_weights(hierarchy)),
        }
    }
}

impl Default for PerformanceAggregator<Unconfigured> {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceAggregator<WeightsResolved> {
    pub fn resolved(&self) -> &ResolvedWeights {
        &self.state.0
    }

    /// Compute the session score
    pub fn compute(&self, inputs: &ScoreInputs) -> PerformanceScore {
        let ResolvedWeights { weights, source } = self.state.0;

        let compliance = compliance_score(&inputs.channel_rates, &weights);
        let symmetry = symmetry_score(&inputs.channel_rates, &inputs.symmetry_pairs);
        let effort = inputs.rpe.effort_score();
        let game = sanitize_game_score(inputs.game_score);

        let data_completeness = DataCompleteness {
            has_emg: compliance.is_some(),
            has_symmetry: symmetry.is_some(),
            has_effort: effort.is_some(),
            has_game: game.is_some(),
        };

        let components = [
            (weights.compliance, compliance),
            (weights.symmetry, symmetry),
            (weights.effort, effort),
            (weights.game, game),
        ];
        let available_weight: f64 = components
            .iter()
            .filter(|(_, score)| score.is_some())
            .map(|(w, _)| w)
            .sum();

        let effective = |w: f64, score: Option<f64>| {
            if score.is_some() && available_weight > 0.0 {
                w / available_weight
            } else {
                0.0
            }
        };
        let effective_weights = ComponentWeights {
            compliance: effective(weights.compliance, compliance),
            symmetry: effective(weights.symmetry, symmetry),
            effort: effective(weights.effort, effort),
            game: effective(weights.game, game),
        };

        let overall = (available_weight > 0.0).then(|| {
            components
                .iter()
                .filter_map(|(w, score)| score.map(|s| w * s))
                .sum::<f64>()
                / available_weight
        });

        debug!(?overall, ?data_completeness, %source, "performance score computed");

        PerformanceScore {
            overall,
            compliance,
            symmetry,
            effort,
            game,
            weights_used: weights,
            weight_source: source,
            effective_weights,
            data_completeness,
        }
    }
}

/// Mean over rated channels of the sub-weighted compliance blend
///
/// Sub-weights are renormalised per channel over the available parts;
/// completion is absent when no contraction count was prescribed.
pub fn compliance_score(
    channel_rates: &BTreeMap<ChannelId, ChannelRates>,
    weights: &ScoringWeights,
) -> Option<f64> {
    let per_channel: Vec<f64> = channel_rates
        .values()
        .filter_map(|rates| {
            let parts = [
                (weights.compliance_completion, rates.completion),
                (weights.compliance_intensity, Some(rates.intensity)),
                (weights.compliance_duration, Some(rates.duration)),
            ];
            let (weighted, total) = parts
                .iter()
                .filter_map(|(w, value)| value.map(|v| (w * v, *w)))
                .fold((0.0, 0.0), |(acc, tw), (wv, w)| (acc + wv, tw + w));
            (total > 0.0).then(|| weighted / total)
        })
        .collect();

    mean(&per_channel)
}

/// Mean bilateral symmetry over channel pairs
///
/// Pairs come from configuration; with none configured and exactly two rated
/// channels, those two are paired. A pair scores
/// `1 - |a - b| / max(a, b)` on compliance rate, or 1.0 when both are zero.
pub fn symmetry_score(
    channel_rates: &BTreeMap<ChannelId, ChannelRates>,
    pairs: &[SymmetryPair],
) -> Option<f64> {
    let implicit;
    let pairs = if pairs.is_empty() && channel_rates.len() == 2 {
        let mut ids = channel_rates.keys().cloned();
        implicit = match (ids.next(), ids.next()) {
            (Some(left), Some(right)) => vec![SymmetryPair { left, right }],
            _ => Vec::new(),
        };
        implicit.as_slice()
    } else {
        pairs
    };

    let scores: Vec<f64> = pairs
        .iter()
        .filter_map(|pair| {
            let left = channel_rates.get(&pair.left)?.compliance;
            let right = channel_rates.get(&pair.right)?.compliance;
            Some(pair_symmetry(left, right))
        })
        .collect();

    mean(&scores)
}

fn pair_symmetry(left: f64, right: f64) -> f64 {
    let larger = left.max(right);
    if larger <= 0.0 {
        1.0
    } else {
        1.0 - (left - right).abs() / larger
    }
}

fn sanitize_game_score(score: Option<f64>) -> Option<f64> {
    let score = score.filter(|s| !s.is_nan())?;
    if (0.0..=1.0).contains(&score) {
        Some(score)
    } else {
        let clamped = score.clamp(0.0, 1.0);
        warn!(score, clamped, "game score outside [0, 1], clamping");
        Some(clamped)
    }
}
