// src/scoring/weights.rs
//! Scoring weights and their resolution hierarchy
//!
//! Weight sets are looked up from the most to the least specific level:
//! session override, therapist+patient, therapist, global, then the built-in
//! defaults. A level whose set fails validation is skipped with a warning.
//! Resolution always succeeds because the defaults are the terminal case.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::constants::scoring::*;
use crate::error::AnalysisError;

/// Top-level component weights plus the compliance sub-weights
///
/// Each group (`compliance + symmetry + effort + game` and
/// `compliance_completion + compliance_intensity + compliance_duration`)
/// must sum to 1.0 within [`WEIGHT_SUM_TOLERANCE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub compliance: f64,
    pub symmetry: f64,
    pub effort: f64,
    pub game: f64,
    pub compliance_completion: f64,
    pub compliance_intensity: f64,
    pub compliance_duration: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            compliance: DEFAULT_COMPLIANCE_WEIGHT,
            symmetry: DEFAULT_SYMMETRY_WEIGHT,
            effort: DEFAULT_EFFORT_WEIGHT,
            game: DEFAULT_GAME_WEIGHT,
            compliance_completion: DEFAULT_COMPLETION_WEIGHT,
            compliance_intensity: DEFAULT_INTENSITY_WEIGHT,
            compliance_duration: DEFAULT_DURATION_WEIGHT,
        }
    }
}

impl ScoringWeights {
    fn components(&self) -> [f64; 4] {
        [self.compliance, self.symmetry, self.effort, self.game]
    }

    fn compliance_parts(&self) -> [f64; 3] {
        [
            self.compliance_completion,
            self.compliance_intensity,
            self.compliance_duration,
        ]
    }

    /// Check the non-negativity and sum-to-one invariants
    pub fn validate(&self) -> Result<(), String> {
        let all = self.components().into_iter().chain(self.compliance_parts());
        for value in all {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("weight {} must be finite and non-negative", value));
            }
        }

        let top: f64 = self.components().iter().sum();
        if (top - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(format!("component weights sum to {:.4}, expected 1.0", top));
        }

        let sub: f64 = self.compliance_parts().iter().sum();
        if (sub - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(format!("compliance sub-weights sum to {:.4}, expected 1.0", sub));
        }

        Ok(())
    }

    /// Rescale each group to sum to exactly 1.0
    ///
    /// Only meaningful for a set that passed [`validate`](Self::validate).
    pub fn normalized(&self) -> Self {
        let top: f64 = self.components().iter().sum();
        let sub: f64 = self.compliance_parts().iter().sum();
        Self {
            compliance: self.compliance / top,
            symmetry: self.symmetry / top,
            effort: self.effort / top,
            game: self.game / top,
            compliance_completion: self.compliance_completion / sub,
            compliance_intensity: self.compliance_intensity / sub,
            compliance_duration: self.compliance_duration / sub,
        }
    }
}

/// Hierarchy level a weight set was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSource {
    SessionOverride,
    TherapistPatient,
    Therapist,
    Global,
    Defaults,
}

impl fmt::Display for WeightSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeightSource::SessionOverride => "session override",
            WeightSource::TherapistPatient => "therapist+patient configuration",
            WeightSource::Therapist => "therapist configuration",
            WeightSource::Global => "global configuration",
            WeightSource::Defaults => "built-in defaults",
        };
        f.write_str(name)
    }
}

/// Candidate weight sets, most specific first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightHierarchy {
    #[serde(default)]
    pub session_override: Option<ScoringWeights>,
    #[serde(default)]
    pub therapist_patient: Option<ScoringWeights>,
    #[serde(default)]
    pub therapist: Option<ScoringWeights>,
    #[serde(default)]
    pub global: Option<ScoringWeights>,
}

impl WeightHierarchy {
    fn levels(&self) -> [(WeightSource, Option<&ScoringWeights>); 4] {
        [
            (WeightSource::SessionOverride, self.session_override.as_ref()),
            (WeightSource::TherapistPatient, self.therapist_patient.as_ref()),
            (WeightSource::Therapist, self.therapist.as_ref()),
            (WeightSource::Global, self.global.as_ref()),
        ]
    }
}

/// Weight set chosen by [`resolve_weights`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedWeights {
    pub weights: ScoringWeights,
    pub source: WeightSource,
}

/// Pick the most specific valid weight set
pub fn resolve_weights(hierarchy: &WeightHierarchy) -> ResolvedWeights {
    for (source, candidate) in hierarchy.levels() {
        let Some(weights) = candidate else {
            continue;
        };
        match weights.validate() {
            Ok(()) => {
                debug!(%source, "scoring weights resolved");
                return ResolvedWeights {
                    weights: weights.normalized(),
                    source,
                };
            }
            Err(reason) => {
                let err = AnalysisError::InvalidWeights {
                    source_level: source,
                    reason,
                };
                warn!(error = %err, "skipping weight set");
            }
        }
    }

    debug!("no configured weights, using built-in defaults");
    ResolvedWeights {
        weights: ScoringWeights::default().normalized(),
        source: WeightSource::Defaults,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(compliance: f64, symmetry: f64, effort: f64, game: f64) -> ScoringWeights {
        ScoringWeights {
            compliance,
            symmetry,
            effort,
            game,
            ..ScoringWeights::default()
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(ScoringWeights::default().validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        assert!(weights(0.5, 0.5, 0.5, 0.0).validate().is_err());
        assert!(weights(1.2, -0.2, 0.0, 0.0).validate().is_err());
        assert!(weights(f64::NAN, 0.5, 0.5, 0.0).validate().is_err());

        let bad_sub = ScoringWeights {
            compliance_completion: 0.9,
            ..ScoringWeights::default()
        };
        assert!(bad_sub.validate().is_err());
    }

    #[test]
    fn test_most_specific_valid_level_wins() {
        let hierarchy = WeightHierarchy {
            session_override: None,
            therapist_patient: Some(weights(0.7, 0.1, 0.1, 0.1)),
            therapist: Some(weights(0.25, 0.25, 0.25, 0.25)),
            global: None,
        };
        let resolved = resolve_weights(&hierarchy);
        assert_eq!(resolved.source, WeightSource::TherapistPatient);
        assert!((resolved.weights.compliance - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_level_falls_through() {
        let hierarchy = WeightHierarchy {
            session_override: Some(weights(0.9, 0.9, 0.0, 0.0)),
            global: Some(weights(0.25, 0.25, 0.25, 0.25)),
            ..WeightHierarchy::default()
        };
        assert_eq!(resolve_weights(&hierarchy).source, WeightSource::Global);
    }

    #[test]
    fn test_terminal_defaults() {
        let hierarchy = WeightHierarchy {
            therapist: Some(weights(2.0, 0.0, 0.0, 0.0)),
            ..WeightHierarchy::default()
        };
        let resolved = resolve_weights(&hierarchy);
        assert_eq!(resolved.source, WeightSource::Defaults);
        assert!((resolved.weights.compliance - 0.40).abs() < 1e-9);
    }

    #[test]
    fn test_resolved_groups_sum_to_one() {
        let hierarchy = WeightHierarchy {
            session_override: Some(weights(0.4, 0.3, 0.2, 0.1004)),
            ..WeightHierarchy::default()
        };
        let w = resolve_weights(&hierarchy).weights;
        assert!((w.compliance + w.symmetry + w.effort + w.game - 1.0).abs() < NORMALIZED_SUM_TOLERANCE);
        assert!(
            (w.compliance_completion + w.compliance_intensity + w.compliance_duration - 1.0).abs()
                < NORMALIZED_SUM_TOLERANCE
        );
    }

    #[test]
    fn test_weights_from_toml() {
        let toml_str = r#"
            compliance = 0.5
            symmetry = 0.2
            effort = 0.2
            game = 0.1
            compliance_completion = 0.2
            compliance_intensity = 0.4
            compliance_duration = 0.4
        "#;
        let parsed: ScoringWeights = toml::from_str(toml_str).unwrap();
        assert!(parsed.validate().is_ok());
    }
}
