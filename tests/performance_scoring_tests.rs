// tests/performance_scoring_tests.rs
//! Performance scoring and weight resolution through a full session

use std::collections::BTreeMap;

use emg_analytics::channels::ChannelId;
use emg_analytics::config::{AnalysisConfig, SymmetryPair};
use emg_analytics::scoring::{
    resolve_weights, ChannelRates, PerformanceAggregator, RpeRating, ScoreInputs, ScoringWeights,
    WeightHierarchy, WeightSource,
};
use emg_analytics::session::{SessionAnalyzer, SessionContext};
use emg_analytics::simulation::{SessionSimulator, SimulationConfig};

fn weights(compliance: f64, symmetry: f64, effort: f64, game: f64) -> ScoringWeights {
    ScoringWeights {
        compliance,
        symmetry,
        effort,
        game,
        ..ScoringWeights::default()
    }
}

fn rates(compliance: f64) -> ChannelRates {
    ChannelRates {
        compliance,
        intensity: compliance,
        duration: compliance,
        completion: None,
    }
}

#[test]
fn test_compliance_and_symmetry_only_renormalise() {
    let inputs = ScoreInputs {
        channel_rates: BTreeMap::from([
            (ChannelId::from("Left"), rates(1.0)),
            (ChannelId::from("Right"), rates(0.5)),
        ]),
        ..ScoreInputs::default()
    };
    let score = PerformanceAggregator::new()
        .with_weights(&WeightHierarchy::default())
        .compute(&inputs);

    let compliance = score.compliance.unwrap();
    let symmetry = score.symmetry.unwrap();
    assert!((compliance - 0.75).abs() < 1e-9);
    assert!((symmetry - 0.5).abs() < 1e-9);

    let w = score.effective_weights;
    assert!((w.compliance + w.symmetry - 1.0).abs() < 1e-9);
    assert!((w.compliance - 0.40 / 0.65).abs() < 1e-9);

    let expected = (0.40 * 0.75 + 0.25 * 0.5) / 0.65;
    assert!((score.overall.unwrap() - expected).abs() < 1e-9);
}

#[test]
fn test_session_override_wins_over_global_config() {
    let mut config = AnalysisConfig::default();
    config.scoring.global_weights = Some(weights(0.25, 0.25, 0.25, 0.25));
    let analyzer = SessionAnalyzer::new(config).unwrap();
    let input = SessionSimulator::new(SimulationConfig::default()).generate();

    let from_global = analyzer.analyze(&input, &SessionContext::default()).unwrap();
    assert_eq!(from_global.performance.weight_source, WeightSource::Global);

    let context = SessionContext {
        weights: WeightHierarchy {
            session_override: Some(weights(0.7, 0.1, 0.1, 0.1)),
            ..WeightHierarchy::default()
        },
        ..SessionContext::default()
    };
    let overridden = analyzer.analyze(&input, &context).unwrap();
    assert_eq!(overridden.performance.weight_source, WeightSource::SessionOverride);
    assert!((overridden.performance.weights_used.compliance - 0.7).abs() < 1e-9);
}

#[test]
fn test_invalid_global_config_weights_fall_back_to_defaults() {
    let mut config = AnalysisConfig::default();
    config.scoring.global_weights = Some(ScoringWeights {
        compliance: 0.9,
        ..ScoringWeights::default()
    });
    let analyzer = SessionAnalyzer::new(config).unwrap();
    let input = SessionSimulator::new(SimulationConfig::default()).generate();

    let analysis = analyzer.analyze(&input, &SessionContext::default()).unwrap();
    assert_eq!(analysis.performance.weight_source, WeightSource::Defaults);
    assert_eq!(analysis.performance.weights_used, ScoringWeights::default().normalized());
}

#[test]
fn test_invalid_levels_fall_back_to_defaults() {
    let hierarchy = WeightHierarchy {
        session_override: Some(weights(0.5, 0.5, 0.5, 0.5)),
        therapist_patient: Some(weights(-0.1, 0.6, 0.3, 0.2)),
        therapist: Some(ScoringWeights {
            compliance_duration: 0.9,
            ..ScoringWeights::default()
        }),
        global: Some(weights(f64::NAN, 0.0, 0.0, 0.0)),
    };
    let resolved = resolve_weights(&hierarchy);
    assert_eq!(resolved.source, WeightSource::Defaults);
    assert_eq!(resolved.weights, ScoringWeights::default().normalized());
}

#[test]
fn test_all_components_present() {
    let inputs = ScoreInputs {
        channel_rates: BTreeMap::from([
            (ChannelId::from("Left"), rates(0.8)),
            (ChannelId::from("Right"), rates(0.8)),
        ]),
        symmetry_pairs: vec![SymmetryPair {
            left: ChannelId::from("Left"),
            right: ChannelId::from("Right"),
        }],
        rpe: RpeRating::Recorded(5),
        game_score: Some(0.9),
    };
    let score = PerformanceAggregator::new()
        .with_weights(&WeightHierarchy::default())
        .compute(&inputs);

    let completeness = score.data_completeness;
    assert!(completeness.has_emg && completeness.has_symmetry && completeness.has_effort && completeness.has_game);
    assert_eq!(score.effort, Some(0.65));
    assert_eq!(score.symmetry, Some(1.0));

    let expected = 0.40 * 0.8 + 0.25 * 1.0 + 0.20 * 0.65 + 0.15 * 0.9;
    assert!((score.overall.unwrap() - expected).abs() < 1e-9);
}

#[test]
fn test_out_of_range_rpe_is_not_recorded() {
    let analyzer = SessionAnalyzer::new(AnalysisConfig::default()).unwrap();
    let input = SessionSimulator::new(SimulationConfig::default()).generate();
    let context = SessionContext {
        rpe: Some(14),
        ..SessionContext::default()
    };
    let analysis = analyzer.analyze(&input, &context).unwrap();
    assert!(analysis.performance.effort.is_none());
    assert!(!analysis.performance.data_completeness.has_effort);
}

#[test]
fn test_context_from_json() {
    let json = r#"{
        "calibrations": { "CH1": { "mvc_value": 0.9, "expected_contractions": 5 } },
        "weights": {
            "therapist": {
                "compliance": 0.5, "symmetry": 0.2, "effort": 0.2, "game": 0.1,
                "compliance_completion": 0.4, "compliance_intensity": 0.3, "compliance_duration": 0.3
            }
        },
        "rpe": 7,
        "game_score": null
    }"#;
    let context: SessionContext = serde_json::from_str(json).unwrap();
    assert_eq!(context.calibrations[&ChannelId::from("CH1")].mvc_value, Some(0.9));
    assert_eq!(resolve_weights(&context.weights).source, WeightSource::Therapist);
    assert_eq!(context.rpe, Some(7));
}
