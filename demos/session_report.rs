// demos/session_report.rs
//! Simulate a rehabilitation session and print its analytics report

use std::collections::BTreeMap;

use emg_analytics::channels::{ChannelId, ChannelMapping};
use emg_analytics::config::ConfigLoader;
use emg_analytics::processing::ChannelCalibration;
use emg_analytics::simulation::{ContractionProtocol, SessionSimulator, SimulationConfig};
use emg_analytics::{version_info, ChannelReport, SessionAnalyzer, SessionContext};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let info = version_info();
    println!("{} v{}", info.name, info.version);
    println!("================================");

    println!("Loading configuration...");
    let config = ConfigLoader::new().load()?;
    let summary = config.get_summary();
    println!("  - {:?}", summary);

    println!("\nSimulating session...");
    let simulation = SimulationConfig {
        protocol: ContractionProtocol {
            skipped: vec![3],
            ..ContractionProtocol::default()
        },
        ..SimulationConfig::default()
    };
    let simulator = SessionSimulator::new(simulation);
    for planned in simulator.schedule() {
        println!("  planned contraction {:?}", planned);
    }

    let mapping = ChannelMapping::from([
        (ChannelId::from("Left Quadriceps"), ChannelId::from("CH1")),
        (ChannelId::from("Right Quadriceps"), ChannelId::from("CH2")),
    ]);
    let input = simulator.generate().with_mapping(mapping);

    let context = SessionContext {
        calibrations: BTreeMap::from([
            (
                ChannelId::from("Left Quadriceps"),
                ChannelCalibration {
                    expected_contractions: Some(5),
                    ..ChannelCalibration::with_mvc(0.8)
                },
            ),
            (
                ChannelId::from("Right Quadriceps"),
                ChannelCalibration {
                    expected_contractions: Some(5),
                    ..ChannelCalibration::default()
                },
            ),
        ]),
        rpe: Some(5),
        game_score: Some(0.72),
        ..SessionContext::default()
    };

    println!("\nAnalyzing session...");
    let analyzer = SessionAnalyzer::new(config)?;
    let analysis = analyzer.analyze(&input, &context)?;

    println!("Fingerprint: {}", analysis.fingerprint);
    for report in &analysis.channels {
        match report {
            ChannelReport::Analyzed(channel) => {
                println!(
                    "  {}: {} contractions, {:?}",
                    channel.channel,
                    channel.contractions.len(),
                    channel.detection.mode
                );
            }
            ChannelReport::Failed { channel, message, .. } => {
                println!("  {}: failed ({})", channel, message);
            }
        }
    }

    let performance = &analysis.performance;
    println!("\nPerformance ({} weights)", performance.weight_source);
    println!("  overall:    {:?}", performance.overall);
    println!("  compliance: {:?}", performance.compliance);
    println!("  symmetry:   {:?}", performance.symmetry);
    println!("  effort:     {:?}", performance.effort);
    println!("  game:       {:?}", performance.game);

    println!("\nFull report:");
    println!("{}", serde_json::to_string_pretty(&analysis)?);

    Ok(())
}
