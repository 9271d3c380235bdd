//! EMG-Analytics: clinical EMG session analysis engine
//!
//! Turns the channels of one rehabilitation session into contraction,
//! compliance, fatigue and performance metrics:
//!
//! - Logical channel resolution with activated-signal pairing
//! - Hybrid dual-signal contraction detection
//! - MVC and duration compliance classification
//! - Windowed amplitude and spectral fatigue analysis (RMS, MAV, MPF, MDF, FI_nsm5)
//! - Weighted performance scoring with a weight resolution hierarchy
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use emg_analytics::config::ConfigLoader;
//! use emg_analytics::session::{SessionAnalyzer, SessionContext};
//! use emg_analytics::simulation::{SessionSimulator, SimulationConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().load()?;
//!     let analyzer = SessionAnalyzer::new(config)?;
//!
//!     let input = SessionSimulator::new(SimulationConfig::default()).generate();
//!     let analysis = analyzer.analyze(&input, &SessionContext::default())?;
//!
//!     for channel in analysis.analyzed() {
//!         println!("{}: {} contractions", channel.channel, channel.contractions.len());
//!     }
//!     println!("overall score: {:?}", analysis.performance.overall);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod channels;
pub mod config;
pub mod error;
pub mod processing;
pub mod scoring;
pub mod session;
pub mod simulation;
pub mod utils;

// Re-export commonly used types for convenience
pub use channels::{ChannelId, ChannelSignal, RawChannel};
pub use config::{AnalysisConfig, ConfigLoader};
pub use error::{AnalysisError, AnalysisResult, ErrorKind};
pub use processing::{ChannelAnalytics, ChannelCalibration, Contraction};
pub use scoring::{PerformanceScore, RpeRating, ScoringWeights, WeightHierarchy};
pub use session::{ChannelReport, SessionAnalysis, SessionAnalyzer, SessionContext, SessionInput};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Clinical EMG session analytics engine".to_string(),
        features: vec![
            "Hybrid contraction detection".to_string(),
            "MVC and duration compliance".to_string(),
            "Spectral fatigue analysis".to_string(),
            "Hierarchical performance scoring".to_string(),
            "Deterministic session simulation".to_string(),
        ],
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// List of features
    pub features: Vec<String>,
}
