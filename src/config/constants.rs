// src/config/constants.rs
//! Analysis-wide configuration constants
//!
//! Detection thresholds and timing constants are clinically tuned defaults
//! for surface EMG amplitude ranges. They are overridable through
//! configuration and are never referenced directly by algorithm bodies.

/// Envelope construction constants
pub mod envelope {
    pub const DEFAULT_RMS_WINDOW_MS: f64 = 100.0;
    pub const MIN_WINDOW_SAMPLES: usize = 1;
    pub const MIN_RMS_WINDOW_MS: f64 = 1.0;
    pub const MAX_RMS_WINDOW_MS: f64 = 2000.0;
}

/// Contraction detection constants
pub mod detection {
    /// Onset/offset threshold on the timing signal, fraction of its reference
    pub const DEFAULT_TIMING_THRESHOLD_FRACTION: f64 = 0.05;
    /// Confirmation threshold on the RMS envelope, fraction of the MVC reference
    pub const DEFAULT_AMPLITUDE_THRESHOLD_FRACTION: f64 = 0.10;
    pub const DEFAULT_MERGE_THRESHOLD_MS: f64 = 150.0;
    pub const DEFAULT_REFRACTORY_PERIOD_MS: f64 = 50.0;
    pub const MAX_GAP_MS: f64 = 5000.0;
}

/// Compliance classification constants
pub mod compliance {
    pub const DEFAULT_MVC_THRESHOLD_FRACTION: f64 = 0.75;
    pub const DEFAULT_DURATION_THRESHOLD_MS: f64 = 2000.0;
    pub const MAX_DURATION_THRESHOLD_MS: f64 = 60_000.0;
}

/// Spectral analysis constants
pub mod spectral {
    pub const DEFAULT_ANALYSIS_WINDOW_MS: f64 = 500.0;
    pub const MIN_ANALYSIS_WINDOW_MS: f64 = 50.0;
    pub const MIN_SPECTRAL_SAMPLES: usize = 8;
    /// Dimitrov FI_nsm5 integration band
    pub const DEFAULT_FATIGUE_BAND_LOW_HZ: f64 = 8.0;
    pub const DEFAULT_FATIGUE_BAND_HIGH_HZ: f64 = 500.0;
    /// Spectral moment order of the FI_nsm5 denominator
    pub const FATIGUE_INDEX_HIGH_ORDER: i32 = 5;
    /// Total power at or below this is treated as a degenerate spectrum
    pub const DEGENERATE_POWER_EPSILON: f64 = 1e-20;
}

/// Performance scoring constants
pub mod scoring {
    pub const DEFAULT_COMPLIANCE_WEIGHT: f64 = 0.40;
    pub const DEFAULT_SYMMETRY_WEIGHT: f64 = 0.25;
    pub const DEFAULT_EFFORT_WEIGHT: f64 = 0.20;
    pub const DEFAULT_GAME_WEIGHT: f64 = 0.15;

    pub const DEFAULT_COMPLETION_WEIGHT: f64 = 0.333;
    pub const DEFAULT_INTENSITY_WEIGHT: f64 = 0.333;
    pub const DEFAULT_DURATION_WEIGHT: f64 = 0.334;

    /// Accepted deviation of a stored weight group from 1.0
    pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;
    /// Maximum deviation of a resolved (normalised) weight group from 1.0
    pub const NORMALIZED_SUM_TOLERANCE: f64 = 1e-6;

    pub const MIN_RPE: u8 = 1;
    pub const MAX_RPE: u8 = 10;
}

/// Configuration file locations
pub mod paths {
    pub const SYSTEM_CONFIG_PATH: &str = "/etc/emg-analytics/config.toml";
    pub const USER_CONFIG_DIR: &str = ".config/emg-analytics";
    pub const DEFAULT_CONFIG_FILE: &str = "emg-analytics.toml";
    pub const LOCAL_CONFIG_FILE: &str = "config/local.toml";
    pub const ENV_PREFIX: &str = "EMG_";
    pub const ENV_SECTION_SEPARATOR: &str = "__";
}
