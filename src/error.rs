// src/error.rs
//! Unified error handling for EMG session analytics
//!
//! Every fallible operation in the crate returns [`AnalysisResult`]. Most
//! variants describe conditions that degrade a single channel (a missing
//! channel, too few samples, no MVC reference) and are reported next to the
//! sibling channels' results. Only [`AnalysisError::InvalidData`] and
//! [`AnalysisError::Configuration`] reject a whole request.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::channels::ChannelId;
use crate::scoring::WeightSource;

/// Unified error type for the analysis engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A requested logical channel has no matching raw channel
    #[error("[CHANNEL] Channel '{channel}' not found (requested as '{requested}')")]
    ChannelNotFound {
        channel: ChannelId,
        requested: ChannelId,
    },

    /// Too few samples for the requested operation
    #[error("[SIGNAL] Insufficient signal on '{channel}' for {operation}: need {required} samples, got {actual}")]
    InsufficientSignal {
        channel: ChannelId,
        operation: String,
        required: usize,
        actual: usize,
    },

    /// No MVC reference could be supplied or derived
    #[error("[CALIBRATION] No MVC reference available for '{channel}': {reason}")]
    MissingCalibration { channel: ChannelId, reason: String },

    /// A weight set failed the sum-to-one invariant
    #[error("[WEIGHTS] Invalid weights from {source_level}: {reason}")]
    InvalidWeights {
        source_level: WeightSource,
        reason: String,
    },

    /// Structurally invalid input data
    #[error("[DATA] Invalid {data_type}: {reason} ({context})")]
    InvalidData {
        data_type: String,
        reason: String,
        context: ErrorContext,
    },

    /// Invalid configuration values or files
    #[error("[CONFIG] Configuration error in {component}: {reason}")]
    Configuration { component: String, reason: String },
}

/// Closed classification of [`AnalysisError`] used in serialised reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ChannelNotFound,
    InsufficientSignal,
    MissingCalibration,
    InvalidWeights,
    InvalidData,
    Configuration,
}

impl AnalysisError {
    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::ChannelNotFound { .. } => ErrorKind::ChannelNotFound,
            AnalysisError::InsufficientSignal { .. } => ErrorKind::InsufficientSignal,
            AnalysisError::MissingCalibration { .. } => ErrorKind::MissingCalibration,
            AnalysisError::InvalidWeights { .. } => ErrorKind::InvalidWeights,
            AnalysisError::InvalidData { .. } => ErrorKind::InvalidData,
            AnalysisError::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// Whether the analysis can continue around this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            AnalysisError::InvalidData { .. } | AnalysisError::Configuration { .. }
        )
    }

    /// Channel the error is attributed to, if any
    pub fn channel(&self) -> Option<&ChannelId> {
        match self {
            AnalysisError::ChannelNotFound { requested, .. } => Some(requested),
            AnalysisError::InsufficientSignal { channel, .. }
            | AnalysisError::MissingCalibration { channel, .. } => Some(channel),
            _ => None,
        }
    }
}

/// Location and details of a structural failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorContext {
    pub component: String,
    pub operation: String,
    pub file: Option<&'static str>,
    pub line: Option<u32>,
    pub additional_info: BTreeMap<String, String>,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
            file: None,
            line: None,
            additional_info: BTreeMap::new(),
        }
    }

    /// Create error context with file and line information
    pub fn with_location(component: &str, operation: &str, file: &'static str, line: u32) -> Self {
        let mut context = Self::new(component, operation);
        context.file = Some(file);
        context.line = Some(line);
        context
    }

    /// Add additional information to the context
    pub fn add_info<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.additional_info.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.component, self.operation)?;
        if let (Some(file), Some(line)) = (self.file, self.line) {
            write!(f, " at {}:{}", file, line)?;
        }
        for (key, value) in &self.additional_info {
            write!(f, ", {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Macro for creating error context with file and line info
#[macro_export]
macro_rules! error_context {
    ($component:expr, $operation:expr) => {
        $crate::error::ErrorContext::with_location($component, $operation, file!(), line!())
    };
}

/// Result type alias for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Error builder for convenient error construction
pub struct AnalysisErrorBuilder {
    component: String,
    operation: String,
}

impl AnalysisErrorBuilder {
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn configuration(self, reason: &str) -> AnalysisError {
        AnalysisError::Configuration {
            component: self.component,
            reason: reason.to_string(),
        }
    }

    pub fn invalid_data(self, data_type: &str, reason: &str) -> AnalysisError {
        AnalysisError::InvalidData {
            data_type: data_type.to_string(),
            reason: reason.to_string(),
            context: ErrorContext::new(&self.component, &self.operation),
        }
    }
}
