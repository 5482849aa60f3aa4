//! Sensor source error types

use contracts::ContractError;
use thiserror::Error;

/// Sensor source specific error
#[derive(Debug, Error)]
pub enum SensorSourceError {
    /// Simulator probability out of range
    #[error("compliance probability must be within [0, 1], got {value}")]
    InvalidProbability { value: f64 },

    /// Device did not answer in time
    #[error("device for '{worker_id}' timed out after {timeout_ms}ms")]
    Timeout { worker_id: String, timeout_ms: u64 },

    /// Device answered with an error
    #[error("device for '{worker_id}' failed: {message}")]
    Probe { worker_id: String, message: String },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl SensorSourceError {
    /// Create probe error
    pub fn probe(worker_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Probe {
            worker_id: worker_id.into(),
            message: message.into(),
        }
    }

    /// Classify as `SensorUnavailable` for the given worker
    pub fn into_unavailable(self, worker_id: &str) -> ContractError {
        match self {
            Self::Contract(e @ ContractError::SensorUnavailable { .. }) => e,
            other => ContractError::sensor_unavailable(worker_id, other.to_string()),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, SensorSourceError>;
