//! Scheduler error types

use thiserror::Error;

/// Errors raised before the scheduler starts
///
/// Nothing in normal operation stops a running scheduler except `stop()` or
/// the tick limit, so there are no runtime variants.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid scheduler config '{field}': {message}")]
    InvalidConfig { field: String, message: String },
}

impl SchedulerError {
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }
}
