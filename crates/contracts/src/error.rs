//! ContractError - errors shared across crate boundaries

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by configuration, sensors, publishing and sinks
#[derive(Debug, Error)]
pub enum ContractError {
    /// The configuration document could not be read as a blueprint
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// A blueprint value was rejected
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// A worker's sensor could not be read this sweep
    #[error("sensor unavailable for '{worker_id}': {message}")]
    SensorUnavailable { worker_id: String, message: String },

    /// Snapshot could not be handed to one viewer
    #[error("publish to viewer {viewer} failed: {message}")]
    PublishFailure { viewer: u64, message: String },

    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Parse error keeping the underlying decoder error as `source()`
    pub fn config_parse_with(message: impl Into<String>, source: BoxedSource) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn sensor_unavailable(worker_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SensorUnavailable {
            worker_id: worker_id.into(),
            message: message.into(),
        }
    }

    pub fn publish_failure(viewer: u64, message: impl Into<String>) -> Self {
        Self::PublishFailure {
            viewer,
            message: message.into(),
        }
    }

    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// True for errors that mean the configuration must be fixed
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigParse { .. } | Self::ConfigValidation { .. })
    }
}
