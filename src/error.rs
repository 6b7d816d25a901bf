use thiserror::Error;

/// Failure kinds raised by the simulation core.
///
/// Core functions return `anyhow::Result`; callers that need to tell the kinds
/// apart use `err.downcast_ref::<SimError>()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("data quality error: {0}")]
    DataQuality(String),
}

impl SimError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn data_quality(msg: impl Into<String>) -> Self {
        Self::DataQuality(msg.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn is_data_quality(&self) -> bool {
        matches!(self, Self::DataQuality(_))
    }
}

/// Returns the `SimError` carried by an `anyhow::Error`, if any.
pub fn sim_error(err: &anyhow::Error) -> Option<&SimError> {
    err.downcast_ref::<SimError>()
}
