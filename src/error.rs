use thiserror::Error;

/// Errors surfaced by the classification pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// A dataset entry is missing a measurement, carries a non-numeric value,
    /// or names an unknown species.
    #[error("invalid record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// An input vector does not have the expected number of components.
    #[error("shape mismatch: expected {expected} components, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("training diverged at epoch {epoch}: loss is {loss}")]
    TrainingDiverged { epoch: usize, loss: f32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
