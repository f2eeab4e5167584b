//! Typed error taxonomy for the prediction engine
//!
//! Batch operations catch and log these per unit; explicit single calls
//! propagate them to the caller. Insufficient history is deliberately not
//! represented here — it is a soft condition that routes to the synthetic
//! training path.

use thiserror::Error;

/// Errors surfaced by the prediction and optimization engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Model id was never registered with the registry.
    #[error("model '{0}' is not registered")]
    UnknownModel(String),

    /// Model is registered but has no trained weights yet.
    #[error("model '{0}' has no trained weights loaded")]
    ModelNotLoaded(String),

    /// Feature vector width disagrees with the model's declared input width.
    #[error("feature width mismatch: model expects {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Equipment or task category has no corresponding model.
    #[error("no prediction model registered for equipment type '{0}'")]
    NoModelForType(String),

    /// Equipment id not present in the data store.
    #[error("equipment '{0}' not found")]
    EquipmentNotFound(String),

    /// Training set violates the parallel-array contract.
    #[error("invalid training set: {0}")]
    InvalidTrainingSet(String),

    /// Persisted model snapshot failed its integrity check.
    #[error("model snapshot checksum mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offender() {
        let err = EngineError::UnknownModel("maintenance-crane".to_string());
        assert!(err.to_string().contains("maintenance-crane"));

        let err = EngineError::ShapeMismatch {
            expected: 18,
            actual: 12,
        };
        assert!(err.to_string().contains("18"));
        assert!(err.to_string().contains("12"));
    }
}
