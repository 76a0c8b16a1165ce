use thiserror::Error;

use crate::model::EditField;

/// Engine-level error taxonomy. Validation failures are rejected before any
/// scheduling happens; persistence and snapshot failures surface through the
/// status machine and the load result respectively.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The grade calculator was given numerically meaningless input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A local edit failed field validation and was never scheduled.
    #[error("invalid {field:?} value: {message}")]
    Validation { field: EditField, message: String },

    /// A scheduled save hit a network or server failure.
    #[error("persist failed: {0}")]
    Persistence(String),

    /// The full-grid fetch failed; the store is left untouched.
    #[error("snapshot load failed: {0}")]
    SnapshotLoad(String),

    /// The engine was disposed; no further work is accepted.
    #[error("engine disposed")]
    Disposed,
}

impl EngineError {
    /// Stable string code for the UI layer.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidInput(_) => "bad_input",
            EngineError::Validation { .. } => "bad_params",
            EngineError::Persistence(_) => "persist_failed",
            EngineError::SnapshotLoad(_) => "snapshot_failed",
            EngineError::Disposed => "disposed",
        }
    }

    pub fn validation(field: EditField, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field,
            message: message.into(),
        }
    }
}
