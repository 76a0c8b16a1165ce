//! Synchronization engine for a teacher-facing assessment grid.
//!
//! Coalesces rapid per-field edits into debounced persistence calls, tracks
//! a save-status badge per edited field, keeps an optimistic in-memory grid,
//! and derives final marks deterministically from raw inputs. Transport and
//! auth live behind the [`persistence::GridPersistence`] capability trait.

pub mod calc;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod persistence;
pub mod scheduler;
pub mod status;
pub mod store;

pub use config::EngineConfig;
pub use engine::SyncEngine;
pub use error::EngineError;
pub use model::{
    Assignment, AssessmentCell, EditField, EditKey, FieldEdit, FileRef, SaveStatus,
    SnapshotRecord, Student, SubmissionStatus,
};
pub use persistence::{BulkScope, FieldUpdate, GridPersistence};
