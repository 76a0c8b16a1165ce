use async_trait::async_trait;
use serde::Serialize;

use crate::model::{EditField, SnapshotRecord};

/// Idempotent single-field update as handed to the collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUpdate {
    pub course_id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub field: EditField,
    pub value: serde_json::Value,
}

/// Server-side batch operations that rewrite many cells atomically. Both
/// must be followed by a full snapshot reload; the engine does that itself
/// in `apply_bulk_refresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkScope {
    /// Copy-checker ingestion for one assignment.
    CopyChecker { assignment_id: i64 },
    /// Late-penalty recompute across a whole course.
    LatePenalties { course_id: i64 },
}

/// Capabilities the engine consumes from the transport layer. HTTP, auth
/// headers, and file plumbing all live behind this seam; the engine never
/// sees endpoints. File download is deliberately absent: it is opaque to the
/// engine and exposed to the UI directly.
#[async_trait]
pub trait GridPersistence: Send + Sync {
    /// Full flat grid for one course as graded by one teacher.
    async fn fetch_grid_snapshot(
        &self,
        course_id: i64,
        teacher_id: i64,
    ) -> anyhow::Result<Vec<SnapshotRecord>>;

    /// Persist one field of one cell. Last write wins server-side.
    async fn persist_field(&self, update: FieldUpdate) -> anyhow::Result<()>;

    /// Kick off a server-side batch recompute.
    async fn trigger_bulk_recompute(&self, scope: BulkScope) -> anyhow::Result<()>;
}
