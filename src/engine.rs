use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};

use crate::calc::{self, AssignmentAverage, StudentTotals};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::model::{
    Assignment, AssessmentCell, EditField, EditKey, FieldEdit, SaveStatus, Student,
};
use crate::persistence::{BulkScope, FieldUpdate, GridPersistence};
use crate::scheduler::SaveScheduler;
use crate::status::StatusTracker;
use crate::store::GridStore;

/// Orchestrates the grid: applies edits optimistically, debounces their
/// persistence, tracks per-key save status, and reconciles full snapshots.
///
/// Must live inside a tokio runtime; debounce and badge timers are spawned
/// tasks. The UI reads through the accessor methods and never holds a
/// reference into the store.
pub struct SyncEngine {
    course_id: i64,
    teacher_id: i64,
    config: EngineConfig,
    store: Mutex<GridStore>,
    scheduler: SaveScheduler,
    status: StatusTracker,
    persistence: Arc<dyn GridPersistence>,
}

impl SyncEngine {
    pub fn new(
        course_id: i64,
        teacher_id: i64,
        persistence: Arc<dyn GridPersistence>,
        config: EngineConfig,
    ) -> Self {
        let scheduler = SaveScheduler::new(config.debounce());
        let status = StatusTracker::new(config.saved_clear(), config.error_clear());
        Self {
            course_id,
            teacher_id,
            config,
            store: Mutex::new(GridStore::default()),
            scheduler,
            status,
            persistence,
        }
    }

    /// Fetch the full grid and replace the store wholesale. Success cancels
    /// every pending debounce timer and wipes all statuses: the snapshot is
    /// fresher than anything scheduled locally. Failure leaves the current
    /// grid untouched so the session can keep going and retry.
    pub async fn load_snapshot(&self) -> Result<(), EngineError> {
        if self.scheduler.is_disposed() {
            return Err(EngineError::Disposed);
        }
        let records = self
            .persistence
            .fetch_grid_snapshot(self.course_id, self.teacher_id)
            .await
            .map_err(|e| EngineError::SnapshotLoad(e.to_string()))?;

        self.scheduler.cancel_all();
        self.status.clear_all();

        let store = GridStore::from_records(records);
        info!(
            "grid snapshot loaded: course={} students={} assignments={} cells={}",
            self.course_id,
            store.students().len(),
            store.assignments().len(),
            store.cell_count()
        );
        *self.lock_store() = store;
        Ok(())
    }

    /// Validate and apply one field edit, then arm its debounced save.
    ///
    /// The store is updated before anything touches the network (optimistic);
    /// a later persistence failure keeps the local value and only surfaces
    /// through the status badge. Rejected edits never transition the status
    /// machine. Teacher marks are deliberately unclamped: negative and
    /// over-cap entries are valid adjustments.
    pub fn apply_local_edit(
        &self,
        student_id: i64,
        assignment_id: i64,
        edit: FieldEdit,
    ) -> Result<(), EngineError> {
        if self.scheduler.is_disposed() {
            return Err(EngineError::Disposed);
        }
        validate_edit(&edit)?;

        let key = EditKey::new(student_id, assignment_id, edit.field());
        let value = edit.to_wire_value();

        {
            let mut store = self.lock_store();
            let cell = store.cell_mut(student_id, assignment_id).ok_or_else(|| {
                EngineError::validation(
                    edit.field(),
                    format!("no cell for student {} assignment {}", student_id, assignment_id),
                )
            })?;

            match &edit {
                FieldEdit::TeacherMark(mark) => {
                    // Local preview of the derived mark; the server recomputes
                    // authoritatively and the next snapshot wins.
                    let preview = calc::compute_final_mark(
                        *mark,
                        cell.full_mark,
                        cell.counts_as_late(),
                        cell.copy_penalty_applied,
                        self.config.late_penalty_rate,
                    )?;
                    cell.teacher_mark = *mark;
                    cell.final_mark = preview;
                }
                FieldEdit::GradingNotes(notes) => {
                    cell.grading_notes = notes.clone();
                }
                FieldEdit::ManualWeight(weight) => {
                    cell.manual_weight = *weight;
                }
            }
        }

        self.status.mark_pending(key);

        let update = FieldUpdate {
            course_id: self.course_id,
            assignment_id,
            student_id,
            field: key.field,
            value,
        };
        let status = self.status.clone();
        let persistence = Arc::clone(&self.persistence);
        // Transitions from this save are only valid for the current status
        // epoch; a dispose or reload in the meantime invalidates them.
        let epoch = self.status.epoch();
        let fire = async move {
            status.mark_saving(key, epoch);
            match persistence.persist_field(update).await {
                Ok(()) => {
                    debug!(
                        "persisted {} for student={} assignment={}",
                        key.field.as_str(),
                        key.student_id,
                        key.assignment_id
                    );
                    status.mark_saved(key, epoch);
                }
                Err(e) => {
                    warn!(
                        "persist failed for {} student={} assignment={}: {}",
                        key.field.as_str(),
                        key.student_id,
                        key.assignment_id,
                        e
                    );
                    status.mark_error(key, epoch);
                }
            }
        };
        self.scheduler.schedule(key, fire)
    }

    /// Run a server-side batch recompute, then reload the whole grid. The
    /// batch can flip penalties and final marks for many cells at once and
    /// the client has no cheap way to know which, so merging partial results
    /// is not attempted. A failed trigger mutates nothing.
    pub async fn apply_bulk_refresh(&self, scope: BulkScope) -> Result<(), EngineError> {
        if self.scheduler.is_disposed() {
            return Err(EngineError::Disposed);
        }
        self.persistence
            .trigger_bulk_recompute(scope)
            .await
            .map_err(|e| EngineError::Persistence(e.to_string()))?;
        info!("bulk recompute triggered: {:?}", scope);
        self.load_snapshot().await
    }

    pub fn cell(&self, student_id: i64, assignment_id: i64) -> Option<AssessmentCell> {
        self.lock_store().cell(student_id, assignment_id).cloned()
    }

    pub fn status(&self, key: EditKey) -> SaveStatus {
        self.status.get(key)
    }

    /// Every key currently showing a non-idle badge.
    pub fn active_statuses(&self) -> Vec<(EditKey, SaveStatus)> {
        self.status.active_keys()
    }

    pub fn students(&self) -> Vec<Student> {
        self.lock_store().students().to_vec()
    }

    pub fn assignments(&self) -> Vec<Assignment> {
        self.lock_store().assignments().to_vec()
    }

    /// Current-standing totals for one student across all assignments.
    pub fn student_totals(&self, student_id: i64) -> StudentTotals {
        let store = self.lock_store();
        calc::student_totals(store.student_cells(student_id).into_iter())
    }

    /// Class average for one assignment column, if the assignment exists.
    pub fn assignment_average(&self, assignment_id: i64) -> Option<AssignmentAverage> {
        let store = self.lock_store();
        let full_mark = store.assignment(assignment_id)?.full_mark;
        Some(calc::assignment_average(
            store.assignment_cells(assignment_id).into_iter(),
            full_mark,
        ))
    }

    /// Tear the engine down: no debounce timer fires after this returns and
    /// all status badges are gone. Saves already in flight complete against
    /// the server but no longer report anywhere. Idempotent.
    pub fn dispose(&self) {
        self.scheduler.dispose();
        self.status.clear_all();
    }

    pub fn is_disposed(&self) -> bool {
        self.scheduler.is_disposed()
    }

    fn lock_store(&self) -> MutexGuard<'_, GridStore> {
        self.store.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        self.scheduler.dispose();
    }
}

fn validate_edit(edit: &FieldEdit) -> Result<(), EngineError> {
    match edit {
        FieldEdit::TeacherMark(Some(v)) if !v.is_finite() => Err(EngineError::validation(
            EditField::TeacherMark,
            "mark must be a finite number or empty",
        )),
        FieldEdit::ManualWeight(w) if !w.is_finite() => Err(EngineError::validation(
            EditField::ManualWeight,
            "weight must be a finite number",
        )),
        FieldEdit::ManualWeight(w) if !(0.0..=2.0).contains(w) => Err(EngineError::validation(
            EditField::ManualWeight,
            format!("weight must be in [0, 2], got {}", w),
        )),
        _ => Ok(()),
    }
}
