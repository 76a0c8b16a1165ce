#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use gridsync::{
    BulkScope, EngineConfig, FieldUpdate, GridPersistence, SnapshotRecord, SubmissionStatus,
    SyncEngine,
};

pub const COURSE_ID: i64 = 42;
pub const TEACHER_ID: i64 = 7;

/// Recording stand-in for the transport layer. Snapshot contents, injected
/// failures, and an artificial persist latency are all adjustable per test.
#[derive(Default)]
pub struct MockPersistence {
    pub snapshot: Mutex<Vec<SnapshotRecord>>,
    pub persisted: Mutex<Vec<FieldUpdate>>,
    pub recomputes: Mutex<Vec<BulkScope>>,
    pub fail_persist: AtomicBool,
    pub fail_snapshot: AtomicBool,
    pub fail_recompute: AtomicBool,
    pub persist_delay_ms: AtomicUsize,
    pub snapshot_calls: AtomicUsize,
}

impl MockPersistence {
    pub fn with_snapshot(records: Vec<SnapshotRecord>) -> Arc<Self> {
        let mock = Self::default();
        *mock.snapshot.lock().expect("snapshot lock") = records;
        Arc::new(mock)
    }

    pub fn set_snapshot(&self, records: Vec<SnapshotRecord>) {
        *self.snapshot.lock().expect("snapshot lock") = records;
    }

    pub fn persisted(&self) -> Vec<FieldUpdate> {
        self.persisted.lock().expect("persisted lock").clone()
    }

    pub fn recomputes(&self) -> Vec<BulkScope> {
        self.recomputes.lock().expect("recomputes lock").clone()
    }
}

#[async_trait]
impl GridPersistence for MockPersistence {
    async fn fetch_grid_snapshot(
        &self,
        _course_id: i64,
        _teacher_id: i64,
    ) -> anyhow::Result<Vec<SnapshotRecord>> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_snapshot.load(Ordering::SeqCst) {
            anyhow::bail!("injected snapshot failure");
        }
        Ok(self.snapshot.lock().expect("snapshot lock").clone())
    }

    async fn persist_field(&self, update: FieldUpdate) -> anyhow::Result<()> {
        let delay = self.persist_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
        }
        if self.fail_persist.load(Ordering::SeqCst) {
            anyhow::bail!("injected persist failure");
        }
        self.persisted.lock().expect("persisted lock").push(update);
        Ok(())
    }

    async fn trigger_bulk_recompute(&self, scope: BulkScope) -> anyhow::Result<()> {
        if self.fail_recompute.load(Ordering::SeqCst) {
            anyhow::bail!("injected recompute failure");
        }
        self.recomputes.lock().expect("recomputes lock").push(scope);
        Ok(())
    }
}

pub fn record(student_id: i64, assignment_id: i64, full_mark: f64) -> SnapshotRecord {
    SnapshotRecord {
        student_id,
        student_name: format!("Student {}", student_id),
        student_email: format!("s{}@example.edu", student_id),
        assignment_id,
        assignment_title: format!("Assignment {}", assignment_id),
        full_mark,
        deadline: None,
        teacher_mark: None,
        grading_notes: String::new(),
        manual_weight: 1.0,
        final_mark: None,
        submission_status: SubmissionStatus::Submitted,
        is_late_submission: false,
        copy_penalty_applied: false,
        submission_files: Vec::new(),
        graded_at: None,
    }
}

pub fn engine(mock: &Arc<MockPersistence>) -> SyncEngine {
    SyncEngine::new(
        COURSE_ID,
        TEACHER_ID,
        Arc::clone(mock) as Arc<dyn GridPersistence>,
        EngineConfig::default(),
    )
}

/// Engine pre-loaded with the mock's snapshot.
pub async fn loaded_engine(mock: &Arc<MockPersistence>) -> SyncEngine {
    let engine = engine(mock);
    engine.load_snapshot().await.expect("load snapshot");
    engine
}
