mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{engine, loaded_engine, record, MockPersistence};
use gridsync::{EditField, EditKey, EngineError, FieldEdit, SaveStatus};

#[tokio::test(start_paused = true)]
async fn a_second_load_replaces_the_grid_wholesale() {
    let mock = MockPersistence::with_snapshot(vec![record(1, 10, 100.0), record(2, 10, 100.0)]);
    let engine = loaded_engine(&mock).await;
    assert_eq!(engine.students().len(), 2);

    let key = EditKey::new(1, 10, EditField::TeacherMark);
    engine
        .apply_local_edit(1, 10, FieldEdit::TeacherMark(Some(80.0)))
        .expect("edit");
    assert_eq!(engine.status(key), SaveStatus::Pending);

    let mut replacement = record(3, 20, 60.0);
    replacement.teacher_mark = Some(50.0);
    replacement.final_mark = Some(50.0);
    mock.set_snapshot(vec![replacement]);
    engine.load_snapshot().await.expect("reload");

    // No stale cells survive, statuses reset, pending saves cancelled.
    assert!(engine.cell(1, 10).is_none());
    assert!(engine.cell(2, 10).is_none());
    assert_eq!(engine.cell(3, 20).expect("new cell").final_mark, Some(50.0));
    assert_eq!(engine.status(key), SaveStatus::Idle);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert!(mock.persisted().is_empty(), "reload cancels armed timers");
}

#[tokio::test(start_paused = true)]
async fn in_flight_save_resolving_after_a_reload_leaves_no_ghost_badge() {
    let mock = MockPersistence::with_snapshot(vec![record(1, 10, 100.0)]);
    mock.persist_delay_ms.store(3000, Ordering::SeqCst);
    let engine = loaded_engine(&mock).await;
    let key = EditKey::new(1, 10, EditField::TeacherMark);

    engine
        .apply_local_edit(1, 10, FieldEdit::TeacherMark(Some(80.0)))
        .expect("edit");
    tokio::time::sleep(Duration::from_millis(850)).await;
    assert_eq!(engine.status(key), SaveStatus::Saving);

    // Reload while the save is in flight: the snapshot is fresher, so the
    // save's eventual result must be discarded, not shown as Saved/Error.
    mock.set_snapshot(vec![record(1, 10, 100.0), record(2, 10, 100.0)]);
    engine.load_snapshot().await.expect("reload");
    assert_eq!(engine.status(key), SaveStatus::Idle);

    tokio::time::sleep(Duration::from_millis(4000)).await;
    assert_eq!(mock.persisted().len(), 1, "the in-flight call still completes");
    assert_eq!(engine.status(key), SaveStatus::Idle);
    assert!(engine.active_statuses().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_load_leaves_the_current_grid_alone() {
    let mock = MockPersistence::with_snapshot(vec![record(1, 10, 100.0)]);
    let engine = loaded_engine(&mock).await;

    mock.fail_snapshot.store(true, Ordering::SeqCst);
    let err = engine.load_snapshot().await.expect_err("load should fail");
    assert!(matches!(err, EngineError::SnapshotLoad(_)));
    assert!(engine.cell(1, 10).is_some(), "store untouched on failure");

    // Explicit retry works once the collaborator recovers.
    mock.fail_snapshot.store(false, Ordering::SeqCst);
    engine.load_snapshot().await.expect("retry");
    assert_eq!(mock.snapshot_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn first_load_failure_shows_an_empty_grid() {
    let mock = MockPersistence::with_snapshot(vec![record(1, 10, 100.0)]);
    mock.fail_snapshot.store(true, Ordering::SeqCst);
    let engine = engine(&mock);
    assert!(engine.load_snapshot().await.is_err());
    assert!(engine.students().is_empty());
    assert!(engine.assignments().is_empty());
}
