//! Lifecycle events flowing through a store into TaskState / TaskStatus.

mod common;

use common::*;
use futures::stream;
use tokio_util::sync::CancellationToken;
use unistore::diagnostics::{Anomaly, RecordingDiagnostics};
use unistore::error::TaskError;
use unistore::status::{EventKind, LifecycleEvent, TaskState, TaskStatus, Tracker};
use unistore::store::Store;

#[test]
fn download_sequence_ends_completed_with_last_value() {
    let store = counter_store();
    let mut states = store.subscribe(|state: &Counter| state.download.clone());
    let tracker = Tracker::new(store.dispatcher(), "download", download_field);

    tracker.started();
    tracker.value(8);
    tracker.value(420);
    tracker.finished();

    assert_eq!(
        states.drain(),
        vec![
            TaskState::Initial,
            TaskState::Loading,
            TaskState::Active(8),
            TaskState::Active(420),
            TaskState::Completed(Some(420)),
        ]
    );
}

#[test]
fn status_failure_is_terminal() {
    let store = counter_store();
    let mut statuses = store.subscribe(|state: &Counter| state.status.clone());
    let tracker = Tracker::new(store.dispatcher(), "status", status_field);

    tracker.started::<u64, TaskError>();
    tracker.value::<u64, TaskError>(1);
    tracker.failed::<u64, TaskError>(TaskError::source_failed("disk full"));
    tracker.value::<u64, TaskError>(2);
    tracker.finished::<u64, TaskError>();

    assert_eq!(
        statuses.drain(),
        vec![
            TaskStatus::Initial,
            TaskStatus::Loading,
            TaskStatus::Active,
            TaskStatus::Failed(TaskError::Source("disk full".into())),
        ]
    );
    assert!(store.state().status.is_done());
}

#[test]
fn events_after_terminal_are_reported() {
    let diagnostics = RecordingDiagnostics::new();
    let store = counter_store();
    let tracker = Tracker::new(store.dispatcher(), "download", download_field)
        .with_diagnostics(diagnostics.clone());

    tracker.started();
    tracker.cancelled();
    tracker.value(5);

    assert_eq!(store.state().download, TaskState::Cancelled);
    assert_eq!(
        diagnostics.anomalies(),
        vec![Anomaly::TerminalEventIgnored {
            label: "download".into(),
            event: EventKind::Value,
        }]
    );
}

#[test]
fn repeated_start_keeps_current_value() {
    let store = counter_store();
    let tracker = Tracker::new(store.dispatcher(), "download", download_field);

    tracker.value(3);
    tracker.started();

    assert_eq!(store.state().download, TaskState::Active(3));
}

#[test]
fn emit_accepts_raw_events() {
    let store = counter_store();
    let tracker = Tracker::new(store.dispatcher(), "download", download_field);

    tracker.emit(LifecycleEvent::<u64, TaskError>::Started);
    tracker.emit(LifecycleEvent::<u64, TaskError>::Finished);

    assert_eq!(store.state().download, TaskState::Completed(None));
}

#[tokio::test]
async fn drive_emits_full_sequence() {
    let store = counter_store();
    let mut states = store.subscribe(|state: &Counter| state.download.clone());
    let tracker = Tracker::new(store.dispatcher(), "download", download_field);

    let source = stream::iter(vec![Ok::<u64, TaskError>(1), Ok(2), Ok(3)]);
    tracker.drive(source, CancellationToken::new()).await;

    assert_eq!(
        states.drain(),
        vec![
            TaskState::Initial,
            TaskState::Loading,
            TaskState::Active(1),
            TaskState::Active(2),
            TaskState::Active(3),
            TaskState::Completed(Some(3)),
        ]
    );
}

#[tokio::test]
async fn drive_stops_at_first_error() {
    let store = counter_store();
    let tracker = Tracker::new(store.dispatcher(), "download", download_field);

    let source = stream::iter(vec![
        Ok(1),
        Err(TaskError::source_failed("reset by peer")),
        Ok(3),
    ]);
    tracker.drive(source, CancellationToken::new()).await;

    assert_eq!(
        store.state().download,
        TaskState::Failed(TaskError::Source("reset by peer".into()))
    );
}

#[tokio::test]
async fn drive_reports_cancellation_once() {
    let store = counter_store();
    let mut statuses = store.subscribe_all(|state: &Counter| state.status.clone());
    let tracker = Tracker::new(store.dispatcher(), "status", status_field);

    let token = CancellationToken::new();
    let driving = {
        let tracker = tracker.clone();
        let token = token.clone();
        tokio::spawn(async move {
            tracker
                .drive(stream::pending::<Result<u64, TaskError>>(), token)
                .await
        })
    };

    assert!(eventually(|| store.state().status.is_loading()).await);
    token.cancel();
    driving.await.expect("drive task panicked");

    assert_eq!(
        statuses.drain(),
        vec![
            TaskStatus::Initial,
            TaskStatus::Loading,
            TaskStatus::Cancelled,
        ]
    );
}

#[tokio::test]
async fn drive_on_pre_cancelled_token_still_acknowledges() {
    let store = counter_store();
    let tracker = Tracker::new(store.dispatcher(), "download", download_field);
    let token = CancellationToken::new();
    token.cancel();

    tracker
        .drive(stream::iter(vec![Ok::<u64, TaskError>(1)]), token)
        .await;

    assert_eq!(store.state().download, TaskState::Cancelled);
    assert_eq!(store.version(), 2);
}

#[test]
fn tracker_dispatch_after_store_drop_is_reported() {
    let diagnostics = RecordingDiagnostics::new();
    let store = Store::builder(counter_reducer(), Counter::default())
        .diagnostics(diagnostics.clone())
        .build();
    let tracker = Tracker::new(store.dispatcher(), "download", download_field);
    drop(store);

    tracker.value(1);

    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(
        diagnostics.anomalies()[0],
        Anomaly::DispatchAfterDrop { .. }
    ));
}
