//! Task and retained task actions: ownership, cleanup counting, failures.

mod common;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use common::*;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use unistore::diagnostics::{Anomaly, RecordingDiagnostics};
use unistore::error::TaskError;
use unistore::status::TaskStatus;
use unistore::store::{Action, Store, Update};
use unistore::task::{CancellationHandle, Cleanup, RetainedTaskAction, TaskAction, TaskId};

fn task_store() -> (Store<Counter, CounterIntent>, Arc<RecordingDiagnostics>) {
    let diagnostics = RecordingDiagnostics::new();
    let store = Store::builder(counter_reducer(), Counter::default())
        .diagnostics(diagnostics.clone())
        .with_tasks()
        .build();
    (store, diagnostics)
}

fn record_failure(error: TaskError) -> Action<Counter, CounterIntent> {
    Action::Update(Update::new(move |state: &mut Counter| {
        state.status = TaskStatus::Failed(error)
    }))
}

#[tokio::test]
async fn dropping_task_action_cancels_its_work() {
    let (store, _) = task_store();
    let tokens: Arc<Mutex<Vec<CancellationToken>>> = Arc::default();
    let seen = Arc::clone(&tokens);

    let action = TaskAction::new(move |scope: &mut CounterScope| {
        let token = scope.spawn(|ctx| async move { ctx.token.cancelled().await })?;
        seen.lock().push(token);
        Ok(())
    })
    .with_label("watch");

    store.dispatch(action.clone());
    assert_eq!(action.handle_count(), 1);
    let token = tokens.lock()[0].clone();
    assert!(!token.is_cancelled());

    drop(action);
    assert!(token.is_cancelled());
    assert_eq!(store.version(), 0);
}

#[tokio::test]
async fn work_cancelled_before_its_first_poll_never_dispatches() {
    let (store, _) = task_store();

    let action = TaskAction::new(|scope: &mut CounterScope| {
        scope.spawn(|ctx| async move { ctx.dispatch.send(CounterIntent::Add(1)) })?;
        Ok(())
    });
    store.dispatch(action.clone());
    drop(action);

    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(store.state().value, 0);
    assert_eq!(store.version(), 0);
}

#[tokio::test]
async fn dropped_task_action_stops_dispatching_midway() {
    let (store, _) = task_store();
    let gate = CancellationToken::new();
    let opened = gate.clone();

    let action = TaskAction::new(move |scope: &mut CounterScope| {
        let gate = opened.clone();
        scope.spawn(move |ctx| async move {
            ctx.dispatch.send(CounterIntent::Add(1));
            gate.cancelled().await;
            ctx.dispatch.send(CounterIntent::Add(10));
        })?;
        Ok(())
    });
    store.dispatch(action.clone());
    assert!(eventually(|| store.state().value == 1).await);

    drop(action);
    gate.cancel();
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(store.state().value, 1);
    assert_eq!(store.version(), 1);
}

#[tokio::test]
async fn cancel_drops_handles_now() {
    let (store, _) = task_store();
    let tokens: Arc<Mutex<Vec<CancellationToken>>> = Arc::default();
    let seen = Arc::clone(&tokens);

    let action = TaskAction::new(move |scope: &mut CounterScope| {
        let handle = CancellationHandle::new();
        seen.lock().push(handle.token());
        scope.retain(handle);
        Ok(())
    });
    store.dispatch(action.clone());
    store.dispatch(action.clone());
    assert_eq!(action.handle_count(), 2);

    action.cancel();
    assert_eq!(action.handle_count(), 0);
    assert!(tokens.lock().iter().all(|token| token.is_cancelled()));
}

#[tokio::test]
async fn retained_task_outlives_the_action_value() {
    let (store, diagnostics) = task_store();
    let gate = CancellationToken::new();
    let opened = gate.clone();

    store.dispatch(
        RetainedTaskAction::new(move |scope: &mut CounterScope| {
            let gate = opened.clone();
            scope.spawn(move |ctx| async move {
                gate.cancelled().await;
                ctx.dispatch.send(CounterIntent::Add(1));
            })?;
            Ok(())
        })
        .with_label("wait-then-add"),
    );
    assert_eq!(store.retained_tasks(), 1);
    assert_eq!(store.state().value, 0);

    gate.cancel();
    assert!(eventually(|| store.retained_tasks() == 0).await);
    assert_eq!(store.state().value, 1);
    assert!(diagnostics.is_empty());
}

#[tokio::test]
async fn entry_released_after_one_cleanup_per_handle() {
    let (store, diagnostics) = task_store();
    let first = CancellationToken::new();
    let second = CancellationToken::new();
    let ids: Arc<Mutex<Vec<TaskId>>> = Arc::default();

    let (a, b, seen) = (first.clone(), second.clone(), Arc::clone(&ids));
    store.dispatch(RetainedTaskAction::new(move |scope: &mut CounterScope| {
        seen.lock().extend(scope.task_id());
        let a = a.clone();
        scope.spawn(move |_ctx| async move { a.cancelled().await })?;
        let b = b.clone();
        scope.spawn(move |_ctx| async move { b.cancelled().await })?;
        Ok(())
    }));

    let id = ids.lock()[0];
    let registry = Arc::clone(store.task_registry().expect("task support enabled"));
    assert_eq!(registry.remaining(id), Some(2));

    first.cancel();
    assert!(eventually(|| registry.remaining(id) == Some(1)).await);
    assert_eq!(store.retained_tasks(), 1);

    second.cancel();
    assert!(eventually(|| store.retained_tasks() == 0).await);
    assert!(!registry.contains(id));
    assert!(diagnostics.is_empty());
}

#[test]
fn synchronous_completion_during_body_releases_on_seal() {
    let (store, diagnostics) = task_store();

    store.dispatch(RetainedTaskAction::new(|scope: &mut CounterScope| {
        scope.retain(CancellationHandle::new());
        scope.cleanup().call();
        Ok(())
    }));

    assert_eq!(store.retained_tasks(), 0);
    assert!(diagnostics.is_empty());
}

#[test]
fn cleanup_after_release_is_reported_and_ignored() {
    let (store, diagnostics) = task_store();
    let cleanups: Arc<Mutex<Vec<Cleanup>>> = Arc::default();
    let ids: Arc<Mutex<Vec<TaskId>>> = Arc::default();

    let (slot, seen) = (Arc::clone(&cleanups), Arc::clone(&ids));
    store.dispatch(RetainedTaskAction::new(move |scope: &mut CounterScope| {
        seen.lock().extend(scope.task_id());
        scope.retain(CancellationHandle::new());
        slot.lock().push(scope.cleanup());
        slot.lock().push(scope.cleanup());
        Ok(())
    }));
    assert_eq!(store.retained_tasks(), 1);

    let mut taken = std::mem::take(&mut *cleanups.lock());
    let extra = taken.pop().expect("two cleanups");
    let first = taken.pop().expect("two cleanups");

    assert!(first.call());
    assert!(!first.call());
    assert_eq!(store.retained_tasks(), 0);
    assert!(diagnostics.is_empty());

    assert!(extra.call());
    let id = ids.lock()[0];
    assert_eq!(
        diagnostics.anomalies(),
        vec![Anomaly::CleanupAfterRelease { task: id }]
    );
}

#[tokio::test]
async fn cleanup_from_work_releases_and_cancels_it() {
    let (store, _) = task_store();
    let stopped = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stopped);

    store.dispatch(RetainedTaskAction::new(move |scope: &mut CounterScope| {
        let flag = Arc::clone(&flag);
        scope.spawn(move |ctx| async move {
            ctx.cleanup().call();
            ctx.token.cancelled().await;
            flag.store(true, Ordering::SeqCst);
        })?;
        Ok(())
    }));

    assert!(eventually(|| stopped.load(Ordering::SeqCst)).await);
    assert_eq!(store.retained_tasks(), 0);
}

#[tokio::test]
async fn failing_body_keeps_partial_handles_and_reports() {
    let (store, _) = task_store();

    let action = TaskAction::new(|scope: &mut CounterScope| {
        scope.spawn(|ctx| async move { ctx.token.cancelled().await })?;
        Err(TaskError::body_failed("second source unavailable"))
    })
    .on_failure(record_failure);

    store.dispatch(action.clone());

    assert_eq!(action.handle_count(), 1);
    assert_eq!(
        store.state().status,
        TaskStatus::Failed(TaskError::Body("second source unavailable".into()))
    );
}

#[tokio::test]
async fn failing_retained_body_still_registers_handles() {
    let (store, _) = task_store();
    let gate = CancellationToken::new();
    let opened = gate.clone();

    store.dispatch(
        RetainedTaskAction::new(move |scope: &mut CounterScope| {
            let gate = opened.clone();
            scope.spawn(move |_ctx| async move { gate.cancelled().await })?;
            Err(TaskError::body_failed("late failure"))
        })
        .on_failure(record_failure),
    );

    assert_eq!(store.retained_tasks(), 1);
    assert!(store.state().status.is_done());

    gate.cancel();
    assert!(eventually(|| store.retained_tasks() == 0).await);
}

#[test]
fn panicking_retained_body_settles_its_entry() {
    let (store, _) = task_store();

    store.dispatch(
        RetainedTaskAction::new(|scope: &mut CounterScope| {
            scope.retain(CancellationHandle::new());
            drop(scope.cleanup());
            panic!("registry lookup failed");
        })
        .on_failure(record_failure),
    );

    assert_eq!(store.retained_tasks(), 0);
    assert_eq!(
        store.state().status,
        TaskStatus::Failed(TaskError::Body("panicked: registry lookup failed".into()))
    );
}

#[tokio::test]
async fn panicking_retained_body_keeps_spawned_work() {
    let (store, _) = task_store();
    let gate = CancellationToken::new();
    let opened = gate.clone();

    store.dispatch(RetainedTaskAction::new(move |scope: &mut CounterScope| {
        let gate = opened.clone();
        scope.spawn(move |ctx| async move {
            gate.cancelled().await;
            ctx.dispatch.send(CounterIntent::Add(3));
        })?;
        panic!("second source missing");
    }));
    assert_eq!(store.retained_tasks(), 1);

    gate.cancel();
    assert!(eventually(|| store.retained_tasks() == 0).await);
    assert_eq!(store.state().value, 3);
}

#[tokio::test]
async fn panicking_task_body_keeps_partial_handles() {
    let (store, _) = task_store();

    let action = TaskAction::new(|scope: &mut CounterScope| {
        scope.spawn(|ctx| async move { ctx.token.cancelled().await })?;
        panic!("{} unavailable", "second source");
    })
    .on_failure(record_failure);
    store.dispatch(action.clone());

    assert_eq!(action.handle_count(), 1);
    assert_eq!(
        store.state().status,
        TaskStatus::Failed(TaskError::Body("panicked: second source unavailable".into()))
    );
}

#[test]
fn spawn_without_runtime_fails_the_body() {
    let (store, _) = task_store();

    let action = TaskAction::new(|scope: &mut CounterScope| {
        scope.spawn(|_ctx| async {})?;
        Ok(())
    })
    .on_failure(record_failure);
    store.dispatch(action.clone());

    assert_eq!(store.state().status, TaskStatus::Failed(TaskError::NoRuntime));
    assert_eq!(action.handle_count(), 0);
}

#[tokio::test]
async fn each_retained_dispatch_gets_its_own_entry() {
    let (store, _) = task_store();
    let gate = CancellationToken::new();
    let ids: Arc<Mutex<Vec<TaskId>>> = Arc::default();

    let (opened, seen) = (gate.clone(), Arc::clone(&ids));
    let task = RetainedTaskAction::new(move |scope: &mut CounterScope| {
        seen.lock().extend(scope.task_id());
        let gate = opened.clone();
        scope.spawn(move |_ctx| async move { gate.cancelled().await })?;
        Ok(())
    });

    store.dispatch(task.clone());
    store.dispatch(task);

    assert_eq!(store.retained_tasks(), 2);
    let distinct: HashSet<TaskId> = ids.lock().iter().copied().collect();
    assert_eq!(distinct.len(), 2);

    gate.cancel();
    assert!(eventually(|| store.retained_tasks() == 0).await);
}

#[tokio::test]
async fn dropping_store_cancels_retained_work() {
    let (store, diagnostics) = task_store();
    let stopped = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stopped);

    store.dispatch(RetainedTaskAction::new(move |scope: &mut CounterScope| {
        let flag = Arc::clone(&flag);
        scope.spawn(move |ctx| async move {
            let _stopped = scopeguard::guard(flag, |flag| flag.store(true, Ordering::SeqCst));
            ctx.token.cancelled().await;
            ctx.dispatch.send(CounterIntent::Add(1));
        })?;
        Ok(())
    }));
    assert_eq!(store.retained_tasks(), 1);
    drop(store);

    assert!(eventually(|| stopped.load(Ordering::SeqCst)).await);
    assert!(diagnostics.anomalies().is_empty());
}

#[test]
fn task_action_without_task_support_is_reported() {
    let diagnostics = RecordingDiagnostics::new();
    let store = Store::builder(counter_reducer(), Counter::default())
        .diagnostics(diagnostics.clone())
        .build();
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);

    store.dispatch(
        TaskAction::new(move |_scope: &mut CounterScope| {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .with_label("orphan"),
    );

    assert!(!ran.load(Ordering::SeqCst));
    assert_eq!(store.version(), 1);
    assert_eq!(
        diagnostics.anomalies(),
        vec![Anomaly::UnhandledTask {
            description: "[TaskAction] orphan".into()
        }]
    );
}
