//! Shared fixtures: a counter store and a recording interceptor.

#![allow(dead_code, unused_imports)]

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use unistore::interceptor::Interceptor;
use unistore::mvi::{FnReducer, Intent, Reducer, StoreState};
use unistore::status::{TaskState, TaskStatus};
use unistore::store::{Action, Dispatch, GetState, StateStream, Store};
use unistore::task::TaskScope;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Counter {
    pub value: i64,
    pub label: String,
    pub download: TaskState<u64>,
    pub status: TaskStatus,
}

impl StoreState for Counter {}

#[derive(Debug, Clone, PartialEq)]
pub enum CounterIntent {
    Add(i64),
    Rename(String),
    Reset,
}

impl Intent for CounterIntent {}

pub type CounterScope = TaskScope<Counter, CounterIntent>;

pub fn reduce(mut state: Counter, intent: &CounterIntent) -> Counter {
    match intent {
        CounterIntent::Add(n) => state.value += n,
        CounterIntent::Rename(label) => state.label = label.clone(),
        CounterIntent::Reset => state.value = 0,
    }
    state
}

pub fn counter_reducer() -> impl Reducer<State = Counter, Intent = CounterIntent> {
    FnReducer::new(reduce)
}

pub fn counter_store() -> Store<Counter, CounterIntent> {
    Store::new(counter_reducer(), Counter::default())
}

pub fn download_field(state: &mut Counter) -> &mut TaskState<u64> {
    &mut state.download
}

pub fn status_field(state: &mut Counter) -> &mut TaskStatus {
    &mut state.status
}

/// Shared log of strings written by interceptors under test.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

/// Interceptor that writes `name` to the journal and forwards the action.
pub fn tagging(
    name: &'static str,
    journal: Journal,
) -> impl Interceptor<Counter, CounterIntent> {
    move |_full: Dispatch<Counter, CounterIntent>,
          _get_state: GetState<Counter>,
          next: Dispatch<Counter, CounterIntent>| {
        let journal = journal.clone();
        Dispatch::new(move |action: Action<Counter, CounterIntent>| {
            journal.push(name);
            next.dispatch(action);
        })
    }
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Wait for the next stream item, with a timeout.
pub async fn next_item<T>(stream: &mut StateStream<T>) -> Option<T> {
    tokio::time::timeout(Duration::from_secs(2), stream.recv())
        .await
        .ok()
        .flatten()
}
