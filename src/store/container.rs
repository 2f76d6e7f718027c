//! The store: single owner of state, entry point for every dispatch.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use crate::diagnostics::{Anomaly, Diagnostics};
use crate::interceptor::{compose, Interceptor};
use crate::mvi::{Intent, Reducer, StoreState};
use crate::store::action::Action;
use crate::store::builder::StoreBuilder;
use crate::store::dispatch::{Dispatch, GetState};
use crate::store::subscription::{distinct, every_change, snapshots, StateStream, Subscriber};
use crate::task::TaskRegistry;

/// Unidirectional state container.
///
/// ```text
/// dispatch(action) ──► interceptor chain ──► reducer ──► commit ──► subscribers
/// ```
///
/// Commits are serialized by one lock: reducer application, snapshot swap
/// and fan-out to subscribers happen as one step, so every subscriber sees
/// changes in dispatch order regardless of which thread dispatched.
/// `dispatch` never waits for async task work.
pub struct Store<S, A> {
    inner: Arc<StoreInner<S, A>>,
}

pub(crate) struct StoreInner<S, A> {
    core: Mutex<Core<S>>,
    reducer: Box<dyn Reducer<State = S, Intent = A>>,
    chain: RwLock<Dispatch<S, A>>,
    interceptors: Mutex<Vec<Arc<dyn Interceptor<S, A>>>>,
    registry: Option<Arc<TaskRegistry>>,
    diagnostics: Arc<dyn Diagnostics>,
    this: Weak<StoreInner<S, A>>,
}

struct Core<S> {
    state: Arc<S>,
    version: u64,
    subscribers: Vec<Box<dyn Subscriber<S>>>,
}

/// Everything the builder hands over.
pub(crate) struct StoreParts<S, A> {
    pub(crate) reducer: Box<dyn Reducer<State = S, Intent = A>>,
    pub(crate) state: S,
    pub(crate) interceptors: Vec<Arc<dyn Interceptor<S, A>>>,
    pub(crate) registry: Option<Arc<TaskRegistry>>,
    pub(crate) diagnostics: Arc<dyn Diagnostics>,
}

impl<S: StoreState, A: Intent> Store<S, A> {
    /// A store without interceptors.
    pub fn new(reducer: impl Reducer<State = S, Intent = A>, state: S) -> Self {
        StoreBuilder::new(reducer, state).build()
    }

    pub fn builder(reducer: impl Reducer<State = S, Intent = A>, state: S) -> StoreBuilder<S, A> {
        StoreBuilder::new(reducer, state)
    }

    pub(crate) fn from_parts(parts: StoreParts<S, A>) -> Self {
        let inner = Arc::new_cyclic(|this: &Weak<StoreInner<S, A>>| {
            let chain = StoreInner::build_chain(this, &parts.interceptors, &parts.diagnostics);
            StoreInner {
                core: Mutex::new(Core {
                    state: Arc::new(parts.state),
                    version: 0,
                    subscribers: Vec::new(),
                }),
                reducer: parts.reducer,
                chain: RwLock::new(chain),
                interceptors: Mutex::new(parts.interceptors),
                registry: parts.registry,
                diagnostics: parts.diagnostics,
                this: this.clone(),
            }
        });
        Self { inner }
    }

    /// Latest committed state.
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&self.inner.core.lock().state)
    }

    /// Number of commits since the store was created.
    pub fn version(&self) -> u64 {
        self.inner.core.lock().version
    }

    /// Route an action through the interceptor chain.
    ///
    /// Returns once synchronous work is done: interceptors, task body
    /// registration, reducer and subscriber fan-out.
    pub fn dispatch(&self, action: impl Into<Action<S, A>>) {
        self.inner.dispatch(action.into());
    }

    /// Dispatch an application intent.
    pub fn send(&self, intent: A) {
        self.inner.dispatch(Action::Intent(intent));
    }

    /// A dispatcher that enters the chain from the top.
    ///
    /// Does not keep the store alive; dispatches after drop are ignored.
    pub fn dispatcher(&self) -> Dispatch<S, A> {
        StoreInner::full_dispatch(&self.inner.this, &self.inner.diagnostics)
    }

    /// A state reader that does not keep the store alive.
    pub fn getter(&self) -> GetState<S> {
        StoreInner::get_state(&self.inner.this)
    }

    /// A callback that dispatches a clone of `intent` each time it runs.
    pub fn bind(&self, intent: A) -> impl Fn() + Send + Sync + 'static
    where
        A: Clone + Sync,
    {
        let dispatch = self.dispatcher();
        move || dispatch.send(intent.clone())
    }

    /// Deduplicated projection stream: emits only when the projected value
    /// differs from the last one emitted.
    pub fn subscribe<T, F>(&self, selector: F) -> StateStream<T>
    where
        T: PartialEq + Clone + Send + 'static,
        F: Fn(&S) -> T + Send + 'static,
    {
        let mut core = self.inner.core.lock();
        let (subscriber, stream) = distinct(selector, &*core.state);
        core.subscribers.push(subscriber);
        stream
    }

    /// Projection stream that emits on every commit.
    pub fn subscribe_all<T, F>(&self, selector: F) -> StateStream<T>
    where
        T: Send + 'static,
        F: Fn(&S) -> T + Send + 'static,
    {
        let mut core = self.inner.core.lock();
        let (subscriber, stream) = every_change(selector, &*core.state);
        core.subscribers.push(subscriber);
        stream
    }

    /// Full-state snapshot on every commit.
    pub fn subscribe_raw(&self) -> StateStream<Arc<S>> {
        let mut core = self.inner.core.lock();
        let (subscriber, stream) = snapshots(&core.state);
        core.subscribers.push(subscriber);
        stream
    }

    /// Live subscriber count (closed streams are pruned on commit).
    pub fn subscriber_count(&self) -> usize {
        self.inner.core.lock().subscribers.len()
    }

    /// Replace the interceptor list and rebuild the chain.
    ///
    /// Retained tasks keep running: the registry belongs to the store.
    pub fn set_interceptors(&self, interceptors: Vec<Arc<dyn Interceptor<S, A>>>) {
        let chain =
            StoreInner::build_chain(&self.inner.this, &interceptors, &self.inner.diagnostics);
        *self.inner.interceptors.lock() = interceptors;
        *self.inner.chain.write() = chain;
        tracing::debug!("Interceptor chain rebuilt");
    }

    /// Append one interceptor (innermost) and rebuild the chain.
    pub fn push_interceptor(&self, interceptor: Arc<dyn Interceptor<S, A>>) {
        let mut interceptors = self.interceptors();
        interceptors.push(interceptor);
        self.set_interceptors(interceptors);
    }

    pub fn interceptors(&self) -> Vec<Arc<dyn Interceptor<S, A>>> {
        self.inner.interceptors.lock().clone()
    }

    /// The retained-task registry, if task support is enabled.
    pub fn task_registry(&self) -> Option<&Arc<TaskRegistry>> {
        self.inner.registry.as_ref()
    }

    /// Live retained-task entries.
    pub fn retained_tasks(&self) -> usize {
        self.inner.registry.as_ref().map_or(0, |registry| registry.len())
    }
}

impl<S: StoreState, A: Intent> StoreInner<S, A> {
    fn dispatch(&self, action: Action<S, A>) {
        // Clone the chain out so interceptors may dispatch or rebuild.
        let chain = self.chain.read().clone();
        chain.dispatch(action);
    }

    fn build_chain(
        this: &Weak<Self>,
        interceptors: &[Arc<dyn Interceptor<S, A>>],
        diagnostics: &Arc<dyn Diagnostics>,
    ) -> Dispatch<S, A> {
        compose(
            interceptors,
            &Self::full_dispatch(this, diagnostics),
            &Self::get_state(this),
            Self::base_dispatch(this),
        )
    }

    fn full_dispatch(this: &Weak<Self>, diagnostics: &Arc<dyn Diagnostics>) -> Dispatch<S, A> {
        let this = this.clone();
        let diagnostics = Arc::clone(diagnostics);
        Dispatch::new(move |action| match this.upgrade() {
            Some(inner) => inner.dispatch(action),
            None => diagnostics.anomaly(&Anomaly::DispatchAfterDrop {
                description: action.describe(),
            }),
        })
    }

    fn get_state(this: &Weak<Self>) -> GetState<S> {
        let this = this.clone();
        GetState::new(move || {
            this.upgrade()
                .map(|inner| Arc::clone(&inner.core.lock().state))
        })
    }

    fn base_dispatch(this: &Weak<Self>) -> Dispatch<S, A> {
        let this = this.clone();
        Dispatch::new(move |action| match this.upgrade() {
            Some(inner) => inner.commit(action),
            None => tracing::debug!(action = %action.describe(), "Commit after store drop ignored"),
        })
    }

    /// Apply the reducer and publish, as one step.
    fn commit(&self, action: Action<S, A>) {
        let mut unhandled = None;
        {
            let mut core = self.core.lock();
            let next = match action {
                Action::Intent(intent) => {
                    Arc::new(self.reducer.reduce(S::clone(&core.state), &intent))
                }
                Action::Update(update) => Arc::new(update.apply(S::clone(&core.state))),
                other => {
                    unhandled = Some(other);
                    Arc::clone(&core.state)
                }
            };
            core.state = next;
            core.version += 1;
            let Core {
                state, subscribers, ..
            } = &mut *core;
            subscribers.retain_mut(|subscriber| subscriber.notify(state));
        }

        // Dropped outside the lock: task actions cancel their handles here.
        if let Some(action) = unhandled {
            self.diagnostics.anomaly(&Anomaly::UnhandledTask {
                description: action.describe(),
            });
        }
    }
}
