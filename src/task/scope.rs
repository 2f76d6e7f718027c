//! What a task body sees while it registers its work.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::mvi::{Intent, StoreState};
use crate::store::{Dispatch, GetState};
use crate::task::cleanup::Cleanup;
use crate::task::handle::CancellationHandle;
use crate::task::registry::{TaskId, TaskRegistry};

enum CleanupSource {
    Detached,
    Registry { registry: Arc<TaskRegistry>, id: TaskId },
}

/// Collects the handles a task body starts.
///
/// Handles retained here end up on the [`TaskAction`](super::TaskAction)
/// value or in the store's [`TaskRegistry`], even when the body returns an
/// error halfway through.
pub struct TaskScope<S, A> {
    dispatch: Dispatch<S, A>,
    get_state: GetState<S>,
    label: Cow<'static, str>,
    handles: Vec<CancellationHandle>,
    cleanup: CleanupSource,
}

impl<S: StoreState, A: Intent> TaskScope<S, A> {
    pub(crate) fn detached(
        dispatch: Dispatch<S, A>,
        get_state: GetState<S>,
        label: Cow<'static, str>,
    ) -> Self {
        Self {
            dispatch,
            get_state,
            label,
            handles: Vec::new(),
            cleanup: CleanupSource::Detached,
        }
    }

    pub(crate) fn retained(
        dispatch: Dispatch<S, A>,
        get_state: GetState<S>,
        label: Cow<'static, str>,
        registry: Arc<TaskRegistry>,
        id: TaskId,
    ) -> Self {
        Self {
            dispatch,
            get_state,
            label,
            handles: Vec::new(),
            cleanup: CleanupSource::Registry { registry, id },
        }
    }

    /// Dispatch through the full interceptor chain.
    pub fn dispatch(&self) -> &Dispatch<S, A> {
        &self.dispatch
    }

    pub fn get_state(&self) -> &GetState<S> {
        &self.get_state
    }

    /// Latest committed state.
    pub fn state(&self) -> Option<Arc<S>> {
        self.get_state.get()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Registry id for retained tasks.
    pub fn task_id(&self) -> Option<TaskId> {
        match &self.cleanup {
            CleanupSource::Registry { id, .. } => Some(*id),
            CleanupSource::Detached => None,
        }
    }

    /// Keep a handle alive for as long as the task owner lives.
    pub fn retain(&mut self, handle: CancellationHandle) {
        self.handles.push(handle);
    }

    /// A fresh completion latch. Take exactly one per retained handle and
    /// fire it when that handle's work ends.
    ///
    /// For non-retained tasks the latch releases nothing.
    pub fn cleanup(&self) -> Cleanup {
        match &self.cleanup {
            CleanupSource::Registry { registry, id } => registry.cleanup_for(*id),
            CleanupSource::Detached => Cleanup::detached(),
        }
    }

    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    /// Run `work` on the current tokio runtime under a new handle.
    ///
    /// The work receives the handle's token and should stop once it is
    /// cancelled; it is no longer polled after that either way, not even
    /// when it was cancelled before its first poll. The handle's cleanup
    /// fires when the work ends for any reason.
    pub fn spawn<F, Fut>(&mut self, work: F) -> Result<CancellationToken, TaskError>
    where
        F: FnOnce(TaskContext<S, A>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TaskError::NoRuntime)?;
        let handle = CancellationHandle::new();
        let token = handle.token();
        let cleanup = self.cleanup();

        let future = work(TaskContext {
            dispatch: self.dispatch.clone(),
            get_state: self.get_state.clone(),
            token: token.clone(),
            cleanup: cleanup.clone(),
        });
        let watch = token.clone();
        runtime.spawn(async move {
            let _cleanup = scopeguard::guard(cleanup, |cleanup| {
                cleanup.call();
            });
            tokio::select! {
                biased;
                _ = watch.cancelled() => {}
                _ = future => {}
            }
        });

        self.retain(handle);
        Ok(token)
    }

    pub(crate) fn into_handles(self) -> Vec<CancellationHandle> {
        self.handles
    }
}

/// Handed to work started with [`TaskScope::spawn`].
pub struct TaskContext<S, A> {
    pub dispatch: Dispatch<S, A>,
    pub get_state: GetState<S>,
    pub token: CancellationToken,
    cleanup: Cleanup,
}

impl<S: StoreState, A: Intent> TaskContext<S, A> {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Latch for this handle, for work that finishes before returning.
    pub fn cleanup(&self) -> &Cleanup {
        &self.cleanup
    }
}

impl<S, A> Clone for TaskContext<S, A> {
    fn clone(&self) -> Self {
        Self {
            dispatch: self.dispatch.clone(),
            get_state: self.get_state.clone(),
            token: self.token.clone(),
            cleanup: self.cleanup.clone(),
        }
    }
}
