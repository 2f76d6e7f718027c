//! Dispatches lifecycle events for one stream into a field of the state.

use std::borrow::Cow;
use std::sync::Arc;

use futures::{pin_mut, Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::diagnostics::{Anomaly, Diagnostics};
use crate::mvi::{Intent, StoreState};
use crate::status::{Lifecycle, LifecycleEvent, Transition};
use crate::store::{Dispatch, Update};

/// Binds a dispatcher to one lifecycle field of the state.
///
/// Every event becomes an [`Update`] action whose closure feeds the event
/// into the field, so the transition is applied to the state current at
/// commit time and terminal states stay terminal.
pub struct Tracker<S, A, M> {
    dispatch: Dispatch<S, A>,
    label: Cow<'static, str>,
    field: fn(&mut S) -> &mut M,
    diagnostics: Option<Arc<dyn Diagnostics>>,
}

impl<S, A, M> Tracker<S, A, M>
where
    S: StoreState,
    A: Intent,
    M: 'static,
{
    pub fn new(
        dispatch: Dispatch<S, A>,
        label: impl Into<Cow<'static, str>>,
        field: fn(&mut S) -> &mut M,
    ) -> Self {
        Self {
            dispatch,
            label: label.into(),
            field,
            diagnostics: None,
        }
    }

    /// Report events that arrive after the field is terminal.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn emit<T, E>(&self, event: LifecycleEvent<T, E>)
    where
        M: Lifecycle<T, E>,
        T: Send + 'static,
        E: Send + 'static,
    {
        let kind = event.kind();
        let field = self.field;
        let diagnostics = self.diagnostics.clone();
        let label = self.label.clone();
        let update = Update::new(move |state: &mut S| {
            let target = field(state);
            let was_terminal = target.is_terminal();
            if target.on_event(event) == Transition::Ignored && was_terminal {
                if let Some(diagnostics) = diagnostics {
                    diagnostics.anomaly(&Anomaly::TerminalEventIgnored {
                        label: label.into_owned(),
                        event: kind,
                    });
                }
            }
        })
        .with_event(kind)
        .with_label(self.label.clone());
        self.dispatch.dispatch(update);
    }

    pub fn started<T, E>(&self)
    where
        M: Lifecycle<T, E>,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.emit(LifecycleEvent::<T, E>::Started)
    }

    pub fn value<T, E>(&self, value: T)
    where
        M: Lifecycle<T, E>,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.emit(LifecycleEvent::<T, E>::Value(value))
    }

    pub fn finished<T, E>(&self)
    where
        M: Lifecycle<T, E>,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.emit(LifecycleEvent::<T, E>::Finished)
    }

    pub fn failed<T, E>(&self, error: E)
    where
        M: Lifecycle<T, E>,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.emit(LifecycleEvent::<T, E>::Failed(error))
    }

    pub fn cancelled<T, E>(&self)
    where
        M: Lifecycle<T, E>,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.emit(LifecycleEvent::<T, E>::Cancelled)
    }

    /// Observe `stream` until it ends or `token` is cancelled.
    ///
    /// Emits `Started`, one `Value` per item, then exactly one terminal
    /// event: `Finished` when the stream ends, `Failed` on its first error,
    /// `Cancelled` if the token fires first. Nothing is emitted after the
    /// terminal event.
    pub async fn drive<St, T, E>(&self, stream: St, token: CancellationToken)
    where
        St: Stream<Item = Result<T, E>>,
        M: Lifecycle<T, E>,
        T: Send + 'static,
        E: Send + 'static,
    {
        pin_mut!(stream);
        self.started::<T, E>();
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    self.cancelled::<T, E>();
                    return;
                }
                item = stream.next() => match item {
                    Some(Ok(value)) => self.value::<T, E>(value),
                    Some(Err(error)) => {
                        self.failed::<T, E>(error);
                        return;
                    }
                    None => {
                        self.finished::<T, E>();
                        return;
                    }
                },
            }
        }
    }
}

impl<S, A, M> Clone for Tracker<S, A, M> {
    fn clone(&self) -> Self {
        Self {
            dispatch: self.dispatch.clone(),
            label: self.label.clone(),
            field: self.field,
            diagnostics: self.diagnostics.clone(),
        }
    }
}
