//! Subscriber streams fed by the store on every commit.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

/// One registered subscriber. Returns `false` once its stream is gone.
pub(crate) trait Subscriber<S>: Send {
    fn notify(&mut self, state: &Arc<S>) -> bool;
}

/// Emits every committed snapshot.
struct Snapshots<S> {
    sender: UnboundedSender<Arc<S>>,
}

impl<S: Send + Sync> Subscriber<S> for Snapshots<S> {
    fn notify(&mut self, state: &Arc<S>) -> bool {
        self.sender.send(Arc::clone(state)).is_ok()
    }
}

/// Emits the projection of every committed state.
struct EveryChange<T, F> {
    selector: F,
    sender: UnboundedSender<T>,
}

impl<S, T, F> Subscriber<S> for EveryChange<T, F>
where
    T: Send,
    F: Fn(&S) -> T + Send,
{
    fn notify(&mut self, state: &Arc<S>) -> bool {
        self.sender.send((self.selector)(&**state)).is_ok()
    }
}

/// Emits a projection only when it differs from the previous one.
struct Distinct<T, F> {
    selector: F,
    sender: UnboundedSender<T>,
    last: T,
}

impl<S, T, F> Subscriber<S> for Distinct<T, F>
where
    T: PartialEq + Clone + Send,
    F: Fn(&S) -> T + Send,
{
    fn notify(&mut self, state: &Arc<S>) -> bool {
        if self.sender.is_closed() {
            return false;
        }
        let next = (self.selector)(&**state);
        if next == self.last {
            return true;
        }
        self.last = next.clone();
        self.sender.send(next).is_ok()
    }
}

/// Build a snapshot subscriber, seeded with `initial`.
pub(crate) fn snapshots<S>(initial: &Arc<S>) -> (Box<dyn Subscriber<S>>, StateStream<Arc<S>>)
where
    S: Send + Sync + 'static,
{
    let (sender, receiver) = mpsc::unbounded_channel();
    // Receiver is alive, the seed cannot fail.
    let _ = sender.send(Arc::clone(initial));
    (Box::new(Snapshots { sender }), StateStream { receiver })
}

/// Build a subscriber that emits on every commit, seeded with `initial`.
pub(crate) fn every_change<S, T, F>(
    selector: F,
    initial: &S,
) -> (Box<dyn Subscriber<S>>, StateStream<T>)
where
    S: 'static,
    T: Send + 'static,
    F: Fn(&S) -> T + Send + 'static,
{
    let (sender, receiver) = mpsc::unbounded_channel();
    let _ = sender.send(selector(initial));
    (
        Box::new(EveryChange { selector, sender }),
        StateStream { receiver },
    )
}

/// Build a deduplicating subscriber, seeded with `initial`.
pub(crate) fn distinct<S, T, F>(selector: F, initial: &S) -> (Box<dyn Subscriber<S>>, StateStream<T>)
where
    S: 'static,
    T: PartialEq + Clone + Send + 'static,
    F: Fn(&S) -> T + Send + 'static,
{
    let (sender, receiver) = mpsc::unbounded_channel();
    let last = selector(initial);
    let _ = sender.send(last.clone());
    (
        Box::new(Distinct {
            selector,
            sender,
            last,
        }),
        StateStream { receiver },
    )
}

/// Sequence of projected states, one item per emitted change.
///
/// Starts with the projection current at subscription time. Ends only when
/// the store is dropped. Dropping the stream unsubscribes it.
#[derive(Debug)]
pub struct StateStream<T> {
    receiver: UnboundedReceiver<T>,
}

impl<T> StateStream<T> {
    /// Wait for the next item.
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Next buffered item, if any.
    pub fn try_recv(&mut self) -> Option<T> {
        match self.receiver.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Every buffered item, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Stop receiving; the store forgets this subscriber on its next commit.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

impl<T> Stream for StateStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.receiver.poll_recv(cx)
    }
}
