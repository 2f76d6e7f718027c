//! Base trait for store state.

/// Marker trait for the state held by a [`Store`](crate::store::Store).
///
/// States should be:
/// - Immutable (Clone to create new states)
/// - Self-contained (everything subscribers need to project from)
/// - Shareable across threads (snapshots are handed out as `Arc<S>`)
pub trait StoreState: Clone + Send + Sync + 'static {}
