//! State container: one owner of state, one entry point for every change.
//!
//! ```text
//! Store::dispatch ──► interceptors ──► commit (reducer + publish)
//!                                         │
//!                                         └─► StateStream subscribers
//! ```

mod action;
mod builder;
mod container;
mod dispatch;
mod subscription;

pub use action::{Action, Thunk, Update};
pub use builder::StoreBuilder;
pub use container::Store;
pub use dispatch::{Dispatch, GetState};
pub use subscription::StateStream;
