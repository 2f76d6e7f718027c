//! Interceptors: composable wrappers around the store's dispatch.
//!
//! ```text
//! dispatch(action)
//!   └─► m1 ──next──► m2 ──next──► … ──next──► base (reducer + publish)
//!        │            │
//!        └─ full dispatch re-enters at m1
//! ```
//!
//! An interceptor that does not call `next` drops the action; the task and
//! thunk interceptors rely on this to keep executable actions away from
//! the reducer.

mod chain;
mod log;
mod thunk;

pub use chain::{compose, Interceptor};
pub use log::{ActionLogLevel, ActionRecorder, LogInterceptor, TracingRecorder};
pub use thunk::ThunkInterceptor;
