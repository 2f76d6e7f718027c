//! Unidirectional state container with interceptors and lifecycle-aware
//! async tasks.
//!
//! ```text
//! dispatch(action) ──► interceptors ──► reducer ──► state ──► subscribers
//!                          │
//!                          └─► task bodies ──► async work ──► dispatch(…)
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod interceptor;
pub mod logging;
pub mod mvi;
pub mod status;
pub mod store;
pub mod task;

pub use config::{ConfigError, StoreConfig};
pub use diagnostics::{Anomaly, Diagnostics};
pub use error::TaskError;
pub use interceptor::Interceptor;
pub use mvi::{combine, FnReducer, Intent, Reducer, StoreState};
pub use status::{LifecycleEvent, TaskState, TaskStatus, Tracker};
pub use store::{Action, Dispatch, GetState, StateStream, Store, StoreBuilder, Thunk, Update};
pub use task::{RetainedTaskAction, TaskAction, TaskScope};
